//! Core value types for the dataLayer engine.
//!
//! Identifiers are thin newtypes over the host's numeric keys. Values that
//! arrive as free-form strings (currency codes, locales, the container id)
//! use smart constructors so that once constructed they are always valid.

use nutype::nutype;
use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Wraps a raw numeric key.
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the raw numeric key.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Catalog product key.
    ProductId
);
entity_id!(
    /// Product variant (sale element) key.
    VariantId
);
entity_id!(
    /// Catalog category key.
    CategoryId
);
entity_id!(
    /// Brand key.
    BrandId
);
entity_id!(
    /// Cart key.
    CartId
);
entity_id!(
    /// Order key.
    OrderId
);
entity_id!(
    /// Tax rule key.
    TaxRuleId
);

/// ISO 4217 currency code, e.g. `EUR`.
#[nutype(
    sanitize(trim, uppercase),
    validate(regex = r"^[A-Z]{3}$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct CurrencyCode(String);

/// Host locale such as `en_US` or `fr_FR`.
#[nutype(
    sanitize(trim),
    validate(regex = r"^[a-z]{2,3}(_[A-Z]{2})?$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct Locale(String);

/// Tag-manager container identifier, e.g. `GTM-AB12CD3`.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 32, regex = r"^GTM-[A-Z0-9]+$"),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize,
        TryFrom
    )
)]
pub struct ContainerId(String);

/// Upper bound on the number of categories walked for one category path.
///
/// Validated to be between 1 and 256 so a corrupted parent chain fails
/// quickly instead of walking forever.
#[nutype(
    validate(greater_or_equal = 1, less_or_equal = 256),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct MaxCategoryDepth(usize);

impl MaxCategoryDepth {
    /// Default bound, far deeper than any real catalog tree.
    pub const DEFAULT: usize = 64;
}

impl Default for MaxCategoryDepth {
    fn default() -> Self {
        Self::try_new(Self::DEFAULT).expect("default category depth should always be valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn currency_code_is_normalised_to_uppercase() {
        let code = CurrencyCode::try_new(" eur ").unwrap();
        assert_eq!(code.as_ref(), "EUR");
        assert!(CurrencyCode::try_new("EURO").is_err());
        assert!(CurrencyCode::try_new("").is_err());
    }

    #[test]
    fn locale_validation() {
        assert!(Locale::try_new("en_US").is_ok());
        assert!(Locale::try_new("fr").is_ok());
        assert!(Locale::try_new("EN-us").is_err());
    }

    #[test]
    fn container_id_validation() {
        assert!(ContainerId::try_new("GTM-AB12CD3").is_ok());
        assert_eq!(
            ContainerId::try_new("  GTM-XYZ  ").unwrap().as_ref(),
            "GTM-XYZ"
        );
        assert!(ContainerId::try_new("").is_err());
        assert!(ContainerId::try_new("UA-1234").is_err());
        assert!(ContainerId::try_new("GTM-").is_err());
    }

    #[test]
    fn max_category_depth_defaults_and_bounds() {
        let depth: usize = MaxCategoryDepth::default().into();
        assert_eq!(depth, 64);
        assert!(MaxCategoryDepth::try_new(0).is_err());
        assert!(MaxCategoryDepth::try_new(257).is_err());
    }

    #[test]
    fn ids_serialize_as_plain_numbers() {
        let json = serde_json::to_string(&ProductId::new(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(ProductId::new(42).to_string(), "42");
    }

    proptest! {
        #[test]
        fn container_id_accepts_generated_ids(suffix in "[A-Z0-9]{1,20}") {
            let raw = format!("GTM-{suffix}");
            let id = ContainerId::try_new(raw.clone());
            prop_assert!(id.is_ok());
            let id = id.unwrap();
            prop_assert_eq!(id.as_ref(), raw.as_str());
        }
    }
}
