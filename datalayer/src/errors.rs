//! Error types for the dataLayer payload engine.
//!
//! The engine distinguishes failures that must abort the payload being built
//! from missing *optional* context, which never surfaces as an error:
//!
//! - **NotFound**: a required entity (category ancestor, price in the
//!   requested currency, the product behind a cart line) could not be loaded.
//!   The enclosing payload build is aborted.
//! - **CycleDetected**: a category parent chain loops back on itself or
//!   exceeds the configured depth bound.
//! - **MalformedInput**: a fetch endpoint received a body or URL it cannot
//!   parse. Endpoints surface this as an empty JSON result.
//! - **Configuration**: an invalid configuration value was submitted.
//! - **Store**: a collaborator reported a failure of its own.
//!
//! Missing optional context (no session currency, an unknown cart id, an
//! order that does not exist) is handled by the aggregators returning
//! `Ok(None)` rather than by any variant here.

use std::fmt;

use thiserror::Error;

use crate::types::{CategoryId, ContainerIdError, CurrencyCodeError, LocaleError};

/// The kind of entity a failed lookup was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A catalog category.
    Category,
    /// A catalog product.
    Product,
    /// A purchasable product variant.
    Variant,
    /// A variant price in a given currency.
    Price,
    /// A brand.
    Brand,
    /// A cart.
    Cart,
    /// An order.
    Order,
    /// A language.
    Lang,
    /// A currency.
    Currency,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Category => "category",
            Self::Product => "product",
            Self::Variant => "variant",
            Self::Price => "price",
            Self::Brand => "brand",
            Self::Cart => "cart",
            Self::Order => "order",
            Self::Lang => "lang",
            Self::Currency => "currency",
        };
        f.write_str(name)
    }
}

/// Errors produced while assembling dataLayer payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataLayerError {
    /// A required entity could not be resolved.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// What was being looked up
        entity: EntityKind,
        /// The identifier that failed to resolve
        id: String,
    },

    /// The category parent chain revisits a category or is deeper than allowed.
    #[error("category parent chain starting at {category_id} does not terminate")]
    CycleDetected {
        /// The category where the walk started
        category_id: CategoryId,
    },

    /// A request body or URL could not be parsed.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A configuration value was rejected.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A collaborator store reported a failure.
    #[error("store error: {0}")]
    Store(String),
}

impl DataLayerError {
    /// Shorthand for a [`DataLayerError::NotFound`] error.
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Whether this error is a [`DataLayerError::NotFound`].
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ContainerIdError> for DataLayerError {
    fn from(err: ContainerIdError) -> Self {
        Self::Configuration(format!("invalid container id: {err}"))
    }
}

impl From<CurrencyCodeError> for DataLayerError {
    fn from(err: CurrencyCodeError) -> Self {
        Self::MalformedInput(format!("invalid currency code: {err}"))
    }
}

impl From<LocaleError> for DataLayerError {
    fn from(err: LocaleError) -> Self {
        Self::MalformedInput(format!("invalid locale: {err}"))
    }
}

impl From<serde_json::Error> for DataLayerError {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedInput(err.to_string())
    }
}

impl From<url::ParseError> for DataLayerError {
    fn from(err: url::ParseError) -> Self {
        Self::MalformedInput(format!("invalid url: {err}"))
    }
}

/// Result alias used throughout the crate.
pub type DataLayerResult<T> = Result<T, DataLayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let error = DataLayerError::not_found(EntityKind::Price, "EUR");
        assert_eq!(error.to_string(), "price not found: EUR");
        assert!(error.is_not_found());
    }

    #[test]
    fn serde_errors_become_malformed_input() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let converted: DataLayerError = err.into();
        assert!(matches!(converted, DataLayerError::MalformedInput(_)));
    }
}
