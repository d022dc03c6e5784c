//! Read-only records handed to the engine by the host's stores.
//!
//! The engine never persists or mutates these. They mirror what the catalog
//! and order stores expose: localized titles, variant prices per currency,
//! and order lines that snapshot the title and price at purchase time.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    BrandId, CartId, CategoryId, CurrencyCode, Locale, OrderId, ProductId, TaxRuleId, VariantId,
};

/// Localized titles keyed by locale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Translations(BTreeMap<Locale, String>);

impl Translations {
    /// Creates an empty set of titles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the title for `locale`.
    #[must_use]
    pub fn with(mut self, locale: Locale, title: impl Into<String>) -> Self {
        let _ = self.0.insert(locale, title.into());
        self
    }

    /// Title in `locale`, or the empty string when untranslated.
    pub fn title(&self, locale: &Locale) -> &str {
        self.0.get(locale).map_or("", String::as_str)
    }
}

/// A catalog language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lang {
    /// Locale used for title lookups
    pub locale: Locale,
}

/// A store currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    /// ISO code
    pub code: CurrencyCode,
}

/// A delivery or invoice country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    /// Host key of the country
    pub id: u64,
    /// Two-letter ISO 3166 code
    pub iso_alpha2: String,
}

/// A catalog category. `parent` is `None` for a top-level category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category key
    pub id: CategoryId,
    /// Parent category, `None` at the root
    pub parent: Option<CategoryId>,
    /// Localized titles
    pub titles: Translations,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Brand key
    pub id: BrandId,
    /// Localized titles
    pub titles: Translations,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product key
    pub id: ProductId,
    /// Merchant reference, also stored on order lines
    pub reference: String,
    /// Localized titles
    pub titles: Translations,
    /// Brand, if any
    pub brand_id: Option<BrandId>,
    /// Category the product is filed under by default
    pub default_category_id: Option<CategoryId>,
    /// Tax rule applied at settlement time
    pub tax_rule_id: TaxRuleId,
}

/// Prices of a variant in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPrice {
    /// List price, untaxed
    pub price: Decimal,
    /// Promotional price, untaxed
    pub promo_price: Decimal,
}

/// One attribute/value pair describing a variant, e.g. `Size: M`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeCombination {
    /// Attribute titles (`Size`)
    pub attribute: Translations,
    /// Attribute value titles (`M`)
    pub value: Translations,
}

/// A purchasable configuration of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant key
    pub id: VariantId,
    /// Owning product
    pub product_id: ProductId,
    /// Whether this is the product's default variant
    pub is_default: bool,
    /// Whether the promotional price is active
    pub promo: bool,
    /// Units in stock
    pub quantity: u32,
    /// Prices keyed by currency
    pub prices: BTreeMap<String, VariantPrice>,
    /// Attribute combinations, in display order
    pub combinations: Vec<AttributeCombination>,
}

impl Variant {
    /// Prices for `currency`, if the variant is priced in it.
    pub fn prices_in(&self, currency: &CurrencyCode) -> Option<&VariantPrice> {
        self.prices.get(currency.as_ref())
    }
}

/// A line of a live cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Variant placed in the cart
    pub variant_id: VariantId,
    /// Units
    pub quantity: u32,
}

/// A live shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Cart key
    pub id: CartId,
    /// Currency the cart is priced in
    pub currency: Option<CurrencyCode>,
    /// Lines, in insertion order
    pub lines: Vec<CartLine>,
}

/// Attribute snapshot stored on an order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineAttribute {
    /// Attribute title at purchase time
    pub attribute_title: String,
    /// Attribute value title at purchase time
    pub value_title: String,
}

/// A historical order line. Title and prices are snapshots and stay
/// authoritative even if the catalog product changed or disappeared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Reference of the product at purchase time
    pub product_ref: String,
    /// Title at purchase time
    pub title: String,
    /// Units bought
    pub quantity: u32,
    /// Untaxed list price at purchase time
    pub price: Decimal,
    /// Untaxed promotional price at purchase time
    pub promo_price: Decimal,
    /// Whether the promotional price applied
    pub was_in_promo: bool,
    /// Unit tax amount recorded at purchase time
    pub tax_amount: Option<Decimal>,
    /// Attribute snapshots, in display order
    pub attributes: Vec<OrderLineAttribute>,
}

/// An order address snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// First street line
    pub address1: String,
    /// Second street line
    pub address2: String,
    /// Third street line
    pub address3: String,
    /// Postal code
    pub zip_code: String,
    /// City
    pub city: String,
    /// Country
    pub country: Country,
}

impl OrderAddress {
    /// Street address composed from the non-empty address lines.
    pub fn street(&self) -> String {
        [&self.address1, &self.address2, &self.address3]
            .into_iter()
            .filter(|line| !line.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order key
    pub id: OrderId,
    /// Public order reference
    pub reference: String,
    /// Buyer email
    pub customer_email: String,
    /// Order total, taxed, excluding postage
    pub total_amount: Decimal,
    /// Tax part of `total_amount`
    pub total_tax: Decimal,
    /// Shipping cost
    pub postage: Decimal,
    /// Code of the payment module used
    pub payment_module: String,
    /// Code of the delivery module used
    pub delivery_module: String,
    /// Invoice address snapshot
    pub invoice_address: OrderAddress,
    /// Lines, in order
    pub lines: Vec<OrderLine>,
}

/// The logged-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Public customer reference
    pub reference: String,
    /// Email address
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(lines: [&str; 3]) -> OrderAddress {
        OrderAddress {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            address1: lines[0].to_string(),
            address2: lines[1].to_string(),
            address3: lines[2].to_string(),
            zip_code: "75001".to_string(),
            city: "Paris".to_string(),
            country: Country {
                id: 64,
                iso_alpha2: "FR".to_string(),
            },
        }
    }

    #[test]
    fn street_joins_non_empty_lines() {
        assert_eq!(address(["1 rue A", "", ""]).street(), "1 rue A");
        assert_eq!(address(["1 rue A", "Bat B", ""]).street(), "1 rue A Bat B");
        assert_eq!(
            address(["1 rue A", "", "Etage 3"]).street(),
            "1 rue A Etage 3"
        );
    }

    #[test]
    fn untranslated_title_is_empty() {
        let en = Locale::try_new("en_US").unwrap();
        let fr = Locale::try_new("fr_FR").unwrap();
        let titles = Translations::new().with(en.clone(), "Shoes");
        assert_eq!(titles.title(&en), "Shoes");
        assert_eq!(titles.title(&fr), "");
    }
}
