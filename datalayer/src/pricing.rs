//! Unit price resolution.
//!
//! Browse-time items are priced untaxed; cart, checkout and order items are
//! priced with the product's tax rule applied for the delivery country.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::errors::{DataLayerError, DataLayerResult, EntityKind};
use crate::model::{Country, Variant};
use crate::store::TaxEngine;
use crate::types::{CurrencyCode, TaxRuleId};

/// Jurisdiction and rule used to tax one product.
#[derive(Debug, Clone, Copy)]
pub struct TaxContext<'a> {
    /// Country whose rates apply
    pub country: &'a Country,
    /// The product's tax rule
    pub rule: TaxRuleId,
}

/// Rounds to two decimal places, halves away from zero.
pub fn round_price(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Promotional price when the promotion is active, list price otherwise.
pub fn base_price(variant: &Variant, currency: &CurrencyCode) -> DataLayerResult<Decimal> {
    let prices = variant.prices_in(currency).ok_or_else(|| {
        DataLayerError::not_found(EntityKind::Price, format!("{} in {currency}", variant.id))
    })?;
    Ok(if variant.promo {
        prices.promo_price
    } else {
        prices.price
    })
}

/// Computes final unit prices.
pub struct PriceResolver<'a> {
    taxes: &'a dyn TaxEngine,
}

impl<'a> PriceResolver<'a> {
    /// Creates a resolver delegating taxation to `taxes`.
    pub fn new(taxes: &'a dyn TaxEngine) -> Self {
        Self { taxes }
    }

    /// Final rounded unit price of `variant` in `currency`, taxed when a tax
    /// context is given.
    pub async fn unit_price(
        &self,
        variant: &Variant,
        currency: &CurrencyCode,
        tax: Option<TaxContext<'_>>,
    ) -> DataLayerResult<Decimal> {
        let price = base_price(variant, currency)?;
        let price = match tax {
            Some(tax) => self.taxes.taxed_price(tax.rule, tax.country, price).await?,
            None => price,
        };
        Ok(round_price(price))
    }
}
