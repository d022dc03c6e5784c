use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalayer::errors::{DataLayerError, DataLayerResult};
use datalayer::model::Country;
use datalayer::store::TaxEngine;
use datalayer::types::TaxRuleId;
use parking_lot::RwLock;
use rust_decimal::Decimal;

#[derive(Default)]
struct TaxState {
    delivery_country: Option<Country>,
    // (rule, country id) -> rate, e.g. 0.2 for 20%
    rates: HashMap<(TaxRuleId, u64), Decimal>,
}

/// Flat-rate tax engine. Rules without a rate for a country are untaxed.
#[derive(Clone, Default)]
pub struct InMemoryTaxes {
    state: Arc<RwLock<TaxState>>,
}

impl InMemoryTaxes {
    /// Creates an engine without rates or delivery country.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the country of the current delivery context.
    pub fn set_delivery_country(&self, country: Country) {
        self.state.write().delivery_country = Some(country);
    }

    /// Sets the rate of `rule` for `country`, as a fraction.
    pub fn set_rate(&self, rule: TaxRuleId, country: &Country, rate: Decimal) {
        let _ = self.state.write().rates.insert((rule, country.id), rate);
    }

    /// Rate of `rule` for `country`, zero when unset.
    pub fn rate(&self, rule: TaxRuleId, country: &Country) -> Decimal {
        self.state
            .read()
            .rates
            .get(&(rule, country.id))
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl TaxEngine for InMemoryTaxes {
    async fn delivery_country(&self) -> DataLayerResult<Country> {
        self.state
            .read()
            .delivery_country
            .clone()
            .ok_or_else(|| DataLayerError::Store("no delivery country configured".to_string()))
    }

    async fn taxed_price(
        &self,
        rule: TaxRuleId,
        country: &Country,
        price: Decimal,
    ) -> DataLayerResult<Decimal> {
        Ok(price * (Decimal::ONE + self.rate(rule, country)))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn france() -> Country {
        Country {
            id: 64,
            iso_alpha2: "FR".to_string(),
        }
    }

    #[tokio::test]
    async fn applies_the_rule_rate_for_the_country() {
        let taxes = InMemoryTaxes::new();
        taxes.set_rate(TaxRuleId::new(1), &france(), dec!(0.2));

        let taxed = taxes
            .taxed_price(TaxRuleId::new(1), &france(), dec!(10))
            .await
            .unwrap();
        assert_eq!(taxed, dec!(12));

        let untaxed = taxes
            .taxed_price(TaxRuleId::new(2), &france(), dec!(10))
            .await
            .unwrap();
        assert_eq!(untaxed, dec!(10));
    }
}
