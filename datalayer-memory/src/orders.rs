use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalayer::errors::{DataLayerError, DataLayerResult, EntityKind};
use datalayer::model::{Cart, Country, Order};
use datalayer::pricing::{base_price, round_price};
use datalayer::store::{CatalogStore, OrderStore, TaxEngine};
use datalayer::types::{CartId, OrderId};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::catalog::InMemoryCatalog;
use crate::taxes::InMemoryTaxes;

#[derive(Default)]
struct OrderState {
    carts: HashMap<CartId, Cart>,
    orders: HashMap<OrderId, Order>,
}

/// Thread-safe in-memory carts and orders.
///
/// Cart totals are computed like a storefront would: each line's rounded
/// taxed unit price times its quantity, in the cart's currency.
#[derive(Clone)]
pub struct InMemoryOrders {
    state: Arc<RwLock<OrderState>>,
    catalog: InMemoryCatalog,
    taxes: InMemoryTaxes,
}

impl InMemoryOrders {
    /// Creates an empty store pricing carts against `catalog` and `taxes`.
    pub fn new(catalog: InMemoryCatalog, taxes: InMemoryTaxes) -> Self {
        Self {
            state: Arc::default(),
            catalog,
            taxes,
        }
    }

    /// Adds or replaces a cart.
    pub fn insert_cart(&self, cart: Cart) {
        let _ = self.state.write().carts.insert(cart.id, cart);
    }

    /// Adds or replaces an order.
    pub fn insert_order(&self, order: Order) {
        let _ = self.state.write().orders.insert(order.id, order);
    }
}

#[async_trait]
impl OrderStore for InMemoryOrders {
    async fn cart(&self, id: CartId) -> DataLayerResult<Option<Cart>> {
        Ok(self.state.read().carts.get(&id).cloned())
    }

    async fn cart_taxed_total(&self, cart: &Cart, country: &Country) -> DataLayerResult<Decimal> {
        let currency = match &cart.currency {
            Some(currency) => currency.clone(),
            None => self.catalog.default_currency().await?.code,
        };
        let mut total = Decimal::ZERO;
        for line in &cart.lines {
            let variant = self
                .catalog
                .variant(line.variant_id)
                .await?
                .ok_or_else(|| DataLayerError::not_found(EntityKind::Variant, line.variant_id))?;
            let product = self
                .catalog
                .product(variant.product_id)
                .await?
                .ok_or_else(|| DataLayerError::not_found(EntityKind::Product, variant.product_id))?;
            let unit = self
                .taxes
                .taxed_price(product.tax_rule_id, country, base_price(&variant, &currency)?)
                .await?;
            total += round_price(unit) * Decimal::from(line.quantity);
        }
        Ok(total)
    }

    async fn order(&self, id: OrderId) -> DataLayerResult<Option<Order>> {
        Ok(self.state.read().orders.get(&id).cloned())
    }
}
