//! Collaborator contracts consumed by the engine.
//!
//! The host storefront owns the catalog, carts, orders, the tax engine,
//! the configuration table and the session. The engine only ever reads from
//! them, with one exception: the session, where staged view signals are
//! written and cleared (see [`crate::staging`]).
//!
//! Lookups return `Ok(None)` when the entity does not exist; `Err` is
//! reserved for failures of the store itself.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::DataLayerResult;
use crate::model::{Brand, Cart, Category, Country, Currency, Lang, Order, Product, Variant};
use crate::types::{BrandId, CartId, CategoryId, OrderId, ProductId, TaxRuleId, VariantId};

/// Read access to the product catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Loads a category by key.
    async fn category(&self, id: CategoryId) -> DataLayerResult<Option<Category>>;

    /// Loads a brand by key.
    async fn brand(&self, id: BrandId) -> DataLayerResult<Option<Brand>>;

    /// Loads a product by key.
    async fn product(&self, id: ProductId) -> DataLayerResult<Option<Product>>;

    /// Loads a product by its merchant reference.
    async fn product_by_ref(&self, reference: &str) -> DataLayerResult<Option<Product>>;

    /// Loads several products. Unknown keys are skipped; catalog order is kept.
    async fn products(&self, ids: &[ProductId]) -> DataLayerResult<Vec<Product>>;

    /// Loads a variant by key.
    async fn variant(&self, id: VariantId) -> DataLayerResult<Option<Variant>>;

    /// Loads the default variant of a product.
    async fn default_variant(&self, product_id: ProductId) -> DataLayerResult<Option<Variant>>;

    /// Resolves a rewritten storefront URL (path without leading `/`) for a
    /// view to the key of the entity it addresses.
    async fn resolve_rewritten_url(&self, view: &str, url: &str) -> DataLayerResult<Option<u64>>;

    /// The store's default language.
    async fn default_lang(&self) -> DataLayerResult<Lang>;

    /// The store's default currency.
    async fn default_currency(&self) -> DataLayerResult<Currency>;
}

/// Read access to carts and orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Loads a cart by key.
    async fn cart(&self, id: CartId) -> DataLayerResult<Option<Cart>>;

    /// The cart's total including taxes for delivery to `country`.
    async fn cart_taxed_total(&self, cart: &Cart, country: &Country) -> DataLayerResult<Decimal>;

    /// Loads an order by key.
    async fn order(&self, id: OrderId) -> DataLayerResult<Option<Order>>;
}

/// The host's tax engine.
#[async_trait]
pub trait TaxEngine: Send + Sync {
    /// Country used for taxation in the current delivery context.
    async fn delivery_country(&self) -> DataLayerResult<Country>;

    /// Applies `rule` for `country` to an untaxed `price`.
    async fn taxed_price(
        &self,
        rule: TaxRuleId,
        country: &Country,
        price: Decimal,
    ) -> DataLayerResult<Decimal>;
}

/// String key/value configuration table.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> DataLayerResult<Option<String>>;

    /// Writes a value.
    async fn set(&self, key: &str, value: &str) -> DataLayerResult<()>;
}

/// One user's session. Values are JSON so the host can persist them however
/// it stores sessions; typed access goes through [`crate::session::SessionKey`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Reads a value.
    async fn get(&self, key: &str) -> DataLayerResult<Option<Value>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: Value) -> DataLayerResult<()>;

    /// Removes a value and returns what was stored.
    async fn remove(&self, key: &str) -> DataLayerResult<Option<Value>>;
}

/// The host collaborators one request works against.
#[derive(Clone, Copy)]
pub struct Stores<'a> {
    /// Product catalog
    pub catalog: &'a dyn CatalogStore,
    /// Carts and orders
    pub orders: &'a dyn OrderStore,
    /// Tax engine
    pub taxes: &'a dyn TaxEngine,
    /// Configuration table
    pub config: &'a dyn ConfigStore,
    /// The visitor's session
    pub session: &'a dyn SessionStore,
}
