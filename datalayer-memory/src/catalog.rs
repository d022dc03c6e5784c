use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalayer::errors::{DataLayerError, DataLayerResult};
use datalayer::model::{Brand, Category, Currency, Lang, Product, Variant};
use datalayer::store::CatalogStore;
use datalayer::types::{BrandId, CategoryId, ProductId, VariantId};
use parking_lot::RwLock;

#[derive(Default)]
struct CatalogState {
    categories: HashMap<CategoryId, Category>,
    brands: HashMap<BrandId, Brand>,
    products: HashMap<ProductId, Product>,
    variants: HashMap<VariantId, Variant>,
    // (view, url) -> entity key
    rewritten_urls: HashMap<(String, String), u64>,
    default_lang: Option<Lang>,
    default_currency: Option<Currency>,
}

/// Thread-safe in-memory product catalog.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog without defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a category.
    pub fn insert_category(&self, category: Category) {
        let _ = self.state.write().categories.insert(category.id, category);
    }

    /// Adds or replaces a brand.
    pub fn insert_brand(&self, brand: Brand) {
        let _ = self.state.write().brands.insert(brand.id, brand);
    }

    /// Adds or replaces a product.
    pub fn insert_product(&self, product: Product) {
        let _ = self.state.write().products.insert(product.id, product);
    }

    /// Removes a product, as when it is deleted from the catalog.
    pub fn remove_product(&self, id: ProductId) -> Option<Product> {
        self.state.write().products.remove(&id)
    }

    /// Adds or replaces a variant.
    pub fn insert_variant(&self, variant: Variant) {
        let _ = self.state.write().variants.insert(variant.id, variant);
    }

    /// Maps a rewritten URL of `view` to an entity key.
    pub fn insert_rewritten_url(&self, view: &str, url: &str, key: u64) {
        let _ = self
            .state
            .write()
            .rewritten_urls
            .insert((view.to_string(), url.to_string()), key);
    }

    /// Sets the store's default language.
    pub fn set_default_lang(&self, lang: Lang) {
        self.state.write().default_lang = Some(lang);
    }

    /// Sets the store's default currency.
    pub fn set_default_currency(&self, currency: Currency) {
        self.state.write().default_currency = Some(currency);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn category(&self, id: CategoryId) -> DataLayerResult<Option<Category>> {
        Ok(self.state.read().categories.get(&id).cloned())
    }

    async fn brand(&self, id: BrandId) -> DataLayerResult<Option<Brand>> {
        Ok(self.state.read().brands.get(&id).cloned())
    }

    async fn product(&self, id: ProductId) -> DataLayerResult<Option<Product>> {
        Ok(self.state.read().products.get(&id).cloned())
    }

    async fn product_by_ref(&self, reference: &str) -> DataLayerResult<Option<Product>> {
        Ok(self
            .state
            .read()
            .products
            .values()
            .find(|product| product.reference == reference)
            .cloned())
    }

    async fn products(&self, ids: &[ProductId]) -> DataLayerResult<Vec<Product>> {
        let state = self.state.read();
        let mut products: Vec<Product> = ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect();
        // catalog order, like a filtered query
        products.sort_by_key(|product| product.id);
        products.dedup_by_key(|product| product.id);
        Ok(products)
    }

    async fn variant(&self, id: VariantId) -> DataLayerResult<Option<Variant>> {
        Ok(self.state.read().variants.get(&id).cloned())
    }

    async fn default_variant(&self, product_id: ProductId) -> DataLayerResult<Option<Variant>> {
        Ok(self
            .state
            .read()
            .variants
            .values()
            .find(|variant| variant.product_id == product_id && variant.is_default)
            .cloned())
    }

    async fn resolve_rewritten_url(&self, view: &str, url: &str) -> DataLayerResult<Option<u64>> {
        Ok(self
            .state
            .read()
            .rewritten_urls
            .get(&(view.to_string(), url.to_string()))
            .copied())
    }

    async fn default_lang(&self) -> DataLayerResult<Lang> {
        self.state
            .read()
            .default_lang
            .clone()
            .ok_or_else(|| DataLayerError::Store("no default language configured".to_string()))
    }

    async fn default_currency(&self) -> DataLayerResult<Currency> {
        self.state
            .read()
            .default_currency
            .clone()
            .ok_or_else(|| DataLayerError::Store("no default currency configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use datalayer::model::Translations;
    use datalayer::types::TaxRuleId;

    use super::*;

    fn product(id: u64, reference: &str) -> Product {
        Product {
            id: ProductId::new(id),
            reference: reference.to_string(),
            titles: Translations::new(),
            brand_id: None,
            default_category_id: None,
            tax_rule_id: TaxRuleId::new(1),
        }
    }

    #[tokio::test]
    async fn products_skip_unknown_ids_and_keep_catalog_order() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(3, "C"));
        catalog.insert_product(product(1, "A"));

        let found = catalog
            .products(&[ProductId::new(3), ProductId::new(9), ProductId::new(1)])
            .await
            .unwrap();

        let ids: Vec<u64> = found.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, [1, 3]);
    }

    #[tokio::test]
    async fn products_are_found_by_reference() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_product(product(7, "SHIRT-7"));

        let found = catalog.product_by_ref("SHIRT-7").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(ProductId::new(7)));
        assert_eq!(catalog.product_by_ref("NOPE").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rewritten_urls_are_scoped_by_view() {
        let catalog = InMemoryCatalog::new();
        catalog.insert_rewritten_url("product", "shirt.html", 7);

        assert_eq!(
            catalog.resolve_rewritten_url("product", "shirt.html").await.unwrap(),
            Some(7)
        );
        assert_eq!(
            catalog.resolve_rewritten_url("category", "shirt.html").await.unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn missing_defaults_are_store_errors() {
        let catalog = InMemoryCatalog::new();
        assert!(matches!(
            catalog.default_currency().await,
            Err(DataLayerError::Store(_))
        ));
    }
}
