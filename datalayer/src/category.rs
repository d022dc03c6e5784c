//! Category path resolution.

use std::collections::HashSet;

use tracing::instrument;

use crate::errors::{DataLayerError, DataLayerResult, EntityKind};
use crate::escape::escape_html;
use crate::model::Category;
use crate::store::CatalogStore;
use crate::types::{CategoryId, Locale, MaxCategoryDepth};

/// Walks category parent chains into root-first title paths.
pub struct CategoryPathResolver<'a> {
    catalog: &'a dyn CatalogStore,
    max_depth: MaxCategoryDepth,
}

impl<'a> CategoryPathResolver<'a> {
    /// Creates a resolver reading from `catalog`.
    pub fn new(catalog: &'a dyn CatalogStore, max_depth: MaxCategoryDepth) -> Self {
        Self { catalog, max_depth }
    }

    /// Escaped titles of `leaf` and all of its ancestors, root first and
    /// `leaf` last. A leaf with `N` ancestors yields `N + 1` entries.
    ///
    /// Fails with `NotFound` when an ancestor does not resolve and with
    /// `CycleDetected` when the chain revisits a category or is deeper than
    /// the configured bound.
    #[instrument(skip(self, leaf), fields(leaf = %leaf.id))]
    pub async fn resolve(&self, leaf: &Category, locale: &Locale) -> DataLayerResult<Vec<String>> {
        let limit: usize = self.max_depth.into();
        let mut visited = HashSet::from([leaf.id]);
        let mut titles = vec![escape_html(leaf.titles.title(locale))];
        let mut parent = leaf.parent;

        while let Some(parent_id) = parent {
            if !visited.insert(parent_id) || visited.len() > limit {
                return Err(DataLayerError::CycleDetected {
                    category_id: leaf.id,
                });
            }
            let category = self
                .catalog
                .category(parent_id)
                .await?
                .ok_or_else(|| DataLayerError::not_found(EntityKind::Category, parent_id))?;
            titles.push(escape_html(category.titles.title(locale)));
            parent = category.parent;
        }

        titles.reverse();
        Ok(titles)
    }

    /// Like [`Self::resolve`], starting from a category key. An unknown key
    /// is `NotFound`.
    pub async fn resolve_id(&self, id: CategoryId, locale: &Locale) -> DataLayerResult<Vec<String>> {
        let leaf = self
            .catalog
            .category(id)
            .await?
            .ok_or_else(|| DataLayerError::not_found(EntityKind::Category, id))?;
        self.resolve(&leaf, locale).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use proptest::prelude::*;

    use super::*;
    use crate::model::{Brand, Currency, Lang, Product, Translations, Variant};
    use crate::testing::arb_category_chain;
    use crate::types::{BrandId, ProductId, VariantId};

    struct CategoryCatalog(HashMap<CategoryId, Category>);

    impl CategoryCatalog {
        fn new(categories: impl IntoIterator<Item = Category>) -> Self {
            Self(categories.into_iter().map(|c| (c.id, c)).collect())
        }
    }

    #[async_trait]
    impl CatalogStore for CategoryCatalog {
        async fn category(&self, id: CategoryId) -> DataLayerResult<Option<Category>> {
            Ok(self.0.get(&id).cloned())
        }
        async fn brand(&self, _id: BrandId) -> DataLayerResult<Option<Brand>> {
            Ok(None)
        }
        async fn product(&self, _id: ProductId) -> DataLayerResult<Option<Product>> {
            Ok(None)
        }
        async fn product_by_ref(&self, _reference: &str) -> DataLayerResult<Option<Product>> {
            Ok(None)
        }
        async fn products(&self, _ids: &[ProductId]) -> DataLayerResult<Vec<Product>> {
            Ok(Vec::new())
        }
        async fn variant(&self, _id: VariantId) -> DataLayerResult<Option<Variant>> {
            Ok(None)
        }
        async fn default_variant(&self, _product_id: ProductId) -> DataLayerResult<Option<Variant>> {
            Ok(None)
        }
        async fn resolve_rewritten_url(&self, _view: &str, _url: &str) -> DataLayerResult<Option<u64>> {
            Ok(None)
        }
        async fn default_lang(&self) -> DataLayerResult<Lang> {
            Ok(Lang { locale: en() })
        }
        async fn default_currency(&self) -> DataLayerResult<Currency> {
            Err(DataLayerError::Store("no currencies".to_string()))
        }
    }

    fn en() -> Locale {
        Locale::try_new("en_US").unwrap()
    }

    fn category(id: u64, parent: Option<u64>, title: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            parent: parent.map(CategoryId::new),
            titles: Translations::new().with(en(), title),
        }
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap()
            .block_on(future)
    }

    #[tokio::test]
    async fn path_is_root_first_and_escaped() {
        let catalog = CategoryCatalog::new([
            category(1, None, "Clothing"),
            category(2, Some(1), "Men & Boys"),
            category(3, Some(2), "Shirts"),
        ]);
        let resolver = CategoryPathResolver::new(&catalog, MaxCategoryDepth::default());

        let path = resolver.resolve_id(CategoryId::new(3), &en()).await.unwrap();

        assert_eq!(path, ["Clothing", "Men &amp; Boys", "Shirts"]);
    }

    #[tokio::test]
    async fn missing_ancestor_is_not_found() {
        let catalog = CategoryCatalog::new([category(3, Some(2), "Shirts")]);
        let resolver = CategoryPathResolver::new(&catalog, MaxCategoryDepth::default());

        let err = resolver.resolve_id(CategoryId::new(3), &en()).await.unwrap_err();

        assert_eq!(err, DataLayerError::not_found(EntityKind::Category, 2));
    }

    #[tokio::test]
    async fn cycles_are_detected() {
        let catalog = CategoryCatalog::new([
            category(1, Some(3), "A"),
            category(2, Some(1), "B"),
            category(3, Some(2), "C"),
        ]);
        let resolver = CategoryPathResolver::new(&catalog, MaxCategoryDepth::default());

        let err = resolver.resolve_id(CategoryId::new(2), &en()).await.unwrap_err();

        assert_eq!(
            err,
            DataLayerError::CycleDetected {
                category_id: CategoryId::new(2)
            }
        );
    }

    #[tokio::test]
    async fn self_parent_is_a_cycle() {
        let catalog = CategoryCatalog::new([category(5, Some(5), "Loop")]);
        let resolver = CategoryPathResolver::new(&catalog, MaxCategoryDepth::default());

        let err = resolver.resolve_id(CategoryId::new(5), &en()).await.unwrap_err();

        assert!(matches!(err, DataLayerError::CycleDetected { .. }));
    }

    #[tokio::test]
    async fn chains_deeper_than_the_bound_are_rejected() {
        let catalog = CategoryCatalog::new([
            category(1, None, "A"),
            category(2, Some(1), "B"),
            category(3, Some(2), "C"),
        ]);
        let depth = MaxCategoryDepth::try_new(2).unwrap();
        let resolver = CategoryPathResolver::new(&catalog, depth);

        assert!(resolver.resolve_id(CategoryId::new(2), &en()).await.is_ok());
        let err = resolver.resolve_id(CategoryId::new(3), &en()).await.unwrap_err();
        assert!(matches!(err, DataLayerError::CycleDetected { .. }));
    }

    proptest! {
        #[test]
        fn chain_of_n_ancestors_yields_n_plus_one_titles(
            chain in arb_category_chain(en(), 1, 12)
        ) {
            let leaf = chain.last().unwrap().clone();
            let expected: Vec<String> = chain
                .iter()
                .map(|c| crate::escape::escape_html(c.titles.title(&en())))
                .collect();
            let catalog = CategoryCatalog::new(chain);
            let resolver = CategoryPathResolver::new(&catalog, MaxCategoryDepth::default());

            let path = block_on(resolver.resolve(&leaf, &en())).unwrap();

            prop_assert_eq!(path, expected);
        }
    }
}
