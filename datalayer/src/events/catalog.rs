use tracing::{debug, instrument};

use super::{DataLayerEvent, EventAggregator, ItemsEcommerce};
use crate::errors::DataLayerResult;
use crate::item::{CatalogItem, ItemOptions};
use crate::page::View;
use crate::staging::ViewStaging;
use crate::types::ProductId;

impl EventAggregator<'_> {
    /// `view_item_list` for the listing staged by an earlier product loop.
    ///
    /// Consumes the staged list. `None` when nothing was staged.
    #[instrument(skip(self, staging, view), fields(view = %view))]
    pub async fn view_item_list(
        &self,
        staging: &ViewStaging<'_>,
        view: &View,
    ) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(ids) = staging.take_list().await? else {
            debug!("no staged listing");
            return Ok(None);
        };
        let items = self.product_items(&ids, Some(view)).await?;
        Ok(Some(DataLayerEvent::ViewItemList {
            ecommerce: ItemsEcommerce { items },
        }))
    }

    /// `view_item` for the product staged by an earlier detail render.
    ///
    /// Consumes the staged product. `None` when nothing was staged.
    #[instrument(skip(self, staging))]
    pub async fn view_item(
        &self,
        staging: &ViewStaging<'_>,
    ) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(id) = staging.take_item().await? else {
            debug!("no staged product");
            return Ok(None);
        };
        let items = self.product_items(&[id], None).await?;
        Ok(Some(DataLayerEvent::ViewItem {
            ecommerce: ItemsEcommerce { items },
        }))
    }

    /// Browse-time items for `ids`, untaxed and priced with each product's
    /// default variant. Products that no longer exist are skipped.
    pub async fn product_items(
        &self,
        ids: &[ProductId],
        list: Option<&View>,
    ) -> DataLayerResult<Vec<CatalogItem>> {
        let products = self.stores.catalog.products(ids).await?;
        let mut items = Vec::with_capacity(products.len());
        for product in &products {
            let options = ItemOptions {
                list,
                ..ItemOptions::default()
            };
            items.push(
                self.items
                    .from_catalog(product, &self.session.lang, self.currency(), options)
                    .await?,
            );
        }
        Ok(items)
    }
}
