use tracing::{debug, instrument};

use super::{CartEcommerce, DataLayerEvent, EventAggregator};
use crate::errors::{DataLayerError, DataLayerResult, EntityKind};
use crate::escape::escape_html;
use crate::item::{CatalogItem, ItemOptions};
use crate::model::{Cart, Country};
use crate::types::CurrencyCode;

impl EventAggregator<'_> {
    /// `view_cart` for the session cart, priced for delivery to `country`.
    ///
    /// `None` when the session has no cart or the cart no longer exists.
    #[instrument(skip(self, country), fields(country = %country.iso_alpha2))]
    pub async fn view_cart(&self, country: &Country) -> DataLayerResult<Option<DataLayerEvent>> {
        Ok(self
            .cart_body(country, None)
            .await?
            .map(|ecommerce| DataLayerEvent::ViewCart { ecommerce }))
    }

    /// `begin_checkout`: the `view_cart` body plus the consumed coupons.
    #[instrument(skip(self, country), fields(country = %country.iso_alpha2))]
    pub async fn begin_checkout(&self, country: &Country) -> DataLayerResult<Option<DataLayerEvent>> {
        let coupons = escape_html(&self.session.coupon_string());
        Ok(self
            .cart_body(country, Some(coupons))
            .await?
            .map(|ecommerce| DataLayerEvent::BeginCheckout { ecommerce }))
    }

    async fn cart_body(
        &self,
        country: &Country,
        coupon: Option<String>,
    ) -> DataLayerResult<Option<CartEcommerce>> {
        let Some(cart) = self.session_cart().await? else {
            return Ok(None);
        };
        let currency = cart
            .currency
            .clone()
            .unwrap_or_else(|| self.currency().clone());
        let items = self.cart_items(&cart, &currency, country).await?;
        let value = self.stores.orders.cart_taxed_total(&cart, country).await?;

        Ok(Some(CartEcommerce {
            currency,
            value,
            coupon,
            items,
        }))
    }

    async fn session_cart(&self) -> DataLayerResult<Option<Cart>> {
        let Some(cart_id) = self.session.cart_id else {
            debug!("session has no cart");
            return Ok(None);
        };
        let cart = self.stores.orders.cart(cart_id).await?;
        if cart.is_none() {
            debug!(cart = %cart_id, "session cart not found");
        }
        Ok(cart)
    }

    /// Settlement-time items for every cart line. The variant and product
    /// behind each line are required.
    async fn cart_items(
        &self,
        cart: &Cart,
        currency: &CurrencyCode,
        country: &Country,
    ) -> DataLayerResult<Vec<CatalogItem>> {
        let catalog = self.stores.catalog;
        let mut items = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let variant = catalog
                .variant(line.variant_id)
                .await?
                .ok_or_else(|| DataLayerError::not_found(EntityKind::Variant, line.variant_id))?;
            let product = catalog
                .product(variant.product_id)
                .await?
                .ok_or_else(|| DataLayerError::not_found(EntityKind::Product, variant.product_id))?;
            let options = ItemOptions {
                variant: Some(&variant),
                quantity: Some(line.quantity),
                list: None,
                taxed_for: Some(country),
            };
            items.push(
                self.items
                    .from_catalog(&product, &self.session.lang, currency, options)
                    .await?,
            );
        }
        Ok(items)
    }
}
