//! Item fetch endpoints.
//!
//! Storefront scripts call these when a visitor selects a product in a
//! listing or adds one to the cart, and push the returned item themselves.
//! Both answer with a JSON array holding zero or one item; input that cannot
//! be understood yields the empty array.

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{EngineOptions, TagManagerSettings};
use crate::errors::{DataLayerError, DataLayerResult};
use crate::item::{CatalogItem, ItemNormalizer, ItemOptions};
use crate::page::View;
use crate::session::{Session, SessionContext};
use crate::store::Stores;
use crate::types::{ProductId, VariantId};

/// Body of the fetch-item-by-url endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemByUrlRequest {
    /// Absolute or root-relative storefront URL of a product page
    pub product_url: String,
}

/// Body of the fetch-cart-item endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    /// Variant added to the cart
    pub pse_id: VariantId,
    /// Units added
    pub quantity: u32,
}

/// Resolves single items for the storefront scripts.
pub struct ItemEndpoints<'a> {
    stores: Stores<'a>,
    options: EngineOptions,
}

impl<'a> ItemEndpoints<'a> {
    /// Creates the endpoints over the host stores.
    pub const fn new(stores: Stores<'a>, options: EngineOptions) -> Self {
        Self { stores, options }
    }

    /// Item of the product addressed by a storefront URL.
    #[instrument(skip(self, body))]
    pub async fn item_by_url(&self, body: &[u8]) -> DataLayerResult<Vec<CatalogItem>> {
        let request: ItemByUrlRequest = match parse_body(body) {
            Ok(request) => request,
            Err(err) => return malformed(&err),
        };
        let path = match rewritten_path(&request.product_url) {
            Ok(Some(path)) => path,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => return malformed(&err),
        };

        let catalog = self.stores.catalog;
        let Some(key) = catalog
            .resolve_rewritten_url(View::Product.as_str(), &path)
            .await?
        else {
            debug!(path = %path, "url does not address a product");
            return Ok(Vec::new());
        };
        let Some(product) = catalog.product(ProductId::new(key)).await? else {
            debug!(product = key, "rewritten url points to a missing product");
            return Ok(Vec::new());
        };

        let (session, store_name) = self.context().await?;
        let item = self
            .normalizer(&store_name)
            .from_catalog(
                &product,
                &session.lang,
                &session.currency.code,
                ItemOptions::default(),
            )
            .await?;
        Ok(vec![item])
    }

    /// Item of a variant just added to the cart.
    #[instrument(skip(self, body))]
    pub async fn cart_item(&self, body: &[u8]) -> DataLayerResult<Vec<CatalogItem>> {
        let request: CartItemRequest = match parse_body(body) {
            Ok(request) => request,
            Err(err) => return malformed(&err),
        };

        let catalog = self.stores.catalog;
        let Some(variant) = catalog.variant(request.pse_id).await? else {
            debug!(variant = %request.pse_id, "unknown variant");
            return Ok(Vec::new());
        };
        let Some(product) = catalog.product(variant.product_id).await? else {
            debug!(product = %variant.product_id, "variant of a missing product");
            return Ok(Vec::new());
        };

        let (session, store_name) = self.context().await?;
        let options = ItemOptions {
            variant: Some(&variant),
            quantity: Some(request.quantity),
            ..ItemOptions::default()
        };
        let item = self
            .normalizer(&store_name)
            .from_catalog(&product, &session.lang, &session.currency.code, options)
            .await?;
        Ok(vec![item])
    }

    async fn context(&self) -> DataLayerResult<(SessionContext, String)> {
        let session =
            SessionContext::resolve(Session::new(self.stores.session), self.stores.catalog).await?;
        let store_name = TagManagerSettings::new(self.stores.config).store_name().await?;
        Ok((session, store_name))
    }

    fn normalizer(&self, store_name: &str) -> ItemNormalizer<'a> {
        ItemNormalizer::new(
            self.stores.catalog,
            self.stores.taxes,
            store_name,
            self.options.max_category_depth,
        )
    }
}

fn parse_body<T: for<'de> Deserialize<'de>>(body: &[u8]) -> DataLayerResult<T> {
    Ok(serde_json::from_slice(body)?)
}

fn malformed(err: &DataLayerError) -> DataLayerResult<Vec<CatalogItem>> {
    warn!(error = %err, "rejecting fetch request");
    Ok(Vec::new())
}

/// Path of `raw` without its leading `/`, percent-decoded, as stored in the
/// rewritten URL table. Root-relative URLs are accepted. `None` for the bare
/// root.
fn rewritten_path(raw: &str) -> DataLayerResult<Option<String>> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse("http://storefront.invalid/")?.join(raw)?
        }
        Err(err) => return Err(err.into()),
    };
    let path = url.path().strip_prefix('/').unwrap_or(url.path());
    let path = percent_decode_str(path)
        .decode_utf8()
        .map_err(|err| DataLayerError::MalformedInput(format!("url path is not utf-8: {err}")))?;
    Ok((!path.is_empty()).then(|| path.into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_lose_their_leading_slash() {
        assert_eq!(
            rewritten_path("https://shop.test/blue-shirt.html?ref=home")
                .unwrap()
                .as_deref(),
            Some("blue-shirt.html")
        );
        assert_eq!(
            rewritten_path("/fr/chemise-bleue.html").unwrap().as_deref(),
            Some("fr/chemise-bleue.html")
        );
        assert_eq!(
            rewritten_path("/café.html").unwrap().as_deref(),
            Some("café.html")
        );
        assert_eq!(
            rewritten_path("/caf%C3%A9.html").unwrap().as_deref(),
            Some("café.html")
        );
        assert_eq!(
            rewritten_path("https://shop.test/café-noir.html")
                .unwrap()
                .as_deref(),
            Some("café-noir.html")
        );
    }

    #[test]
    fn non_utf8_escapes_are_malformed() {
        let err = rewritten_path("/caf%E9.html").unwrap_err();
        assert!(matches!(err, DataLayerError::MalformedInput(_)));
    }

    #[test]
    fn bare_roots_have_no_path() {
        assert_eq!(rewritten_path("https://shop.test").unwrap(), None);
        assert_eq!(rewritten_path("/").unwrap(), None);
    }

    #[test]
    fn unparseable_urls_are_malformed() {
        let err = rewritten_path("http://[::1").unwrap_err();
        assert!(matches!(err, DataLayerError::MalformedInput(_)));
    }

    #[test]
    fn request_bodies_use_storefront_field_names() {
        let request: CartItemRequest =
            parse_body(br#"{"pseId": 12, "quantity": 3}"#).unwrap();
        assert_eq!(request.pse_id, VariantId::new(12));
        assert_eq!(request.quantity, 3);

        let request: ItemByUrlRequest =
            parse_body(br#"{"productUrl": "/shirt.html"}"#).unwrap();
        assert_eq!(request.product_url, "/shirt.html");

        assert!(parse_body::<CartItemRequest>(br#"{"pseId": 12}"#).is_err());
    }
}
