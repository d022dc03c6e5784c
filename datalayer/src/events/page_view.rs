use md5::Md5;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use tracing::{debug, instrument};

use super::{DataLayerEvent, EventAggregator, GoogleTagParams, UserInfo};
use crate::errors::DataLayerResult;
use crate::escape::escape_html;
use crate::page::{PageRequest, View};

impl EventAggregator<'_> {
    /// `thelia_page_view`, emitted on every render.
    ///
    /// Context fields whose entity cannot be found are left out of the
    /// payload instead of failing the page.
    #[instrument(skip(self, request), fields(view = %request.view))]
    pub async fn page_view(&self, request: &PageRequest) -> DataLayerResult<DataLayerEvent> {
        let page_type = request.view.page_type();
        let mut params = GoogleTagParams {
            ecomm_pagetype: page_type,
            ecomm_category: None,
            ecomm_prodid: None,
            ecomm_totalvalue: None,
        };

        if page_type.reports_category() {
            params.ecomm_category = self.page_title(request).await?;
        }
        if page_type.reports_product() {
            params.ecomm_prodid = self.page_product_refs(request).await?;
        }
        if page_type.reports_total() {
            params.ecomm_totalvalue = self.page_total(request).await?;
        }

        Ok(DataLayerEvent::PageView {
            user: self.visitor(true),
            google_tag_params: params,
        })
    }

    /// Identity of the current visitor, with email hashes when `hashed`.
    pub(super) fn visitor(&self, hashed: bool) -> UserInfo {
        let Some(customer) = &self.session.customer else {
            return UserInfo::default();
        };
        let email = customer.email.as_bytes();
        UserInfo {
            logged: 1,
            user_id: Some(escape_html(&customer.reference)),
            umd: hashed.then(|| hex::encode(Md5::digest(email))),
            ush: hashed.then(|| hex::encode(Sha256::digest(email))),
        }
    }

    async fn page_title(&self, request: &PageRequest) -> DataLayerResult<Option<String>> {
        let catalog = self.stores.catalog;
        let locale = &self.session.lang.locale;
        let title = match request.view {
            View::Category => match request.category_id {
                Some(id) => catalog
                    .category(id)
                    .await?
                    .map(|category| escape_html(category.titles.title(locale))),
                None => None,
            },
            View::Brand => match request.brand_id {
                Some(id) => catalog
                    .brand(id)
                    .await?
                    .map(|brand| escape_html(brand.titles.title(locale))),
                None => None,
            },
            View::Product => match request.product_id {
                Some(id) => catalog
                    .product(id)
                    .await?
                    .map(|product| escape_html(product.titles.title(locale))),
                None => None,
            },
            View::Index
            | View::Content
            | View::Folder
            | View::Search
            | View::Cart
            | View::OrderDelivery
            | View::OrderPlaced
            | View::Account
            | View::AccountOrders
            | View::AccountUpdate
            | View::AccountAddress
            | View::Other(_) => return Ok(None),
        };
        if title.is_none() {
            debug!("page entity not found, omitting ecomm_category");
        }
        Ok(title)
    }

    async fn page_product_refs(&self, request: &PageRequest) -> DataLayerResult<Option<Vec<String>>> {
        let Some(id) = request.product_id else {
            debug!("no product on a product page, omitting ecomm_prodid");
            return Ok(None);
        };
        let product = self.stores.catalog.product(id).await?;
        Ok(product.map(|product| vec![escape_html(&product.reference)]))
    }

    async fn page_total(&self, request: &PageRequest) -> DataLayerResult<Option<Decimal>> {
        match request.view {
            View::Cart | View::OrderDelivery => {
                let Some(cart_id) = self.session.cart_id else {
                    return Ok(None);
                };
                let Some(cart) = self.stores.orders.cart(cart_id).await? else {
                    debug!(cart = %cart_id, "session cart not found, omitting ecomm_totalvalue");
                    return Ok(None);
                };
                let country = self.stores.taxes.delivery_country().await?;
                Ok(Some(self.stores.orders.cart_taxed_total(&cart, &country).await?))
            }
            View::OrderPlaced => {
                let Some(order_id) = request.order_id else {
                    return Ok(None);
                };
                let order = self.stores.orders.order(order_id).await?;
                if order.is_none() {
                    debug!(order = %order_id, "order not found, omitting ecomm_totalvalue");
                }
                Ok(order.map(|order| order.total_amount - order.total_tax))
            }
            View::Index
            | View::Category
            | View::Brand
            | View::Product
            | View::Content
            | View::Folder
            | View::Search
            | View::Account
            | View::AccountOrders
            | View::AccountUpdate
            | View::AccountAddress
            | View::Other(_) => Ok(None),
        }
    }
}
