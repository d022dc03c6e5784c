//! dataLayer event payloads and the aggregators that build them.
//!
//! Each business event has its own body type so a payload can only carry the
//! fields its event defines. [`DataLayerEvent`] serializes to the object the
//! tag manager expects, with the event name under `"event"`:
//!
//! ```json
//! { "event": "view_cart", "ecommerce": { "currency": "EUR", "value": 25.0, "items": [] } }
//! ```
//!
//! Aggregators live on [`EventAggregator`], one file per event family.

mod auth;
mod cart;
mod catalog;
mod order;
mod page_view;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::config::EngineOptions;
use crate::errors::DataLayerResult;
use crate::item::{CatalogItem, ItemNormalizer};
use crate::page::PageType;
use crate::session::SessionContext;
use crate::staging::AuthAction;
use crate::store::Stores;
use crate::types::CurrencyCode;

/// A dataLayer event ready to be pushed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DataLayerEvent {
    /// Emitted on every page render.
    #[serde(rename = "thelia_page_view")]
    PageView {
        /// Visitor identity
        user: UserInfo,
        /// Page classification and context
        google_tag_params: GoogleTagParams,
    },
    /// A product listing was rendered.
    ViewItemList {
        /// Listed items
        ecommerce: ItemsEcommerce,
    },
    /// A product detail page was rendered.
    ViewItem {
        /// The viewed item
        ecommerce: ItemsEcommerce,
    },
    /// The visitor logged in or registered.
    #[serde(rename = "thelia_auth_success")]
    AuthSuccess {
        /// Which flow succeeded
        auth_action: AuthAction,
        /// Visitor identity
        user: UserInfo,
    },
    /// The cart was shown on the delivery step.
    ViewCart {
        /// Cart contents
        ecommerce: CartEcommerce,
    },
    /// Checkout started.
    BeginCheckout {
        /// Cart contents with coupons
        ecommerce: CartEcommerce,
    },
    /// Payment method of a placed order.
    AddPaymentInfo {
        /// Order contents and payment module
        ecommerce: PaymentEcommerce,
    },
    /// Delivery method of a placed order.
    AddShippingInfo {
        /// Order contents and delivery module
        ecommerce: ShippingEcommerce,
    },
    /// An order was placed.
    Purchase {
        /// Transaction details
        ecommerce: PurchaseEcommerce,
        /// Buyer identity
        user_purchase: UserPurchase,
    },
}

impl DataLayerEvent {
    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::PageView { .. } => "thelia_page_view",
            Self::ViewItemList { .. } => "view_item_list",
            Self::ViewItem { .. } => "view_item",
            Self::AuthSuccess { .. } => "thelia_auth_success",
            Self::ViewCart { .. } => "view_cart",
            Self::BeginCheckout { .. } => "begin_checkout",
            Self::AddPaymentInfo { .. } => "add_payment_info",
            Self::AddShippingInfo { .. } => "add_shipping_info",
            Self::Purchase { .. } => "purchase",
        }
    }

    /// Items carried by ecommerce events; empty for the others.
    pub fn items(&self) -> &[CatalogItem] {
        match self {
            Self::ViewItemList { ecommerce } | Self::ViewItem { ecommerce } => &ecommerce.items,
            Self::ViewCart { ecommerce } | Self::BeginCheckout { ecommerce } => &ecommerce.items,
            Self::AddPaymentInfo { ecommerce } => &ecommerce.items,
            Self::AddShippingInfo { ecommerce } => &ecommerce.items,
            Self::Purchase { ecommerce, .. } => &ecommerce.items,
            Self::PageView { .. } | Self::AuthSuccess { .. } => &[],
        }
    }

    /// The payload as a JSON value.
    pub fn to_json(&self) -> DataLayerResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Visitor identity block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserInfo {
    /// `1` when a customer is logged in, `0` otherwise
    pub logged: u8,
    /// Customer reference
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Hex MD5 of the customer email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub umd: Option<String>,
    /// Hex SHA-256 of the customer email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ush: Option<String>,
}

/// Page context of a page view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoogleTagParams {
    /// Semantic page type
    pub ecomm_pagetype: PageType,
    /// Title of the addressed category, brand or product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecomm_category: Option<String>,
    /// References of the addressed product
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecomm_prodid: Option<Vec<String>>,
    /// Cart or order total
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ecomm_totalvalue: Option<Decimal>,
}

/// Body of list and detail views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemsEcommerce {
    /// Viewed items
    pub items: Vec<CatalogItem>,
}

/// Body of cart and checkout events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartEcommerce {
    /// Cart currency
    pub currency: CurrencyCode,
    /// Cart total including taxes
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Consumed coupon codes joined with `,`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    /// Cart lines
    pub items: Vec<CatalogItem>,
}

/// Body of `add_payment_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentEcommerce {
    /// Session currency
    pub currency: CurrencyCode,
    /// Order total
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Consumed coupon codes joined with `,`
    pub coupon: String,
    /// Payment module code
    pub payment_type: String,
    /// Order lines, taxed
    pub items: Vec<CatalogItem>,
}

/// Body of `add_shipping_info`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShippingEcommerce {
    /// Session currency
    pub currency: CurrencyCode,
    /// Order total
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Consumed coupon codes joined with `,`
    pub coupon: String,
    /// Delivery module code
    pub shipping_tier: String,
    /// Order lines, taxed
    pub items: Vec<CatalogItem>,
}

/// Body of `purchase`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseEcommerce {
    /// Order reference
    pub transaction_id: String,
    /// Order total
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    /// Tax part of the total
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    /// Shipping cost
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    /// Session currency
    pub currency: CurrencyCode,
    /// Store name
    pub affiliation: String,
    /// Order lines, taxed
    pub items: Vec<CatalogItem>,
}

/// Buyer block of `purchase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserPurchase {
    /// Buyer email
    pub email: String,
    /// Invoice address
    pub address: PurchaseAddress,
}

/// Invoice address of `purchase`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseAddress {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Street lines joined with a space
    pub address: String,
    /// City
    pub city: String,
    /// Postal code
    pub postal_code: String,
    /// Two-letter ISO country code
    pub country: String,
}

/// Builds the payload of every event for one request.
pub struct EventAggregator<'a> {
    stores: Stores<'a>,
    session: &'a SessionContext,
    items: ItemNormalizer<'a>,
    affiliation: String,
}

impl<'a> EventAggregator<'a> {
    /// Creates an aggregator over the host stores for the visitor described
    /// by `session`. `store_name` is the raw configured store name.
    pub fn new(
        stores: Stores<'a>,
        session: &'a SessionContext,
        store_name: &str,
        options: &EngineOptions,
    ) -> Self {
        Self {
            stores,
            session,
            items: ItemNormalizer::new(
                stores.catalog,
                stores.taxes,
                store_name,
                options.max_category_depth,
            ),
            affiliation: crate::escape::escape_html(store_name),
        }
    }

    /// The item normalizer bound to the same stores.
    pub const fn items(&self) -> &ItemNormalizer<'a> {
        &self.items
    }

    fn currency(&self) -> &CurrencyCode {
        &self.session.currency.code
    }
}
