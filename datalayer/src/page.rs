//! Route classification.
//!
//! The host identifies each rendered page by a view name (`index`,
//! `category`, `order-placed`, ...). [`View`] closes that vocabulary and
//! [`PageType`] is the semantic page type reported to the tag manager.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{BrandId, CategoryId, OrderId, ProductId};

/// A storefront view, as named by the host router.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum View {
    /// Home page
    Index,
    /// Product detail
    Product,
    /// Category listing
    Category,
    /// Brand listing
    Brand,
    /// Content page
    Content,
    /// Folder of contents
    Folder,
    /// Search results
    Search,
    /// Cart
    Cart,
    /// Delivery step of the checkout
    OrderDelivery,
    /// Order confirmation
    OrderPlaced,
    /// Account dashboard
    Account,
    /// Order history
    AccountOrders,
    /// Account edition
    AccountUpdate,
    /// Address book
    AccountAddress,
    /// Any view the engine has no special handling for
    Other(String),
}

impl View {
    /// The host's name for this view.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Index => "index",
            Self::Product => "product",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Content => "content",
            Self::Folder => "folder",
            Self::Search => "search",
            Self::Cart => "cart",
            Self::OrderDelivery => "order-delivery",
            Self::OrderPlaced => "order-placed",
            Self::Account => "account",
            Self::AccountOrders => "account-orders",
            Self::AccountUpdate => "account-update",
            Self::AccountAddress => "account-address",
            Self::Other(name) => name,
        }
    }

    /// Views that render a product listing tracked for `view_item_list`.
    pub const fn is_listing(&self) -> bool {
        matches!(self, Self::Category | Self::Brand | Self::Search)
    }

    /// Semantic page type of this view.
    pub const fn page_type(&self) -> PageType {
        match self {
            Self::Index => PageType::Home,
            Self::Product => PageType::Product,
            Self::Category | Self::Brand => PageType::Category,
            Self::Content => PageType::Content,
            Self::Folder => PageType::Dossier,
            Self::Search => PageType::SearchResults,
            Self::Cart | Self::OrderDelivery => PageType::Cart,
            Self::OrderPlaced => PageType::Purchase,
            Self::Account | Self::AccountOrders | Self::AccountUpdate | Self::AccountAddress => {
                PageType::Account
            }
            Self::Other(_) => PageType::Other,
        }
    }
}

impl FromStr for View {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "index" => Self::Index,
            "product" => Self::Product,
            "category" => Self::Category,
            "brand" => Self::Brand,
            "content" => Self::Content,
            "folder" => Self::Folder,
            "search" => Self::Search,
            "cart" => Self::Cart,
            "order-delivery" => Self::OrderDelivery,
            "order-placed" => Self::OrderPlaced,
            "account" => Self::Account,
            "account-orders" => Self::AccountOrders,
            "account-update" => Self::AccountUpdate,
            "account-address" => Self::AccountAddress,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<&str> for View {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(view) => view,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The page being rendered: its view plus the route parameters the
/// aggregators read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// View name
    pub view: View,
    /// `category_id` route parameter
    pub category_id: Option<CategoryId>,
    /// `brand_id` route parameter
    pub brand_id: Option<BrandId>,
    /// `product_id` route parameter
    pub product_id: Option<ProductId>,
    /// `order_id` route parameter
    pub order_id: Option<OrderId>,
}

impl PageRequest {
    /// A request for `view` without route parameters.
    pub fn new(view: impl Into<View>) -> Self {
        Self {
            view: view.into(),
            category_id: None,
            brand_id: None,
            product_id: None,
            order_id: None,
        }
    }

    /// Sets the addressed category.
    #[must_use]
    pub fn with_category(mut self, id: CategoryId) -> Self {
        self.category_id = Some(id);
        self
    }

    /// Sets the addressed brand.
    #[must_use]
    pub fn with_brand(mut self, id: BrandId) -> Self {
        self.brand_id = Some(id);
        self
    }

    /// Sets the addressed product.
    #[must_use]
    pub fn with_product(mut self, id: ProductId) -> Self {
        self.product_id = Some(id);
        self
    }

    /// Sets the placed order.
    #[must_use]
    pub fn with_order(mut self, id: OrderId) -> Self {
        self.order_id = Some(id);
        self
    }
}

/// Page type reported as `ecomm_pagetype`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageType {
    /// Home page
    Home,
    /// Product detail
    Product,
    /// Category or brand listing
    Category,
    /// Content page
    Content,
    /// Folder of contents
    Dossier,
    /// Search results
    SearchResults,
    /// Cart and delivery step
    Cart,
    /// Order confirmation
    Purchase,
    /// Customer account pages
    Account,
    /// Everything else
    Other,
}

impl PageType {
    /// Whether `ecomm_category` is reported for this page type.
    pub const fn reports_category(self) -> bool {
        matches!(self, Self::Category | Self::Product)
    }

    /// Whether `ecomm_prodid` is reported for this page type.
    pub const fn reports_product(self) -> bool {
        matches!(self, Self::Product)
    }

    /// Whether `ecomm_totalvalue` is reported for this page type.
    pub const fn reports_total(self) -> bool {
        matches!(self, Self::Cart | Self::Purchase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_known_view() {
        let cases = [
            ("index", PageType::Home),
            ("product", PageType::Product),
            ("category", PageType::Category),
            ("brand", PageType::Category),
            ("content", PageType::Content),
            ("folder", PageType::Dossier),
            ("search", PageType::SearchResults),
            ("cart", PageType::Cart),
            ("order-delivery", PageType::Cart),
            ("order-placed", PageType::Purchase),
            ("account", PageType::Account),
            ("account-orders", PageType::Account),
            ("account-update", PageType::Account),
            ("account-address", PageType::Account),
            ("contact", PageType::Other),
            ("", PageType::Other),
        ];

        for (name, expected) in cases {
            assert_eq!(View::from(name).page_type(), expected, "view {name}");
        }
    }

    #[test]
    fn view_names_round_trip() {
        for name in ["index", "order-delivery", "account-address", "newsletter"] {
            assert_eq!(View::from(name).as_str(), name);
        }
    }

    #[test]
    fn page_types_use_host_wire_names() {
        assert_eq!(
            serde_json::to_value(PageType::SearchResults).unwrap(),
            "searchresults"
        );
        assert_eq!(serde_json::to_value(PageType::Dossier).unwrap(), "dossier");
    }

    #[test]
    fn only_catalog_listings_are_tracked() {
        assert!(View::Category.is_listing());
        assert!(View::Brand.is_listing());
        assert!(View::Search.is_listing());
        assert!(!View::Product.is_listing());
        assert!(!View::Index.is_listing());
    }
}
