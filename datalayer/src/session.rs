//! Typed access to the host session.
//!
//! The session store speaks JSON; [`SessionKey`] pairs a key name with the
//! type stored under it so reads and writes cannot disagree on the shape.
//! [`SessionContext`] snapshots the values the aggregators need for one
//! request, applying the store defaults for language and currency.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::{DataLayerError, DataLayerResult};
use crate::model::{Currency, Customer, Lang};
use crate::staging::AuthAction;
use crate::store::{CatalogStore, SessionStore};
use crate::types::{CartId, ProductId};

/// A session key and the type of the value stored under it.
#[derive(Debug)]
pub struct SessionKey<T> {
    name: &'static str,
    _value: PhantomData<fn() -> T>,
}

impl<T> SessionKey<T> {
    /// Declares a key.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _value: PhantomData,
        }
    }

    /// Key name as stored in the session.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

/// Language selected by the visitor.
pub const CURRENT_LANG: SessionKey<Lang> = SessionKey::new("thelia.current.lang");
/// Currency selected by the visitor.
pub const CURRENT_CURRENCY: SessionKey<Currency> = SessionKey::new("thelia.current.currency");
/// Logged-in customer.
pub const CUSTOMER_USER: SessionKey<Customer> = SessionKey::new("thelia.customer_user");
/// Coupon codes applied to the current cart.
pub const CONSUMED_COUPONS: SessionKey<Vec<String>> = SessionKey::new("thelia.consumed_coupons");
/// The visitor's cart.
pub const CART_ID: SessionKey<CartId> = SessionKey::new("thelia.cart_id");
/// Product ids last rendered in a listing, awaiting a `view_item_list` event.
pub const VIEW_LIST_ITEM: SessionKey<Vec<ProductId>> =
    SessionKey::new("google_tag_view_list_item");
/// Product last rendered as a detail page, awaiting a `view_item` event.
pub const VIEW_ITEM: SessionKey<ProductId> = SessionKey::new("google_tag_view_item");
/// Authentication outcome awaiting a `thelia_auth_success` event.
pub const TRIGGER_LOGIN: SessionKey<AuthAction> = SessionKey::new("google_tag_trigger_login");

/// Typed view over a [`SessionStore`].
#[derive(Clone, Copy)]
pub struct Session<'a> {
    store: &'a dyn SessionStore,
}

impl<'a> Session<'a> {
    /// Wraps a session store.
    pub fn new(store: &'a dyn SessionStore) -> Self {
        Self { store }
    }

    /// Reads a value. A stored `null` or a value of the wrong shape reads as
    /// absent.
    pub async fn get<T: DeserializeOwned>(&self, key: &SessionKey<T>) -> DataLayerResult<Option<T>> {
        let raw = self.store.get(key.name()).await?;
        Ok(decode(key, raw))
    }

    /// Writes a value.
    pub async fn set<T: Serialize>(&self, key: &SessionKey<T>, value: &T) -> DataLayerResult<()> {
        let encoded = serde_json::to_value(value)
            .map_err(|err| DataLayerError::Store(format!("cannot encode {}: {err}", key.name())))?;
        self.store.set(key.name(), encoded).await
    }

    /// Reads and clears a value in one step.
    pub async fn take<T: DeserializeOwned>(&self, key: &SessionKey<T>) -> DataLayerResult<Option<T>> {
        let raw = self.store.remove(key.name()).await?;
        Ok(decode(key, raw))
    }

    /// Clears a value.
    pub async fn clear<T>(&self, key: &SessionKey<T>) -> DataLayerResult<()> {
        let _ = self.store.remove(key.name()).await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(key: &SessionKey<T>, raw: Option<Value>) -> Option<T> {
    match raw {
        None | Some(Value::Null) => None,
        Some(value) => match serde_json::from_value(value) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(key = key.name(), error = %err, "ignoring undecodable session value");
                None
            }
        },
    }
}

/// Session values needed by the aggregators for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Visitor language, or the store default
    pub lang: Lang,
    /// Visitor currency, or the store default
    pub currency: Currency,
    /// Logged-in customer
    pub customer: Option<Customer>,
    /// Coupon codes applied to the cart
    pub consumed_coupons: Vec<String>,
    /// The visitor's cart
    pub cart_id: Option<CartId>,
}

impl SessionContext {
    /// Snapshots the session, falling back to the catalog defaults for
    /// language and currency.
    pub async fn resolve(
        session: Session<'_>,
        catalog: &dyn CatalogStore,
    ) -> DataLayerResult<Self> {
        let lang = match session.get(&CURRENT_LANG).await? {
            Some(lang) => lang,
            None => catalog.default_lang().await?,
        };
        let currency = match session.get(&CURRENT_CURRENCY).await? {
            Some(currency) => currency,
            None => catalog.default_currency().await?,
        };

        Ok(Self {
            lang,
            currency,
            customer: session.get(&CUSTOMER_USER).await?,
            consumed_coupons: session.get(&CONSUMED_COUPONS).await?.unwrap_or_default(),
            cart_id: session.get(&CART_ID).await?,
        })
    }

    /// Consumed coupon codes joined with `,`.
    pub fn coupon_string(&self) -> String {
        self.consumed_coupons.join(",")
    }
}
