//! Deferred view staging.
//!
//! Product listings and detail pages are rendered in a different phase from
//! the page head where dataLayer events are emitted, so the viewing side
//! records what was shown in the session and the emitting side consumes it.
//!
//! Per session there are three independent slots:
//!
//! ```text
//! list slot:  idle --record_list(ids)--> list-pending(ids) --take_list--> idle
//! item slot:  idle --record_item(id)---> item-pending(id)  --take_item--> idle
//!             item-pending(id) --discard_item--> idle
//! auth slot:  idle --registration------> auth-pending(creation)
//!             idle --login-------------> auth-pending(authentication)
//!             auth-pending(creation) --login--> unchanged
//!             auth-pending(_) --take_auth_action--> idle
//! ```
//!
//! Every `take_*` clears the slot it reads, so a staged value is emitted at
//! most once even when several listeners observe the same render. Callers
//! must not run two requests of the same session concurrently; the slots
//! have no lock of their own.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::DataLayerResult;
use crate::page::View;
use crate::session::{Session, TRIGGER_LOGIN, VIEW_ITEM, VIEW_LIST_ITEM};
use crate::types::ProductId;

/// Outcome of a successful authentication flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthAction {
    /// The visitor created an account.
    #[serde(rename = "account creation")]
    AccountCreation,
    /// The visitor logged in to an existing account.
    #[serde(rename = "account authentication")]
    AccountAuthentication,
}

impl AuthAction {
    /// Wire value of the action.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccountCreation => "account creation",
            Self::AccountAuthentication => "account authentication",
        }
    }
}

/// Session-scoped staging of view and authentication signals.
#[derive(Clone, Copy)]
pub struct ViewStaging<'a> {
    session: Session<'a>,
}

impl<'a> ViewStaging<'a> {
    /// Stages over `session`.
    pub const fn new(session: Session<'a>) -> Self {
        Self { session }
    }

    /// Records the product ids just rendered in a listing.
    pub async fn record_list(&self, ids: &[ProductId]) -> DataLayerResult<()> {
        self.session.set(&VIEW_LIST_ITEM, &ids.to_vec()).await
    }

    /// Records the product just rendered as a detail page.
    pub async fn record_item(&self, id: ProductId) -> DataLayerResult<()> {
        self.session.set(&VIEW_ITEM, &id).await
    }

    /// Handles a product loop render on `view`: listing views stage the
    /// rendered ids, every other view drops a stale staged list so it cannot
    /// leak onto an unrelated page.
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    pub async fn track_listing(&self, view: &View, ids: &[ProductId]) -> DataLayerResult<()> {
        if view.is_listing() {
            self.record_list(ids).await
        } else {
            debug!(view = view.as_str(), "clearing staged list outside a listing view");
            self.session.clear(&VIEW_LIST_ITEM).await
        }
    }

    /// Consumes the staged listing.
    pub async fn take_list(&self) -> DataLayerResult<Option<Vec<ProductId>>> {
        self.session.take(&VIEW_LIST_ITEM).await
    }

    /// Consumes the staged detail view.
    pub async fn take_item(&self) -> DataLayerResult<Option<ProductId>> {
        self.session.take(&VIEW_ITEM).await
    }

    /// Drops a staged detail view without emitting it, for renders of any
    /// view other than a product page.
    pub async fn discard_item(&self) -> DataLayerResult<()> {
        if let Some(id) = self.take_item().await? {
            debug!(product = %id, "dropping staged product outside a product view");
        }
        Ok(())
    }

    /// A registration always wins the auth slot.
    pub async fn record_registration(&self) -> DataLayerResult<()> {
        self.session
            .set(&TRIGGER_LOGIN, &AuthAction::AccountCreation)
            .await
    }

    /// A login only takes the auth slot if no registration is pending;
    /// registration flows log the new customer in straight away.
    pub async fn record_login(&self) -> DataLayerResult<()> {
        if self.session.get(&TRIGGER_LOGIN).await? == Some(AuthAction::AccountCreation) {
            return Ok(());
        }
        self.session
            .set(&TRIGGER_LOGIN, &AuthAction::AccountAuthentication)
            .await
    }

    /// Consumes the staged authentication outcome.
    pub async fn take_auth_action(&self) -> DataLayerResult<Option<AuthAction>> {
        self.session.take(&TRIGGER_LOGIN).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::store::SessionStore;

    #[derive(Default)]
    struct MapSession(Mutex<HashMap<String, Value>>);

    #[async_trait]
    impl SessionStore for MapSession {
        async fn get(&self, key: &str) -> DataLayerResult<Option<Value>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: Value) -> DataLayerResult<()> {
            let _ = self.0.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn remove(&self, key: &str) -> DataLayerResult<Option<Value>> {
            Ok(self.0.lock().unwrap().remove(key))
        }
    }

    fn ids(raw: &[u64]) -> Vec<ProductId> {
        raw.iter().copied().map(ProductId::new).collect()
    }

    #[tokio::test]
    async fn staged_list_is_emitted_at_most_once() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_list(&ids(&[1, 2, 3])).await.unwrap();

        assert_eq!(staging.take_list().await.unwrap(), Some(ids(&[1, 2, 3])));
        assert_eq!(staging.take_list().await.unwrap(), None);
    }

    #[tokio::test]
    async fn staged_item_is_emitted_at_most_once() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_item(ProductId::new(7)).await.unwrap();

        assert_eq!(staging.take_item().await.unwrap(), Some(ProductId::new(7)));
        assert_eq!(staging.take_item().await.unwrap(), None);
    }

    #[tokio::test]
    async fn discarded_item_is_never_emitted() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_item(ProductId::new(7)).await.unwrap();
        staging.discard_item().await.unwrap();
        staging.discard_item().await.unwrap();

        assert_eq!(staging.take_item().await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_and_item_slots_are_independent() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_list(&ids(&[4, 5])).await.unwrap();
        staging.record_item(ProductId::new(9)).await.unwrap();

        assert_eq!(staging.take_item().await.unwrap(), Some(ProductId::new(9)));
        assert_eq!(staging.take_list().await.unwrap(), Some(ids(&[4, 5])));
    }

    #[tokio::test]
    async fn listing_views_stage_and_other_views_clear() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging
            .track_listing(&View::Category, &ids(&[1, 2]))
            .await
            .unwrap();
        staging
            .track_listing(&View::Content, &ids(&[3]))
            .await
            .unwrap();

        assert_eq!(staging.take_list().await.unwrap(), None);

        staging
            .track_listing(&View::Search, &ids(&[8]))
            .await
            .unwrap();
        assert_eq!(staging.take_list().await.unwrap(), Some(ids(&[8])));
    }

    #[tokio::test]
    async fn registration_takes_precedence_over_login() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_registration().await.unwrap();
        staging.record_login().await.unwrap();

        assert_eq!(
            staging.take_auth_action().await.unwrap(),
            Some(AuthAction::AccountCreation)
        );
        assert_eq!(staging.take_auth_action().await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_alone_stages_authentication() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_login().await.unwrap();
        staging.record_login().await.unwrap();

        assert_eq!(
            staging.take_auth_action().await.unwrap(),
            Some(AuthAction::AccountAuthentication)
        );
    }

    #[tokio::test]
    async fn registration_overwrites_pending_login() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_login().await.unwrap();
        staging.record_registration().await.unwrap();

        assert_eq!(
            staging.take_auth_action().await.unwrap(),
            Some(AuthAction::AccountCreation)
        );
    }

    #[tokio::test]
    async fn auth_action_uses_host_wire_values() {
        let store = MapSession::default();
        let staging = ViewStaging::new(Session::new(&store));

        staging.record_registration().await.unwrap();

        assert_eq!(
            store.get("google_tag_trigger_login").await.unwrap(),
            Some(json!("account creation"))
        );
    }
}
