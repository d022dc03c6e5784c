use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalayer::errors::{DataLayerError, DataLayerResult};
use datalayer::session::SessionKey;
use datalayer::store::SessionStore;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;

/// One visitor session held in memory. Clones share the same session.
#[derive(Clone, Default)]
pub struct InMemorySession {
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemorySession {
    /// Creates an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a typed value outside of any request.
    pub fn put<T: Serialize>(&self, key: &SessionKey<T>, value: &T) -> DataLayerResult<()> {
        let encoded = serde_json::to_value(value)
            .map_err(|err| DataLayerError::Store(format!("cannot encode {}: {err}", key.name())))?;
        let _ = self.values.write().insert(key.name().to_string(), encoded);
        Ok(())
    }

    /// Raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.values.read().get(key).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySession {
    async fn get(&self, key: &str) -> DataLayerResult<Option<Value>> {
        Ok(self.raw(key))
    }

    async fn set(&self, key: &str, value: Value) -> DataLayerResult<()> {
        let _ = self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> DataLayerResult<Option<Value>> {
        Ok(self.values.write().remove(key))
    }
}

#[cfg(test)]
mod tests {
    use datalayer::session::{Session, CONSUMED_COUPONS};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn typed_values_round_trip_through_json() {
        let store = InMemorySession::new();
        let session = Session::new(&store);

        session
            .set(&CONSUMED_COUPONS, &vec!["WELCOME".to_string()])
            .await
            .unwrap();

        assert_eq!(store.raw("thelia.consumed_coupons"), Some(json!(["WELCOME"])));
        assert_eq!(
            session.take(&CONSUMED_COUPONS).await.unwrap(),
            Some(vec!["WELCOME".to_string()])
        );
        assert_eq!(store.raw("thelia.consumed_coupons"), None);
    }

    #[tokio::test]
    async fn null_and_mistyped_values_read_as_absent() {
        let store = InMemorySession::new();
        let session = Session::new(&store);

        store.set("thelia.consumed_coupons", Value::Null).await.unwrap();
        assert_eq!(session.get(&CONSUMED_COUPONS).await.unwrap(), None);

        store
            .set("thelia.consumed_coupons", json!({"not": "a list"}))
            .await
            .unwrap();
        assert_eq!(session.get(&CONSUMED_COUPONS).await.unwrap(), None);
    }
}
