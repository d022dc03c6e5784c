use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use datalayer::errors::DataLayerResult;
use datalayer::store::ConfigStore;
use parking_lot::RwLock;

/// Thread-safe in-memory configuration table.
#[derive(Clone, Default)]
pub struct InMemoryConfig {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryConfig {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value without validation, as a direct table edit would.
    pub fn insert(&self, key: &str, value: &str) {
        let _ = self
            .values
            .write()
            .insert(key.to_string(), value.to_string());
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfig {
    async fn get(&self, key: &str) -> DataLayerResult<Option<String>> {
        Ok(self.values.read().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DataLayerResult<()> {
        self.insert(key, value);
        Ok(())
    }
}
