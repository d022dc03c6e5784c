//! Engine configuration.
//!
//! Two sources feed the engine: the host's configuration table, read through
//! [`TagManagerSettings`], and [`EngineOptions`], supplied by whoever embeds
//! the engine.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::DataLayerResult;
use crate::store::ConfigStore;
use crate::types::{ContainerId, MaxCategoryDepth};

/// Configuration key of the tag-manager container id.
pub const CONTAINER_ID_KEY: &str = "googletagmanager_gtmId";

/// Configuration key of the store name.
pub const STORE_NAME_KEY: &str = "store_name";

/// Tuning knobs of the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Longest category parent chain walked before giving up
    pub max_category_depth: MaxCategoryDepth,
}

/// Tag-manager settings stored in the host configuration table.
#[derive(Clone, Copy)]
pub struct TagManagerSettings<'a> {
    config: &'a dyn ConfigStore,
}

impl<'a> TagManagerSettings<'a> {
    /// Reads and writes through `config`.
    pub fn new(config: &'a dyn ConfigStore) -> Self {
        Self { config }
    }

    /// The configured container id. `None` disables the integration: the
    /// value is absent, blank, or no longer valid.
    pub async fn container_id(&self) -> DataLayerResult<Option<ContainerId>> {
        let Some(raw) = self.config.get(CONTAINER_ID_KEY).await? else {
            return Ok(None);
        };
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match ContainerId::try_new(raw) {
            Ok(id) => Ok(Some(id)),
            Err(err) => {
                warn!(error = %err, "stored container id is invalid, tag manager disabled");
                Ok(None)
            }
        }
    }

    /// Validates and stores a container id submitted by an administrator.
    #[instrument(skip(self))]
    pub async fn save_container_id(&self, raw: &str) -> DataLayerResult<ContainerId> {
        let id = ContainerId::try_new(raw)?;
        self.config.set(CONTAINER_ID_KEY, id.as_ref()).await?;
        info!(container_id = %id, "container id saved");
        Ok(id)
    }

    /// Disables the integration.
    pub async fn clear_container_id(&self) -> DataLayerResult<()> {
        self.config.set(CONTAINER_ID_KEY, "").await
    }

    /// The raw store name, empty when unset.
    pub async fn store_name(&self) -> DataLayerResult<String> {
        Ok(self.config.get(STORE_NAME_KEY).await?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use super::*;
    use crate::errors::DataLayerError;

    #[derive(Default)]
    struct MapConfig(Mutex<HashMap<String, String>>);

    #[async_trait]
    impl ConfigStore for MapConfig {
        async fn get(&self, key: &str) -> DataLayerResult<Option<String>> {
            Ok(self.0.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str) -> DataLayerResult<()> {
            let _ = self
                .0
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }
    }

    #[tokio::test]
    async fn unset_or_blank_container_id_disables() {
        let config = MapConfig::default();
        let settings = TagManagerSettings::new(&config);
        assert_eq!(settings.container_id().await.unwrap(), None);

        config.set(CONTAINER_ID_KEY, "   ").await.unwrap();
        assert_eq!(settings.container_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn saved_container_id_is_trimmed_and_read_back() {
        let config = MapConfig::default();
        let settings = TagManagerSettings::new(&config);

        let saved = settings.save_container_id(" GTM-ABC123 ").await.unwrap();

        assert_eq!(saved.as_ref(), "GTM-ABC123");
        assert_eq!(
            config.get(CONTAINER_ID_KEY).await.unwrap().as_deref(),
            Some("GTM-ABC123")
        );
        assert_eq!(settings.container_id().await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn invalid_container_id_is_a_configuration_error() {
        let config = MapConfig::default();
        let settings = TagManagerSettings::new(&config);

        let err = settings.save_container_id("UA-12345").await.unwrap_err();

        assert!(matches!(err, DataLayerError::Configuration(_)));
        assert_eq!(config.get(CONTAINER_ID_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    #[traced_test]
    async fn invalid_stored_container_id_disables_with_a_warning() {
        let config = MapConfig::default();
        config.set(CONTAINER_ID_KEY, "UA-12345").await.unwrap();

        let id = TagManagerSettings::new(&config).container_id().await.unwrap();

        assert_eq!(id, None);
        assert!(logs_contain("stored container id is invalid"));
    }

    #[tokio::test]
    async fn clearing_disables_the_integration() {
        let config = MapConfig::default();
        let settings = TagManagerSettings::new(&config);
        let _ = settings.save_container_id("GTM-ABC123").await.unwrap();

        settings.clear_container_id().await.unwrap();

        assert_eq!(settings.container_id().await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_name_defaults_to_empty() {
        let config = MapConfig::default();
        let settings = TagManagerSettings::new(&config);
        assert_eq!(settings.store_name().await.unwrap(), "");

        config.set(STORE_NAME_KEY, "Chez Ada").await.unwrap();
        assert_eq!(settings.store_name().await.unwrap(), "Chez Ada");
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: EngineOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EngineOptions::default());

        let options: EngineOptions =
            serde_json::from_str(r#"{"max_category_depth": 8}"#).unwrap();
        assert_eq!(usize::from(options.max_category_depth), 8);

        assert!(serde_json::from_str::<EngineOptions>(r#"{"max_category_depth": 0}"#).is_err());
    }
}
