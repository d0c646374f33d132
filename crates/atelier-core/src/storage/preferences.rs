//! Typed settings on top of a [`Storage`] backend.

use crate::config::EditorConfig;
use crate::storage::{Storage, StorageError, StorageResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Key under which the editor configuration is stored.
pub const CONFIG_KEY: &str = "editor-config";

/// Reads and writes JSON-serializable values through an injected backend.
pub struct PreferenceStore<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> Clone for PreferenceStore<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> PreferenceStore<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Value under `key`, or `None` if it was never stored.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let json = match self.storage.load(key).await {
            Ok(json) => json,
            Err(StorageError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.save(key, &json).await
    }

    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage.delete(key).await
    }

    /// Stored editor configuration, or the defaults when none was saved.
    pub async fn load_config(&self) -> StorageResult<EditorConfig> {
        let config = self.get::<EditorConfig>(CONFIG_KEY).await?;
        if config.is_none() {
            log::debug!("No stored editor config, using defaults");
        }
        Ok(config.unwrap_or_default())
    }

    pub async fn save_config(&self, config: &EditorConfig) -> StorageResult<()> {
        self.set(CONFIG_KEY, config).await
    }
}
