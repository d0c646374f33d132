//! `localStorage` backend for WebAssembly.

use super::{BoxFuture, Storage, StorageError, StorageResult};

const KEY_PREFIX: &str = "atelier:";

/// Browser `localStorage`, namespaced under a key prefix.
///
/// Not Send/Sync: the handle belongs to the page's single thread.
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> StorageResult<Self> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Other("No window object".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Other(format!("localStorage error: {:?}", e)))?
            .ok_or_else(|| StorageError::Other("localStorage not available".to_string()))?;
        Ok(Self { storage })
    }

    fn full_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage
            .get_item(&Self::full_key(key))
            .map_err(|e| StorageError::Io(format!("Failed to read {}: {:?}", key, e)))
    }
}

impl Storage for LocalStorage {
    fn save(&self, key: &str, value: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .storage
            .set_item(&Self::full_key(key), value)
            .map_err(|e| StorageError::Io(format!("Failed to write {}: {:?}", key, e)));
        Box::pin(async move { result })
    }

    fn load(&self, key: &str) -> BoxFuture<'_, StorageResult<String>> {
        let result = self
            .get(key)
            .and_then(|value| value.ok_or_else(|| StorageError::NotFound(key.to_string())));
        Box::pin(async move { result })
    }

    fn delete(&self, key: &str) -> BoxFuture<'_, StorageResult<()>> {
        let result = self
            .storage
            .remove_item(&Self::full_key(key))
            .map_err(|e| StorageError::Io(format!("Failed to delete {}: {:?}", key, e)));
        Box::pin(async move { result })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let len = self
                .storage
                .length()
                .map_err(|e| StorageError::Io(format!("Failed to list keys: {:?}", e)))?;
            let mut keys = Vec::new();
            for i in 0..len {
                let key = self
                    .storage
                    .key(i)
                    .map_err(|e| StorageError::Io(format!("Failed to list keys: {:?}", e)))?;
                if let Some(key) = key.as_deref().and_then(|k| k.strip_prefix(KEY_PREFIX)) {
                    keys.push(key.to_string());
                }
            }
            keys.sort();
            Ok(keys)
        })
    }

    fn exists(&self, key: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let result = self.get(key).map(|value| value.is_some());
        Box::pin(async move { result })
    }
}
