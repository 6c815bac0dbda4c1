//! In-process object store
//!
//! Used by tests and by local runs without a bucket. Objects live as long as
//! the process.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use super::{join_url, unique_key, ObjectStore, StorageError, StoredObject};

/// An object held in memory
#[derive(Debug, Clone)]
pub struct MemoryObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Object store backed by a map
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, MemoryObject>>>,
    base_url: String,
    key_prefix: String,
}

impl MemoryStore {
    pub fn new(base_url: impl Into<String>, key_prefix: impl Into<String>) -> Self {
        MemoryStore {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into(),
            key_prefix: key_prefix.into(),
        }
    }

    pub fn get(&self, key: &str) -> Option<MemoryObject> {
        self.objects.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.read().keys().cloned().collect()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new("memory://objects", "mockups")
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        suggested_name: &str,
    ) -> Result<StoredObject, StorageError> {
        let key = unique_key(&self.key_prefix, suggested_name);
        let url = join_url(&self.base_url, &key);

        debug!(key = %key, bytes = data.len(), "Stored object in memory");

        self.objects.write().insert(
            key.clone(),
            MemoryObject {
                data,
                content_type: content_type.to_string(),
            },
        );

        Ok(StoredObject { url, key })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_and_get() {
        let store = MemoryStore::new("https://cdn.test", "mockups");
        let stored = tokio_test::block_on(store.upload(vec![1, 2, 3], "image/webp", "mockup.webp")).unwrap();

        assert!(stored.key.starts_with("mockups/"));
        assert_eq!(stored.url, format!("https://cdn.test/{}", stored.key));

        let object = store.get(&stored.key).unwrap();
        assert_eq!(object.data, vec![1, 2, 3]);
        assert_eq!(object.content_type, "image/webp");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_name_gets_distinct_keys() {
        let store = MemoryStore::default();
        let first = tokio_test::block_on(store.upload(vec![0], "image/png", "m.png")).unwrap();
        let second = tokio_test::block_on(store.upload(vec![0], "image/png", "m.png")).unwrap();

        assert_ne!(first.key, second.key);
        assert_ne!(first.url, second.url);
        assert_eq!(store.keys().len(), 2);
    }
}
