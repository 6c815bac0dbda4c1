//! Object storage for published mockups
//!
//! The pipeline only needs "store these bytes, give me a public URL and the
//! key". [`S3Store`] talks to any S3-compatible endpoint (AWS S3, Cloudflare
//! R2, MinIO); [`MemoryStore`] keeps objects in process.

mod memory;
mod s3;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use s3::S3Store;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage not configured: {0}")]
    NotConfigured(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload timed out after {0:?}")]
    Timeout(Duration),
}

/// A stored object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Publicly resolvable URL
    pub url: String,
    /// Object key, unique per upload
    pub key: String,
}

/// Durable object storage collaborator
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under a freshly generated key derived from
    /// `suggested_name`'s extension
    async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        suggested_name: &str,
    ) -> Result<StoredObject, StorageError>;
}

/// Build a key that no other upload can share: `{prefix}/{uuid-v4}.{ext}`
pub fn unique_key(prefix: &str, suggested_name: &str) -> String {
    let extension = suggested_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| "bin".to_string());

    let id = Uuid::new_v4();
    let prefix = prefix.trim_matches('/');

    if prefix.is_empty() {
        format!("{}.{}", id, extension)
    } else {
        format!("{}/{}.{}", prefix, id, extension)
    }
}

/// Join a public base URL and a key
pub(crate) fn join_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
