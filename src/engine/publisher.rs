//! Output encoder and publisher

use std::sync::Arc;
use std::time::Duration;

use image::RgbaImage;
use tracing::{debug, instrument};

use crate::domain::PublishedMockup;
use crate::storage::{ObjectStore, StorageError};

use super::encoder::{EncodeError, OutputFormat};
use super::error::MockupError;

/// A mockup encoded and ready for upload
#[derive(Debug, Clone)]
pub struct EncodedMockup {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
}

/// Encodes composites and hands them to object storage
#[derive(Clone)]
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    format: OutputFormat,
    upload_timeout: Duration,
}

impl Publisher {
    pub fn new(store: Arc<dyn ObjectStore>, format: OutputFormat, upload_timeout: Duration) -> Self {
        Publisher {
            store,
            format,
            upload_timeout,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encode a finished composite. CPU-bound; call from a blocking context.
    pub fn encode(format: OutputFormat, image: &RgbaImage) -> Result<EncodedMockup, EncodeError> {
        let bytes = format.encode(image)?;
        Ok(EncodedMockup {
            bytes,
            format,
            width: image.width(),
            height: image.height(),
        })
    }

    /// Decode `image_bytes`, re-encode them as `format` (which carries the
    /// quality) and upload the result
    pub async fn publish_image(
        &self,
        image_bytes: Vec<u8>,
        format: OutputFormat,
    ) -> Result<PublishedMockup, MockupError> {
        let encoded = tokio::task::spawn_blocking(move || -> Result<EncodedMockup, MockupError> {
            let image = image::load_from_memory(&image_bytes)?.to_rgba8();
            Ok(Self::encode(format, &image)?)
        })
        .await
        .map_err(|e| MockupError::Worker(e.to_string()))??;

        self.publish(encoded).await
    }

    /// Upload an encoded mockup under a fresh key
    #[instrument(skip(self, encoded), fields(format = encoded.format.extension(), bytes = encoded.bytes.len()))]
    pub async fn publish(&self, encoded: EncodedMockup) -> Result<PublishedMockup, MockupError> {
        let size_bytes = encoded.bytes.len();
        let content_type = encoded.format.content_type();
        let suggested_name = format!("mockup.{}", encoded.format.extension());

        let upload = self.store.upload(encoded.bytes, content_type, &suggested_name);
        let stored = tokio::time::timeout(self.upload_timeout, upload)
            .await
            .map_err(|_| StorageError::Timeout(self.upload_timeout))??;

        debug!(key = %stored.key, "Mockup published");

        Ok(PublishedMockup {
            url: stored.url,
            key: stored.key,
            content_type: content_type.to_string(),
            width: encoded.width,
            height: encoded.height,
            size_bytes,
        })
    }
}
