//! Mockup pipeline errors

use thiserror::Error;

use crate::domain::SkipReason;
use crate::storage::StorageError;

use super::encoder::EncodeError;
use super::template::TemplateError;

/// Errors raised by the individual pipeline stages.
///
/// None of these reach the product-creation caller: the orchestrator turns
/// each one into an empty [`crate::domain::MockupResult`].
#[derive(Debug, Error)]
pub enum MockupError {
    #[error("Base template missing: {0}")]
    TemplateMissing(#[from] TemplateError),

    #[error("Download failed for {url}: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("Failed to decode image: {0}")]
    DecodeFailed(#[from] image::ImageError),

    #[error("Failed to rasterize SVG design: {0}")]
    SvgDecodeFailed(String),

    #[error("Failed to encode mockup: {0}")]
    EncodeFailed(#[from] EncodeError),

    #[error("Failed to publish mockup: {0}")]
    PublishFailed(#[from] StorageError),

    #[error("Image worker failed: {0}")]
    Worker(String),
}

impl MockupError {
    pub fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        MockupError::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    /// The stage this error aborted
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            MockupError::TemplateMissing(_) => SkipReason::TemplateMissing,
            MockupError::DownloadFailed { .. } => SkipReason::DownloadFailed,
            MockupError::DecodeFailed(_) | MockupError::SvgDecodeFailed(_) => SkipReason::DecodeFailed,
            MockupError::EncodeFailed(_) => SkipReason::EncodeFailed,
            MockupError::PublishFailed(_) => SkipReason::PublishFailed,
            MockupError::Worker(_) => SkipReason::Internal,
        }
    }
}
