//! Mockup requests and results

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One pipeline execution: a design applied to a garment color
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CompositingRequest {
    /// Public URL of the already-uploaded design image
    pub design_url: String,
    /// Garment color as `#RGB` or `#RRGGBB`
    pub color_hex: String,
}

impl CompositingRequest {
    pub fn new(design_url: impl Into<String>, color_hex: impl Into<String>) -> Self {
        CompositingRequest {
            design_url: design_url.into(),
            color_hex: color_hex.into(),
        }
    }

    /// A mockup needs both a design and a color
    pub fn is_complete(&self) -> bool {
        !self.design_url.trim().is_empty() && !self.color_hex.trim().is_empty()
    }
}

/// A mockup that was encoded and uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PublishedMockup {
    /// Public URL of the stored mockup
    pub url: String,
    /// Object storage key
    pub key: String,
    pub content_type: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: usize,
}

/// Pipeline stage that stopped a mockup from being produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Design URL or color missing from the request
    MissingInput,
    /// Base garment template could not be loaded
    TemplateMissing,
    /// Design image could not be fetched
    DownloadFailed,
    /// Design bytes are not a decodable image
    DecodeFailed,
    /// Composite could not be encoded to the output format
    EncodeFailed,
    /// Object storage rejected or timed out the upload
    PublishFailed,
    /// The image worker task died
    Internal,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::MissingInput => "missing_input",
            SkipReason::TemplateMissing => "template_missing",
            SkipReason::DownloadFailed => "download_failed",
            SkipReason::DecodeFailed => "decode_failed",
            SkipReason::EncodeFailed => "encode_failed",
            SkipReason::PublishFailed => "publish_failed",
            SkipReason::Internal => "internal",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a mockup generation.
///
/// Either both URL and key exist or neither does; callers persist the
/// variant either way.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockupResult {
    Generated(PublishedMockup),
    Skipped(SkipReason),
}

impl MockupResult {
    pub fn url(&self) -> Option<&str> {
        match self {
            MockupResult::Generated(mockup) => Some(&mockup.url),
            MockupResult::Skipped(_) => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        match self {
            MockupResult::Generated(mockup) => Some(&mockup.key),
            MockupResult::Skipped(_) => None,
        }
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, MockupResult::Generated(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            MockupResult::Generated(_) => None,
            MockupResult::Skipped(reason) => Some(*reason),
        }
    }

    pub fn published(&self) -> Option<&PublishedMockup> {
        match self {
            MockupResult::Generated(mockup) => Some(mockup),
            MockupResult::Skipped(_) => None,
        }
    }
}

/// A product variant that needs a mockup
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct VariantMockupRequest {
    /// Caller-side identifier, echoed back in the result
    pub variant_id: String,
    pub color_hex: String,
}

/// Mockup outcome for one variant
#[derive(Debug, Clone)]
pub struct VariantMockup {
    pub variant_id: String,
    pub mockup: MockupResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published() -> PublishedMockup {
        PublishedMockup {
            url: "https://cdn.example.com/mockups/a.webp".to_string(),
            key: "mockups/a.webp".to_string(),
            content_type: "image/webp".to_string(),
            width: 800,
            height: 900,
            size_bytes: 1234,
        }
    }

    #[test]
    fn test_generated_exposes_url_and_key() {
        let result = MockupResult::Generated(published());
        assert_eq!(result.url(), Some("https://cdn.example.com/mockups/a.webp"));
        assert_eq!(result.key(), Some("mockups/a.webp"));
        assert!(result.is_generated());
        assert_eq!(result.skip_reason(), None);
    }

    #[test]
    fn test_skipped_has_neither_url_nor_key() {
        let result = MockupResult::Skipped(SkipReason::DownloadFailed);
        assert_eq!(result.url(), None);
        assert_eq!(result.key(), None);
        assert!(result.published().is_none());
        assert_eq!(result.skip_reason(), Some(SkipReason::DownloadFailed));
    }

    #[test]
    fn test_request_completeness() {
        assert!(CompositingRequest::new("https://x/d.png", "#FFF").is_complete());
        assert!(!CompositingRequest::new("", "#FFF").is_complete());
        assert!(!CompositingRequest::new("https://x/d.png", "  ").is_complete());
    }

    #[test]
    fn test_skip_reason_serializes_snake_case() {
        let json = serde_json::to_string(&SkipReason::TemplateMissing).unwrap();
        assert_eq!(json, "\"template_missing\"");
        assert_eq!(SkipReason::PublishFailed.to_string(), "publish_failed");
    }
}
