//! Configuration module for the mockup service

use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};
use std::path::PathBuf;

use crate::engine::{BlendMode, EncodeError, OutputFormat};

/// Main application settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub template: TemplateSettings,
    pub mockup: MockupSettings,
    pub storage: StorageSettings,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: None,
        }
    }
}

/// Base garment template configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Path to the plain (white) t-shirt PNG every mockup starts from
    pub path: PathBuf,
    /// Load the template at startup instead of on the first mockup request
    pub preload: bool,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        TemplateSettings {
            path: PathBuf::from("assets/templates/base-tshirt.png"),
            preload: true,
        }
    }
}

/// Default opacity of the solid color layer laid over the garment.
///
/// Empirical value: 30% multiply colors a white shirt while keeping the
/// fabric shading visible.
pub const DEFAULT_TINT_OPACITY: f32 = 0.30;

/// Default bounding box (px) the design is fitted into
pub const DEFAULT_DESIGN_BOX: u32 = 300;

/// Default design position on the reference template (chest area)
pub const DEFAULT_DESIGN_LEFT: i64 = 250;
pub const DEFAULT_DESIGN_TOP: i64 = 150;

/// Default cap on downloaded design size (20 MiB)
pub const DEFAULT_MAX_DESIGN_BYTES: u64 = 20 * 1024 * 1024;

/// Geometry, blending and output tuning for the mockup pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockupSettings {
    pub design_box_width: u32,
    pub design_box_height: u32,
    /// Offset of the design's top-left corner from the garment's left edge
    pub design_left: i64,
    /// Offset of the design's top-left corner from the garment's top edge
    pub design_top: i64,
    pub tint_opacity: f32,
    pub tint_blend_mode: BlendMode,
    pub design_blend_mode: BlendMode,
    /// webp, png or jpeg
    pub output_format: String,
    /// Encoder quality (0-100); the format default is used when absent
    pub output_quality: Option<u8>,
    /// Upper bound on variants processed at the same time
    pub max_concurrency: usize,
    pub download_timeout_secs: u64,
    pub upload_timeout_secs: u64,
    /// Largest design body accepted from a design URL
    pub max_design_bytes: u64,
}

impl Default for MockupSettings {
    fn default() -> Self {
        MockupSettings {
            design_box_width: DEFAULT_DESIGN_BOX,
            design_box_height: DEFAULT_DESIGN_BOX,
            design_left: DEFAULT_DESIGN_LEFT,
            design_top: DEFAULT_DESIGN_TOP,
            tint_opacity: DEFAULT_TINT_OPACITY,
            tint_blend_mode: BlendMode::Multiply,
            design_blend_mode: BlendMode::Normal,
            output_format: "webp".to_string(),
            output_quality: Some(85),
            max_concurrency: 4,
            download_timeout_secs: 15,
            upload_timeout_secs: 30,
            max_design_bytes: DEFAULT_MAX_DESIGN_BYTES,
        }
    }
}

impl MockupSettings {
    /// Resolve the configured output format
    pub fn output_format(&self) -> Result<OutputFormat, EncodeError> {
        OutputFormat::from_str(&self.output_format, self.output_quality)
    }

    /// Reject geometry and tint values the pipeline cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.design_box_width == 0 || self.design_box_height == 0 {
            return Err(ConfigError::Message(format!(
                "mockup design box must be at least 1x1, got {}x{}",
                self.design_box_width, self.design_box_height
            )));
        }
        if !(0.0..=1.0).contains(&self.tint_opacity) {
            return Err(ConfigError::Message(format!(
                "mockup.tint_opacity must be within [0, 1], got {}",
                self.tint_opacity
            )));
        }
        Ok(())
    }
}

/// Object storage configuration (any S3-compatible endpoint)
///
/// An empty bucket name selects the in-process store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for R2 / MinIO; path-style addressing is used when set
    pub endpoint: Option<String>,
    /// Static credentials; the default AWS credential chain is used when absent
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Public base URL for uploaded objects (CDN or custom domain)
    pub public_url_prefix: Option<String>,
    /// Send `x-amz-acl: public-read` with every upload
    pub public_read: bool,
    /// Prefix for generated object keys
    pub key_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            bucket: String::new(),
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            public_url_prefix: None,
            public_read: false,
            key_prefix: "mockups".to_string(),
        }
    }
}

impl StorageSettings {
    pub fn is_configured(&self) -> bool {
        !self.bucket.trim().is_empty()
    }
}

impl Settings {
    /// Load configuration from files and environment variables
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables (prefixed with MOCKUP_)
    /// 2. config/local.toml (gitignored)
    /// 3. config/default.toml
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir = std::env::var("CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"));

        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // MOCKUP_SERVER__PORT, MOCKUP_STORAGE__BUCKET, ...
            .add_source(
                Environment::with_prefix("MOCKUP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.mockup.validate()?;

        Ok(settings)
    }
}
