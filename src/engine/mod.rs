//! Mockup generation engine
//!
//! This module contains the core mockup generation logic including:
//! - Base template loading and caching
//! - Design decoding (raster and SVG)
//! - Garment tinting and design compositing
//! - Output encoding and publishing
//! - Orchestration of the full pipeline

mod blend;
mod compositor;
mod design;
mod encoder;
mod error;
mod orchestrator;
mod publisher;
mod source;
mod template;
mod tint;

pub use blend::{blend_atop, blend_over, BlendMode};
pub use compositor::Compositor;
pub use design::{decode_design, is_svg, rasterize_svg};
pub use encoder::{encode_png, EncodeError, OutputFormat};
pub use error::MockupError;
pub use orchestrator::MockupGenerator;
pub use publisher::{EncodedMockup, Publisher};
pub use source::{validate_url, HttpImageSource, ImageSource};
pub use template::{BaseTemplate, TemplateError};
pub use tint::{tint, tint_color, tint_image, TintSettings};
