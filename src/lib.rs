//! Tee Mockup
//!
//! T-shirt mockup generation for print-on-demand products: tints a base
//! garment template to the variant's color, composites the customer design
//! onto it and publishes the result to object storage.

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod storage;

use std::sync::Arc;

use crate::config::Settings;
use crate::engine::MockupGenerator;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Settings,
    pub generator: Arc<MockupGenerator>,
}
