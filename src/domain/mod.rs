//! Domain types and models

mod color;
mod mockup;
mod placement;

pub use color::{ColorError, ColorSpec, Rgb};
pub use mockup::{
    CompositingRequest, MockupResult, PublishedMockup, SkipReason,
    VariantMockup, VariantMockupRequest,
};
pub use placement::DesignPlacement;
