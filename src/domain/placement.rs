//! Design placement on the garment template
//!
//! The design is fitted into a fixed box and its top-left corner is pinned at
//! a fixed offset. Both are product-design constants tuned for the reference
//! template's chest area, not derived from image content.

use crate::config::{MockupSettings, DEFAULT_DESIGN_BOX, DEFAULT_DESIGN_LEFT, DEFAULT_DESIGN_TOP};

/// Where and how large the design is drawn on the garment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesignPlacement {
    /// Bounding box the design must fit inside
    pub box_width: u32,
    pub box_height: u32,
    /// Top-left corner of the design, relative to the garment
    pub left: i64,
    pub top: i64,
}

impl DesignPlacement {
    pub fn new(box_width: u32, box_height: u32, left: i64, top: i64) -> Self {
        DesignPlacement {
            box_width,
            box_height,
            left,
            top,
        }
    }

    /// Dimensions of a `width`x`height` design after fitting it into the box.
    ///
    /// Aspect ratio is preserved and designs already inside the box are never
    /// enlarged.
    pub fn fit_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }
        if width <= self.box_width && height <= self.box_height {
            return (width, height);
        }

        let scale = f64::min(
            self.box_width as f64 / width as f64,
            self.box_height as f64 / height as f64,
        );

        let fitted_width = ((width as f64 * scale).round() as u32).clamp(1, self.box_width.max(1));
        let fitted_height = ((height as f64 * scale).round() as u32).clamp(1, self.box_height.max(1));

        (fitted_width, fitted_height)
    }
}

impl Default for DesignPlacement {
    fn default() -> Self {
        DesignPlacement::new(DEFAULT_DESIGN_BOX, DEFAULT_DESIGN_BOX, DEFAULT_DESIGN_LEFT, DEFAULT_DESIGN_TOP)
    }
}

impl From<&MockupSettings> for DesignPlacement {
    fn from(settings: &MockupSettings) -> Self {
        DesignPlacement::new(
            settings.design_box_width,
            settings.design_box_height,
            settings.design_left,
            settings.design_top,
        )
    }
}
