//! Garment color codes
//!
//! Colors arrive from the color catalog as `#RGB` or `#RRGGBB` strings. The
//! leading `#` is optional and digits are case-insensitive; the canonical
//! form is uppercase `#RRGGBB`.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Color parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("Invalid hex color {0:?}: expected #RGB or #RRGGBB")]
    InvalidColor(String),
}

/// An sRGB triple, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

/// A validated, normalized garment color
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorSpec {
    hex: String,
    rgb: [u8; 3],
}

impl ColorSpec {
    /// Parse a 3- or 6-digit hex code, with or without a leading `#`
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let digits = input.strip_prefix('#').unwrap_or(input);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidColor(input.to_string()));
        }

        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(ColorError::InvalidColor(input.to_string())),
        };
        let expanded = expanded.to_ascii_uppercase();

        let mut rgb = [0u8; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            *channel = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16)
                .map_err(|_| ColorError::InvalidColor(input.to_string()))?;
        }

        Ok(ColorSpec {
            hex: format!("#{}", expanded),
            rgb,
        })
    }

    /// Canonical `#RRGGBB` form
    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> Rgb {
        Rgb::new(self.rgb[0], self.rgb[1], self.rgb[2])
    }
}

impl FromStr for ColorSpec {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorSpec::parse(s)
    }
}

impl fmt::Display for ColorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex)
    }
}
