//! Straight-alpha sRGB color stored as four normalized channels.

use serde::{Deserialize, Serialize};

/// A color with red, green, blue and opacity channels in `[0, 1]`.
///
/// Channels are kept as independent floats rather than a packed integer so
/// a persisted color reads back exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub opacity: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgba_unchecked(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba_unchecked(1.0, 1.0, 1.0, 1.0);
    pub const CLEAR: Color = Color::rgba_unchecked(0.0, 0.0, 0.0, 0.0);

    const fn rgba_unchecked(red: f64, green: f64, blue: f64, opacity: f64) -> Self {
        Self {
            red,
            green,
            blue,
            opacity,
        }
    }

    /// Create a color, clamping every channel into `[0, 1]`.
    /// NaN channels become 0.
    pub fn rgba(red: f64, green: f64, blue: f64, opacity: f64) -> Self {
        Self {
            red: clamp_unit(red),
            green: clamp_unit(green),
            blue: clamp_unit(blue),
            opacity: clamp_unit(opacity),
        }
    }

    /// Create an opaque color.
    pub fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Convert to 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.opacity].map(|c| (c * 255.0).round() as u8)
    }

    /// Whether every channel lies in `[0, 1]`.
    pub fn is_normalized(&self) -> bool {
        [self.red, self.green, self.blue, self.opacity]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
