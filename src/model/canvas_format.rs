//! Canvas aspect-ratio presets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::VIEWPORT_FILL;
use crate::model::Size;

/// Aspect-ratio preset that sizes the editable canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CanvasFormat {
    /// 1:1
    #[default]
    Square,
    /// 3:4
    Portrait,
    /// 16:9
    Landscape,
    /// 9:16
    Story,
}

impl CanvasFormat {
    /// All formats in picker order.
    pub const ALL: [CanvasFormat; 4] = [
        CanvasFormat::Square,
        CanvasFormat::Portrait,
        CanvasFormat::Landscape,
        CanvasFormat::Story,
    ];

    /// Display and persisted name.
    pub fn name(&self) -> &'static str {
        match self {
            CanvasFormat::Square => "Square",
            CanvasFormat::Portrait => "Portrait",
            CanvasFormat::Landscape => "Landscape",
            CanvasFormat::Story => "Story",
        }
    }

    /// Width divided by height.
    pub fn aspect_ratio(&self) -> f64 {
        match self {
            CanvasFormat::Square => 1.0,
            CanvasFormat::Portrait => 3.0 / 4.0,
            CanvasFormat::Landscape => 16.0 / 9.0,
            CanvasFormat::Story => 9.0 / 16.0,
        }
    }

    /// Largest canvas with this aspect ratio that fits inside 80% of the
    /// viewport in both dimensions.
    ///
    /// Tall formats constrain on height first, wide and square formats on
    /// width first. Keep that order: swapping it changes rounding for the
    /// formats that hit both limits.
    pub fn fitted_size(&self, viewport_width: f64, viewport_height: f64) -> Size {
        let max_width = viewport_width.max(0.0) * VIEWPORT_FILL;
        let max_height = viewport_height.max(0.0) * VIEWPORT_FILL;
        let ratio = self.aspect_ratio();

        if ratio < 1.0 {
            let height = max_height.min(max_width / ratio);
            Size::new(height * ratio, height)
        } else {
            let width = max_width.min(max_height * ratio);
            Size::new(width, width / ratio)
        }
    }
}

impl fmt::Display for CanvasFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown canvas format '{0}' (expected one of: Square, Portrait, Landscape, Story)")]
pub struct UnknownFormat(pub String);

impl FromStr for CanvasFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanvasFormat::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_fitted_size_preserves_ratio_and_bounds() {
        let viewports = [(390.0, 844.0), (1024.0, 768.0), (500.0, 500.0), (1.0, 3000.0)];

        for format in CanvasFormat::ALL {
            for (vw, vh) in viewports {
                let size = format.fitted_size(vw, vh);
                assert!(
                    (size.width / size.height - format.aspect_ratio()).abs() < EPSILON,
                    "{format} in {vw}x{vh} gave {size:?}"
                );
                assert!(size.width <= vw * VIEWPORT_FILL + EPSILON);
                assert!(size.height <= vh * VIEWPORT_FILL + EPSILON);
            }
        }
    }

    #[test]
    fn test_fitted_size_touches_one_bound() {
        let size = CanvasFormat::Square.fitted_size(400.0, 1000.0);
        assert!((size.width - 320.0).abs() < EPSILON);
        assert!((size.height - 320.0).abs() < EPSILON);

        let size = CanvasFormat::Story.fitted_size(1000.0, 400.0);
        assert!((size.height - 320.0).abs() < EPSILON);
        assert!((size.width - 180.0).abs() < EPSILON);

        let size = CanvasFormat::Landscape.fitted_size(1600.0, 1600.0);
        assert!((size.width - 1280.0).abs() < EPSILON);
        assert!((size.height - 720.0).abs() < EPSILON);
    }

    #[test]
    fn test_fitted_size_zero_viewport() {
        for format in CanvasFormat::ALL {
            let size = format.fitted_size(0.0, 0.0);
            assert_eq!(size, Size::ZERO);
        }
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Story".parse::<CanvasFormat>(), Ok(CanvasFormat::Story));
        assert_eq!("landscape".parse::<CanvasFormat>(), Ok(CanvasFormat::Landscape));
        assert!("Panorama".parse::<CanvasFormat>().is_err());
        assert_eq!(CanvasFormat::Portrait.to_string(), "Portrait");
    }
}
