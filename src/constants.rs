//! Global constants for the collage editor

/// Fraction of the viewport a fitted canvas may occupy in each dimension
pub const VIEWPORT_FILL: f64 = 0.8;

/// Default side length of a newly added photo item
pub const DEFAULT_PHOTO_SIDE: f64 = 300.0;

/// Default side length of a newly added text item
pub const DEFAULT_TEXT_SIDE: f64 = 200.0;

/// Placeholder string for a newly added text item
pub const DEFAULT_TEXT: &str = "Double tap to edit";

/// Font used for a newly added text item
pub const DEFAULT_FONT: &str = "Helvetica";

/// Font size (points) for a newly added text item
pub const DEFAULT_FONT_SIZE: f64 = 24.0;

/// JPEG quality used for rasters at rest (0.8 on a 0-1 scale)
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Viewport used when no device size is known (points)
pub const DEFAULT_VIEWPORT: (f64, f64) = (390.0, 844.0);

/// File name of the project index inside the projects directory
pub const INDEX_FILENAME: &str = "projects.json";

/// Extension of per-project scene files
pub const SCENE_EXTENSION: &str = "json";

/// Name used for projects created without an explicit name
pub const DEFAULT_PROJECT_NAME: &str = "New Project";
