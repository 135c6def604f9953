//! Unit tests for the scene codec.
//!
//! These tests verify structural decode errors, best-effort image decoding
//! and save/load round trips.

mod scene_file_tests;

use image::RgbaImage;

use crate::model::Raster;

/// A raster with enough detail that JPEG has something to compress.
pub(super) fn test_raster(width: u32, height: u32) -> Raster {
    Raster::new(RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }))
}
