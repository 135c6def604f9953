//! Lossy at-rest encoding for rasters.
//!
//! Rasters are stored as JPEG. JPEG has no alpha channel, so opacity is
//! dropped on the way out; a decoded raster is always fully opaque.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder};

use crate::format::error::EncodeError;
use crate::model::Raster;

/// Encode a raster as JPEG at `quality` (1-100, clamped).
pub fn encode_jpeg(raster: &Raster, quality: u8) -> Result<Vec<u8>, EncodeError> {
    if raster.is_empty() {
        return Err(EncodeError::EmptyImage {
            width: raster.width(),
            height: raster.height(),
        });
    }

    let rgb = DynamicImage::ImageRgba8(raster.pixels().clone()).into_rgb8();
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100)).write_image(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    )?;

    log::trace!(
        "Encoded {}x{} raster to {} JPEG bytes (q={})",
        raster.width(),
        raster.height(),
        bytes.len(),
        quality
    );
    Ok(bytes)
}

/// Decode any image format the `image` crate recognises.
pub fn decode_image(bytes: &[u8]) -> Result<Raster, image::ImageError> {
    Ok(Raster::from(image::load_from_memory(bytes)?))
}

/// Encode a raster and wrap it as base64 text for embedding in JSON.
pub fn encode_base64(raster: &Raster, quality: u8) -> Result<String, EncodeError> {
    Ok(STANDARD.encode(encode_jpeg(raster, quality)?))
}

/// Decode base64 text back into a raster.
///
/// Best effort: undecodable text or pixels yield `None` and a warning,
/// naming `field` so the log says which image was lost.
pub fn decode_base64(text: &str, field: &str) -> Option<Raster> {
    let bytes = match STANDARD.decode(text) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Dropping image at '{}': invalid base64: {}", field, e);
            return None;
        }
    };

    match decode_image(&bytes) {
        Ok(raster) => Some(raster),
        Err(e) => {
            log::warn!("Dropping image at '{}': {}", field, e);
            None
        }
    }
}

/// The raster as it will look after one save/load cycle.
pub fn reencode(raster: &Raster, quality: u8) -> Result<Raster, EncodeError> {
    let bytes = encode_jpeg(raster, quality)?;
    Ok(decode_image(&bytes)?)
}
