//! Error types for scene and index persistence.

use thiserror::Error;

/// Errors produced while reading a persisted record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not well-formed JSON
    #[error("JSON error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// A field is missing or has the wrong shape
    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        /// Path of the first invalid field, e.g. `items[2]` or `items[2].id`
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// The record was written by a newer, incompatible version
    #[error("Unsupported version: expected {expected}, found {found}")]
    UnsupportedVersion {
        /// Version this build writes
        expected: String,
        /// Version found in the record
        found: String,
    },
}

impl DecodeError {
    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Path of the offending field, when known.
    pub fn field(&self) -> Option<&str> {
        match self {
            DecodeError::InvalidField { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Errors produced while writing a record.
///
/// Unlike decode failures these are never swallowed: dropping a user's
/// image on save loses data.
#[derive(Error, Debug)]
pub enum EncodeError {
    /// Image has no pixels
    #[error("Cannot encode empty {width}x{height} image")]
    EmptyImage {
        /// Image width
        width: u32,
        /// Image height
        height: u32,
    },

    /// Geometry holds NaN or infinity, which JSON cannot represent
    #[error("Non-finite geometry in '{field}'")]
    NonFinite {
        /// Path of the offending record
        field: String,
    },

    /// The image encoder rejected the pixels
    #[error("Image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
