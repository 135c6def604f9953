//! Error types for the project registry.

use std::path::PathBuf;

use thiserror::Error;

use crate::format::{DecodeError, EncodeError};

/// Errors that can occur while reading or writing project storage.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during file operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The scene or index could not be encoded
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    /// A stored file exists but could not be decoded
    #[error("Corrupt file {path:?}: {source}")]
    Corrupt {
        /// File that failed to decode
        path: PathBuf,
        /// Why decoding failed
        #[source]
        source: DecodeError,
    },
}
