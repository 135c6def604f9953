//! Persistence codec for scenes, rasters and the project index.
//!
//! Everything is stored as JSON. Rasters are JPEG-encoded and embedded as
//! base64 strings, so a scene file is self-contained.
//!
//! ## Error policy
//!
//! - Encoding failures ([`EncodeError`]) are hard errors.
//! - Structural decode failures ([`DecodeError`]) name the first bad field.
//! - An embedded image that cannot be decoded is dropped (logged at warn
//!   level) without failing the rest of the record.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use collage::format::{decode_scene, encode_scene};
//!
//! let bytes = encode_scene(&scene, 80)?;
//! let restored = decode_scene(&bytes)?;
//! ```

mod error;
pub mod image_codec;
mod index_file;
mod scene_file;

#[cfg(test)]
mod tests;

pub use error::{DecodeError, EncodeError};
pub use index_file::{IndexEntry, decode_index, encode_index};
pub use scene_file::{
    ItemEntry, PayloadEntry, SCENE_VERSION, SceneFile, decode_scene, decode_thumbnail,
    encode_scene,
};
