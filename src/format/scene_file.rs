//! On-disk representation of a scene.
//!
//! A scene file is a single JSON object:
//!
//! ```json
//! {
//!   "version": "1.0",
//!   "items": [
//!     {
//!       "id": "7b0c…", "type": "photo",
//!       "position": { "x": 150.0, "y": 200.0 },
//!       "size": { "width": 300.0, "height": 300.0 },
//!       "rotationDegrees": 0.0, "zIndex": 0.0,
//!       "imageData": "<base64 JPEG>", "borderWidth": 0.0,
//!       "borderColor": { "red": 0.0, "green": 0.0, "blue": 0.0, "opacity": 0.0 },
//!       "hasBackground": true
//!     }
//!   ],
//!   "background": { "red": 1.0, "green": 1.0, "blue": 1.0, "opacity": 1.0 },
//!   "backgroundImageData": "<base64 JPEG, optional>",
//!   "format": "Square"
//! }
//! ```
//!
//! Decoding reads the record field by field so the error names the first
//! field that is malformed. Image fields are best effort and never fail the
//! decode.

use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::format::error::{DecodeError, EncodeError};
use crate::format::image_codec;
use crate::model::{
    Angle, CanvasFormat, Color, ItemId, ItemKind, PhotoStyle, Point, Raster, Scene, SceneItem,
    Size, TextStyle,
};

/// Current scene file format version.
pub const SCENE_VERSION: &str = "1.0";

/// Major version this build can read.
const SCENE_VERSION_MAJOR: u32 = 1;

/// A whole scene as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneFile {
    /// Format version for compatibility checking.
    pub version: String,

    /// Items in iteration order.
    pub items: Vec<ItemEntry>,

    /// Background fill.
    pub background: Color,

    /// Base64 JPEG background image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_data: Option<String>,

    /// Canvas format name.
    pub format: CanvasFormat,
}

/// One stored item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEntry {
    pub id: ItemId,
    pub position: Point,
    pub size: Size,
    pub rotation_degrees: f64,
    pub z_index: f64,
    #[serde(flatten)]
    pub payload: PayloadEntry,
}

/// Type tag plus variant fields, flattened into the item object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PayloadEntry {
    #[serde(rename_all = "camelCase")]
    Photo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        image_data: Option<String>,
        border_width: f64,
        border_color: Color,
        has_background: bool,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        font: String,
        font_size: f64,
        text_color: Color,
    },
}

impl SceneFile {
    /// Build the stored form of `scene`, encoding every raster at `quality`.
    pub fn from_scene(scene: &Scene, quality: u8) -> Result<Self, EncodeError> {
        let items = scene
            .items()
            .iter()
            .enumerate()
            .map(|(index, item)| ItemEntry::from_item(index, item, quality))
            .collect::<Result<Vec<_>, _>>()?;

        check_color("background", &scene.background)?;

        let background_image_data = scene
            .background_image
            .as_ref()
            .map(|raster| image_codec::encode_base64(raster, quality))
            .transpose()?;

        Ok(Self {
            version: SCENE_VERSION.to_string(),
            items,
            background: scene.background,
            background_image_data,
            format: scene.format,
        })
    }

    /// Parse a scene file, naming the first malformed field on failure.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_slice(bytes)?;
        let Value::Object(mut map) = value else {
            return Err(DecodeError::invalid_field("$", "expected an object"));
        };

        let version = match take_optional::<String>(&mut map, "version")? {
            Some(version) => {
                check_version(&version)?;
                version
            }
            None => SCENE_VERSION.to_string(),
        };

        let items = match map.remove("items") {
            Some(Value::Array(values)) => values
                .into_iter()
                .enumerate()
                .map(|(index, value)| parse_field(value, &format!("items[{index}]")))
                .collect::<Result<Vec<ItemEntry>, _>>()?,
            Some(_) => return Err(DecodeError::invalid_field("items", "expected an array")),
            None => return Err(DecodeError::invalid_field("items", "missing field")),
        };

        Ok(Self {
            version,
            items,
            background: take_required(&mut map, "background")?,
            background_image_data: take_optional(&mut map, "backgroundImageData")?,
            format: take_required(&mut map, "format")?,
        })
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_vec(&self) -> Result<Vec<u8>, EncodeError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Convert to an in-memory scene.
    ///
    /// Images that cannot be decoded become `None`; everything else must be
    /// well formed.
    pub fn into_scene(self) -> Result<Scene, DecodeError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        let mut items = Vec::with_capacity(self.items.len());

        for (index, entry) in self.items.into_iter().enumerate() {
            if !seen.insert(entry.id) {
                return Err(DecodeError::invalid_field(
                    format!("items[{index}].id"),
                    format!("duplicate item id {}", entry.id),
                ));
            }
            items.push(entry.into_item(index));
        }

        let background_image = self
            .background_image_data
            .as_deref()
            .and_then(|data| image_codec::decode_base64(data, "backgroundImageData"));

        Scene::from_parts(
            items,
            Color::rgba(
                self.background.red,
                self.background.green,
                self.background.blue,
                self.background.opacity,
            ),
            background_image,
            self.format,
        )
        .map_err(|e| DecodeError::invalid_field("items", e.to_string()))
    }

    /// Encoded image of the first photo item in iteration order.
    pub fn first_photo_image_data(&self) -> Option<&str> {
        self.items.iter().find_map(|entry| match &entry.payload {
            PayloadEntry::Photo { image_data, .. } => Some(image_data.as_deref()),
            PayloadEntry::Text { .. } => None,
        })?
    }
}

impl ItemEntry {
    fn from_item(index: usize, item: &SceneItem, quality: u8) -> Result<Self, EncodeError> {
        check_finite(
            &format!("items[{index}]"),
            &[
                item.position.x,
                item.position.y,
                item.size.width,
                item.size.height,
                item.rotation.degrees(),
                item.z_index,
            ],
        )?;

        let payload = match item.kind() {
            ItemKind::Photo(photo) => {
                check_finite(&format!("items[{index}].borderWidth"), &[photo.border_width])?;
                check_color(&format!("items[{index}].borderColor"), &photo.border_color)?;
                PayloadEntry::Photo {
                    image_data: photo
                        .image
                        .as_ref()
                        .map(|raster| image_codec::encode_base64(raster, quality))
                        .transpose()?,
                    border_width: photo.border_width,
                    border_color: photo.border_color,
                    has_background: photo.has_background,
                }
            }
            ItemKind::Text(text) => {
                check_finite(&format!("items[{index}].fontSize"), &[text.font_size])?;
                check_color(&format!("items[{index}].textColor"), &text.text_color)?;
                PayloadEntry::Text {
                    text: text.text.clone(),
                    font: text.font.clone(),
                    font_size: text.font_size,
                    text_color: text.text_color,
                }
            }
        };

        Ok(Self {
            id: item.id(),
            position: item.position,
            size: item.size,
            rotation_degrees: item.rotation.degrees(),
            z_index: item.z_index,
            payload,
        })
    }

    fn into_item(self, index: usize) -> SceneItem {
        let kind = match self.payload {
            PayloadEntry::Photo {
                image_data,
                border_width,
                border_color,
                has_background,
            } => ItemKind::Photo(PhotoStyle {
                image: image_data.as_deref().and_then(|data| {
                    image_codec::decode_base64(data, &format!("items[{index}].imageData"))
                }),
                border_width,
                border_color: normalized(border_color),
                has_background,
            }),
            PayloadEntry::Text {
                text,
                font,
                font_size,
                text_color,
            } => ItemKind::Text(TextStyle {
                text,
                font,
                font_size,
                text_color: normalized(text_color),
            }),
        };

        let mut item = SceneItem::with_id(self.id, kind, self.size);
        item.position = self.position;
        item.rotation = Angle::from_degrees(self.rotation_degrees);
        item.z_index = self.z_index;
        item
    }
}

/// Encode a scene to bytes.
pub fn encode_scene(scene: &Scene, quality: u8) -> Result<Vec<u8>, EncodeError> {
    SceneFile::from_scene(scene, quality)?.to_vec()
}

/// Decode a scene from bytes.
pub fn decode_scene(bytes: &[u8]) -> Result<Scene, DecodeError> {
    SceneFile::from_slice(bytes)?.into_scene()
}

/// Decode a stored thumbnail candidate (best effort).
pub fn decode_thumbnail(file: &SceneFile) -> Option<Raster> {
    image_codec::decode_base64(file.first_photo_image_data()?, "thumbnail")
}

fn check_version(version: &str) -> Result<(), DecodeError> {
    let major = version
        .split('.')
        .next()
        .and_then(|major| major.parse::<u32>().ok());

    match major {
        Some(major) if major <= SCENE_VERSION_MAJOR => Ok(()),
        Some(_) => Err(DecodeError::UnsupportedVersion {
            expected: SCENE_VERSION.to_string(),
            found: version.to_string(),
        }),
        None => Err(DecodeError::invalid_field(
            "version",
            format!("malformed version '{version}'"),
        )),
    }
}

fn check_finite(field: &str, values: &[f64]) -> Result<(), EncodeError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(EncodeError::NonFinite {
            field: field.to_string(),
        })
    }
}

fn check_color(field: &str, color: &Color) -> Result<(), EncodeError> {
    check_finite(field, &[color.red, color.green, color.blue, color.opacity])
}

fn normalized(color: Color) -> Color {
    Color::rgba(color.red, color.green, color.blue, color.opacity)
}

pub(crate) fn parse_field<T: DeserializeOwned>(value: Value, field: &str) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|e| DecodeError::invalid_field(field, e.to_string()))
}

fn take_required<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &str,
) -> Result<T, DecodeError> {
    let value = map
        .remove(field)
        .ok_or_else(|| DecodeError::invalid_field(field, "missing field"))?;
    parse_field(value, field)
}

fn take_optional<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &str,
) -> Result<Option<T>, DecodeError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => parse_field(value, field).map(Some),
    }
}
