//! Placeable collage elements.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    DEFAULT_FONT, DEFAULT_FONT_SIZE, DEFAULT_PHOTO_SIDE, DEFAULT_TEXT, DEFAULT_TEXT_SIDE,
};
use crate::model::{Angle, Color, Point, Raster, Size};

/// Unique identifier for a scene item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ItemId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Style and content of a photo item.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoStyle {
    /// The photo. `None` only when persisted pixel data could not be decoded.
    pub image: Option<Raster>,
    pub border_width: f64,
    pub border_color: Color,
    /// Draw the photo's own backdrop behind transparent regions.
    pub has_background: bool,
}

/// Style and content of a text item.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub text: String,
    pub font: String,
    pub font_size: f64,
    pub text_color: Color,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: DEFAULT_TEXT.to_string(),
            font: DEFAULT_FONT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            text_color: Color::BLACK,
        }
    }
}

/// Variant-specific payload of a scene item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Photo(PhotoStyle),
    Text(TextStyle),
}

impl ItemKind {
    /// Persisted type tag.
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Photo(_) => "photo",
            ItemKind::Text(_) => "text",
        }
    }
}

/// One photo or text element placed on the canvas.
///
/// Geometry is always defined. A new item sits at the origin, which callers
/// treat as "not placed yet" and replace with the canvas center.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneItem {
    id: ItemId,
    /// Center of the item on the canvas.
    pub position: Point,
    pub size: Size,
    pub rotation: Angle,
    /// Stacking order; higher values are drawn on top.
    pub z_index: f64,
    pub kind: ItemKind,
}

impl SceneItem {
    /// Create an item with a fresh id and default geometry.
    pub fn new(kind: ItemKind, size: Size) -> Self {
        Self::with_id(ItemId::new(), kind, size)
    }

    /// Create an item with a known id (used when decoding).
    pub fn with_id(id: ItemId, kind: ItemKind, size: Size) -> Self {
        Self {
            id,
            position: Point::ZERO,
            size,
            rotation: Angle::ZERO,
            z_index: 0.0,
            kind,
        }
    }

    /// A 300x300 photo with no border and the backdrop enabled.
    pub fn new_photo(image: Raster) -> Self {
        Self::new(
            ItemKind::Photo(PhotoStyle {
                image: Some(image),
                border_width: 0.0,
                border_color: Color::CLEAR,
                has_background: true,
            }),
            Size::new(DEFAULT_PHOTO_SIDE, DEFAULT_PHOTO_SIDE),
        )
    }

    /// A placeholder text item in 24pt black Helvetica.
    pub fn new_text() -> Self {
        Self::new(
            ItemKind::Text(TextStyle::default()),
            Size::new(DEFAULT_TEXT_SIDE, DEFAULT_TEXT_SIDE),
        )
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ItemKind {
        &mut self.kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_photo(&self) -> bool {
        matches!(self.kind, ItemKind::Photo(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ItemKind::Text(_))
    }

    /// The photo raster, if this is a photo item that has one.
    pub fn photo_image(&self) -> Option<&Raster> {
        match &self.kind {
            ItemKind::Photo(photo) => photo.image.as_ref(),
            ItemKind::Text(_) => None,
        }
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn set_rotation(&mut self, rotation: Angle) {
        self.rotation = rotation;
    }

    pub fn set_z_index(&mut self, z_index: f64) {
        self.z_index = z_index;
    }

    /// Multiply the size by `factor`.
    ///
    /// Pinch gestures report a cumulative scale; callers pass the ratio
    /// between consecutive readings so repeated calls compose exactly.
    pub fn scale_by(&mut self, factor: f64) {
        self.size = self.size.scaled(factor);
    }

    /// Axis-aligned hit test around the item center. Rotation is ignored.
    pub fn contains_point(&self, point: Point) -> bool {
        let half_w = self.size.width.abs() / 2.0;
        let half_h = self.size.height.abs() / 2.0;
        (point.x - self.position.x).abs() <= half_w && (point.y - self.position.y).abs() <= half_h
    }
}
