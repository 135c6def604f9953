//! The editable collage document.

use std::collections::HashSet;

use crate::model::{CanvasFormat, Color, ItemId, Point, Raster, SceneItem, Size};

/// Error returned when an item id is already present in a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("item {0} already exists in the scene")]
pub struct DuplicateItem(pub ItemId);

/// Background, items and canvas format of one collage.
///
/// Item order is insertion order and only matters for iteration;
/// drawing order follows `z_index`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    items: Vec<SceneItem>,
    pub background: Color,
    /// Drawn instead of `background` when present.
    pub background_image: Option<Raster>,
    pub format: CanvasFormat,
}

impl Scene {
    /// Empty scene on a white background.
    pub fn new(format: CanvasFormat) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    /// Build a scene from decoded parts, rejecting duplicate item ids.
    pub fn from_parts(
        items: Vec<SceneItem>,
        background: Color,
        background_image: Option<Raster>,
        format: CanvasFormat,
    ) -> Result<Self, DuplicateItem> {
        let mut scene = Self {
            items: Vec::with_capacity(items.len()),
            background,
            background_image,
            format,
        };
        for item in items {
            scene.add_item(item)?;
        }
        Ok(scene)
    }

    pub fn items(&self) -> &[SceneItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Append an item.
    pub fn add_item(&mut self, item: SceneItem) -> Result<ItemId, DuplicateItem> {
        let id = item.id();
        if self.contains(id) {
            return Err(DuplicateItem(id));
        }
        self.items.push(item);
        Ok(id)
    }

    /// Remove an item, returning it. Unknown ids are ignored.
    pub fn remove_item(&mut self, id: ItemId) -> Option<SceneItem> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id() == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&SceneItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut SceneItem> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Items back to front. Equal z-indices keep insertion order.
    pub fn render_order(&self) -> Vec<&SceneItem> {
        let mut ordered: Vec<&SceneItem> = self.items.iter().collect();
        ordered.sort_by(|a, b| a.z_index.total_cmp(&b.z_index));
        ordered
    }

    /// Image of the first photo item in iteration order.
    ///
    /// This is insertion order, not z-order.
    pub fn first_photo_image(&self) -> Option<&Raster> {
        self.items
            .iter()
            .find(|item| item.is_photo())
            .and_then(SceneItem::photo_image)
    }

    /// Move unplaced or out-of-bounds items to the canvas center.
    ///
    /// An item needs placement when it sits exactly at the origin or
    /// outside `[0, width] x [0, height]`. Returns the number of moved items.
    pub fn center_stray_items(&mut self, canvas: Size) -> usize {
        let center = canvas.center();
        let mut moved = 0;
        for item in &mut self.items {
            if item.position == Point::ZERO || !canvas.contains(item.position) {
                item.position = center;
                moved += 1;
            }
        }
        moved
    }

    /// Item ids are unique. Always true for scenes built through this API.
    pub fn has_unique_ids(&self) -> bool {
        let mut seen = HashSet::with_capacity(self.items.len());
        self.items.iter().all(|item| seen.insert(item.id()))
    }

    pub(crate) fn replace_items(&mut self, items: Vec<SceneItem>) {
        self.items = items;
        debug_assert!(self.has_unique_ids());
    }
}
