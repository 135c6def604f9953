//! Editing session for one project.
//!
//! The session owns the in-memory scene, its history, the canvas size and
//! gesture tracking, and borrows the registry exclusively so saves cannot
//! race another writer.
//!
//! Mutations come in two flavours:
//! - *live* updates ([`EditorSession::update_item_live`], drag/pinch/rotate
//!   events) change the scene without touching history or disk;
//! - *commits* ([`EditorSession::commit`], and every discrete action such as
//!   adding or removing an item) record a history checkpoint and save.
//!
//! The checkpoint recorded by a commit is the scene as of the previous
//! commit, so undo always returns to the state before the last discrete
//! action, however many live updates it took.

use crate::editor::gesture::{GestureEvent, GestureState};
use crate::model::{
    CanvasFormat, Color, DuplicateItem, ItemId, Point, ProjectId, Raster, Scene, SceneItem, Size,
};
use crate::store::{ProjectRegistry, StoreError};
use crate::undo::{History, UndoConfig};

/// An open project in the editor.
#[derive(Debug)]
pub struct EditorSession<'a> {
    registry: &'a mut ProjectRegistry,
    project_id: ProjectId,
    scene: Scene,
    /// Scene as of the last commit, undo or redo.
    committed: Scene,
    history: History,
    viewport: Size,
    canvas: Size,
    selected: Option<ItemId>,
    gesture: GestureState,
}

impl<'a> EditorSession<'a> {
    /// Open `project_id` for editing inside a viewport of the given size.
    ///
    /// A project that was never saved (or whose scene cannot be read) starts
    /// from an empty square scene. An unreadable scene file is first copied
    /// aside with [`ProjectRegistry::backup_scene`], since the next commit
    /// overwrites it. Items saved at the origin or outside the canvas are
    /// moved to its center.
    pub fn open(
        registry: &'a mut ProjectRegistry,
        project_id: ProjectId,
        viewport: Size,
        undo_config: UndoConfig,
    ) -> Self {
        let mut scene = match registry.try_load_scene(project_id) {
            Ok(scene) => scene.unwrap_or_default(),
            Err(e) => {
                log::error!("Scene for project {} is unreadable: {}", project_id, e);
                if let Err(e) = registry.backup_scene(project_id) {
                    log::warn!("Could not back up scene for project {}: {}", project_id, e);
                }
                Scene::default()
            }
        };
        let canvas = scene.format.fitted_size(viewport.width, viewport.height);
        let moved = scene.center_stray_items(canvas);

        log::debug!(
            "Opened project {} ({} items, {} re-centered) on {:.0}x{:.0} canvas",
            project_id,
            scene.len(),
            moved,
            canvas.width,
            canvas.height
        );

        Self {
            registry,
            project_id,
            committed: scene.clone(),
            scene,
            history: History::with_config(undo_config),
            viewport,
            canvas,
            selected: None,
            gesture: GestureState::default(),
        }
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Items in drawing order.
    pub fn render_order(&self) -> Vec<&SceneItem> {
        self.scene.render_order()
    }

    /// Topmost item under `point`, ignoring rotation.
    pub fn item_at(&self, point: Point) -> Option<ItemId> {
        self.scene
            .render_order()
            .into_iter()
            .rev()
            .find(|item| item.contains_point(point))
            .map(SceneItem::id)
    }

    /// The registry this session writes through.
    pub fn registry(&self) -> &ProjectRegistry {
        self.registry
    }

    /// Select an item, or clear the selection. Unknown ids clear it.
    pub fn select(&mut self, id: Option<ItemId>) {
        self.selected = id.filter(|id| self.scene.contains(*id));
    }

    // ------------------------------------------------------------------
    // Discrete actions (each commits)
    // ------------------------------------------------------------------

    /// Add a photo at the canvas center and select it.
    pub fn add_photo(&mut self, image: Raster) -> Result<ItemId, StoreError> {
        self.add_centered(SceneItem::new_photo(image))
    }

    /// Add a placeholder text item at the canvas center and select it.
    pub fn add_text(&mut self) -> Result<ItemId, StoreError> {
        self.add_centered(SceneItem::new_text())
    }

    fn add_centered(&mut self, mut item: SceneItem) -> Result<ItemId, StoreError> {
        item.set_position(self.canvas.center());
        let id = match self.scene.add_item(item) {
            Ok(id) => id,
            Err(DuplicateItem(id)) => {
                log::warn!("Item {} is already in the scene", id);
                return Ok(id);
            }
        };
        self.selected = Some(id);
        log::debug!("➕ Added item {}", id);
        self.commit()?;
        Ok(id)
    }

    /// Remove an item. Returns false for unknown ids.
    pub fn remove_item(&mut self, id: ItemId) -> Result<bool, StoreError> {
        if self.scene.remove_item(id).is_none() {
            return Ok(false);
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::debug!("🗑️ Removed item {}", id);
        self.commit()?;
        Ok(true)
    }

    /// Apply `edit` to an item and commit. Returns false for unknown ids.
    pub fn update_item(
        &mut self,
        id: ItemId,
        edit: impl FnOnce(&mut SceneItem),
    ) -> Result<bool, StoreError> {
        if !self.update_item_live(id, edit) {
            return Ok(false);
        }
        self.commit()?;
        Ok(true)
    }

    /// Apply `edit` to an item without recording history or saving.
    pub fn update_item_live(&mut self, id: ItemId, edit: impl FnOnce(&mut SceneItem)) -> bool {
        match self.scene.item_mut(id) {
            Some(item) => {
                edit(item);
                true
            }
            None => false,
        }
    }

    pub fn set_background_color(&mut self, color: Color) -> Result<(), StoreError> {
        self.scene.background = color;
        self.commit()
    }

    /// Set or clear the background image. An image hides the color.
    pub fn set_background_image(&mut self, image: Option<Raster>) -> Result<(), StoreError> {
        self.scene.background_image = image;
        self.commit()
    }

    /// Switch canvas format. Not undoable; saved immediately.
    pub fn set_format(&mut self, format: CanvasFormat) -> Result<(), StoreError> {
        self.scene.format = format;
        self.committed.format = format;
        self.canvas = format.fitted_size(self.viewport.width, self.viewport.height);
        log::debug!(
            "Canvas format {} -> {:.0}x{:.0}",
            format,
            self.canvas.width,
            self.canvas.height
        );
        self.save()
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Apply one gesture event. Only [`GestureEvent::End`] commits.
    pub fn handle_gesture(&mut self, event: GestureEvent) -> Result<(), StoreError> {
        match event {
            GestureEvent::Tap(target) => {
                self.selected = match target {
                    Some(id) if self.selected == Some(id) => None,
                    other => other.filter(|id| self.scene.contains(*id)),
                };
            }
            GestureEvent::Drag { item, location } => {
                if location.x.is_finite()
                    && location.y.is_finite()
                    && self.update_item_live(item, |i| i.set_position(location))
                {
                    self.selected = Some(item);
                }
            }
            GestureEvent::Pinch { scale } => {
                if let Some(id) = self.selected {
                    if let Some(step) = self.gesture.pinch_step(scale) {
                        self.update_item_live(id, |item| item.scale_by(step));
                    }
                }
            }
            GestureEvent::Rotate { angle } => {
                if let Some(id) = self.selected {
                    if !angle.degrees().is_finite() {
                        return Ok(());
                    }
                    let Some(current) = self.scene.item(id).map(|item| item.rotation) else {
                        return Ok(());
                    };
                    let base = *self.gesture.rotation_base.get_or_insert(current);
                    self.update_item_live(id, |item| item.set_rotation(base + angle));
                }
            }
            GestureEvent::End => {
                self.gesture.reset();
                self.commit()?;
            }
        }
        Ok(())
    }

    /// Move the selected item by a delta. Live; pair with [`Self::commit`].
    pub fn nudge_selected(&mut self, delta: Point) -> bool {
        let Some(id) = self.selected else {
            return false;
        };
        self.update_item_live(id, |item| item.set_position(item.position + delta))
    }

    // ------------------------------------------------------------------
    // History and persistence
    // ------------------------------------------------------------------

    /// Checkpoint the last committed state (if anything changed) and save.
    pub fn commit(&mut self) -> Result<(), StoreError> {
        if self.scene != self.committed {
            self.history.record_checkpoint(&self.committed);
            self.committed = self.scene.clone();
        }
        self.save()
    }

    /// Revert to the state before the last commit. Returns false if there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Result<bool, StoreError> {
        if !self.history.undo(&mut self.scene) {
            return Ok(false);
        }
        self.after_history_jump()?;
        Ok(true)
    }

    /// Re-apply the last undone state. Returns false if there is nothing to
    /// redo.
    pub fn redo(&mut self) -> Result<bool, StoreError> {
        if !self.history.redo(&mut self.scene) {
            return Ok(false);
        }
        self.after_history_jump()?;
        Ok(true)
    }

    fn after_history_jump(&mut self) -> Result<(), StoreError> {
        self.gesture.reset();
        self.committed = self.scene.clone();
        if let Some(id) = self.selected {
            if !self.scene.contains(id) {
                self.selected = None;
            }
        }
        self.save()
    }

    /// Write the current scene through the registry.
    pub fn save(&mut self) -> Result<(), StoreError> {
        self.registry.save_scene(self.project_id, &self.scene)
    }
}
