//! Undo/Redo history for scene edits.
//!
//! History is snapshot based: every checkpoint stores the complete editable
//! content of the scene (items, background color and background image).
//! Rasters are reference counted, so a snapshot costs one `Vec` of items
//! rather than a copy of every image.
//!
//! The canvas format is deliberately not part of a snapshot; changing it is
//! not an undoable action.

use crate::model::{Color, Raster, Scene, SceneItem};

// ============================================================================
// Snapshot
// ============================================================================

/// The undoable content of a scene at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    /// All items in iteration order
    pub items: Vec<SceneItem>,
    /// Background fill color
    pub background: Color,
    /// Optional background image
    pub background_image: Option<Raster>,
}

impl SceneSnapshot {
    /// Capture the undoable content of `scene`.
    pub fn capture(scene: &Scene) -> Self {
        Self {
            items: scene.items().to_vec(),
            background: scene.background,
            background_image: scene.background_image.clone(),
        }
    }

    /// Write this snapshot back into `scene`, leaving its format alone.
    pub fn restore(self, scene: &mut Scene) {
        scene.replace_items(self.items);
        scene.background = self.background;
        scene.background_image = self.background_image;
    }
}

// ============================================================================
// History
// ============================================================================

/// Configuration for the history stacks
#[derive(Debug, Clone, Default)]
pub struct UndoConfig {
    /// Maximum number of checkpoints to keep. `None` keeps everything.
    pub max_history: Option<usize>,
}

/// The undo/redo history.
///
/// Maintains two stacks:
/// - `undo_stack`: states that can be returned to (most recent at the end)
/// - `redo_stack`: states that were undone (most recent at the end)
///
/// Recording a checkpoint pushes the current state and clears `redo_stack`.
/// Undo and redo swap the current state with the top of the opposite stack,
/// so an undo followed by a redo restores the exact pre-undo state.
#[derive(Debug, Clone, Default)]
pub struct History {
    /// Stack of states that can be restored by undo
    undo_stack: Vec<SceneSnapshot>,
    /// Stack of states that can be restored by redo
    redo_stack: Vec<SceneSnapshot>,
    /// Configuration
    config: UndoConfig,
}

impl History {
    /// Create an empty, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Push the current state of `scene` and clear the redo stack.
    ///
    /// Call once per discrete edit, never while a gesture is in progress.
    pub fn record_checkpoint(&mut self, scene: &Scene) {
        self.undo_stack.push(SceneSnapshot::capture(scene));
        self.redo_stack.clear();

        if let Some(max) = self.config.max_history {
            let excess = self.undo_stack.len().saturating_sub(max);
            if excess > 0 {
                self.undo_stack.drain(..excess);
            }
        }

        log::debug!("📝 History: checkpoint ({} undo)", self.undo_stack.len());
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Restore the previous checkpoint into `scene`.
    /// Returns false, leaving everything untouched, if there is nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(SceneSnapshot::capture(scene));
        previous.restore(scene);
        log::debug!(
            "⏪ Undo ({} undo, {} redo)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        true
    }

    /// Re-apply the most recently undone state.
    /// Returns false, leaving everything untouched, if there is nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(SceneSnapshot::capture(scene));
        next.restore(scene);
        log::debug!(
            "⏩ Redo ({} undo, {} redo)",
            self.undo_stack.len(),
            self.redo_stack.len()
        );
        true
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ History cleared");
    }

    /// Get the number of checkpoints available to undo
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of states available to redo
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
