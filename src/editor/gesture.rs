//! Gesture events delivered by the UI layer.

use crate::model::{Angle, ItemId, Point};

/// A discrete event from the gesture recognizers.
///
/// Pinch and rotate values are cumulative since the gesture began, the way
/// platform recognizers report them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Tap on an item, or on the background (`None`)
    Tap(Option<ItemId>),
    /// An item is being dragged; `location` is its new center
    Drag { item: ItemId, location: Point },
    /// Pinch on the selected item
    Pinch { scale: f64 },
    /// Rotation of the selected item
    Rotate { angle: Angle },
    /// The current gesture finished
    End,
}

/// Tracking state for an in-progress gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GestureState {
    /// Last cumulative pinch scale applied; 1.0 between gestures
    pub last_scale: f64,
    /// Item rotation when the current rotate gesture began
    pub rotation_base: Option<Angle>,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            last_scale: 1.0,
            rotation_base: None,
        }
    }
}

impl GestureState {
    /// Ratio to apply for a new cumulative pinch reading, updating the
    /// stored reading. Returns `None` for unusable readings.
    pub fn pinch_step(&mut self, scale: f64) -> Option<f64> {
        if !scale.is_finite() || scale <= 0.0 {
            return None;
        }
        let step = scale / self.last_scale;
        self.last_scale = scale;
        Some(step)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
