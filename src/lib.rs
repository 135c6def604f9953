//! Collage - photo collage scene model
//!
//! Scenes of photo and text items on an aspect-ratio canvas, persisted as
//! JSON per project with an index of projects, plus snapshot undo/redo and
//! an editing session that ties gestures, history and saving together.
//!
//! - [`model`]: canvas formats, items, scenes and projects
//! - [`format`]: on-disk JSON encoding of scenes and the project index
//! - [`store`]: the project registry
//! - [`undo`]: snapshot history
//! - [`editor`]: interactive editing of one project

pub mod config;
pub mod constants;
pub mod editor;
pub mod format;
pub mod model;
pub mod store;
pub mod undo;

pub use config::AppConfig;
pub use editor::{EditorSession, GestureEvent};
pub use model::{CanvasFormat, Project, ProjectId, Scene, SceneItem};
pub use store::{ProjectRegistry, StoreError};
pub use undo::{History, UndoConfig};
