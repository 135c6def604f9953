//! Data model: canvas formats, items, the collage document and projects.

mod canvas_format;
mod color;
mod geometry;
mod item;
mod project;
mod raster;
mod scene;

pub use canvas_format::{CanvasFormat, UnknownFormat};
pub use color::Color;
pub use geometry::{Angle, Point, Size};
pub use item::{ItemId, ItemKind, PhotoStyle, SceneItem, TextStyle};
pub use project::{Project, ProjectId};
pub use raster::Raster;
pub use scene::{DuplicateItem, Scene};
