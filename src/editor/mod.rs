//! Interactive editing on top of the scene model and registry.

mod gesture;
mod session;

pub use gesture::GestureEvent;
pub use session::EditorSession;
