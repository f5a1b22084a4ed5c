pub mod history;
pub mod selection;
pub mod session;

pub use history::History;
pub use selection::Selection;
pub use session::{Drag, DragSession, DragState};
