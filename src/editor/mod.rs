//! Editor pane text buffer.
//!
//! Provides a rope-backed buffer with cursor management. The buffer is the
//! text-input surface: after each edit its full text is handed to the
//! document unchanged.

mod buffer;

pub use buffer::{Cursor, Direction, EditorBuffer};
