//! The edited document.
//!
//! This module handles:
//! - Holding the markdown text and pane order
//! - Versioning and change notification
//! - Memoized HTML rendering and byte serialization for export

mod state;

pub use state::{DocumentEvent, DocumentState, ObserverId, PaneOrder, SEED_TEXT};
