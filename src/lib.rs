// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderPipeline)
    clippy::module_name_repetitions
)]

//! # mdpane
//!
//! A terminal markdown editor with a live preview.
//!
//! mdpane keeps an editable markdown buffer and an HTML preview in step:
//! - Side-by-side or paged layout, with swappable column order
//! - Large documents rendered on a background thread, newest result wins
//! - Export of the raw markdown to a file without blocking typing
//! - Optional preview mirror on a second terminal
//!
//! ## Architecture
//!
//! mdpane uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`document`]: The document state, single source of truth
//! - [`render`]: Markdown to HTML, inline or on a worker thread
//! - [`preview`]: HTML to styled, wrapped terminal lines
//! - [`editor`]: Rope-backed editing buffer
//! - [`export`]: Writing the markdown out
//! - [`display`]: Secondary display capability
//! - [`app`]: Main application loop and state
//! - [`ui`]: Terminal UI components
//! - [`highlight`]: Syntax highlighting for code blocks
//! - [`logging`]: Keeping log output off the live screen

pub mod app;
pub mod config;
pub mod display;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod highlight;
pub mod logging;
pub mod perf;
pub mod preview;
pub mod render;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{DocumentState, PaneOrder};
    pub use crate::export::{AtomicFileSink, ExportSink};
    pub use crate::render::RenderPipeline;
    pub use crate::ui::viewport::Viewport;
}
