//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`viewport`]: Scroll position and visible range management
//! - [`style`]: Colors for preview lines
//! - pane layout, the status bar and popups

pub mod style;
pub mod viewport;

mod overlays;
mod render;
mod status;

pub use render::{
    PaneLayout, editor_position_at, layout_for, line_number_width, pane_content_area, pane_layout,
    render,
};
