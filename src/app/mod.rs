//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! Rendering large documents, exporting and display switching run on
//! background threads and come back into the loop as messages.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{DEFAULT_SPLIT_WIDTH, DEFAULT_SYNC_RENDER_LIMIT, Focus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::Sender;

use crate::display::{DisplayStatus, DisplayTarget, NoSecondaryDisplay, TtyDisplay};
use crate::export::{AtomicFileSink, DEFAULT_FILE_NAME};
use crate::render::RenderPipeline;

use effects::Runtime;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    pipeline: RenderPipeline,
    split_width: u16,
    sync_render_limit: usize,
    export_dir: PathBuf,
    file_name: String,
    secondary_tty: Option<PathBuf>,
}

impl App {
    pub fn new() -> Self {
        Self {
            pipeline: RenderPipeline::default(),
            split_width: DEFAULT_SPLIT_WIDTH,
            sync_render_limit: DEFAULT_SYNC_RENDER_LIMIT,
            export_dir: PathBuf::from("."),
            file_name: DEFAULT_FILE_NAME.to_string(),
            secondary_tty: None,
        }
    }

    #[must_use]
    pub const fn with_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    /// Minimum terminal width for the side-by-side layout.
    #[must_use]
    pub const fn with_split_width(mut self, width: u16) -> Self {
        self.split_width = width;
        self
    }

    /// Largest document (in bytes) rendered on the input thread.
    #[must_use]
    pub const fn with_sync_render_limit(mut self, limit: usize) -> Self {
        self.sync_render_limit = limit;
        self
    }

    /// Where exports go and the name the prompt suggests.
    #[must_use]
    pub fn with_export(mut self, dir: PathBuf, file_name: impl Into<String>) -> Self {
        self.export_dir = dir;
        self.file_name = file_name.into();
        self
    }

    /// Terminal device to mirror the preview to.
    #[must_use]
    pub fn with_secondary_tty(mut self, path: Option<PathBuf>) -> Self {
        self.secondary_tty = path;
        self
    }

    fn build_model(&self, terminal_size: (u16, u16), display: DisplayStatus) -> Model {
        let mut model = Model::new(self.pipeline, terminal_size)
            .with_split_width(self.split_width)
            .with_sync_render_limit(self.sync_render_limit)
            .with_export(self.export_dir.clone(), self.file_name.clone())
            .with_display_status(display);
        model.reflow_layout();
        model
    }

    fn runtime(&self, events: Sender<Message>) -> Runtime {
        let display: Box<dyn DisplayTarget> = match &self.secondary_tty {
            Some(path) => Box::new(TtyDisplay::new(path)),
            None => Box::new(NoSecondaryDisplay),
        };
        Runtime::new(events, self.pipeline, display, Arc::new(AtomicFileSink))
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
