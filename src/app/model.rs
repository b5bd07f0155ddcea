use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::layout::Rect;

use crate::display::DisplayStatus;
use crate::document::{DocumentState, PaneOrder};
use crate::editor::EditorBuffer;
use crate::export::DEFAULT_FILE_NAME;
use crate::preview::PreviewPane;
use crate::render::RenderPipeline;
use crate::ui::viewport::Viewport;

/// Documents up to this many bytes render on the input thread.
pub const DEFAULT_SYNC_RENDER_LIMIT: usize = 64 * 1024;

/// Minimum terminal width for showing both panes side by side.
pub const DEFAULT_SPLIT_WIDTH: u16 = 100;

const TOAST_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// Which pane receives keys. In the narrow layout this is also the page on
/// screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Editor,
    Preview,
}

impl Focus {
    pub const fn other(self) -> Self {
        match self {
            Self::Editor => Self::Preview,
            Self::Preview => Self::Editor,
        }
    }
}

/// The complete application state.
pub struct Model {
    /// Text, pane order and the render pipeline
    pub document: DocumentState,
    /// Text-input surface; its text always equals the document's
    pub editor: EditorBuffer,
    pub editor_viewport: Viewport,
    pub preview: PreviewPane,
    pub focus: Focus,
    pub terminal_size: (u16, u16),
    pub split_width: u16,
    pub sync_render_limit: usize,
    /// The document changed since the last render was scheduled
    pub render_requested: bool,
    /// Newest version handed to the background renderer
    pub render_in_flight: Option<u64>,
    pub display_status: DisplayStatus,
    pub display_switching: bool,
    pub(super) display_switch_requested: bool,
    /// Destination being typed, when the export prompt is open
    pub export_prompt: Option<String>,
    /// Directory relative export names resolve against
    pub export_dir: PathBuf,
    /// Name the prompt starts with
    pub export_name: String,
    /// Confirmed prompt text waiting to be resolved and written
    pub(super) export_requested: Option<String>,
    pub export_in_flight: bool,
    /// Document version last written out (or loaded)
    pub(super) clean_version: u64,
    pub help_visible: bool,
    pub quit_confirmed: bool,
    pub should_quit: bool,
    pub resize_pending: bool,
    toast: Option<Toast>,
}

impl Model {
    pub fn new(pipeline: RenderPipeline, terminal_size: (u16, u16)) -> Self {
        let document = DocumentState::with_pipeline(pipeline);
        let editor = EditorBuffer::from_text(document.text());
        let clean_version = document.version();
        let mut model = Self {
            editor_viewport: Viewport::new(terminal_size.0, terminal_size.1, editor.line_count()),
            preview: PreviewPane::new(terminal_size.0, terminal_size.1),
            document,
            editor,
            focus: Focus::Editor,
            terminal_size,
            split_width: DEFAULT_SPLIT_WIDTH,
            sync_render_limit: DEFAULT_SYNC_RENDER_LIMIT,
            render_requested: true,
            render_in_flight: None,
            display_status: DisplayStatus::Unsupported,
            display_switching: false,
            display_switch_requested: false,
            export_prompt: None,
            export_dir: PathBuf::from("."),
            export_name: DEFAULT_FILE_NAME.to_string(),
            export_requested: None,
            export_in_flight: false,
            clean_version,
            help_visible: false,
            quit_confirmed: false,
            should_quit: false,
            resize_pending: false,
            toast: None,
        };
        model.reflow_layout();
        model
    }

    #[must_use]
    pub const fn with_split_width(mut self, split_width: u16) -> Self {
        self.split_width = split_width;
        self
    }

    #[must_use]
    pub fn with_export(mut self, dir: PathBuf, name: impl Into<String>) -> Self {
        self.export_dir = dir;
        self.export_name = name.into();
        self
    }

    #[must_use]
    pub const fn with_sync_render_limit(mut self, limit: usize) -> Self {
        self.sync_render_limit = limit;
        self
    }

    #[must_use]
    pub const fn with_display_status(mut self, status: DisplayStatus) -> Self {
        self.display_status = status;
        self
    }

    pub fn pane_order(&self) -> PaneOrder {
        self.document.pane_order()
    }

    /// Whether the text changed since it was last exported.
    pub const fn has_unexported_changes(&self) -> bool {
        self.document.version() != self.clean_version
    }

    pub(super) const fn mark_exported(&mut self, version: u64) {
        if version > self.clean_version {
            self.clean_version = version;
        }
    }

    /// Whether the preview is behind the text.
    pub fn preview_is_stale(&self) -> bool {
        self.render_requested || self.preview.version() != Some(self.document.version())
    }

    /// Background work whose result the event loop is waiting on.
    pub const fn awaiting_background(&self) -> bool {
        self.render_in_flight.is_some() || self.export_in_flight || self.display_switching
    }

    /// Hand the editor's text to the document after an edit.
    pub(super) fn sync_document_from_editor(&mut self) {
        self.document.set_text(self.editor.text());
        self.render_requested = true;
        self.editor_viewport.set_total_lines(self.editor.line_count());
        self.editor_viewport
            .scroll_into_view(self.editor.cursor().line);
    }

    /// Recompute pane sizes from the terminal size and layout mode.
    pub fn reflow_layout(&mut self) {
        let (width, height) = self.terminal_size;
        let layout = crate::ui::pane_layout(
            Rect::new(0, 0, width, height),
            self.split_width,
            self.pane_order(),
            self.focus,
            self.display_status == DisplayStatus::Active,
        );
        let editor = crate::ui::pane_content_area(layout.editor);
        let preview = crate::ui::pane_content_area(layout.preview);
        self.editor_viewport.resize(editor.width, editor.height);
        self.editor_viewport.set_total_lines(self.editor.line_count());
        self.editor_viewport
            .scroll_into_view(self.editor.cursor().line);
        self.preview.resize(preview.width, preview.height);
    }

    pub fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?level, %message, "toast");
        self.toast = Some(Toast {
            level,
            message,
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    /// Drop the toast once it has expired. Returns true when one was removed.
    pub fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| now >= toast.expires_at)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(RenderPipeline::default(), (80, 24))
    }
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("document", &self.document)
            .field("focus", &self.focus)
            .field("terminal_size", &self.terminal_size)
            .field("preview_version", &self.preview.version())
            .field("display_status", &self.display_status)
            .field("export_prompt", &self.export_prompt)
            .finish_non_exhaustive()
    }
}
