use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{Focus, ToastLevel};
use crate::display::DisplayStatus;
use crate::editor::Direction;
use crate::error::ExportError;
use crate::render::RenderResult;

/// All possible events and actions in the application.
///
/// These represent user input, terminal events, and results coming back
/// from background work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Editor
    /// Insert a character at the cursor
    EditorInsertChar(char),
    /// Insert pasted text at the cursor
    EditorInsertText(String),
    /// Delete character before cursor (Backspace)
    EditorDeleteBack,
    /// Delete character at cursor (Delete)
    EditorDeleteForward,
    /// Split line at cursor (Enter)
    EditorSplitLine,
    EditorMoveCursor(Direction),
    EditorMoveHome,
    EditorMoveEnd,
    EditorMoveWordLeft,
    EditorMoveWordRight,
    EditorMoveToStart,
    EditorMoveToEnd,
    /// Move cursor to (line, col), e.g. from a mouse click
    EditorMoveTo(usize, usize),

    // Scrolling the focused pane
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,

    // Layout
    /// Move focus to the other pane (or page, in the narrow layout)
    SwitchFocus,
    /// Swap editor and preview columns
    ToggleColumnOrder,
    /// Terminal resized
    Resize(u16, u16),
    ToggleHelp,
    HideHelp,

    // Secondary display
    /// Ask the host to move the preview to (or back from) a second screen
    RequestDisplaySwitch,
    /// Outcome of a display switch
    DisplayStatusChanged(Result<DisplayStatus, String>),

    // Export
    /// Open the destination prompt
    StartExport,
    ExportInput(char),
    ExportBackspace,
    ConfirmExport,
    CancelExport,
    /// A background export finished
    ExportFinished {
        destination: PathBuf,
        version: u64,
        result: Result<usize, String>,
    },

    // Rendering
    /// A background render finished
    RenderFinished(RenderResult),

    /// Redraw screen
    Redraw,
    /// Quit the application
    Quit,
}

impl Message {
    const fn edits_text(&self) -> bool {
        matches!(
            self,
            Self::EditorInsertChar(_)
                | Self::EditorInsertText(_)
                | Self::EditorDeleteBack
                | Self::EditorDeleteForward
                | Self::EditorSplitLine
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// All state transitions happen here. Work that touches threads, files or
/// devices is only requested through flags the side-effect step picks up.
pub fn update(mut model: Model, msg: Message) -> Model {
    // A pending quit confirmation only survives the second Quit, and
    // results arriving from background work.
    if !matches!(
        msg,
        Message::Quit
            | Message::RenderFinished(_)
            | Message::ExportFinished { .. }
            | Message::DisplayStatusChanged(_)
            | Message::Redraw
    ) {
        model.quit_confirmed = false;
    }

    if msg.edits_text() && model.focus != Focus::Editor {
        model.focus = Focus::Editor;
        model.reflow_layout();
    }

    match msg {
        Message::EditorInsertChar(ch) => {
            if model.editor.insert_char(ch) {
                model.sync_document_from_editor();
            }
        }
        Message::EditorInsertText(text) => {
            if model.editor.insert_str(&text) {
                model.sync_document_from_editor();
            }
        }
        Message::EditorDeleteBack => {
            if model.editor.delete_back() {
                model.sync_document_from_editor();
            }
        }
        Message::EditorDeleteForward => {
            if model.editor.delete_forward() {
                model.sync_document_from_editor();
            }
        }
        Message::EditorSplitLine => {
            if model.editor.split_line() {
                model.sync_document_from_editor();
            }
        }
        Message::EditorMoveCursor(direction) => {
            model.editor.move_cursor(direction);
            follow_cursor(&mut model);
        }
        Message::EditorMoveHome => model.editor.move_home(),
        Message::EditorMoveEnd => model.editor.move_end(),
        Message::EditorMoveWordLeft => {
            model.editor.move_word_left();
            follow_cursor(&mut model);
        }
        Message::EditorMoveWordRight => {
            model.editor.move_word_right();
            follow_cursor(&mut model);
        }
        Message::EditorMoveToStart => {
            model.editor.move_to_start();
            follow_cursor(&mut model);
        }
        Message::EditorMoveToEnd => {
            model.editor.move_to_end();
            follow_cursor(&mut model);
        }
        Message::EditorMoveTo(line, col) => {
            model.focus = Focus::Editor;
            model.editor.move_to(line, col);
            follow_cursor(&mut model);
        }

        Message::ScrollUp(n) => match model.focus {
            Focus::Editor => model.editor_viewport.scroll_up(n),
            Focus::Preview => model.preview.viewport_mut().scroll_up(n),
        },
        Message::ScrollDown(n) => match model.focus {
            Focus::Editor => model.editor_viewport.scroll_down(n),
            Focus::Preview => model.preview.viewport_mut().scroll_down(n),
        },
        Message::PageUp => match model.focus {
            Focus::Editor => {
                let page = usize::from(model.editor_viewport.height().max(1));
                for _ in 0..page {
                    model.editor.move_cursor(Direction::Up);
                }
                follow_cursor(&mut model);
            }
            Focus::Preview => model.preview.viewport_mut().page_up(),
        },
        Message::PageDown => match model.focus {
            Focus::Editor => {
                let page = usize::from(model.editor_viewport.height().max(1));
                for _ in 0..page {
                    model.editor.move_cursor(Direction::Down);
                }
                follow_cursor(&mut model);
            }
            Focus::Preview => model.preview.viewport_mut().page_down(),
        },

        Message::SwitchFocus => {
            model.focus = model.focus.other();
            model.reflow_layout();
        }
        Message::ToggleColumnOrder => {
            model.document.toggle_column_order();
            model.reflow_layout();
        }
        Message::Resize(width, height) => {
            model.terminal_size = (width, height);
            model.reflow_layout();
        }
        Message::ToggleHelp => model.help_visible = !model.help_visible,
        Message::HideHelp => model.help_visible = false,

        Message::RequestDisplaySwitch => {
            if model.display_status == DisplayStatus::Unsupported {
                model.show_toast(ToastLevel::Warning, "No secondary display available");
            } else if !model.display_switching {
                model.display_switching = true;
                model.display_switch_requested = true;
            }
        }
        Message::DisplayStatusChanged(result) => {
            model.display_switching = false;
            match result {
                Ok(status) => {
                    model.display_status = status;
                    let note = match status {
                        DisplayStatus::Active => "Preview moved to secondary display",
                        DisplayStatus::Available => "Preview back on this screen",
                        DisplayStatus::Unsupported => "Secondary display unavailable",
                    };
                    model.show_toast(ToastLevel::Info, note);
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Display switch failed: {err}"));
                }
            }
            model.reflow_layout();
        }

        Message::StartExport => {
            if model.export_in_flight {
                model.show_toast(ToastLevel::Warning, "Export already in progress");
            } else {
                model.export_prompt = Some(model.export_name.clone());
            }
        }
        Message::ExportInput(ch) => {
            if let Some(prompt) = model.export_prompt.as_mut() {
                prompt.push(ch);
            }
        }
        Message::ExportBackspace => {
            if let Some(prompt) = model.export_prompt.as_mut() {
                prompt.pop();
            }
        }
        Message::ConfirmExport => {
            if let Some(input) = model.export_prompt.take() {
                model.export_name.clone_from(&input);
                model.export_requested = Some(input);
            }
        }
        Message::CancelExport => {
            if model.export_prompt.take().is_some() {
                model.show_toast(ToastLevel::Info, ExportError::Cancelled.to_string());
            }
        }
        Message::ExportFinished {
            destination,
            version,
            result,
        } => {
            model.export_in_flight = false;
            match result {
                Ok(bytes) => {
                    model.mark_exported(version);
                    model.show_toast(
                        ToastLevel::Info,
                        format!("Exported {bytes} bytes to {}", destination.display()),
                    );
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Export failed: {err}"));
                }
            }
        }

        Message::RenderFinished(result) => {
            if model.render_in_flight == Some(result.version) {
                model.render_in_flight = None;
            }
            model.preview.show(result.version, result.html);
        }

        Message::Redraw => {}
        Message::Quit => {
            if model.has_unexported_changes() && !model.quit_confirmed {
                model.quit_confirmed = true;
                model.show_toast(
                    ToastLevel::Warning,
                    "Unexported changes. Ctrl+Q again to quit, Ctrl+S to export",
                );
            } else {
                model.should_quit = true;
            }
        }
    }

    model
}

fn follow_cursor(model: &mut Model) {
    model.focus = Focus::Editor;
    model
        .editor_viewport
        .scroll_into_view(model.editor.cursor().line);
}
