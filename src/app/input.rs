use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::app::{App, Focus, Message, Model};
use crate::editor::Direction;

use super::event_loop::ResizeDebouncer;

const WHEEL_LINES: usize = 3;

impl App {
    pub(super) fn handle_event(
        &self,
        event: &Event,
        model: &Model,
        now_ms: u64,
        resize_debouncer: &mut ResizeDebouncer,
    ) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                Self::handle_key(*key, model)
            }
            Event::Mouse(mouse) => Self::handle_mouse(*mouse, model),
            Event::Paste(text) => {
                if model.export_prompt.is_some() || model.help_visible {
                    None
                } else {
                    Some(Message::EditorInsertText(text.clone()))
                }
            }
            Event::Resize(width, height) => {
                crate::perf::log_event(
                    "event.resize.queue",
                    format!("width={width} height={height}"),
                );
                resize_debouncer.queue(*width, *height, now_ms);
                None
            }
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('q') {
            return Some(Message::Quit);
        }

        if model.help_visible {
            return match key.code {
                KeyCode::F(1) | KeyCode::Esc | KeyCode::Char('q' | '?') => Some(Message::HideHelp),
                _ => None,
            };
        }

        if model.export_prompt.is_some() {
            return match key.code {
                KeyCode::Enter => Some(Message::ConfirmExport),
                KeyCode::Esc => Some(Message::CancelExport),
                KeyCode::Backspace => Some(Message::ExportBackspace),
                KeyCode::Char(c) if !ctrl => Some(Message::ExportInput(c)),
                _ => None,
            };
        }

        if ctrl {
            return match key.code {
                KeyCode::Char('s') => Some(Message::StartExport),
                KeyCode::Char('o') => Some(Message::ToggleColumnOrder),
                KeyCode::Char('d') => Some(Message::RequestDisplaySwitch),
                KeyCode::Char('l') => Some(Message::Redraw),
                KeyCode::Left => Some(Message::EditorMoveWordLeft),
                KeyCode::Right => Some(Message::EditorMoveWordRight),
                KeyCode::Home => Some(Message::EditorMoveToStart),
                KeyCode::End => Some(Message::EditorMoveToEnd),
                _ => None,
            };
        }

        match key.code {
            KeyCode::F(1) => return Some(Message::ToggleHelp),
            KeyCode::Tab | KeyCode::BackTab => return Some(Message::SwitchFocus),
            KeyCode::PageUp => return Some(Message::PageUp),
            KeyCode::PageDown => return Some(Message::PageDown),
            _ => {}
        }

        match model.focus {
            Focus::Editor => Self::handle_editor_key(key),
            Focus::Preview => Self::handle_preview_key(key),
        }
    }

    fn handle_editor_key(key: KeyEvent) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::ALT) {
            return None;
        }
        match key.code {
            KeyCode::Char(c) => Some(Message::EditorInsertChar(c)),
            KeyCode::Enter => Some(Message::EditorSplitLine),
            KeyCode::Backspace => Some(Message::EditorDeleteBack),
            KeyCode::Delete => Some(Message::EditorDeleteForward),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            _ => None,
        }
    }

    fn handle_preview_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => Some(Message::ScrollUp(1)),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::ScrollDown(1)),
            KeyCode::Char(' ') => Some(Message::PageDown),
            KeyCode::Char('b') => Some(Message::PageUp),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            KeyCode::Esc => Some(Message::SwitchFocus),
            _ => None,
        }
    }

    pub(super) fn handle_mouse(mouse: MouseEvent, model: &Model) -> Option<Message> {
        if model.help_visible || model.export_prompt.is_some() {
            return None;
        }
        match mouse.kind {
            MouseEventKind::ScrollUp => Some(Message::ScrollUp(WHEEL_LINES)),
            MouseEventKind::ScrollDown => Some(Message::ScrollDown(WHEEL_LINES)),
            MouseEventKind::Down(MouseButton::Left) => {
                let (line, col) = crate::ui::editor_position_at(model, mouse.column, mouse.row)?;
                Some(Message::EditorMoveTo(line, col))
            }
            _ => None,
        }
    }
}
