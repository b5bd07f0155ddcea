use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Focus, Model, ToastLevel};
use crate::display::DisplayStatus;
use crate::document::PaneOrder;

use super::render::PaneLayout;

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect, layout: &PaneLayout) {
    let order = match model.pane_order() {
        PaneOrder::EditorFirst => "editor|preview",
        PaneOrder::PreviewFirst => "preview|editor",
    };
    let page = if layout.side_by_side {
        order.to_string()
    } else {
        match model.focus {
            Focus::Editor => "editor".to_string(),
            Focus::Preview => "preview".to_string(),
        }
    };

    let cursor = model.editor.cursor();
    let position = format!("Ln {}, Col {}", cursor.line + 1, cursor.col + 1);
    let modified = if model.has_unexported_changes() {
        " [+]"
    } else {
        ""
    };
    let display = match model.display_status {
        DisplayStatus::Unsupported => String::new(),
        status if model.display_switching => format!("  [display: {}...]", status.label()),
        status => format!("  [display: {}]", status.label()),
    };
    let exporting = if model.export_in_flight {
        "  [exporting]"
    } else {
        ""
    };

    let status = format!(
        " {}{}  {}  [{}%]  {}{}{}  F1:help",
        model.export_name,
        modified,
        position,
        model.preview.viewport().scroll_percent(),
        page,
        display,
        exporting
    );

    let status_bar =
        Paragraph::new(status).style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(status_bar, area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
