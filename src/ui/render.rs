use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::{Focus, Model};
use crate::display::DisplayStatus;
use crate::document::PaneOrder;

use super::{overlays, status, style};

/// Where each pane goes for the current terminal size.
///
/// Both pane rectangles are always filled in, so hidden panes keep a size
/// to lay out against; `show_*` says which are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub editor: Rect,
    pub preview: Rect,
    pub status: Rect,
    pub show_editor: bool,
    pub show_preview: bool,
    pub side_by_side: bool,
}

/// Decide the layout: side by side (ordered by `order`) when `area` is at
/// least `split_width` wide, otherwise one pane at a time. With the preview
/// on a secondary display only the editor is shown.
pub fn pane_layout(
    area: Rect,
    split_width: u16,
    order: PaneOrder,
    focus: Focus,
    secondary_active: bool,
) -> PaneLayout {
    let status_rows = area.height.min(1);
    let body = Rect {
        height: area.height - status_rows,
        ..area
    };
    let status = Rect {
        y: area.y + body.height,
        height: status_rows,
        ..area
    };

    if secondary_active {
        return PaneLayout {
            editor: body,
            preview: body,
            status,
            show_editor: true,
            show_preview: false,
            side_by_side: false,
        };
    }

    if area.width >= split_width {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(body);
        let (editor, preview) = match order {
            PaneOrder::EditorFirst => (columns[0], columns[1]),
            PaneOrder::PreviewFirst => (columns[1], columns[0]),
        };
        return PaneLayout {
            editor,
            preview,
            status,
            show_editor: true,
            show_preview: true,
            side_by_side: true,
        };
    }

    PaneLayout {
        editor: body,
        preview: body,
        status,
        show_editor: focus == Focus::Editor,
        show_preview: focus == Focus::Preview,
        side_by_side: false,
    }
}

/// The area inside a pane's border.
pub fn pane_content_area(pane: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(pane)
}

pub fn layout_for(model: &Model) -> PaneLayout {
    let (width, height) = model.terminal_size;
    pane_layout(
        Rect::new(0, 0, width, height),
        model.split_width,
        model.pane_order(),
        model.focus,
        model.display_status == DisplayStatus::Active,
    )
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let layout = layout_for(model);

    if layout.show_editor {
        render_editor(model, frame, layout.editor, &layout);
    }
    if layout.show_preview {
        render_preview(model, frame, layout.preview, &layout);
    }

    if model.active_toast().is_some() && layout.status.y > area.y {
        let toast_area = Rect {
            y: layout.status.y - 1,
            height: 1,
            ..layout.status
        };
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, layout.status, &layout);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    } else if model.export_prompt.is_some() {
        overlays::render_export_prompt(model, frame, area);
    }
}

fn pane_block(title: String, focused: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        })
}

/// Whether a pane gets the focus highlight. A lone pane is implicitly
/// focused and shown without one.
fn highlight_focus(model: &Model, pane: Focus, layout: &PaneLayout) -> bool {
    layout.side_by_side && model.focus == pane
}

fn render_editor(model: &Model, frame: &mut Frame, area: Rect, layout: &PaneLayout) {
    let block = pane_block(" Markdown ".to_string(), highlight_focus(model, Focus::Editor, layout));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let buffer = &model.editor;
    let gutter = line_number_width(buffer.line_count());
    let text_width = usize::from(inner.width.saturating_sub(gutter + 1));
    let hscroll = editor_hscroll(model.editor.cursor().col, text_width);
    let cursor = buffer.cursor();
    let show_cursor = model.focus == Focus::Editor
        && model.export_prompt.is_none()
        && !model.help_visible;

    let mut content: Vec<Line> = Vec::new();
    for line_idx in model.editor_viewport.visible_range() {
        let text = buffer.line_at(line_idx).unwrap_or_default();
        let visible: Vec<char> = text.chars().skip(hscroll).take(text_width).collect();
        let number = format!("{:>width$} ", line_idx + 1, width = usize::from(gutter));
        let mut spans = vec![Span::styled(number, Style::default().fg(Color::DarkGray))];

        if show_cursor && line_idx == cursor.line {
            let col = cursor.col.saturating_sub(hscroll).min(visible.len());
            let before: String = visible[..col].iter().collect();
            let under = visible.get(col).map_or_else(|| " ".to_string(), char::to_string);
            let after: String = visible.get(col + 1..).unwrap_or_default().iter().collect();
            if !before.is_empty() {
                spans.push(Span::raw(before));
            }
            spans.push(Span::styled(
                under,
                Style::default().bg(Color::White).fg(Color::Black),
            ));
            if !after.is_empty() {
                spans.push(Span::raw(after));
            }
        } else {
            spans.push(Span::raw(visible.into_iter().collect::<String>()));
        }
        content.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(content), inner);
}

fn render_preview(model: &Model, frame: &mut Frame, area: Rect, layout: &PaneLayout) {
    let title = if model.preview_is_stale() {
        " Preview (updating) ".to_string()
    } else {
        " Preview ".to_string()
    };
    let block = pane_block(title, highlight_focus(model, Focus::Preview, layout));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let lines = model.preview.lines();
    let range = model.preview.viewport().visible_range();
    let content: Vec<Line> = lines[range.start.min(lines.len())..range.end.min(lines.len())]
        .iter()
        .map(style::preview_line)
        .collect();
    frame.render_widget(Paragraph::new(content), inner);
}

/// Columns scrolled off the left so the cursor stays in view.
pub const fn editor_hscroll(cursor_col: usize, text_width: usize) -> usize {
    if text_width == 0 {
        return cursor_col;
    }
    cursor_col.saturating_sub(text_width - 1)
}

/// Buffer position under a terminal cell, if that cell shows editor text.
pub fn editor_position_at(model: &Model, column: u16, row: u16) -> Option<(usize, usize)> {
    let layout = layout_for(model);
    if !layout.show_editor {
        return None;
    }
    let inner = pane_content_area(layout.editor);
    if !inner.contains(Position::new(column, row)) {
        return None;
    }
    let gutter = line_number_width(model.editor.line_count()) + 1;
    let text_x = inner.x + gutter;
    let text_width = usize::from(inner.width.saturating_sub(gutter));
    let hscroll = editor_hscroll(model.editor.cursor().col, text_width);
    let line = model.editor_viewport.offset() + usize::from(row - inner.y);
    let col = hscroll + usize::from(column.saturating_sub(text_x));
    Some((line, col))
}

/// Calculate the width needed for line numbers.
pub const fn line_number_width(total_lines: usize) -> u16 {
    if total_lines < 10 {
        1
    } else if total_lines < 100 {
        2
    } else if total_lines < 1_000 {
        3
    } else if total_lines < 10_000 {
        4
    } else if total_lines < 100_000 {
        5
    } else {
        6
    }
}
