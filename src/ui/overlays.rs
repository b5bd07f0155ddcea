use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::Model;
use crate::display::DisplayStatus;

pub fn render_export_prompt(model: &Model, frame: &mut Frame, area: Rect) {
    let Some(input) = model.export_prompt.as_deref() else {
        return;
    };
    let popup_width = area.width.saturating_sub(16).max(44);
    let popup = centered_popup_rect(popup_width, 7, area);

    let dim_style = Style::default().fg(Color::Indexed(245));
    let lines = vec![
        Line::from(vec![
            Span::styled("Save as: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(input.to_string()),
            Span::styled(" ", Style::default().bg(Color::White)),
        ]),
        Line::styled(
            format!("in {}", model.export_dir.display()),
            dim_style,
        ),
        Line::styled("Enter saves \u{2502} Esc cancels", dim_style),
    ];

    let block = Block::default()
        .title("Export Markdown")
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let dim_style = Style::default().fg(Color::Indexed(245));

    let mut all_lines: Vec<Line> = Vec::new();

    all_lines.push(Line::styled("Editing", section_style));
    all_lines.push(Line::raw("  Arrows, Home/End    Move cursor"));
    all_lines.push(Line::raw("  Ctrl+Left/Right     Word movement"));
    all_lines.push(Line::raw("  Ctrl+Home/End       Document start / end"));
    all_lines.push(Line::raw("  PageUp/PageDown     Page up / down"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Panes", section_style));
    all_lines.push(Line::raw("  Tab                 Switch focus / page"));
    all_lines.push(Line::raw("  Ctrl-o              Swap column order"));
    all_lines.push(Line::raw("  j/k, Space/b        Scroll preview"));
    all_lines.push(Line::raw(""));

    all_lines.push(Line::styled("Other", section_style));
    all_lines.push(Line::raw("  Ctrl-s              Export Markdown"));
    if model.display_status != DisplayStatus::Unsupported {
        all_lines.push(Line::raw("  Ctrl-d              Preview on second display"));
    }
    all_lines.push(Line::raw("  Ctrl-l              Redraw"));
    all_lines.push(Line::raw("  Ctrl-q              Quit"));
    all_lines.push(Line::raw("  F1                  Toggle help"));

    let block = Block::default()
        .title("Help")
        .borders(Borders::ALL)
        .padding(Padding::uniform(1))
        .style(Style::default().bg(Color::Black).fg(Color::White));

    frame.render_widget(Clear, popup);
    frame.render_widget(block, popup);

    // Inner area: border(1) + padding(1) on each side = 4
    let inner = Rect::new(
        popup.x + 2,
        popup.y + 2,
        popup.width.saturating_sub(4),
        popup.height.saturating_sub(4),
    );

    // Reserve 1 row at bottom for footer hint
    let content_height = inner.height.saturating_sub(1);
    all_lines.truncate(usize::from(content_height));
    let content_area = Rect::new(inner.x, inner.y, inner.width, content_height);
    frame.render_widget(Paragraph::new(all_lines), content_area);

    let footer_area = Rect::new(inner.x, inner.y + content_height, inner.width, 1);
    let footer = Line::styled("Esc closes", dim_style);
    frame.render_widget(Paragraph::new(footer), footer_area);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
