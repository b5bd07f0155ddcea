//! Colors and modifiers for preview lines.
//!
//! Uses ANSI colors that adapt to the terminal's palette, with darker
//! indexed variants on light backgrounds.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::preview::{LineKind, PreviewLine, Rgb, SpanStyle};

/// Base style for every span on a line of the given kind.
pub fn style_for_line_kind(kind: LineKind) -> Style {
    let light_bg = crate::highlight::is_light_background();
    let pick = |light: u8, dark: Color| {
        if light_bg {
            Color::Indexed(light)
        } else {
            dark
        }
    };
    match kind {
        LineKind::Heading(1) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        LineKind::Heading(2) => Style::default()
            .fg(pick(22, Color::Green))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(3) => Style::default()
            .fg(pick(58, Color::Yellow))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(4) => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(5) => Style::default()
            .fg(pick(54, Color::Magenta))
            .add_modifier(Modifier::BOLD),
        LineKind::Heading(_) => Style::default()
            .fg(pick(24, Color::Cyan))
            .add_modifier(Modifier::BOLD),
        LineKind::CodeBlock => Style::default()
            .fg(pick(238, Color::Indexed(245)))
            .add_modifier(Modifier::DIM),
        LineKind::Quote => Style::default()
            .fg(pick(24, Color::Blue))
            .add_modifier(Modifier::ITALIC),
        LineKind::Rule => Style::default()
            .fg(pick(241, Color::Indexed(240)))
            .add_modifier(Modifier::DIM),
        LineKind::ListItem | LineKind::Table | LineKind::Paragraph | LineKind::Empty => {
            Style::default()
        }
    }
}

/// Merge a span's inline formatting into its line's base style.
pub fn style_for_span(base: Style, span: SpanStyle) -> Style {
    let mut style = base;

    if let Some(fg) = span.fg {
        style = style
            .fg(fg_color_for_terminal(fg))
            .remove_modifier(Modifier::DIM);
    }
    if span.emphasis {
        style = style.add_modifier(Modifier::ITALIC);
    }
    if span.strong {
        style = style.add_modifier(Modifier::BOLD);
    }
    if span.strikethrough {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if span.link {
        style = style.add_modifier(Modifier::UNDERLINED);
        if span.fg.is_none() {
            style = style.fg(if crate::highlight::is_light_background() {
                Color::Blue
            } else {
                Color::LightBlue
            });
        }
    }
    // Inline code only; fenced code carries highlight colors or the
    // code-block line style.
    if span.code && span.fg.is_none() && base == Style::default() {
        style = style
            .fg(if crate::highlight::is_light_background() {
                Color::Indexed(88)
            } else {
                Color::Red
            })
            .add_modifier(Modifier::BOLD);
    }

    style
}

/// Convert a preview line into a styled ratatui line.
pub fn preview_line(line: &PreviewLine) -> Line<'static> {
    let base = style_for_line_kind(line.kind);
    let spans: Vec<Span<'static>> = line
        .spans
        .iter()
        .map(|span| Span::styled(span.text.clone(), style_for_span(base, span.style)))
        .collect();
    Line::from(spans)
}

fn fg_color_for_terminal(fg: Rgb) -> Color {
    if supports_truecolor() {
        Color::Rgb(fg.r, fg.g, fg.b)
    } else {
        Color::Indexed(rgb_to_xterm_256(fg.r, fg.g, fg.b))
    }
}

fn supports_truecolor() -> bool {
    if let Ok(force) = std::env::var("MDPANE_TRUECOLOR") {
        let value = force.to_ascii_lowercase();
        return matches!(value.as_str(), "1" | "true" | "yes" | "on");
    }
    supports_truecolor_from_env(
        std::env::var("COLORTERM").ok().as_deref(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn supports_truecolor_from_env(colorterm: Option<&str>, term: Option<&str>) -> bool {
    let mentions = |value: Option<&str>, needles: &[&str]| {
        value.is_some_and(|v| {
            let lower = v.to_ascii_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
    };
    mentions(colorterm, &["truecolor", "24bit"]) || mentions(term, &["direct", "truecolor"])
}

fn rgb_to_xterm_256(r: u8, g: u8, b: u8) -> u8 {
    // Result is always 0-5, fits in u8
    #[allow(clippy::cast_possible_truncation)]
    let to_cube = |v: u8| ((u16::from(v) * 5) / 255) as u8;
    16 + 36 * to_cube(r) + 6 * to_cube(g) + to_cube(b)
}
