//! Colors for fenced code blocks in the preview.
//!
//! Code blocks tagged with a language (`class="language-rust"` in the HTML)
//! are colored with syntect's bundled syntaxes and themes. Untagged or
//! unknown languages stay plain monospace.

use std::sync::{Mutex, OnceLock};

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

use crate::preview::{PreviewSpan, Rgb, SpanStyle};

/// Terminal background the colors must stay readable on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Light,
    Dark,
}

static BACKGROUND_OVERRIDE: Mutex<Option<Background>> = Mutex::new(None);

/// Force a background instead of reading `COLORFGBG`. `None` restores
/// detection.
pub fn set_background(background: Option<Background>) {
    let mut guard = BACKGROUND_OVERRIDE
        .lock()
        .expect("highlight background lock poisoned");
    *guard = background;
}

/// Highlight `code`, one span list per source line.
pub fn highlight_code(language: Option<&str>, code: &str) -> Vec<Vec<PreviewSpan>> {
    let code_style = SpanStyle {
        code: true,
        ..SpanStyle::default()
    };
    let syntaxes = syntax_set();
    let syntax = language.filter(|lang| !lang.is_empty()).and_then(|lang| {
        syntaxes
            .find_syntax_by_token(lang)
            .or_else(|| syntaxes.find_syntax_by_name(lang))
    });

    let Some(syntax) = syntax else {
        return code
            .lines()
            .map(|line| vec![PreviewSpan::new(line, code_style)])
            .collect();
    };

    let _scope = crate::perf::scope("highlight.code");
    let background = background();
    let mut highlighter = HighlightLines::new(syntax, theme());
    let mut lines = Vec::new();
    for line in code.lines() {
        let Ok(ranges) = highlighter.highlight_line(line, syntaxes) else {
            lines.push(vec![PreviewSpan::new(line, code_style)]);
            continue;
        };
        let spans = ranges
            .into_iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(style, text)| {
                let fg = Rgb {
                    r: style.foreground.r,
                    g: style.foreground.g,
                    b: style.foreground.b,
                };
                PreviewSpan::new(
                    text,
                    SpanStyle {
                        fg: Some(readable_on(fg, background)),
                        ..code_style
                    },
                )
            })
            .collect();
        lines.push(spans);
    }
    lines
}

/// Whether the terminal background is light, for picking UI colors.
pub fn is_light_background() -> bool {
    background() == Background::Light
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.syntaxes.load");
        SyntaxSet::load_defaults_newlines()
    })
}

fn theme() -> &'static Theme {
    static THEME: OnceLock<Theme> = OnceLock::new();
    THEME.get_or_init(|| {
        let _scope = crate::perf::scope("highlight.theme.load");
        let themes = ThemeSet::load_defaults();
        let preferred: &[&str] = match background() {
            Background::Dark => &["Monokai Extended", "base16-ocean.dark", "Solarized (dark)"],
            Background::Light => &["InspiredGitHub", "base16-ocean.light", "Solarized (light)"],
        };
        preferred
            .iter()
            .find_map(|name| themes.themes.get(*name))
            .or_else(|| themes.themes.values().next())
            .cloned()
            .unwrap_or_default()
    })
}

fn background() -> Background {
    if let Ok(guard) = BACKGROUND_OVERRIDE.lock()
        && let Some(forced) = *guard
    {
        return forced;
    }
    background_from_colorfgbg(std::env::var("COLORFGBG").ok().as_deref())
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;extra;bg`) in ANSI color indices.
fn background_from_colorfgbg(value: Option<&str>) -> Background {
    let bg = value
        .and_then(|value| value.rsplit(';').next())
        .and_then(|bg| bg.trim().parse::<u8>().ok());
    match bg {
        Some(index) if index >= 7 => Background::Light,
        _ => Background::Dark,
    }
}

/// Darken bright theme colors on light terminals.
fn readable_on(color: Rgb, background: Background) -> Rgb {
    if background == Background::Dark {
        return color;
    }
    let luma =
        0.2126 * f32::from(color.r) + 0.7152 * f32::from(color.g) + 0.0722 * f32::from(color.b);
    if luma < 155.0 {
        return color;
    }
    let scale = |channel: u8| (f32::from(channel) * 0.42).round() as u8;
    Rgb {
        r: scale(color.r),
        g: scale(color.g),
        b: scale(color.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_color(lines: &[Vec<PreviewSpan>]) -> bool {
        lines.iter().flatten().any(|span| span.style.fg.is_some())
    }

    #[test]
    fn test_rust_code_gets_colors() {
        let lines = highlight_code(Some("rust"), "fn main() {\n    let x = 1;\n}\n");
        assert_eq!(lines.len(), 3);
        assert!(has_color(&lines));
        assert!(lines.iter().flatten().all(|span| span.style.code));
    }

    #[test]
    fn test_unknown_language_stays_plain() {
        let lines = highlight_code(Some("no-such-language"), "just text");
        assert_eq!(lines.len(), 1);
        assert!(!has_color(&lines));
        assert_eq!(lines[0][0].text, "just text");
    }

    #[test]
    fn test_untagged_code_is_monospace() {
        let lines = highlight_code(None, "a\nb");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().flatten().all(|span| span.style.code));
    }

    #[test]
    fn test_highlighting_keeps_text() {
        let code = "let greeting = \"hi\";";
        let lines = highlight_code(Some("rs"), code);
        let joined: String = lines[0].iter().map(|span| span.text.as_str()).collect();
        assert_eq!(joined, code);
    }

    #[test]
    fn test_colorfgbg_parsing() {
        assert_eq!(background_from_colorfgbg(Some("15;0")), Background::Dark);
        assert_eq!(background_from_colorfgbg(Some("0;15")), Background::Light);
        assert_eq!(background_from_colorfgbg(Some("0;default;15")), Background::Light);
        assert_eq!(background_from_colorfgbg(Some("garbage")), Background::Dark);
        assert_eq!(background_from_colorfgbg(None), Background::Dark);
    }

    #[test]
    fn test_forced_background_wins() {
        set_background(Some(Background::Light));
        assert_eq!(background(), Background::Light);
        set_background(Some(Background::Dark));
        assert_eq!(background(), Background::Dark);
        set_background(None);
    }

    #[test]
    fn test_light_background_darkens_bright_colors() {
        let bright = Rgb {
            r: 240,
            g: 230,
            b: 120,
        };
        let adjusted = readable_on(bright, Background::Light);
        let luma = 0.2126 * f32::from(adjusted.r)
            + 0.7152 * f32::from(adjusted.g)
            + 0.0722 * f32::from(adjusted.b);
        assert!(luma < 120.0, "still too bright: {luma}");
        assert_eq!(readable_on(bright, Background::Dark), bright);
    }
}
