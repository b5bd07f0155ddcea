//! Preview pane contents.
//!
//! The render pipeline produces HTML; this module turns that HTML into
//! styled, wrapped lines a terminal can show:
//! - [`html_to_blocks`]: HTML to logical blocks (paragraphs, headings, ...)
//! - [`wrap_blocks`]: logical blocks to display lines for a given width
//! - [`PreviewPane`]: the displayed HTML, its version and scroll position

mod html;
mod wrap;

pub use html::html_to_blocks;
pub use wrap::wrap_blocks;

use crate::ui::viewport::Viewport;

/// A 24-bit foreground color from syntax highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Inline formatting carried by a span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
    pub strikethrough: bool,
    pub link: bool,
    pub fg: Option<Rgb>,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSpan {
    pub text: String,
    pub style: SpanStyle,
}

impl PreviewSpan {
    pub fn new(text: impl Into<String>, style: SpanStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, SpanStyle::default())
    }
}

/// What kind of block a line belongs to. Drives line-level styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Heading(u8),
    Paragraph,
    Quote,
    ListItem,
    CodeBlock,
    Table,
    Rule,
    Empty,
}

/// A logical block before wrapping.
///
/// `prefix` starts the first display line (list marker, quote bar);
/// `continuation` starts every following one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: LineKind,
    pub prefix: String,
    pub continuation: String,
    pub spans: Vec<PreviewSpan>,
}

impl Block {
    pub fn new(kind: LineKind) -> Self {
        Self {
            kind,
            prefix: String::new(),
            continuation: String::new(),
            spans: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        Self::new(LineKind::Empty)
    }

    /// Append text, merging with the last span when the style matches.
    pub fn push_text(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        if let Some(last) = self.spans.last_mut()
            && last.style == style
        {
            last.text.push_str(text);
            return;
        }
        self.spans.push(PreviewSpan::new(text, style));
    }

    pub fn has_text(&self) -> bool {
        self.spans.iter().any(|span| !span.text.is_empty())
    }

    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// One display line of the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewLine {
    pub kind: LineKind,
    pub spans: Vec<PreviewSpan>,
}

impl PreviewLine {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }
}

/// What the preview pane is currently showing.
///
/// Holds on to the version of the document its HTML came from and refuses
/// older HTML, so an out-of-order render can never replace a newer one.
#[derive(Debug, Clone)]
pub struct PreviewPane {
    version: Option<u64>,
    html: String,
    blocks: Vec<Block>,
    lines: Vec<PreviewLine>,
    viewport: Viewport,
}

impl PreviewPane {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            version: None,
            html: String::new(),
            blocks: Vec::new(),
            lines: Vec::new(),
            viewport: Viewport::new(width, height, 0),
        }
    }

    /// Version of the document the displayed HTML was rendered from.
    pub const fn version(&self) -> Option<u64> {
        self.version
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn lines(&self) -> &[PreviewLine] {
        &self.lines
    }

    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub const fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Display `html` rendered from document `version`.
    ///
    /// Returns false, leaving the pane untouched, if the pane already shows
    /// the same or a newer version.
    pub fn show(&mut self, version: u64, html: String) -> bool {
        if self.version.is_some_and(|shown| shown >= version) {
            crate::perf::log_event(
                "preview.stale",
                format!("incoming={version} shown={:?}", self.version),
            );
            return false;
        }
        let _scope = crate::perf::scope("preview.layout");
        self.blocks = html_to_blocks(&html);
        self.html = html;
        self.version = Some(version);
        self.relayout();
        true
    }

    /// Change the pane size, re-wrapping when the width changed.
    pub fn resize(&mut self, width: u16, height: u16) {
        let rewrap = width != self.viewport.width();
        self.viewport.resize(width, height);
        if rewrap {
            self.relayout();
        }
    }

    /// The displayed lines as plain text.
    pub fn plain_lines(&self) -> Vec<String> {
        self.lines.iter().map(PreviewLine::text).collect()
    }

    fn relayout(&mut self) {
        self.lines = wrap_blocks(&self.blocks, usize::from(self.viewport.width()));
        self.viewport.set_total_lines(self.lines.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_lays_out_html() {
        let mut pane = PreviewPane::new(40, 10);
        assert!(pane.show(1, "<h1>Hello Markdown</h1>\n".to_string()));
        assert_eq!(pane.version(), Some(1));
        assert_eq!(pane.plain_lines(), vec!["Hello Markdown".to_string()]);
        assert_eq!(pane.lines()[0].kind, LineKind::Heading(1));
    }

    #[test]
    fn test_show_rejects_older_or_equal_versions() {
        let mut pane = PreviewPane::new(40, 10);
        assert!(pane.show(5, "<p>new</p>\n".to_string()));
        assert!(!pane.show(4, "<p>old</p>\n".to_string()));
        assert!(!pane.show(5, "<p>again</p>\n".to_string()));
        assert_eq!(pane.html(), "<p>new</p>\n");
        assert!(pane.show(6, "<p>newer</p>\n".to_string()));
        assert_eq!(pane.plain_lines(), vec!["newer".to_string()]);
    }

    #[test]
    fn test_resize_rewraps_on_width_change() {
        let mut pane = PreviewPane::new(80, 10);
        pane.show(1, "<p>one two three four five six</p>\n".to_string());
        assert_eq!(pane.lines().len(), 1);
        pane.resize(10, 10);
        assert!(pane.lines().len() > 1);
        assert_eq!(pane.viewport().total_lines(), pane.lines().len());
    }

    #[test]
    fn test_block_push_text_merges_same_style() {
        let mut block = Block::new(LineKind::Paragraph);
        block.push_text("a", SpanStyle::default());
        block.push_text("b", SpanStyle::default());
        let bold = SpanStyle {
            strong: true,
            ..SpanStyle::default()
        };
        block.push_text("c", bold);
        assert_eq!(block.spans.len(), 2);
        assert_eq!(block.text(), "abc");
    }
}
