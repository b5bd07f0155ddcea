use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use super::{Block, LineKind, PreviewLine, PreviewSpan, SpanStyle};

/// Wrap logical blocks into display lines no wider than `width` columns.
///
/// Code blocks are not wrapped; the pane clips them. Rules stretch to the
/// full width.
pub fn wrap_blocks(blocks: &[Block], width: usize) -> Vec<PreviewLine> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for block in blocks {
        match block.kind {
            LineKind::Empty => lines.push(PreviewLine {
                kind: LineKind::Empty,
                spans: Vec::new(),
            }),
            LineKind::Rule => {
                let used = block.prefix.width();
                let mut spans = prefix_spans(&block.prefix);
                spans.push(PreviewSpan::plain("─".repeat(width.saturating_sub(used))));
                lines.push(PreviewLine {
                    kind: LineKind::Rule,
                    spans,
                });
            }
            LineKind::CodeBlock => {
                let mut spans = prefix_spans(&block.prefix);
                spans.extend(block.spans.iter().cloned());
                lines.push(PreviewLine {
                    kind: LineKind::CodeBlock,
                    spans,
                });
            }
            _ => wrap_block(block, width, &mut lines),
        }
    }
    lines
}

fn prefix_spans(prefix: &str) -> Vec<PreviewSpan> {
    if prefix.is_empty() {
        Vec::new()
    } else {
        vec![PreviewSpan::plain(prefix)]
    }
}

/// A word or a whitespace run, with its style.
struct Piece<'a> {
    text: &'a str,
    style: SpanStyle,
    space: bool,
}

fn pieces(spans: &[PreviewSpan]) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    for span in spans {
        let mut start = 0;
        let mut in_space: Option<bool> = None;
        for (idx, ch) in span.text.char_indices() {
            let space = ch.is_whitespace() && ch != '\u{a0}';
            if in_space.is_some_and(|prev| prev != space) {
                out.push(Piece {
                    text: &span.text[start..idx],
                    style: span.style,
                    space: !space,
                });
                start = idx;
            }
            in_space = Some(space);
        }
        if let Some(space) = in_space {
            out.push(Piece {
                text: &span.text[start..],
                style: span.style,
                space,
            });
        }
    }
    out
}

struct LineBuilder<'a> {
    kind: LineKind,
    width: usize,
    continuation: &'a str,
    spans: Vec<PreviewSpan>,
    used: usize,
    has_content: bool,
    /// Whitespace waiting for the next word on the same line.
    pending_space: Option<SpanStyle>,
}

impl<'a> LineBuilder<'a> {
    fn new(block: &'a Block, width: usize) -> Self {
        let mut builder = Self {
            kind: block.kind,
            width,
            continuation: &block.continuation,
            spans: Vec::new(),
            used: 0,
            has_content: false,
            pending_space: None,
        };
        builder.start_line(&block.prefix);
        builder
    }

    fn start_line(&mut self, prefix: &str) {
        self.spans = prefix_spans(prefix);
        self.used = prefix.width();
        self.has_content = false;
        self.pending_space = None;
    }

    fn push(&mut self, text: &str, style: SpanStyle) {
        self.used += text.width();
        if let Some(last) = self.spans.last_mut()
            && last.style == style
            && self.has_content
        {
            last.text.push_str(text);
        } else {
            self.spans.push(PreviewSpan::new(text, style));
        }
        self.has_content = true;
    }

    fn break_line(&mut self, lines: &mut Vec<PreviewLine>) {
        let spans = std::mem::take(&mut self.spans);
        lines.push(PreviewLine {
            kind: self.kind,
            spans,
        });
        let continuation = self.continuation;
        self.start_line(continuation);
    }

    fn word(&mut self, text: &str, style: SpanStyle, lines: &mut Vec<PreviewLine>) {
        let word_width = text.width();
        let space = usize::from(self.pending_space.is_some() && self.has_content);
        if self.has_content && self.used + space + word_width > self.width {
            self.break_line(lines);
        }
        if self.has_content
            && let Some(space_style) = self.pending_space.take()
        {
            self.push(" ", space_style);
        }
        self.pending_space = None;

        if self.used + word_width <= self.width {
            self.push(text, style);
            return;
        }
        // Longer than a whole line: split by display width.
        let mut chunk = String::new();
        let mut chunk_width = 0;
        for ch in text.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if self.used + chunk_width + ch_width > self.width
                && (chunk_width > 0 || self.has_content)
            {
                if !chunk.is_empty() {
                    self.push(&chunk, style);
                }
                self.break_line(lines);
                chunk.clear();
                chunk_width = 0;
            }
            chunk.push(ch);
            chunk_width += ch_width;
        }
        if !chunk.is_empty() {
            self.push(&chunk, style);
        }
    }

    fn finish(mut self, lines: &mut Vec<PreviewLine>) {
        if self.has_content || !self.spans.is_empty() {
            let spans = std::mem::take(&mut self.spans);
            lines.push(PreviewLine {
                kind: self.kind,
                spans,
            });
        }
    }
}

fn wrap_block(block: &Block, width: usize, lines: &mut Vec<PreviewLine>) {
    let mut builder = LineBuilder::new(block, width);
    for piece in pieces(&block.spans) {
        if piece.space {
            if builder.has_content {
                builder.pending_space = Some(piece.style);
            }
        } else {
            builder.word(piece.text, piece.style, lines);
        }
    }
    builder.finish(lines);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> Block {
        let mut block = Block::new(LineKind::Paragraph);
        block.push_text(text, SpanStyle::default());
        block
    }

    fn texts(lines: &[PreviewLine]) -> Vec<String> {
        lines.iter().map(PreviewLine::text).collect()
    }

    #[test]
    fn test_short_paragraph_is_one_line() {
        let lines = wrap_blocks(&[paragraph("hello world")], 40);
        assert_eq!(texts(&lines), vec!["hello world"]);
    }

    #[test]
    fn test_wraps_at_word_boundaries() {
        let lines = wrap_blocks(&[paragraph("aaa bbb ccc ddd")], 7);
        assert_eq!(texts(&lines), vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_collapses_runs_of_spaces() {
        let lines = wrap_blocks(&[paragraph("a    b")], 40);
        assert_eq!(texts(&lines), vec!["a b"]);
    }

    #[test]
    fn test_splits_words_longer_than_width() {
        let lines = wrap_blocks(&[paragraph("abcdefghij")], 4);
        assert_eq!(texts(&lines), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wide_characters_count_double() {
        let lines = wrap_blocks(&[paragraph("日本語 日本語")], 6);
        assert_eq!(texts(&lines), vec!["日本語", "日本語"]);
    }

    #[test]
    fn test_list_item_continuation_indent() {
        let mut block = Block::new(LineKind::ListItem);
        block.prefix = "• ".to_string();
        block.continuation = "  ".to_string();
        block.push_text("one two three", SpanStyle::default());
        let lines = wrap_blocks(&[block], 9);
        assert_eq!(texts(&lines), vec!["• one two", "  three"]);
        assert!(lines.iter().all(|line| line.kind == LineKind::ListItem));
    }

    #[test]
    fn test_styles_survive_wrapping() {
        let mut block = Block::new(LineKind::Paragraph);
        block.push_text("plain ", SpanStyle::default());
        let bold = SpanStyle {
            strong: true,
            ..SpanStyle::default()
        };
        block.push_text("bold words", bold);
        let lines = wrap_blocks(&[block], 11);
        assert_eq!(texts(&lines), vec!["plain bold", "words"]);
        assert!(lines[1].spans[0].style.strong);
        assert_eq!(lines[0].spans.last().unwrap().text, "bold");
    }

    #[test]
    fn test_rule_fills_width() {
        let lines = wrap_blocks(&[Block::new(LineKind::Rule)], 5);
        assert_eq!(texts(&lines), vec!["─────"]);
    }

    #[test]
    fn test_code_lines_are_not_wrapped() {
        let mut block = Block::new(LineKind::CodeBlock);
        block.prefix = "  ".to_string();
        block.push_text("let long_line = 1;", SpanStyle::default());
        let lines = wrap_blocks(&[block], 5);
        assert_eq!(texts(&lines), vec!["  let long_line = 1;"]);
    }

    #[test]
    fn test_no_line_exceeds_width() {
        let text = "The quick brown fox jumps over the lazy dog, twice, and then thrice.";
        for width in 1..30 {
            for line in wrap_blocks(&[paragraph(text)], width) {
                assert!(line.text().width() <= width, "width {width}: {:?}", line.text());
            }
        }
    }
}
