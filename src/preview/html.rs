//! HTML to preview blocks.
//!
//! Understands the tag set comrak emits: headings, paragraphs, emphasis,
//! code, fenced blocks, quotes, lists (with task checkboxes), links,
//! images, rules, tables and line breaks. Unknown tags are dropped and
//! their text kept.

use super::{Block, LineKind, SpanStyle};

/// Convert rendered HTML into logical preview blocks.
pub fn html_to_blocks(html: &str) -> Vec<Block> {
    let mut converter = Converter::default();
    for token in Tokenizer::new(html) {
        converter.feed(token);
    }
    converter.finish()
}

#[derive(Debug, PartialEq, Eq)]
enum Token<'a> {
    Start { name: String, attrs: &'a str },
    End { name: String },
    Text(&'a str),
}

struct Tokenizer<'a> {
    rest: &'a str,
}

impl<'a> Tokenizer<'a> {
    const fn new(html: &'a str) -> Self {
        Self { rest: html }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.rest.is_empty() {
                return None;
            }
            if let Some(comment) = self.rest.strip_prefix("<!--") {
                self.rest = comment
                    .find("-->")
                    .map_or("", |end| &comment[end + 3..]);
                continue;
            }
            if self.rest.starts_with('<')
                && let Some(close) = self.rest.find('>')
            {
                let body = &self.rest[1..close];
                self.rest = &self.rest[close + 1..];
                if let Some(name) = body.strip_prefix('/') {
                    return Some(Token::End {
                        name: name.trim().to_ascii_lowercase(),
                    });
                }
                let body = body.strip_suffix('/').unwrap_or(body);
                let (name, attrs) = body
                    .split_once(char::is_whitespace)
                    .unwrap_or((body, ""));
                if name.is_empty() || name.starts_with('!') || name.starts_with('?') {
                    continue;
                }
                return Some(Token::Start {
                    name: name.to_ascii_lowercase(),
                    attrs,
                });
            }
            // Text runs to the next tag; a lone '<' with no '>' is text.
            let first = self.rest.chars().next().map_or(1, char::len_utf8);
            let end = self.rest[first..]
                .find('<')
                .map_or(self.rest.len(), |i| i + first);
            let text = &self.rest[..end];
            self.rest = &self.rest[end..];
            return Some(Token::Text(text));
        }
    }
}

/// Value of `name="..."` (or single-quoted) in a tag's attribute string.
fn attr<'a>(attrs: &'a str, name: &str) -> Option<&'a str> {
    let mut search = attrs;
    while let Some(pos) = search.find(name) {
        let preceded_ok = pos == 0
            || search[..pos]
                .chars()
                .next_back()
                .is_some_and(char::is_whitespace);
        let after = search[pos + name.len()..].trim_start();
        if preceded_ok && let Some(value) = after.strip_prefix('=') {
            let value = value.trim_start();
            let quote = value.chars().next()?;
            if quote == '"' || quote == '\'' {
                let inner = &value[1..];
                return inner.find(quote).map(|end| &inner[..end]);
            }
            let end = value
                .find(|c: char| c.is_whitespace() || c == '>')
                .unwrap_or(value.len());
            return Some(&value[..end]);
        }
        search = &search[pos + name.len()..];
    }
    None
}

fn has_attr(attrs: &str, name: &str) -> bool {
    attrs
        .split_whitespace()
        .any(|part| part == name || part.starts_with(&format!("{name}=")))
}

/// Decode the entities comrak writes plus numeric references.
fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => entity.strip_prefix('#').and_then(|num| {
                    let code = match num.strip_prefix(['x', 'X']) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => num.parse().ok(),
                    };
                    code.and_then(char::from_u32)
                }),
            };
            ch.map(|ch| (ch, semi))
        });
        if let Some((ch, semi)) = decoded {
            out.push(ch);
            rest = &tail[semi + 1..];
        } else {
            out.push('&');
            rest = &tail[1..];
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy)]
struct ListState {
    ordered: bool,
    next: u64,
}

#[derive(Debug)]
struct CodeState {
    language: Option<String>,
    text: String,
}

#[derive(Debug, Default)]
struct Converter {
    blocks: Vec<Block>,
    current: Option<Block>,
    strong: usize,
    emphasis: usize,
    code: usize,
    strike: usize,
    link: usize,
    quote_depth: usize,
    lists: Vec<ListState>,
    /// A list item marker that has not been printed yet.
    item_open: bool,
    pre: Option<CodeState>,
    in_row: bool,
    in_cell: bool,
    cells_in_row: usize,
    header_cell: bool,
}

impl Converter {
    fn feed(&mut self, token: Token<'_>) {
        match token {
            Token::Start { name, attrs } => self.start(&name, attrs),
            Token::End { name } => self.end(&name),
            Token::Text(text) => self.text(text),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        while self
            .blocks
            .last()
            .is_some_and(|block| block.kind == LineKind::Empty)
        {
            self.blocks.pop();
        }
        self.blocks
    }

    fn style(&self) -> SpanStyle {
        SpanStyle {
            strong: self.strong > 0 || self.header_cell,
            emphasis: self.emphasis > 0,
            code: self.code > 0,
            strikethrough: self.strike > 0,
            link: self.link > 0,
            fg: None,
        }
    }

    fn quote_prefix(&self) -> String {
        "│ ".repeat(self.quote_depth)
    }

    /// Indentation for content nested in the open lists.
    fn nested_indent(&self) -> String {
        format!("{}{}", self.quote_prefix(), "  ".repeat(self.lists.len()))
    }

    fn start(&mut self, name: &str, attrs: &str) {
        match name {
            "p" => self.open_block(LineKind::Paragraph),
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                self.open_block(LineKind::Heading(level));
            }
            "blockquote" => {
                self.flush();
                self.quote_depth += 1;
            }
            "ul" | "ol" => {
                self.flush();
                let next = attr(attrs, "start")
                    .and_then(|start| start.parse().ok())
                    .unwrap_or(1);
                self.lists.push(ListState {
                    ordered: name == "ol",
                    next,
                });
            }
            "li" => self.open_list_item(),
            "pre" => {
                self.flush();
                self.pre = Some(CodeState {
                    language: None,
                    text: String::new(),
                });
            }
            "code" => {
                if let Some(pre) = self.pre.as_mut() {
                    pre.language = attr(attrs, "class")
                        .and_then(|class| {
                            class
                                .split_whitespace()
                                .find_map(|c| c.strip_prefix("language-"))
                        })
                        .map(str::to_string);
                } else {
                    self.code += 1;
                }
            }
            "strong" | "b" => self.strong += 1,
            "em" | "i" => self.emphasis += 1,
            "del" | "s" | "strike" => self.strike += 1,
            "a" => self.link += 1,
            "br" => self.hard_break(),
            "hr" => {
                self.flush();
                let mut rule = Block::new(LineKind::Rule);
                rule.prefix = self.quote_prefix();
                self.blocks.push(rule);
                self.push_blank();
            }
            "img" => {
                let alt = attr(attrs, "alt").map(decode_entities).unwrap_or_default();
                let label = if alt.is_empty() {
                    "[image]".to_string()
                } else {
                    format!("[image: {alt}]")
                };
                let style = SpanStyle {
                    link: true,
                    ..self.style()
                };
                self.inline_block().push_text(&label, style);
            }
            "input" if attr(attrs, "type") == Some("checkbox") => {
                let marker = if has_attr(attrs, "checked") {
                    "[x]"
                } else {
                    "[ ]"
                };
                let style = self.style();
                self.inline_block().push_text(marker, style);
            }
            "table" => self.flush(),
            "tr" => {
                self.flush();
                self.in_row = true;
                self.cells_in_row = 0;
                self.open_block(LineKind::Table);
            }
            "th" | "td" => {
                self.in_cell = true;
                self.header_cell = name == "th";
                if self.cells_in_row > 0 {
                    self.inline_block().push_text(" │ ", SpanStyle::default());
                }
                self.cells_in_row += 1;
            }
            _ => {}
        }
    }

    fn end(&mut self, name: &str) {
        match name {
            "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                self.flush();
                if self.lists.is_empty() {
                    self.push_blank();
                }
            }
            "blockquote" => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.push_blank();
            }
            "ul" | "ol" => {
                self.flush();
                self.lists.pop();
                self.item_open = false;
                if self.lists.is_empty() {
                    self.push_blank();
                }
            }
            "li" => {
                self.flush();
                self.item_open = false;
            }
            "pre" => self.close_code_block(),
            "code" => {
                if self.pre.is_none() {
                    self.code = self.code.saturating_sub(1);
                }
            }
            "strong" | "b" => self.strong = self.strong.saturating_sub(1),
            "em" | "i" => self.emphasis = self.emphasis.saturating_sub(1),
            "del" | "s" | "strike" => self.strike = self.strike.saturating_sub(1),
            "a" => self.link = self.link.saturating_sub(1),
            "th" | "td" => {
                self.in_cell = false;
                self.header_cell = false;
            }
            "tr" => {
                self.flush();
                self.in_row = false;
            }
            "table" => {
                self.flush();
                self.push_blank();
            }
            _ => {}
        }
    }

    fn text(&mut self, raw: &str) {
        if let Some(pre) = self.pre.as_mut() {
            pre.text.push_str(&decode_entities(raw));
            return;
        }
        // Layout whitespace between table cells.
        if self.in_row && !self.in_cell {
            return;
        }
        let decoded = decode_entities(raw).replace('\n', " ");
        let fresh = self.current.as_ref().is_none_or(|block| !block.has_text());
        let text = if fresh {
            decoded.trim_start()
        } else {
            decoded.as_str()
        };
        if text.trim().is_empty() && self.current.is_none() {
            return;
        }
        if text.is_empty() {
            return;
        }
        let style = self.style();
        self.inline_block().push_text(text, style);
    }

    /// Start a block. An unprinted list marker is kept for the block's
    /// first line, which is how loose list items (`<li><p>`) render.
    fn open_block(&mut self, kind: LineKind) {
        if self.item_open
            && let Some(block) = self.current.as_mut()
            && !block.has_text()
        {
            if kind != LineKind::Paragraph {
                block.kind = kind;
            }
            return;
        }
        self.flush();
        let mut block = Block::new(self.kind_in_context(kind));
        let indent = self.nested_indent();
        block.prefix.clone_from(&indent);
        block.continuation = indent;
        self.current = Some(block);
    }

    fn open_list_item(&mut self) {
        self.flush();
        let depth = self.lists.len().saturating_sub(1);
        let marker = match self.lists.last_mut() {
            Some(list) if list.ordered => {
                let marker = format!("{}. ", list.next);
                list.next += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        let indent = format!("{}{}", self.quote_prefix(), "  ".repeat(depth));
        let mut block = Block::new(LineKind::ListItem);
        block.continuation = format!(
            "{indent}{}",
            " ".repeat(unicode_width::UnicodeWidthStr::width(marker.as_str()))
        );
        block.prefix = format!("{indent}{marker}");
        self.current = Some(block);
        self.item_open = true;
    }

    fn kind_in_context(&self, kind: LineKind) -> LineKind {
        if self.quote_depth > 0 && kind == LineKind::Paragraph {
            LineKind::Quote
        } else {
            kind
        }
    }

    /// The block inline content goes into, opening a paragraph if needed.
    fn inline_block(&mut self) -> &mut Block {
        if self.current.is_none() {
            self.open_block(LineKind::Paragraph);
        }
        self.current.get_or_insert_with(|| Block::new(LineKind::Paragraph))
    }

    fn hard_break(&mut self) {
        let Some(mut block) = self.current.take() else {
            return;
        };
        trim_trailing_whitespace(&mut block);
        let mut next = Block::new(block.kind);
        next.prefix.clone_from(&block.continuation);
        next.continuation.clone_from(&block.continuation);
        self.blocks.push(block);
        self.current = Some(next);
    }

    fn close_code_block(&mut self) {
        let Some(code) = self.pre.take() else {
            return;
        };
        let indent = format!("{}  ", self.nested_indent());
        let text = code.text.strip_suffix('\n').unwrap_or(&code.text);
        for spans in crate::highlight::highlight_code(code.language.as_deref(), text) {
            let mut block = Block::new(LineKind::CodeBlock);
            block.prefix.clone_from(&indent);
            block.continuation.clone_from(&indent);
            block.spans = spans;
            self.blocks.push(block);
        }
        if self.lists.is_empty() {
            self.push_blank();
        }
    }

    fn flush(&mut self) {
        if let Some(mut block) = self.current.take() {
            trim_trailing_whitespace(&mut block);
            // An item whose marker never got text (e.g. it only holds a
            // nested list) still shows its marker.
            if block.has_text() || block.kind == LineKind::ListItem {
                self.blocks.push(block);
            }
        }
        self.item_open = false;
    }

    fn push_blank(&mut self) {
        if self
            .blocks
            .last()
            .is_some_and(|block| block.kind != LineKind::Empty)
        {
            self.blocks.push(Block::empty());
        }
    }
}

fn trim_trailing_whitespace(block: &mut Block) {
    while let Some(last) = block.spans.last_mut() {
        let kept = last.text.trim_end().len();
        last.text.truncate(kept);
        if !last.text.is_empty() {
            break;
        }
        block.spans.pop();
    }
}
