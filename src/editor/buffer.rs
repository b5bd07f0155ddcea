use ropey::Rope;

/// Cursor position in the editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based column, counted in chars within the line.
    pub col: usize,
    /// Column to aim for when moving vertically through shorter lines.
    goal_col: usize,
}

impl Cursor {
    pub const fn at(line: usize, col: usize) -> Self {
        Self {
            line,
            col,
            goal_col: col,
        }
    }

    const fn set_col(&mut self, col: usize) {
        self.col = col;
        self.goal_col = col;
    }
}

/// Direction for cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// The editor pane's text, backed by a rope.
///
/// Every edit returns `true` when the text actually changed so the caller
/// knows to push the new contents into the document.
pub struct EditorBuffer {
    rope: Rope,
    cursor: Cursor,
}

impl EditorBuffer {
    pub fn from_text(text: &str) -> Self {
        Self {
            rope: Rope::from_str(&normalize_newlines(text)),
            cursor: Cursor::default(),
        }
    }

    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// A line without its trailing newline.
    pub fn line_at(&self, line_idx: usize) -> Option<String> {
        if line_idx >= self.rope.len_lines() {
            return None;
        }
        let mut line = self.rope.line(line_idx).to_string();
        if line.ends_with('\n') {
            line.pop();
        }
        Some(line)
    }

    /// Length of a line in chars, newline excluded.
    pub fn line_len(&self, line_idx: usize) -> usize {
        if line_idx >= self.rope.len_lines() {
            return 0;
        }
        let line = self.rope.line(line_idx);
        let len = line.len_chars();
        if len > 0 && line.char(len - 1) == '\n' {
            len - 1
        } else {
            len
        }
    }

    /// The full text.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn insert_char(&mut self, ch: char) -> bool {
        if ch == '\n' {
            return self.split_line();
        }
        if ch == '\r' {
            return false;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, ch);
        self.cursor.set_col(self.cursor.col + 1);
        true
    }

    /// Insert pasted text at the cursor. Carriage returns are folded into
    /// plain newlines.
    pub fn insert_str(&mut self, s: &str) -> bool {
        let text = normalize_newlines(s);
        if text.is_empty() {
            return false;
        }
        let idx = self.cursor_char_idx();
        self.rope.insert(idx, &text);
        let end = idx + text.chars().count();
        self.place_cursor_at_char(end);
        true
    }

    /// Break the line at the cursor (Enter).
    pub fn split_line(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        self.rope.insert_char(idx, '\n');
        self.cursor.line += 1;
        self.cursor.set_col(0);
        true
    }

    /// Backspace. Joins with the previous line at column 0.
    pub fn delete_back(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx == 0 {
            return false;
        }
        self.rope.remove(idx - 1..idx);
        self.place_cursor_at_char(idx - 1);
        true
    }

    /// Delete. Joins with the next line at end of line.
    pub fn delete_forward(&mut self) -> bool {
        let idx = self.cursor_char_idx();
        if idx >= self.rope.len_chars() {
            return false;
        }
        self.rope.remove(idx..=idx);
        true
    }

    pub fn move_cursor(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                let idx = self.cursor_char_idx();
                if idx > 0 {
                    self.place_cursor_at_char(idx - 1);
                }
            }
            Direction::Right => {
                let idx = self.cursor_char_idx();
                if idx < self.rope.len_chars() {
                    self.place_cursor_at_char(idx + 1);
                }
            }
            Direction::Up => {
                if self.cursor.line > 0 {
                    self.cursor.line -= 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
            Direction::Down => {
                if self.cursor.line + 1 < self.line_count() {
                    self.cursor.line += 1;
                    self.cursor.col = self.cursor.goal_col.min(self.line_len(self.cursor.line));
                }
            }
        }
    }

    pub const fn move_home(&mut self) {
        self.cursor.set_col(0);
    }

    pub fn move_end(&mut self) {
        self.cursor.set_col(self.line_len(self.cursor.line));
    }

    /// Jump to the start of the previous word (Ctrl+Left).
    pub fn move_word_left(&mut self) {
        let mut idx = self.cursor_char_idx();
        while idx > 0 && !is_word_char(self.rope.char(idx - 1)) {
            idx -= 1;
        }
        while idx > 0 && is_word_char(self.rope.char(idx - 1)) {
            idx -= 1;
        }
        self.place_cursor_at_char(idx);
    }

    /// Jump past the current word and the gap after it (Ctrl+Right).
    pub fn move_word_right(&mut self) {
        let len = self.rope.len_chars();
        let mut idx = self.cursor_char_idx();
        while idx < len && is_word_char(self.rope.char(idx)) {
            idx += 1;
        }
        while idx < len && !is_word_char(self.rope.char(idx)) {
            idx += 1;
        }
        self.place_cursor_at_char(idx);
    }

    /// Move to a line and column, clamped to the buffer.
    pub fn move_to(&mut self, line: usize, col: usize) {
        self.cursor.line = line.min(self.line_count().saturating_sub(1));
        self.cursor.set_col(col.min(self.line_len(self.cursor.line)));
    }

    pub const fn move_to_start(&mut self) {
        self.cursor = Cursor::at(0, 0);
    }

    pub fn move_to_end(&mut self) {
        let last = self.line_count().saturating_sub(1);
        self.cursor = Cursor::at(last, self.line_len(last));
    }

    fn cursor_char_idx(&self) -> usize {
        let line = self.cursor.line.min(self.line_count().saturating_sub(1));
        self.rope.line_to_char(line) + self.cursor.col.min(self.line_len(line))
    }

    fn place_cursor_at_char(&mut self, idx: usize) {
        let idx = idx.min(self.rope.len_chars());
        let line = self.rope.char_to_line(idx);
        let col = idx - self.rope.line_to_char(line);
        self.cursor = Cursor::at(line, col);
    }
}

impl Default for EditorBuffer {
    fn default() -> Self {
        Self::from_text("")
    }
}

impl std::fmt::Debug for EditorBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorBuffer")
            .field("lines", &self.rope.len_lines())
            .field("cursor", &self.cursor)
            .finish()
    }
}

fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

fn normalize_newlines(text: &str) -> String {
    if text.contains('\r') {
        text.replace("\r\n", "\n").replace('\r', "\n")
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_has_one_line() {
        let buf = EditorBuffer::default();
        assert_eq!(buf.line_count(), 1);
        assert_eq!(buf.line_at(0), Some(String::new()));
        assert_eq!(buf.line_at(1), None);
    }

    #[test]
    fn test_from_text_preserves_content() {
        let buf = EditorBuffer::from_text("# Hello Markdown\nbody");
        assert_eq!(buf.line_count(), 2);
        assert_eq!(buf.line_at(0).as_deref(), Some("# Hello Markdown"));
        assert_eq!(buf.text(), "# Hello Markdown\nbody");
    }

    #[test]
    fn test_from_text_folds_crlf() {
        let buf = EditorBuffer::from_text("a\r\nb\rc");
        assert_eq!(buf.text(), "a\nb\nc");
    }

    #[test]
    fn test_insert_char_advances_cursor() {
        let mut buf = EditorBuffer::from_text("");
        assert!(buf.insert_char('h'));
        assert!(buf.insert_char('é'));
        assert_eq!(buf.text(), "hé");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_insert_carriage_return_is_ignored() {
        let mut buf = EditorBuffer::from_text("x");
        assert!(!buf.insert_char('\r'));
        assert_eq!(buf.text(), "x");
    }

    #[test]
    fn test_insert_str_multiline_moves_to_end_of_paste() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to(0, 1);
        assert!(buf.insert_str("1\r\n22\n333"));
        assert_eq!(buf.text(), "a1\n22\n333b");
        assert_eq!(buf.cursor(), Cursor::at(2, 3));
    }

    #[test]
    fn test_insert_empty_str_is_not_an_edit() {
        let mut buf = EditorBuffer::from_text("ab");
        assert!(!buf.insert_str(""));
    }

    #[test]
    fn test_split_line_at_cursor() {
        let mut buf = EditorBuffer::from_text("helloworld");
        buf.move_to(0, 5);
        buf.split_line();
        assert_eq!(buf.text(), "hello\nworld");
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
    }

    #[test]
    fn test_delete_back_joins_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(1, 0);
        assert!(buf.delete_back());
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_delete_back_at_start_does_nothing() {
        let mut buf = EditorBuffer::from_text("ab");
        assert!(!buf.delete_back());
        assert_eq!(buf.text(), "ab");
    }

    #[test]
    fn test_delete_back_removes_multibyte_char() {
        let mut buf = EditorBuffer::from_text("a✓b");
        buf.move_to(0, 2);
        buf.delete_back();
        assert_eq!(buf.text(), "ab");
        assert_eq!(buf.cursor(), Cursor::at(0, 1));
    }

    #[test]
    fn test_delete_forward_joins_next_line() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(0, 2);
        assert!(buf.delete_forward());
        assert_eq!(buf.text(), "abcd");
    }

    #[test]
    fn test_delete_forward_at_end_does_nothing() {
        let mut buf = EditorBuffer::from_text("ab");
        buf.move_to_end();
        assert!(!buf.delete_forward());
    }

    #[test]
    fn test_vertical_movement_remembers_column() {
        let mut buf = EditorBuffer::from_text("long line\nab\nanother long");
        buf.move_to(0, 7);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 2);
        buf.move_cursor(Direction::Down);
        assert_eq!(buf.cursor().col, 7);
    }

    #[test]
    fn test_horizontal_movement_wraps_lines() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(0, 2);
        buf.move_cursor(Direction::Right);
        assert_eq!(buf.cursor(), Cursor::at(1, 0));
        buf.move_cursor(Direction::Left);
        assert_eq!(buf.cursor(), Cursor::at(0, 2));
    }

    #[test]
    fn test_word_movement() {
        let mut buf = EditorBuffer::from_text("hello, big world");
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 7);
        buf.move_word_right();
        assert_eq!(buf.cursor().col, 11);
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 7);
        buf.move_word_left();
        assert_eq!(buf.cursor().col, 0);
    }

    #[test]
    fn test_home_end_and_buffer_bounds() {
        let mut buf = EditorBuffer::from_text("abc\ndefg");
        buf.move_end();
        assert_eq!(buf.cursor().col, 3);
        buf.move_home();
        assert_eq!(buf.cursor().col, 0);
        buf.move_to_end();
        assert_eq!(buf.cursor(), Cursor::at(1, 4));
        buf.move_to_start();
        assert_eq!(buf.cursor(), Cursor::at(0, 0));
    }

    #[test]
    fn test_move_to_clamps() {
        let mut buf = EditorBuffer::from_text("ab\ncd");
        buf.move_to(10, 10);
        assert_eq!(buf.cursor(), Cursor::at(1, 2));
    }
}
