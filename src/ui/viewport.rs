//! Scroll state for a pane.

use std::ops::Range;

/// The visible window onto a list of lines.
///
/// Both panes use one: the preview scrolls freely, the editor scrolls just
/// enough to keep the cursor line in view.
///
/// ```
/// use mdpane::ui::viewport::Viewport;
///
/// let mut vp = Viewport::new(80, 10, 50);
/// vp.scroll_down(5);
/// assert_eq!(vp.visible_range(), 5..15);
/// vp.scroll_into_view(30);
/// assert_eq!(vp.visible_range(), 21..31);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    width: u16,
    height: u16,
    offset: usize,
    total_lines: usize,
}

impl Viewport {
    pub const fn new(width: u16, height: u16, total_lines: usize) -> Self {
        Self {
            width,
            height,
            offset: 0,
            total_lines,
        }
    }

    pub const fn offset(&self) -> usize {
        self.offset
    }

    pub const fn width(&self) -> u16 {
        self.width
    }

    pub const fn height(&self) -> u16 {
        self.height
    }

    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    /// Lines currently on screen, clamped to the content.
    pub fn visible_range(&self) -> Range<usize> {
        let end = (self.offset + usize::from(self.height)).min(self.total_lines);
        self.offset.min(end)..end
    }

    /// Scroll position as 0-100, for the status bar.
    pub fn scroll_percent(&self) -> u8 {
        let max = self.max_offset();
        if max == 0 {
            return 100;
        }
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        {
            ((self.offset as f64 / max as f64) * 100.0).round() as u8
        }
    }

    pub const fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
    }

    pub fn scroll_down(&mut self, n: usize) {
        self.offset = self.offset.saturating_add(n).min(self.max_offset());
    }

    pub const fn page_up(&mut self) {
        self.scroll_up(self.height as usize);
    }

    pub fn page_down(&mut self) {
        self.scroll_down(usize::from(self.height));
    }

    pub const fn go_to_top(&mut self) {
        self.offset = 0;
    }

    pub const fn go_to_bottom(&mut self) {
        self.offset = self.max_offset();
    }

    /// Scroll the least amount that puts `line` on screen.
    pub fn scroll_into_view(&mut self, line: usize) {
        let height = usize::from(self.height.max(1));
        if line < self.offset {
            self.offset = line;
        } else if line >= self.offset + height {
            self.offset = line + 1 - height;
        }
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn set_total_lines(&mut self, total: usize) {
        self.total_lines = total;
        self.offset = self.offset.min(self.max_offset());
    }

    const fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.height as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_at_top() {
        let vp = Viewport::new(80, 24, 100);
        assert_eq!(vp.offset(), 0);
        assert_eq!(vp.visible_range(), 0..24);
    }

    #[test]
    fn test_short_content_shows_everything() {
        let vp = Viewport::new(80, 24, 10);
        assert_eq!(vp.visible_range(), 0..10);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_scroll_down_clamps_to_last_page() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(1000);
        assert_eq!(vp.offset(), 76);
        assert_eq!(vp.scroll_percent(), 100);
    }

    #[test]
    fn test_paging() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.page_down();
        assert_eq!(vp.offset(), 24);
        vp.scroll_down(26);
        vp.page_up();
        assert_eq!(vp.offset(), 26);
        vp.go_to_bottom();
        assert_eq!(vp.offset(), 76);
        vp.go_to_top();
        assert_eq!(vp.offset(), 0);
    }

    #[test]
    fn test_scroll_into_view_moves_minimally() {
        let mut vp = Viewport::new(80, 10, 100);
        vp.scroll_into_view(5);
        assert_eq!(vp.offset(), 0);
        vp.scroll_into_view(10);
        assert_eq!(vp.offset(), 1);
        vp.scroll_into_view(40);
        assert_eq!(vp.offset(), 31);
        vp.scroll_into_view(35);
        assert_eq!(vp.offset(), 31);
        vp.scroll_into_view(3);
        assert_eq!(vp.offset(), 3);
    }

    #[test]
    fn test_shrinking_content_clamps_offset() {
        let mut vp = Viewport::new(80, 24, 100);
        vp.scroll_down(80);
        vp.set_total_lines(50);
        assert_eq!(vp.offset(), 26);
        vp.resize(80, 60);
        assert_eq!(vp.offset(), 0);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn offset_never_passes_last_page(
                total in 0..10_000usize,
                height in 1..100u16,
                amount in 0..20_000usize,
            ) {
                let mut vp = Viewport::new(80, height, total);
                vp.scroll_down(amount);
                prop_assert!(vp.offset() <= total.saturating_sub(usize::from(height)));
                let range = vp.visible_range();
                prop_assert!(range.start <= range.end);
                prop_assert!(range.end <= total);
                prop_assert!(vp.scroll_percent() <= 100);
            }

            #[test]
            fn scrolled_into_view_line_is_visible(
                total in 1..10_000usize,
                height in 1..100u16,
                start in 0..10_000usize,
                line_seed in 0..10_000usize,
            ) {
                let line = line_seed % total;
                let mut vp = Viewport::new(80, height, total);
                vp.scroll_down(start);
                vp.scroll_into_view(line);
                prop_assert!(vp.visible_range().contains(&line));
            }
        }
    }
}
