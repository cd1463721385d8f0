//! Cursor and scroll state, and the mapping between buffer and screen.
//!
//! [`CursorViewport`] owns the logical cursor and the first visible line.
//! It never owns text: every method that needs line lengths borrows the
//! [`LineBuffer`]. Two invariants hold after [`reconcile`](CursorViewport::reconcile):
//!
//! - `cursor.line < line_count` and `cursor.col <= line_len(cursor.line)`
//! - `scroll <= max(0, line_count - height)` and the cursor line is visible
//!
//! Screen columns differ from char columns once tabs (4-column stops) or
//! wide characters appear; [`display_col`] and [`char_col_at`] convert.

use ropey::RopeSlice;
use unicode_width::UnicodeWidthChar;

use crate::buffer::LineBuffer;
use crate::position::Position;

/// Columns between tab stops.
pub const TAB_WIDTH: usize = 4;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Screen width of `ch` when it starts at display column `at`.
fn span(ch: char, at: usize) -> usize {
    if ch == '\t' {
        TAB_WIDTH - at % TAB_WIDTH
    } else {
        ch.width().unwrap_or(0)
    }
}

/// Display column of char column `col` in `line`.
///
/// Equals `col` for plain ASCII.
#[must_use]
pub fn display_col(line: RopeSlice<'_>, col: usize) -> usize {
    line.chars()
        .take(col)
        .fold(0, |at, ch| at + span(ch, at))
}

/// `line` with each tab replaced by spaces up to the next tab stop.
#[must_use]
pub fn expand_tabs(line: RopeSlice<'_>) -> String {
    let mut out = String::with_capacity(line.len_bytes());
    let mut at = 0;
    for ch in line.chars() {
        let width = span(ch, at);
        if ch == '\t' {
            out.extend(std::iter::repeat_n(' ', width));
        } else {
            out.push(ch);
        }
        at += width;
    }
    out
}

/// Char column whose glyph covers display column `target`, or the line
/// length when `target` lies past the end of the text.
#[must_use]
pub fn char_col_at(line: RopeSlice<'_>, target: usize) -> usize {
    let mut at = 0;
    for (i, ch) in line.chars().enumerate() {
        let width = span(ch, at);
        if target < at + width {
            return i;
        }
        at += width;
    }
    line.len_chars()
}

// ---------------------------------------------------------------------------
// CursorViewport
// ---------------------------------------------------------------------------

/// The cursor plus the vertical scroll offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorViewport {
    cursor: Position,
    scroll: usize,
    /// Visible height from the last reconcile; the PageUp/PageDown step.
    page: usize,
}

impl Default for CursorViewport {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorViewport {
    /// Cursor at the origin, no scroll.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cursor: Position::ZERO,
            scroll: 0,
            page: 1,
        }
    }

    /// The logical cursor.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Position {
        self.cursor
    }

    /// First visible line.
    #[inline]
    #[must_use]
    pub const fn scroll(&self) -> usize {
        self.scroll
    }

    /// Re-anchor the cursor, typically to the position a buffer edit
    /// returned. Clamping waits for the next [`reconcile`](Self::reconcile).
    #[inline]
    pub const fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }

    // -- Movement -----------------------------------------------------------

    /// One line up, column clamped to the new line.
    pub fn move_up(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.clamp_col(buf);
        }
    }

    /// One line down, column clamped to the new line.
    pub fn move_down(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        if self.cursor.line < buf.last_line() {
            self.cursor.line += 1;
            self.clamp_col(buf);
        }
    }

    /// One char left, wrapping to the end of the previous line.
    pub fn move_left(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        } else if self.cursor.line > 0 {
            self.cursor.line -= 1;
            self.cursor.col = buf.line_len(self.cursor.line);
        }
    }

    /// One char right, wrapping to the start of the next line.
    pub fn move_right(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        if self.cursor.col < buf.line_len(self.cursor.line) {
            self.cursor.col += 1;
        } else if self.cursor.line < buf.last_line() {
            self.cursor.line += 1;
            self.cursor.col = 0;
        }
    }

    /// Column 0 of the current line.
    pub fn move_line_start(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        self.cursor.col = 0;
    }

    /// After the last char of the current line.
    pub fn move_line_end(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        self.cursor.col = buf.line_len(self.cursor.line);
    }

    /// Up by one screenful.
    pub fn page_up(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        self.cursor.line = self.cursor.line.saturating_sub(self.page);
        self.clamp_col(buf);
    }

    /// Down by one screenful, stopping at the last line.
    pub fn page_down(&mut self, buf: &LineBuffer) {
        self.clamp_cursor(buf);
        self.cursor.line = (self.cursor.line + self.page).min(buf.last_line());
        self.clamp_col(buf);
    }

    // -- Viewport -----------------------------------------------------------

    /// Restore both invariants for a viewport `visible_height` lines tall.
    ///
    /// Clamps the scroll offset, clamps the cursor into the buffer, then
    /// scrolls just enough to show the cursor line. Running it twice
    /// changes nothing the second time. A zero height only clamps.
    pub fn reconcile(&mut self, buf: &LineBuffer, visible_height: usize) {
        let max_scroll = buf.line_count().saturating_sub(visible_height.max(1));
        self.scroll = self.scroll.min(max_scroll);
        self.clamp_cursor(buf);

        if visible_height == 0 {
            return;
        }
        self.page = visible_height;

        let line = self.cursor.line;
        if line < self.scroll {
            self.scroll = line;
        } else if line >= self.scroll + visible_height {
            self.scroll = line + 1 - visible_height;
        }
    }

    /// Screen `(row, col)` of the cursor with a gutter `gutter_width`
    /// columns wide. Row 0 is the first visible line.
    #[must_use]
    pub fn to_screen(&self, buf: &LineBuffer, gutter_width: usize) -> (usize, usize) {
        let line = self.cursor.line.min(buf.last_line());
        let text = buf.line(line);
        let col = self.cursor.col.min(text.len_chars());
        (
            line.saturating_sub(self.scroll),
            display_col(text, col) + gutter_width,
        )
    }

    /// Move the cursor to the text under screen cell
    /// (`screen_row`, `screen_col`).
    ///
    /// Returns `false`, leaving the cursor alone, for clicks on the status
    /// row or below the last line. Clicks in the gutter land on column 0;
    /// clicks past the end of a line land after its last char.
    pub fn click(
        &mut self,
        buf: &LineBuffer,
        screen_row: usize,
        screen_col: usize,
        gutter_width: usize,
        visible_height: usize,
    ) -> bool {
        if screen_row >= visible_height {
            return false;
        }
        let line = self.scroll + screen_row;
        if line >= buf.line_count() {
            return false;
        }
        let col = screen_col
            .checked_sub(gutter_width)
            .map_or(0, |target| char_col_at(buf.line(line), target));
        self.cursor = Position::new(line, col);
        true
    }

    // -- Internals ----------------------------------------------------------

    fn clamp_cursor(&mut self, buf: &LineBuffer) {
        self.cursor.line = self.cursor.line.min(buf.last_line());
        self.clamp_col(buf);
    }

    fn clamp_col(&mut self, buf: &LineBuffer) {
        self.cursor.col = self.cursor.col.min(buf.line_len(self.cursor.line));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ropey::Rope;

    fn buf(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines)
    }

    fn at(line: usize, col: usize) -> CursorViewport {
        let mut vp = CursorViewport::new();
        vp.set_cursor(Position::new(line, col));
        vp
    }

    // -- Column mapping -----------------------------------------------------

    #[test]
    fn display_col_ascii_is_identity() {
        let rope = Rope::from_str("hello");
        assert_eq!(display_col(rope.slice(..), 0), 0);
        assert_eq!(display_col(rope.slice(..), 3), 3);
        assert_eq!(display_col(rope.slice(..), 5), 5);
    }

    #[test]
    fn display_col_tabs_and_wide_chars() {
        let rope = Rope::from_str("a\tb中c");
        let line = rope.slice(..);
        assert_eq!(display_col(line, 1), 1);
        assert_eq!(display_col(line, 2), 4);
        assert_eq!(display_col(line, 3), 5);
        assert_eq!(display_col(line, 4), 7);
    }

    #[test]
    fn expand_tabs_fills_to_stops() {
        let rope = Rope::from_str("\tab\tc");
        assert_eq!(expand_tabs(rope.slice(..)), "    ab  c");
    }

    #[test]
    fn char_col_at_inverts_display_col() {
        let rope = Rope::from_str("a\tb中c");
        let line = rope.slice(..);
        assert_eq!(char_col_at(line, 0), 0);
        assert_eq!(char_col_at(line, 2), 1); // inside the tab
        assert_eq!(char_col_at(line, 4), 2);
        assert_eq!(char_col_at(line, 6), 3); // right half of 中
        assert_eq!(char_col_at(line, 7), 4);
        assert_eq!(char_col_at(line, 50), 5);
    }

    // -- Movement -----------------------------------------------------------

    #[test]
    fn vertical_moves_clamp_column() {
        let b = buf(&["long line", "ab", "longer line"]);
        let mut vp = at(0, 8);
        vp.move_down(&b);
        assert_eq!(vp.cursor(), Position::new(1, 2));
        vp.move_down(&b);
        assert_eq!(vp.cursor(), Position::new(2, 2));
        vp.move_down(&b);
        assert_eq!(vp.cursor(), Position::new(2, 2));
        vp.move_up(&b);
        vp.move_up(&b);
        vp.move_up(&b);
        assert_eq!(vp.cursor(), Position::new(0, 2));
    }

    #[test]
    fn left_wraps_to_previous_line_end() {
        let b = buf(&["abc", "d"]);
        let mut vp = at(1, 0);
        vp.move_left(&b);
        assert_eq!(vp.cursor(), Position::new(0, 3));
        let mut origin = at(0, 0);
        origin.move_left(&b);
        assert_eq!(origin.cursor(), Position::ZERO);
    }

    #[test]
    fn right_wraps_to_next_line_start() {
        let b = buf(&["ab", "c"]);
        let mut vp = at(0, 2);
        vp.move_right(&b);
        assert_eq!(vp.cursor(), Position::new(1, 0));
        vp.move_right(&b);
        vp.move_right(&b);
        assert_eq!(vp.cursor(), Position::new(1, 1));
    }

    #[test]
    fn home_and_end() {
        let b = buf(&["hello"]);
        let mut vp = at(0, 2);
        vp.move_line_end(&b);
        assert_eq!(vp.cursor(), Position::new(0, 5));
        vp.move_line_start(&b);
        assert_eq!(vp.cursor(), Position::ZERO);
    }

    #[test]
    fn paging_uses_reconciled_height() {
        let lines: Vec<String> = (0..30).map(|i| format!("line {i}")).collect();
        let b = LineBuffer::from_lines(&lines);
        let mut vp = CursorViewport::new();
        vp.reconcile(&b, 10);
        vp.page_down(&b);
        assert_eq!(vp.cursor().line, 10);
        vp.page_down(&b);
        vp.page_down(&b);
        assert_eq!(vp.cursor().line, 29);
        vp.page_up(&b);
        assert_eq!(vp.cursor().line, 19);
    }

    #[test]
    fn moves_clamp_a_stale_cursor_first() {
        let b = buf(&["x"]);
        let mut vp = at(7, 7);
        vp.move_right(&b);
        assert_eq!(vp.cursor(), Position::new(0, 1));
    }

    // -- reconcile ----------------------------------------------------------

    #[test]
    fn reconcile_scrolls_down_to_cursor() {
        let lines: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let b = LineBuffer::from_lines(&lines);
        let mut vp = at(15, 0);
        vp.reconcile(&b, 5);
        assert_eq!(vp.scroll(), 11);
        vp.set_cursor(Position::new(3, 0));
        vp.reconcile(&b, 5);
        assert_eq!(vp.scroll(), 3);
    }

    #[test]
    fn reconcile_clamps_scroll_after_lines_vanish() {
        let lines: Vec<String> = (0..20).map(|i| i.to_string()).collect();
        let mut vp = at(19, 0);
        vp.reconcile(&LineBuffer::from_lines(&lines), 5);
        assert_eq!(vp.scroll(), 15);

        let short = buf(&["a", "b", "c"]);
        vp.reconcile(&short, 5);
        assert_eq!(vp.scroll(), 0);
        assert_eq!(vp.cursor(), Position::new(2, 0));
    }

    #[test]
    fn reconcile_is_idempotent() {
        let lines: Vec<String> = (0..50).map(|i| "x".repeat(i)).collect();
        let b = LineBuffer::from_lines(&lines);
        let mut vp = at(42, 99);
        vp.reconcile(&b, 7);
        let once = vp.clone();
        vp.reconcile(&b, 7);
        assert_eq!(vp, once);
    }

    #[test]
    fn reconcile_zero_height_only_clamps() {
        let b = buf(&["a", "b"]);
        let mut vp = at(5, 5);
        vp.reconcile(&b, 0);
        assert_eq!(vp.cursor(), Position::new(1, 1));
        assert!(vp.scroll() <= 1);
    }

    // -- Screen mapping -----------------------------------------------------

    #[test]
    fn to_screen_adds_gutter_and_subtracts_scroll() {
        let lines: Vec<String> = (0..10).map(|_| "abcdef".to_string()).collect();
        let b = LineBuffer::from_lines(&lines);
        let mut vp = at(8, 3);
        vp.reconcile(&b, 4);
        assert_eq!(vp.to_screen(&b, 5), (3, 8));
    }

    #[test]
    fn to_screen_expands_tabs() {
        let b = buf(&["\tx"]);
        let vp = at(0, 1);
        assert_eq!(vp.to_screen(&b, 5), (0, 9));
    }

    #[test]
    fn click_maps_back_through_gutter_and_scroll() {
        let lines: Vec<String> = (0..10).map(|i| format!("row{i}")).collect();
        let b = LineBuffer::from_lines(&lines);
        let mut vp = at(9, 0);
        vp.reconcile(&b, 4);
        assert!(vp.click(&b, 1, 7, 5, 4));
        assert_eq!(vp.cursor(), Position::new(7, 2));
    }

    #[test]
    fn click_clamps_past_line_end_and_in_gutter() {
        let b = buf(&["ab", "cd"]);
        let mut vp = CursorViewport::new();
        assert!(vp.click(&b, 1, 40, 5, 10));
        assert_eq!(vp.cursor(), Position::new(1, 2));
        assert!(vp.click(&b, 0, 2, 5, 10));
        assert_eq!(vp.cursor(), Position::new(0, 0));
    }

    #[test]
    fn click_on_status_row_or_below_text_is_ignored() {
        let b = buf(&["ab"]);
        let mut vp = at(0, 1);
        assert!(!vp.click(&b, 4, 6, 5, 4));
        assert!(!vp.click(&b, 2, 6, 5, 4));
        assert_eq!(vp.cursor(), Position::new(0, 1));
    }

    #[test]
    fn to_screen_and_click_agree() {
        let b = buf(&["a\tb中c"]);
        for col in 0..=5 {
            let mut vp = at(0, col);
            let (row, x) = vp.to_screen(&b, 5);
            assert!(vp.click(&b, row, x, 5, 3));
            assert_eq!(vp.cursor().col, col);
        }
    }
}
