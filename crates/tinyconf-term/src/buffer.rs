// SPDX-License-Identifier: MIT
//
// FrameBuffer — the 2D cell grid a frame is painted into.
//
// The editor's renderer fills one of these per frame; the diff renderer
// compares it against the previous frame and writes only what changed.
//
// Flat `Vec<Cell>` with row-major indexing, so a row is a contiguous slice
// and the diff renderer can compare whole rows with one slice comparison.
//
// Every write is bounds-checked and reports whether it landed. Painting past
// the edge is never an error: a resize can shrink the grid between the time
// a frame is laid out and the time it is drawn.

use unicode_width::UnicodeWidthChar;

use crate::cell::{Attr, Cell};
use crate::color::CellColor;

// ─── FrameBuffer ────────────────────────────────────────────────────────────────

/// A 2D buffer of terminal cells.
///
/// ```
/// use tinyconf_term::buffer::FrameBuffer;
/// use tinyconf_term::cell::Cell;
///
/// let mut buf = FrameBuffer::new(80, 24);
/// assert!(buf.set(5, 3, Cell::new('X')));
/// assert!(!buf.set(80, 3, Cell::new('X')));
/// assert_eq!(buf.get(5, 3).unwrap().character(), Some('X'));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    // ─── Construction ────────────────────────────────────────────────────

    /// Create a buffer filled with empty cells.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self::filled(width, height, Cell::EMPTY)
    }

    /// Create a buffer where every cell is `cell`.
    #[must_use]
    pub fn filled(width: u16, height: u16, cell: Cell) -> Self {
        let size = usize::from(width) * usize::from(height);
        Self {
            width,
            height,
            cells: vec![cell; size],
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    /// Buffer width in columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Buffer height in rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Whether `(x, y)` is within the buffer.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Get a cell reference, or `None` if out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if self.in_bounds(x, y) {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// The raw cell slice.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// A single row as a slice. Returns `None` if `y` is out of bounds.
    #[inline]
    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.height {
            let start = self.index(0, y);
            Some(&self.cells[start..start + usize::from(self.width)])
        } else {
            None
        }
    }

    /// The characters of a row as a `String`, continuation cells skipped.
    ///
    /// Meant for tests and debugging; the hot path never allocates strings.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .map(|cells| cells.iter().filter_map(|c| c.character()).collect())
            .unwrap_or_default()
    }

    // ─── Clear & Resize ──────────────────────────────────────────────────

    /// Reset every cell to `cell`.
    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// Resize the buffer, clearing all content.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let size = usize::from(width) * usize::from(height);
        self.cells.clear();
        self.cells.resize(size, Cell::EMPTY);
    }

    /// Copy the contents of `other`, reusing this buffer's allocation.
    ///
    /// # Panics
    ///
    /// Panics if the two buffers differ in size.
    pub fn copy_from(&mut self, other: &Self) {
        assert!(
            self.width == other.width && self.height == other.height,
            "copy_from size mismatch"
        );
        self.cells.copy_from_slice(&other.cells);
    }

    // ─── Writing ─────────────────────────────────────────────────────────

    /// Write a cell. Returns `true` if the position was in bounds.
    #[inline]
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    /// Paint `text` left-to-right from `(x, y)`, stopping before column
    /// `limit` (or the buffer edge, whichever comes first).
    ///
    /// Wide characters take two cells, the second a continuation. A wide
    /// character that would straddle the limit is replaced by a space.
    /// Zero-width characters are skipped.
    ///
    /// Returns the number of columns consumed.
    #[allow(clippy::too_many_arguments)]
    pub fn put_str(
        &mut self,
        x: u16,
        y: u16,
        limit: u16,
        text: &str,
        fg: CellColor,
        bg: CellColor,
        attrs: Attr,
    ) -> u16 {
        if y >= self.height {
            return 0;
        }
        let limit = limit.min(self.width);
        let mut col = x;

        for ch in text.chars() {
            if col >= limit {
                break;
            }
            match char_width(ch) {
                0 => {}
                2 => {
                    if col + 1 >= limit {
                        self.set(col, y, Cell::styled(' ', fg, bg, attrs));
                        col += 1;
                        break;
                    }
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    self.set(col + 1, y, Cell::continuation(fg, bg, attrs));
                    col += 2;
                }
                _ => {
                    self.set(col, y, Cell::styled(ch, fg, bg, attrs));
                    col += 1;
                }
            }
        }

        col.saturating_sub(x)
    }
}

impl std::fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FrameBuffer({}x{})", self.width, self.height)
    }
}

// ─── Text Width Utilities ───────────────────────────────────────────────────────

/// Display width of a character in terminal columns.
///
/// 0 for control characters, 1 for most characters, 2 for wide ones.
///
/// ```
/// use tinyconf_term::buffer::char_width;
///
/// assert_eq!(char_width('a'), 1);
/// assert_eq!(char_width('中'), 2);
/// assert_eq!(char_width('\n'), 0);
/// ```
#[inline]
#[must_use]
pub fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// Display width of a string in terminal columns.
#[must_use]
pub fn string_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

// ─── Tests ──────────────────────────────────────────────────────────────────────
