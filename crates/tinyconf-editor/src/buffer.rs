//! The document: an ordered, never-empty sequence of lines.
//!
//! `LineBuffer` wraps a [`ropey::Rope`] in which `\n` is the only line
//! separator (ropey is built without its CR and Unicode line-break features).
//! Lines are stored joined by `\n`, so the rope's line count is the
//! document's line count and the empty rope is one empty line.
//!
//! Every mutating method takes a [`Position`] and returns where the cursor
//! belongs afterwards. Positions must already be in range: an out-of-range
//! line or column is a caller bug and panics with a descriptive message.
//! Callers clamp through [`CursorViewport`](crate::viewport::CursorViewport)
//! first.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::Position;

// ---------------------------------------------------------------------------
// LineBuffer
// ---------------------------------------------------------------------------

/// Editable text lines plus the unsaved-changes flag.
#[derive(Clone, Default)]
pub struct LineBuffer {
    rope: Rope,
    modified: bool,
}

impl LineBuffer {
    // -- Construction -------------------------------------------------------

    /// One empty line, unmodified.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from already split lines. An empty slice gives one empty line.
    ///
    /// Lines should not contain `\n`; any that do become several lines.
    #[must_use]
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut rope = Rope::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                rope.insert_char(rope.len_chars(), '\n');
            }
            rope.insert(rope.len_chars(), line.as_ref());
        }
        Self {
            rope,
            modified: false,
        }
    }

    // -- Text access --------------------------------------------------------

    /// Number of lines. Always at least 1.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[inline]
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// Line `line` without its terminator.
    ///
    /// # Panics
    ///
    /// Panics if `line >= line_count()`.
    #[must_use]
    pub fn line(&self, line: usize) -> RopeSlice<'_> {
        self.check_line(line, "line");
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            slice.slice(..len - 1)
        } else {
            slice
        }
    }

    /// Length of line `line` in chars, excluding the terminator.
    ///
    /// # Panics
    ///
    /// Panics if `line >= line_count()`.
    #[must_use]
    pub fn line_len(&self, line: usize) -> usize {
        self.line(line).len_chars()
    }

    /// Line `line` as an owned string.
    ///
    /// # Panics
    ///
    /// Panics if `line >= line_count()`.
    #[must_use]
    pub fn line_text(&self, line: usize) -> String {
        self.line(line).to_string()
    }

    /// Owned snapshot of every line, for saving.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count()).map(|i| self.line_text(i)).collect()
    }

    // -- Editing ------------------------------------------------------------

    /// Insert `ch` at `pos`. Returns the position just after it.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range or `ch` is `'\n'`
    /// (use [`split_line`](Self::split_line)).
    pub fn insert_char(&mut self, pos: Position, ch: char) -> Position {
        assert!(ch != '\n', "insert_char cannot insert a line break; use split_line");
        let idx = self.char_idx(pos, "insert_char");
        self.rope.insert_char(idx, ch);
        self.modified = true;
        Position::new(pos.line, pos.col + 1)
    }

    /// Backspace at `pos`.
    ///
    /// Inside a line, removes the char before `pos`. At column 0, joins the
    /// line onto the previous one and returns the join point. At (0, 0) does
    /// nothing, leaves the modified flag alone, and returns `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    pub fn delete_backward(&mut self, pos: Position) -> Position {
        let idx = self.char_idx(pos, "delete_backward");
        let target = match (pos.line, pos.col) {
            (0, 0) => return pos,
            (line, 0) => Position::new(line - 1, self.line_len(line - 1)),
            (line, col) => Position::new(line, col - 1),
        };
        // Either the char before the cursor or the `\n` joining the lines.
        self.rope.remove(idx - 1..idx);
        self.modified = true;
        target
    }

    /// Break line `pos.line` at `pos.col`; the tail moves to a new line
    /// below. Returns the start of that new line.
    ///
    /// # Panics
    ///
    /// Panics if `pos` is out of range.
    pub fn split_line(&mut self, pos: Position) -> Position {
        let idx = self.char_idx(pos, "split_line");
        self.rope.insert_char(idx, '\n');
        self.modified = true;
        Position::new(pos.line + 1, 0)
    }

    // -- Metadata -----------------------------------------------------------

    /// True if the text changed since creation or the last save.
    #[inline]
    #[must_use]
    pub const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Clear the modified flag after a successful write.
    #[inline]
    pub const fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// Set the modified flag without editing.
    #[inline]
    pub const fn mark_modified(&mut self) {
        self.modified = true;
    }

    // -- Internals ----------------------------------------------------------

    fn check_line(&self, line: usize, op: &str) {
        assert!(
            line < self.line_count(),
            "{op}: line {line} out of range (buffer has {} lines)",
            self.line_count()
        );
    }

    fn char_idx(&self, pos: Position, op: &str) -> usize {
        self.check_line(pos.line, op);
        let len = self.line_len(pos.line);
        assert!(
            pos.col <= len,
            "{op}: column {} out of range (line {} has {len} chars)",
            pos.col,
            pos.line
        );
        self.rope.line_to_char(pos.line) + pos.col
    }
}

impl fmt::Debug for LineBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineBuffer")
            .field("lines", &self.line_count())
            .field("modified", &self.modified)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
