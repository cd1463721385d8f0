// SPDX-License-Identifier: MIT
//
// Cell — one character position on screen.
//
// A Cell holds a Unicode codepoint, foreground and background colors, and a
// small set of text attributes. The renderer fills a grid of these and the
// diff renderer turns the changed ones into escape sequences.
//
// Wide characters (CJK, some emoji) occupy two columns. The first cell holds
// the codepoint; the second is a continuation cell (ch = 0) that carries the
// same colors so the background fills correctly.

use crate::color::CellColor;

// ─── Text Attributes ─────────────────────────────────────────────────────────

bitflags::bitflags! {
    /// Text attributes stored as a compact bitfield.
    ///
    /// Each flag maps to one SGR parameter:
    ///
    /// ```
    /// use tinyconf_term::cell::Attr;
    ///
    /// let style = Attr::BOLD | Attr::INVERSE;
    /// assert!(style.contains(Attr::INVERSE));
    /// assert!(!style.contains(Attr::DIM));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Attr: u8 {
        /// SGR 1 — increased intensity.
        const BOLD      = 1 << 0;
        /// SGR 2 — decreased intensity.
        const DIM       = 1 << 1;
        /// SGR 4 — single underline.
        const UNDERLINE = 1 << 2;
        /// SGR 7 — swap foreground and background.
        const INVERSE   = 1 << 3;
    }
}

// ─── Cell ────────────────────────────────────────────────────────────────────

/// A single terminal cell.
///
/// `ch` is a raw codepoint so that the continuation marker (`0`) fits in the
/// same field as real characters.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint to display. `0` marks a continuation cell.
    pub ch: u32,
    /// Foreground (text) color.
    pub fg: CellColor,
    /// Background color.
    pub bg: CellColor,
    /// Text attributes.
    pub attrs: Attr,
}

const CONTINUATION: u32 = 0;
const SPACE: u32 = b' ' as u32;

impl Cell {
    /// An empty cell: space character, default colors, no attributes.
    pub const EMPTY: Self = Self {
        ch: SPACE,
        fg: CellColor::Default,
        bg: CellColor::Default,
        attrs: Attr::empty(),
    };

    /// Create a cell with a character and default styling.
    #[inline]
    #[must_use]
    pub const fn new(ch: char) -> Self {
        Self {
            ch: ch as u32,
            fg: CellColor::Default,
            bg: CellColor::Default,
            attrs: Attr::empty(),
        }
    }

    /// Create a cell with full styling.
    #[inline]
    #[must_use]
    pub const fn styled(ch: char, fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: ch as u32,
            fg,
            bg,
            attrs,
        }
    }

    /// Create a continuation cell for the second column of a wide character.
    #[inline]
    #[must_use]
    pub const fn continuation(fg: CellColor, bg: CellColor, attrs: Attr) -> Self {
        Self {
            ch: CONTINUATION,
            fg,
            bg,
            attrs,
        }
    }

    /// Whether this is a continuation cell.
    #[inline]
    #[must_use]
    pub const fn is_continuation(self) -> bool {
        self.ch == CONTINUATION
    }

    /// The codepoint as a `char`. `None` for continuation cells.
    #[inline]
    #[must_use]
    pub const fn character(self) -> Option<char> {
        if self.ch == CONTINUATION {
            return None;
        }
        char::from_u32(self.ch)
    }
}

impl Default for Cell {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_continuation() {
            return write!(f, "Cell(continuation)");
        }
        let ch = char::from_u32(self.ch).unwrap_or('?');
        write!(f, "Cell({ch:?}")?;
        if !self.fg.is_default() {
            write!(f, ", fg={:?}", self.fg)?;
        }
        if !self.bg.is_default() {
            write!(f, ", bg={:?}", self.bg)?;
        }
        if !self.attrs.is_empty() {
            write!(f, ", {:?}", self.attrs)?;
        }
        write!(f, ")")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_is_small_and_copy() {
        assert!(std::mem::size_of::<Cell>() <= 16);
        let a = Cell::new('x');
        let b = a;
        assert_eq!(a, b);
    }

    #[test]
    fn default_cell_is_space() {
        let cell = Cell::default();
        assert_eq!(cell, Cell::EMPTY);
        assert_eq!(cell.character(), Some(' '));
        assert!(cell.attrs.is_empty());
    }

    #[test]
    fn styled_sets_everything() {
        let cell = Cell::styled('a', CellColor::Rgb(1, 2, 3), CellColor::Ansi256(4), Attr::BOLD);
        assert_eq!(cell.character(), Some('a'));
        assert_eq!(cell.fg, CellColor::Rgb(1, 2, 3));
        assert_eq!(cell.bg, CellColor::Ansi256(4));
        assert_eq!(cell.attrs, Attr::BOLD);
    }

    #[test]
    fn continuation_has_no_character() {
        let cell = Cell::continuation(CellColor::Default, CellColor::Rgb(0, 0, 0), Attr::empty());
        assert!(cell.is_continuation());
        assert_eq!(cell.character(), None);
        assert_eq!(cell.bg, CellColor::Rgb(0, 0, 0));
    }

    #[test]
    fn debug_omits_defaults() {
        assert_eq!(format!("{:?}", Cell::new('q')), "Cell('q')");
        let styled = Cell::styled('q', CellColor::Default, CellColor::Rgb(0, 0, 0), Attr::empty());
        assert_eq!(format!("{styled:?}"), "Cell('q', bg=#000000)");
        let cont = Cell::continuation(CellColor::Default, CellColor::Default, Attr::empty());
        assert_eq!(format!("{cont:?}"), "Cell(continuation)");
    }
}
