// SPDX-License-Identifier: MIT
//
// Output buffering and stateful cell rendering.
//
//   OutputBuffer accumulates a whole frame of bytes so it reaches the
//   terminal in one write() call.
//
//   CellWriter remembers the cursor position and SGR state it last emitted
//   and skips sequences that would not change anything.

use std::io::{self, Write};

use crate::ansi;
use crate::cell::{Attr, Cell};
use crate::color::CellColor;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates ANSI output for a single `write()`.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer (16 KB preallocated).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Write a codepoint as UTF-8. Invalid codepoints (and the continuation
    /// marker) come out as `?`.
    pub fn write_codepoint(&mut self, cp: u32) {
        match char::from_u32(cp).filter(|&ch| ch != '\0') {
            Some(ch) => {
                let mut enc = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut enc).as_bytes());
            }
            None => self.buf.push(b'?'),
        }
    }

    /// Clear the buffer, keeping its capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w`, flush it, and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── CellWriter ──────────────────────────────────────────────────────────────

/// SGR state as last sent. `None` colors mean "unknown, must send".
#[derive(Clone, Copy, PartialEq, Eq)]
struct Pen {
    fg: Option<CellColor>,
    bg: Option<CellColor>,
    attrs: Attr,
}

impl Pen {
    const UNKNOWN: Self = Self {
        fg: None,
        bg: None,
        attrs: Attr::empty(),
    };
}

/// Writes cells into an [`OutputBuffer`], remembering where the terminal
/// cursor is and what the pen looks like so repeated state is not re-sent.
///
/// Attributes cannot be switched off one at a time portably, so any change
/// away from a non-empty set goes through an SGR reset, which also makes
/// both colors unknown.
pub struct CellWriter {
    /// Cell the terminal cursor sits just after.
    last: Option<(u16, u16)>,
    pen: Pen,
}

impl CellWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last: None,
            pen: Pen::UNKNOWN,
        }
    }

    /// Forget the cursor and pen. Needed whenever something else wrote to
    /// the terminal in between.
    pub const fn reset_state(&mut self) {
        self.last = None;
        self.pen = Pen::UNKNOWN;
    }

    /// Whether `(x, y)` is where the terminal cursor already is.
    fn follows(&self, x: u16, y: u16) -> bool {
        matches!(self.last, Some((lx, ly)) if ly == y && lx.checked_add(1) == Some(x))
    }

    /// Emit one cell at `(x, y)`.
    pub fn render_cell(&mut self, out: &mut OutputBuffer, x: u16, y: u16, cell: &Cell) {
        let adjacent = self.follows(x, y);

        // A wide char already advanced the cursor over its second column.
        if cell.is_continuation() && adjacent {
            self.last = Some((x, y));
            return;
        }

        if !adjacent {
            ansi::cursor_to(out, x, y).ok();
        }
        self.set_pen(out, cell);

        if cell.is_continuation() {
            out.buf.push(b' ');
        } else {
            out.write_codepoint(cell.ch);
        }
        self.last = Some((x, y));
    }

    fn set_pen(&mut self, out: &mut OutputBuffer, cell: &Cell) {
        if self.pen.attrs != cell.attrs {
            if !self.pen.attrs.is_empty() {
                ansi::reset(out).ok();
                self.pen = Pen::UNKNOWN;
            }
            ansi::attrs(out, cell.attrs).ok();
            self.pen.attrs = cell.attrs;
        }

        if self.pen.fg != Some(cell.fg) {
            ansi::fg(out, cell.fg).ok();
            self.pen.fg = Some(cell.fg);
        }
        if self.pen.bg != Some(cell.bg) {
            ansi::bg(out, cell.bg).ok();
            self.pen.bg = Some(cell.bg);
        }
    }
}

impl Default for CellWriter {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
