// SPDX-License-Identifier: MIT
//
// Differential renderer.
//
// Compares the current FrameBuffer with the previous one and emits escape
// sequences only for the cells that changed. A keystroke in the editor
// usually touches one text row and the status row, so most frames are a
// few dozen bytes.
//
// Per frame:
//
//   1. The renderer paints a FrameBuffer.
//   2. DiffRenderer::render compares it against the stored previous frame
//      and feeds changed cells to CellWriter, all into an OutputBuffer.
//   3. The hardware cursor is placed (or hidden) at the end of the frame.
//   4. flush_to issues one write() to the terminal.
//
// Unchanged rows are skipped with a single slice comparison. The previous
// frame's allocation is reused while the size stays the same.

use std::io::{self, Write};

use crate::ansi::{self, DecMode};
use crate::buffer::FrameBuffer;
use crate::output::{CellWriter, OutputBuffer};

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// Statistics from a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// Cells that differed from the previous frame and were written.
    pub cells_rendered: usize,
    /// Cells that matched the previous frame and were skipped.
    pub cells_skipped: usize,
    /// Total bytes of output generated.
    pub bytes_written: usize,
}

// ─── DiffRenderer ────────────────────────────────────────────────────────────

/// Differential renderer that emits output only for changed cells.
///
/// ```
/// use tinyconf_term::buffer::FrameBuffer;
/// use tinyconf_term::diff::DiffRenderer;
///
/// let mut renderer = DiffRenderer::new();
/// let frame = FrameBuffer::new(80, 24);
///
/// let first = renderer.render(&frame, Some((0, 0)));
/// assert_eq!(first.cells_rendered, 80 * 24);
///
/// let second = renderer.render(&frame, Some((0, 0)));
/// assert_eq!(second.cells_rendered, 0);
/// ```
pub struct DiffRenderer {
    output: OutputBuffer,
    writer: CellWriter,
    previous: Option<FrameBuffer>,
}

impl DiffRenderer {
    /// Create a renderer with no previous frame; the first render draws
    /// everything.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: OutputBuffer::new(),
            writer: CellWriter::new(),
            previous: None,
        }
    }

    /// Diff `current` against the previous frame and generate output.
    ///
    /// `cursor` is the `(x, y)` screen position for the hardware cursor, or
    /// `None` to leave it hidden. Positions outside the frame hide it too.
    pub fn render(&mut self, current: &FrameBuffer, cursor: Option<(u16, u16)>) -> RenderStats {
        self.output.clear();
        self.writer.reset_state();

        let width = current.width();
        let height = current.height();
        let mut stats = RenderStats::default();

        if width == 0 || height == 0 {
            self.store_frame(current);
            return stats;
        }

        ansi::set_mode(&mut self.output, DecMode::SyncOutput, true).ok();
        ansi::set_mode(&mut self.output, DecMode::CursorVisible, false).ok();

        let previous = self
            .previous
            .as_ref()
            .filter(|prev| prev.width() == width && prev.height() == height);

        if previous.is_none() {
            ansi::reset(&mut self.output).ok();
            ansi::clear_screen(&mut self.output).ok();
        }

        for y in 0..height {
            let Some(curr_row) = current.row(y) else {
                continue;
            };
            let prev_row = previous.and_then(|p| p.row(y));

            if prev_row == Some(curr_row) {
                stats.cells_skipped += curr_row.len();
                continue;
            }

            for (x, cell) in (0..width).zip(curr_row) {
                let changed = prev_row.is_none_or(|row| row[usize::from(x)] != *cell);
                if changed {
                    self.writer.render_cell(&mut self.output, x, y, cell);
                    stats.cells_rendered += 1;
                } else {
                    stats.cells_skipped += 1;
                }
            }
        }

        ansi::reset(&mut self.output).ok();

        if let Some((x, y)) = cursor.filter(|&(x, y)| current.in_bounds(x, y)) {
            ansi::cursor_to(&mut self.output, x, y).ok();
            ansi::set_mode(&mut self.output, DecMode::CursorVisible, true).ok();
        }

        ansi::set_mode(&mut self.output, DecMode::SyncOutput, false).ok();

        stats.bytes_written = self.output.len();
        self.store_frame(current);
        stats
    }

    /// The raw bytes from the last render.
    #[must_use]
    pub fn output_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    /// Write accumulated output to `w` and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        self.output.flush_to(w)
    }

    /// Discard the previous frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }

    fn store_frame(&mut self, current: &FrameBuffer) {
        match &mut self.previous {
            Some(prev) if prev.width() == current.width() && prev.height() == current.height() => {
                prev.copy_from(current);
            }
            _ => self.previous = Some(current.clone()),
        }
    }
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
