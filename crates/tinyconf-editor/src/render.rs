//! Paint editor state into a frame.
//!
//! ```text
//! ┌─────┬──────────────────────────┐
//! │   1 │key = value               │ ← height - 1 text rows
//! │   2 │	indented                 │
//! ├─────┴──────────────────────────┤
//! │type /q to quit, /s to save     │ ← status row
//! └────────────────────────────────┘
//! ```
//!
//! [`render`] is a pure function of its inputs: it reads the buffer,
//! viewport, mode and status and writes only the frame. The caller
//! reconciles the viewport first. Anything that does not fit the frame is
//! clipped.

use tinyconf_term::buffer::{FrameBuffer, string_width};
use tinyconf_term::cell::{Attr, Cell};
use tinyconf_term::color::CellColor;

use crate::buffer::LineBuffer;
use crate::mode::Mode;
use crate::status::StatusChannel;
use crate::viewport::{CursorViewport, expand_tabs};

// ---------------------------------------------------------------------------
// Palette
// ---------------------------------------------------------------------------

/// The three colors the editor draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Text and line numbers.
    pub fg: CellColor,
    /// Everything behind the text.
    pub bg: CellColor,
    /// Background of the status row.
    pub status: CellColor,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            fg: CellColor::Rgb(0xff, 0xff, 0xff),
            bg: CellColor::Rgb(0x00, 0x00, 0x00),
            status: CellColor::Rgb(0x64, 0x64, 0x64),
        }
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Gutter columns for a buffer of `line_count` lines: the line number
/// right-aligned in at least four digits, then one space.
///
/// | Lines           | Gutter |
/// |-----------------|--------|
/// | 1 – 9 999       | 5      |
/// | 10 000 – 99 999 | 6      |
#[must_use]
pub fn gutter_width(line_count: usize) -> usize {
    let digits = line_count.max(1).ilog10() as usize + 1;
    digits.max(4) + 1
}

/// Text rows in a frame `height` rows tall (the last row is status).
#[inline]
#[must_use]
pub const fn visible_height(height: u16) -> usize {
    height.saturating_sub(1) as usize
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Paint the whole frame and return the hardware cursor position.
///
/// Returns `None` for a zero-sized frame.
#[must_use]
pub fn render(
    frame: &mut FrameBuffer,
    buf: &LineBuffer,
    viewport: &CursorViewport,
    mode: &Mode,
    status: &StatusChannel,
    palette: &Palette,
) -> Option<(u16, u16)> {
    let width = frame.width();
    let height = frame.height();
    if width == 0 || height == 0 {
        return None;
    }

    frame.fill(Cell::styled(' ', palette.fg, palette.bg, Attr::empty()));

    let rows = visible_height(height);
    let gutter = gutter_width(buf.line_count());
    let text_x = to_u16(gutter);

    for (row, line) in (viewport.scroll()..buf.line_count()).take(rows).enumerate() {
        let y = to_u16(row);
        let number = format!("{:>digits$} ", line + 1, digits = gutter - 1);
        frame.put_str(0, y, width, &number, palette.fg, palette.bg, Attr::DIM);
        let text = expand_tabs(buf.line(line));
        frame.put_str(text_x, y, width, &text, palette.fg, palette.bg, Attr::empty());
    }

    let status_y = height - 1;
    let message = status.display(mode);
    for x in 0..width {
        frame.set(x, status_y, Cell::styled(' ', palette.fg, palette.status, Attr::empty()));
    }
    frame.put_str(0, status_y, width, &message, palette.fg, palette.status, Attr::empty());

    let (x, y) = match mode {
        Mode::Normal => {
            let (row, col) = viewport.to_screen(buf, gutter);
            (col, row.min(rows.saturating_sub(1)))
        }
        Mode::CommandEntry(_) | Mode::ConfirmSave => (string_width(&message), usize::from(status_y)),
    };
    Some((to_u16(x).min(width - 1), to_u16(y).min(height - 1)))
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandLine;
    use crate::position::Position;
    use crate::status::{CONFIRM_PROMPT, DEFAULT_HINT};
    use pretty_assertions::assert_eq;

    struct Fixture {
        buf: LineBuffer,
        viewport: CursorViewport,
        mode: Mode,
        status: StatusChannel,
    }

    impl Fixture {
        fn new(lines: &[&str]) -> Self {
            Self {
                buf: LineBuffer::from_lines(lines),
                viewport: CursorViewport::new(),
                mode: Mode::Normal,
                status: StatusChannel::new(),
            }
        }

        fn draw(&mut self, width: u16, height: u16) -> (FrameBuffer, Option<(u16, u16)>) {
            self.viewport.reconcile(&self.buf, visible_height(height));
            let mut frame = FrameBuffer::new(width, height);
            let cursor = render(
                &mut frame,
                &self.buf,
                &self.viewport,
                &self.mode,
                &self.status,
                &Palette::default(),
            );
            (frame, cursor)
        }
    }

    fn rows(frame: &FrameBuffer) -> Vec<String> {
        (0..frame.height()).map(|y| frame.row_text(y)).collect()
    }

    // -- Gutter -------------------------------------------------------------

    #[test]
    fn gutter_is_five_until_ten_thousand_lines() {
        assert_eq!(gutter_width(0), 5);
        assert_eq!(gutter_width(1), 5);
        assert_eq!(gutter_width(9_999), 5);
        assert_eq!(gutter_width(10_000), 6);
        assert_eq!(gutter_width(1_000_000), 8);
    }

    // -- Layout -------------------------------------------------------------

    #[test]
    fn lines_gutter_and_status() {
        let mut fx = Fixture::new(&["alpha", "beta"]);
        let (frame, cursor) = fx.draw(32, 4);
        assert_eq!(
            rows(&frame),
            vec![
                format!("{:<32}", "   1 alpha"),
                format!("{:<32}", "   2 beta"),
                " ".repeat(32),
                format!("{DEFAULT_HINT:<32}"),
            ]
        );
        assert_eq!(cursor, Some((5, 0)));
    }

    #[test]
    fn colors_and_attributes() {
        let mut fx = Fixture::new(&["x"]);
        let (frame, _) = fx.draw(10, 3);
        let palette = Palette::default();

        let number = frame.get(3, 0).unwrap();
        assert_eq!(number.character(), Some('1'));
        assert!(number.attrs.contains(Attr::DIM));

        let text = frame.get(5, 0).unwrap();
        assert_eq!((text.fg, text.bg), (palette.fg, palette.bg));
        assert!(text.attrs.is_empty());

        let empty = frame.get(9, 1).unwrap();
        assert_eq!(empty.bg, palette.bg);

        for x in 0..10 {
            assert_eq!(frame.get(x, 2).unwrap().bg, palette.status);
        }
    }

    #[test]
    fn tabs_expand_and_long_lines_clip() {
        let mut fx = Fixture::new(&["\tx", "0123456789abcdef"]);
        let (frame, _) = fx.draw(12, 3);
        assert_eq!(frame.row_text(0), "   1     x  ");
        assert_eq!(frame.row_text(1), "   2 0123456");
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut fx = Fixture::new(&["中a"]);
        let (frame, _) = fx.draw(10, 2);
        assert_eq!(frame.get(5, 0).unwrap().character(), Some('中'));
        assert!(frame.get(6, 0).unwrap().is_continuation());
        assert_eq!(frame.get(7, 0).unwrap().character(), Some('a'));
    }

    #[test]
    fn scrolled_view_shows_cursor_line() {
        let lines: Vec<String> = (1..=10).map(|i| format!("l{i}")).collect();
        let mut fx = Fixture {
            buf: LineBuffer::from_lines(&lines),
            ..Fixture::new(&[])
        };
        fx.viewport.set_cursor(Position::new(9, 1));
        let (frame, cursor) = fx.draw(12, 4);
        assert_eq!(frame.row_text(0).trim_end(), "   8 l8");
        assert_eq!(frame.row_text(2).trim_end(), "  10 l10");
        assert_eq!(cursor, Some((6, 2)));
    }

    // -- Status row and cursor ----------------------------------------------

    #[test]
    fn command_entry_shows_prefix_and_cursor_on_status_row() {
        let mut fx = Fixture::new(&["a"]);
        let mut line = CommandLine::new();
        line.push('s');
        line.push('a');
        fx.mode = Mode::CommandEntry(line);
        let (frame, cursor) = fx.draw(20, 3);
        assert_eq!(frame.row_text(2).trim_end(), "/sa");
        assert_eq!(cursor, Some((3, 2)));
    }

    #[test]
    fn confirm_prompt() {
        let mut fx = Fixture::new(&["a"]);
        fx.mode = Mode::ConfirmSave;
        let (frame, cursor) = fx.draw(40, 3);
        assert_eq!(frame.row_text(2).trim_end(), CONFIRM_PROMPT);
        assert_eq!(cursor, Some((31, 2)));
    }

    #[test]
    fn status_truncates_and_cursor_clamps() {
        let mut fx = Fixture::new(&["a"]);
        fx.mode = Mode::ConfirmSave;
        let (frame, cursor) = fx.draw(8, 2);
        assert_eq!(frame.row_text(1), "Save bef");
        assert_eq!(cursor, Some((7, 1)));
    }

    #[test]
    fn cursor_past_narrow_frame_is_clamped() {
        let mut fx = Fixture::new(&["abcdefghij"]);
        fx.viewport.set_cursor(Position::new(0, 10));
        let (_, cursor) = fx.draw(8, 3);
        assert_eq!(cursor, Some((7, 0)));
    }

    // -- Degenerate frames --------------------------------------------------

    #[test]
    fn zero_sized_frame_renders_nothing() {
        let mut fx = Fixture::new(&["a"]);
        assert_eq!(fx.draw(0, 5).1, None);
        assert_eq!(fx.draw(5, 0).1, None);
    }

    #[test]
    fn single_row_is_status_only() {
        let mut fx = Fixture::new(&["text"]);
        let (frame, cursor) = fx.draw(6, 1);
        assert_eq!(frame.row_text(0), "type /");
        assert_eq!(cursor, Some((5, 0)));
    }

    #[test]
    fn rendering_is_deterministic() {
        let mut fx = Fixture::new(&["same", "input"]);
        let (a, ca) = fx.draw(20, 5);
        let (b, cb) = fx.draw(20, 5);
        assert_eq!(a, b);
        assert_eq!(ca, cb);
    }
}
