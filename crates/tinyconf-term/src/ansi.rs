// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Stateless writers for the handful of sequences tinyconf needs: cursor
// placement, DEC private modes, and SGR colors and attributes. They write
// to any `impl Write`; deciding what to send is `CellWriter`'s job.
//
// Cursor positions are 0-indexed in our API and converted to the 1-indexed
// form the terminal expects.

use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::CellColor;

// ─── Cursor and screen ──────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using CUP.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Clear the entire screen (ED 2). The cursor does not move.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[2J")
}

// ─── DEC private modes ──────────────────────────────────────────────────────

/// Terminal modes switched with `CSI ? n h` (on) and `CSI ? n l` (off).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum DecMode {
    /// DECTCEM: the cursor is drawn.
    CursorVisible = 25,
    /// Report button presses and releases.
    MouseClicks = 1000,
    /// Encode mouse reports as `CSI < b ; x ; y M/m`, which has no
    /// column limit and tells press from release.
    MouseSgr = 1006,
    /// Alternate screen, saving and restoring the shell's screen.
    AltScreen = 1049,
    /// Synchronized output: the terminal holds the frame until reset.
    SyncOutput = 2026,
}

/// Turn `mode` on or off.
#[inline]
pub fn set_mode(w: &mut impl Write, mode: DecMode, on: bool) -> io::Result<()> {
    let action = if on { 'h' } else { 'l' };
    write!(w, "\x1b[?{}{action}", mode as u16)
}

// ─── SGR ────────────────────────────────────────────────────────────────────

/// Reset colors and attributes (SGR 0). Callers tracking SGR state must
/// invalidate it afterwards.
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(b"\x1b[0m")
}

/// Set the foreground color.
pub fn fg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    sgr_color(w, color, 30)
}

/// Set the background color.
pub fn bg(w: &mut impl Write, color: CellColor) -> io::Result<()> {
    sgr_color(w, color, 40)
}

/// Foreground codes start at 30, background at 40; everything else is an
/// offset from there. The 16 standard colors get their short codes.
fn sgr_color(w: &mut impl Write, color: CellColor, base: u16) -> io::Result<()> {
    match color {
        CellColor::Default => write!(w, "\x1b[{}m", base + 9),
        CellColor::Ansi256(idx @ 0..=7) => write!(w, "\x1b[{}m", base + u16::from(idx)),
        CellColor::Ansi256(idx @ 8..=15) => write!(w, "\x1b[{}m", base + 52 + u16::from(idx)),
        CellColor::Ansi256(idx) => write!(w, "\x1b[{};5;{idx}m", base + 8),
        CellColor::Rgb(r, g, b) => write!(w, "\x1b[{};2;{r};{g};{b}m", base + 8),
    }
}

/// Switch on `attr` in one sequence. Nothing is written for an empty set;
/// attributes are only ever cleared with [`reset`].
pub fn attrs(w: &mut impl Write, attr: Attr) -> io::Result<()> {
    const CODES: [(Attr, u8); 4] = [
        (Attr::BOLD, 1),
        (Attr::DIM, 2),
        (Attr::UNDERLINE, 4),
        (Attr::INVERSE, 7),
    ];

    if attr.is_empty() {
        return Ok(());
    }
    w.write_all(b"\x1b[")?;
    let mut first = true;
    for (flag, code) in CODES {
        if attr.contains(flag) {
            if !first {
                w.write_all(b";")?;
            }
            write!(w, "{code}")?;
            first = false;
        }
    }
    w.write_all(b"m")
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn emit<F>(f: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    // ── Cursor ──────────────────────────────────────────────────────────

    #[test]
    fn cursor_to_is_one_based() {
        assert_eq!(emit(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(emit(|w| cursor_to(w, 10, 20)), "\x1b[21;11H");
    }

    #[test]
    fn cursor_to_max_does_not_overflow() {
        assert_eq!(emit(|w| cursor_to(w, u16::MAX, u16::MAX)), "\x1b[65536;65536H");
    }

    #[test]
    fn cursor_visibility() {
        assert_eq!(emit(|w| set_mode(w, DecMode::CursorVisible, false)), "\x1b[?25l");
        assert_eq!(emit(|w| set_mode(w, DecMode::CursorVisible, true)), "\x1b[?25h");
    }

    // ── Colors ──────────────────────────────────────────────────────────

    #[test]
    fn fg_variants() {
        assert_eq!(emit(|w| fg(w, CellColor::Default)), "\x1b[39m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(1))), "\x1b[31m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(9))), "\x1b[91m");
        assert_eq!(emit(|w| fg(w, CellColor::Ansi256(200))), "\x1b[38;5;200m");
        assert_eq!(emit(|w| fg(w, CellColor::Rgb(255, 255, 255))), "\x1b[38;2;255;255;255m");
    }

    #[test]
    fn bg_variants() {
        assert_eq!(emit(|w| bg(w, CellColor::Default)), "\x1b[49m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(0))), "\x1b[40m");
        assert_eq!(emit(|w| bg(w, CellColor::Ansi256(15))), "\x1b[107m");
        assert_eq!(emit(|w| bg(w, CellColor::Rgb(100, 100, 100))), "\x1b[48;2;100;100;100m");
    }

    // ── Attributes ──────────────────────────────────────────────────────

    #[test]
    fn attrs_empty_emits_nothing() {
        assert_eq!(emit(|w| attrs(w, Attr::empty())), "");
    }

    #[test]
    fn attrs_combined() {
        assert_eq!(emit(|w| attrs(w, Attr::BOLD)), "\x1b[1m");
        assert_eq!(emit(|w| attrs(w, Attr::BOLD | Attr::INVERSE)), "\x1b[1;7m");
        assert_eq!(emit(|w| attrs(w, Attr::all())), "\x1b[1;2;4;7m");
    }

    // ── Modes ───────────────────────────────────────────────────────────

    #[test]
    fn dec_modes() {
        assert_eq!(emit(|w| set_mode(w, DecMode::AltScreen, true)), "\x1b[?1049h");
        assert_eq!(emit(|w| set_mode(w, DecMode::AltScreen, false)), "\x1b[?1049l");
        assert_eq!(emit(|w| set_mode(w, DecMode::MouseClicks, true)), "\x1b[?1000h");
        assert_eq!(emit(|w| set_mode(w, DecMode::MouseSgr, false)), "\x1b[?1006l");
        assert_eq!(emit(|w| set_mode(w, DecMode::SyncOutput, true)), "\x1b[?2026h");
    }

    #[test]
    fn screen_and_reset() {
        assert_eq!(emit(|w| clear_screen(w)), "\x1b[2J");
        assert_eq!(emit(|w| reset(w)), "\x1b[0m");
    }
}
