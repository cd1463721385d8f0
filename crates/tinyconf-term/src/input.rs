// SPDX-License-Identifier: MIT
//
// Terminal input parser.
//
// Turns raw stdin bytes into key and mouse events. Covers what a terminal
// sends once `terminal.rs` has put it in raw mode with SGR click reporting:
//
// - Control characters (Enter, Tab, Backspace, Ctrl+letter)
// - Legacy CSI sequences (arrows, Home/End, PageUp/PageDown, Delete, F-keys)
// - SS3 sequences (arrows and F1-F4 in application cursor mode)
// - SGR mouse reports (press / release / drag / scroll)
// - Alt+key (ESC followed by a printable character)
// - UTF-8 multi-byte characters
//
// Escape sequences can span several read() calls, so the parser keeps
// unconsumed bytes between calls to `advance`. A lone ESC stays pending
// until `flush` is called after a short quiet period.

use bitflags::bitflags;

use crate::terminal::Size;

// ─── Event Types ────────────────────────────────────────────────────────────

/// A terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// A mouse action with its screen position.
    Mouse(MouseEvent),
    /// The terminal changed size. Produced by the driver, never by the parser.
    Resize(Size),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Which key was pressed.
    pub code: KeyCode,
    /// Active modifier keys.
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// A key press with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// The character this key would type, if any.
    ///
    /// Only unmodified (or shift-only) characters count. Ctrl and Alt
    /// combinations are commands, not text.
    #[must_use]
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch)
                if !ch.is_control()
                    && (self.modifiers - Modifiers::SHIFT).is_empty() =>
            {
                Some(ch)
            }
            _ => None,
        }
    }
}

/// Identity of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// F1 through F12.
    F(u8),
}

bitflags! {
    /// Keyboard modifier flags, in the xterm encoding (`param = 1 + bits`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
    }
}

/// A mouse event: what happened, where, and with which modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseEvent {
    /// What happened.
    pub kind: MouseEventKind,
    /// 0-indexed column.
    pub x: u16,
    /// 0-indexed row.
    pub y: u16,
    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

/// Mouse event classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Press(MouseButton),
    Release(MouseButton),
    Drag(MouseButton),
    Move,
    ScrollUp,
    ScrollDown,
}

/// Mouse button identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Terminal input parser.
///
/// Feed raw bytes with [`advance`](Parser::advance). Incomplete sequences
/// are kept and completed by later calls. After a quiet period, call
/// [`flush`](Parser::flush) to turn a pending lone ESC into an Escape key.
///
/// ```
/// use tinyconf_term::input::{Event, KeyCode, KeyEvent, Parser};
///
/// let mut parser = Parser::new();
/// assert_eq!(parser.advance(b"\x1b[A"), vec![Event::Key(KeyEvent::plain(KeyCode::Up))]);
///
/// assert!(parser.advance(b"\x1b").is_empty());
/// assert_eq!(parser.flush(), vec![Event::Key(KeyEvent::plain(KeyCode::Escape))]);
/// ```
#[derive(Debug, Default)]
pub struct Parser {
    buf: Vec<u8>,
}

impl Parser {
    /// Create a parser with an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(64),
        }
    }

    /// Feed bytes and return every event that is now complete.
    pub fn advance(&mut self, data: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(data);
        let mut events = Vec::new();
        let mut pos = 0;

        while pos < self.buf.len() {
            match try_parse(&self.buf[pos..]) {
                Parsed::Event(event, consumed) => {
                    events.push(event);
                    pos += consumed;
                }
                Parsed::Incomplete => break,
                Parsed::Skip(n) => pos += n,
            }
        }

        self.buf.drain(..pos);
        events
    }

    /// Are there unconsumed bytes waiting for more input?
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Resolve pending bytes as literal keys.
    ///
    /// A lone ESC becomes Escape; any other leftovers (a truncated sequence)
    /// are decoded byte by byte.
    pub fn flush(&mut self) -> Vec<Event> {
        let events = self
            .buf
            .iter()
            .filter_map(|&byte| match byte {
                0x1B => Some(Event::Key(KeyEvent::plain(KeyCode::Escape))),
                b @ 0x20..=0x7E => Some(press(KeyCode::Char(b as char))),
                b => match try_parse(&[b]) {
                    Parsed::Event(event, _) => Some(event),
                    _ => None,
                },
            })
            .collect();
        self.buf.clear();
        events
    }
}

// ─── Stateless Parsing Functions ────────────────────────────────────────────

/// Result of trying to parse one event from the front of a slice.
enum Parsed {
    /// An event, consuming `usize` bytes.
    Event(Event, usize),
    /// Need more bytes.
    Incomplete,
    /// Unrecognized bytes to drop.
    Skip(usize),
}

fn try_parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };

    match first {
        0x1B => parse_escape(buf),
        0x08 | 0x7F => Parsed::Event(press(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(press(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(press(KeyCode::Enter), 1),
        0x00 => Parsed::Event(ctrl(KeyCode::Char('@')), 1),
        b @ 0x01..=0x1A => Parsed::Event(ctrl(KeyCode::Char((b + b'a' - 1) as char)), 1),
        0x1C..=0x1F => Parsed::Skip(1),
        b @ 0x20..=0x7E => Parsed::Event(press(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

// ── Escape sequences ────────────────────────────────────────────────────────

fn parse_escape(buf: &[u8]) -> Parsed {
    if buf.len() < 2 {
        return Parsed::Incomplete;
    }

    match buf[1] {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(with(KeyCode::Escape, Modifiers::ALT), 2),
        b @ 0x20..=0x7E => Parsed::Event(with(KeyCode::Char(b as char), Modifiers::ALT), 2),
        _ => Parsed::Event(press(KeyCode::Escape), 1),
    }
}

// ── CSI ─────────────────────────────────────────────────────────────────────

fn parse_csi(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }
    if buf[2] == b'<' {
        return parse_sgr_mouse(buf);
    }

    // Parameter bytes 0x30..=0x3F, intermediates 0x20..=0x2F, then a final
    // byte in 0x40..=0x7E.
    let mut end = 2;
    while end < buf.len() {
        let b = buf[end];
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }
    if end >= buf.len() {
        return Parsed::Incomplete;
    }

    let final_byte = buf[end];
    let params = parse_params(&buf[2..end]);
    let consumed = end + 1;
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&p| decode_modifiers(p));

    let code = if final_byte == b'~' {
        match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            15 => KeyCode::F(5),
            17 => KeyCode::F(6),
            18 => KeyCode::F(7),
            19 => KeyCode::F(8),
            20 => KeyCode::F(9),
            21 => KeyCode::F(10),
            23 => KeyCode::F(11),
            24 => KeyCode::F(12),
            _ => return Parsed::Skip(consumed),
        }
    } else {
        match final_byte {
            b'Z' => return Parsed::Event(with(KeyCode::Tab, Modifiers::SHIFT), consumed),
            b => match letter_key(b) {
                Some(code) => code,
                None => return Parsed::Skip(consumed),
            },
        }
    };

    Parsed::Event(with(code, modifiers), consumed)
}

// ── SS3 ─────────────────────────────────────────────────────────────────────

fn parse_ss3(buf: &[u8]) -> Parsed {
    if buf.len() < 3 {
        return Parsed::Incomplete;
    }
    letter_key(buf[2]).map_or(Parsed::Skip(3), |code| Parsed::Event(press(code), 3))
}

/// Final letters shared by CSI and SS3 cursor-key encodings.
const fn letter_key(b: u8) -> Option<KeyCode> {
    Some(match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return None,
    })
}

// ── SGR Mouse ───────────────────────────────────────────────────────────────

fn parse_sgr_mouse(buf: &[u8]) -> Parsed {
    // ESC [ < Cb ; Cx ; Cy M   (press / motion)
    // ESC [ < Cb ; Cx ; Cy m   (release)
    let body = &buf[3..];
    let Some(len) = body.iter().position(|&b| matches!(b, b'M' | b'm')) else {
        return match body.iter().position(|&b| !b.is_ascii_digit() && b != b';') {
            Some(bad) => Parsed::Skip(3 + bad + 1),
            None => Parsed::Incomplete,
        };
    };
    if let Some(bad) = body[..len].iter().position(|&b| !b.is_ascii_digit() && b != b';') {
        return Parsed::Skip(3 + bad + 1);
    }

    let is_release = body[len] == b'm';
    let consumed = 3 + len + 1;
    let params = parse_params(&body[..len]);
    let [cb, raw_x, raw_y] = [0, 1, 2].map(|i| params.get(i).copied().unwrap_or(0));

    // Cb bits: 0-1 button, 2 shift, 3 alt, 4 ctrl, 5 motion, 6 wheel.
    #[allow(clippy::cast_possible_truncation)]
    let modifiers = Modifiers::from_bits_truncate(((cb >> 2) & 0b111) as u8);
    let button = cb & 0b11;
    let kind = match (cb & 64 != 0, cb & 32 != 0) {
        (true, _) if button == 0 => MouseEventKind::ScrollUp,
        (true, _) => MouseEventKind::ScrollDown,
        (false, true) if button == 3 => MouseEventKind::Move,
        (false, true) => MouseEventKind::Drag(decode_mouse_button(button)),
        (false, false) if is_release => MouseEventKind::Release(decode_mouse_button(button)),
        (false, false) => MouseEventKind::Press(decode_mouse_button(button)),
    };

    Parsed::Event(
        Event::Mouse(MouseEvent {
            kind,
            // SGR coordinates are 1-indexed.
            x: raw_x.saturating_sub(1),
            y: raw_y.saturating_sub(1),
            modifiers,
        }),
        consumed,
    )
}

// ── UTF-8 ───────────────────────────────────────────────────────────────────

fn parse_utf8(buf: &[u8]) -> Parsed {
    let expected = utf8_char_len(buf[0]);
    if expected == 0 {
        return Parsed::Skip(1);
    }
    if buf.len() < expected {
        // Bail early on a bad continuation byte instead of waiting forever.
        if buf[1..].iter().any(|&b| b & 0xC0 != 0x80) {
            return Parsed::Skip(1);
        }
        return Parsed::Incomplete;
    }

    std::str::from_utf8(&buf[..expected])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| {
            Parsed::Event(press(KeyCode::Char(ch)), expected)
        })
}

// ─── Helpers ────────────────────────────────────────────────────────────────

const fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::plain(code))
}

const fn ctrl(code: KeyCode) -> Event {
    with(code, Modifiers::CTRL)
}

const fn with(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent { code, modifiers })
}

/// Semicolon-separated decimal parameters. Empty fields read as 0.
fn parse_params(raw: &[u8]) -> Vec<u16> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u16, |acc, &b| {
                    acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
                })
        })
        .collect()
}

/// xterm modifier parameter: `1 + bitmask`. Only the low bits we model
/// are kept.
#[allow(clippy::cast_possible_truncation)]
const fn decode_modifiers(param: u16) -> Modifiers {
    let val = param.saturating_sub(1);
    Modifiers::from_bits_truncate(val as u8)
}

const fn decode_mouse_button(base: u16) -> MouseButton {
    match base {
        0 => MouseButton::Left,
        1 => MouseButton::Middle,
        _ => MouseButton::Right,
    }
}

/// Expected UTF-8 length from a lead byte; 0 for invalid leads.
const fn utf8_char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => 0,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(data: &[u8]) -> Vec<Event> {
        Parser::new().advance(data)
    }

    fn parse_one(data: &[u8]) -> Event {
        let events = parse(data);
        assert_eq!(events.len(), 1, "expected one event from {data:?}, got {events:?}");
        events[0]
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::plain(code))
    }

    fn key_mod(code: KeyCode, modifiers: Modifiers) -> Event {
        Event::Key(KeyEvent { code, modifiers })
    }

    // ── Printable & control ─────────────────────────────────────────────

    #[test]
    fn ascii_chars() {
        assert_eq!(
            parse(b"a/ "),
            vec![key(KeyCode::Char('a')), key(KeyCode::Char('/')), key(KeyCode::Char(' '))]
        );
    }

    #[test]
    fn named_control_keys() {
        assert_eq!(parse_one(b"\r"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\n"), key(KeyCode::Enter));
        assert_eq!(parse_one(b"\t"), key(KeyCode::Tab));
        assert_eq!(parse_one(b"\x7f"), key(KeyCode::Backspace));
        assert_eq!(parse_one(b"\x08"), key(KeyCode::Backspace));
    }

    #[test]
    fn ctrl_letters() {
        assert_eq!(parse_one(b"\x01"), key_mod(KeyCode::Char('a'), Modifiers::CTRL));
        assert_eq!(parse_one(b"\x13"), key_mod(KeyCode::Char('s'), Modifiers::CTRL));
        assert_eq!(parse_one(b"\x00"), key_mod(KeyCode::Char('@'), Modifiers::CTRL));
    }

    #[test]
    fn utf8_multibyte() {
        assert_eq!(parse_one("é".as_bytes()), key(KeyCode::Char('é')));
        assert_eq!(parse_one("中".as_bytes()), key(KeyCode::Char('中')));
        assert_eq!(parse_one("🦀".as_bytes()), key(KeyCode::Char('🦀')));
    }

    #[test]
    fn utf8_split_across_reads() {
        let bytes = "中".as_bytes();
        let mut p = Parser::new();
        assert!(p.advance(&bytes[..1]).is_empty());
        assert!(p.has_pending());
        assert_eq!(p.advance(&bytes[1..]), vec![key(KeyCode::Char('中'))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        assert_eq!(parse(b"\x80a"), vec![key(KeyCode::Char('a'))]);
        assert_eq!(parse(b"\xC3a"), vec![key(KeyCode::Char('a'))]);
    }

    // ── CSI / SS3 ───────────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(parse_one(b"\x1b[A"), key(KeyCode::Up));
        assert_eq!(parse_one(b"\x1b[B"), key(KeyCode::Down));
        assert_eq!(parse_one(b"\x1b[C"), key(KeyCode::Right));
        assert_eq!(parse_one(b"\x1b[D"), key(KeyCode::Left));
        assert_eq!(parse_one(b"\x1bOA"), key(KeyCode::Up));
    }

    #[test]
    fn arrows_with_modifiers() {
        assert_eq!(parse_one(b"\x1b[1;2A"), key_mod(KeyCode::Up, Modifiers::SHIFT));
        assert_eq!(parse_one(b"\x1b[1;5C"), key_mod(KeyCode::Right, Modifiers::CTRL));
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(parse_one(b"\x1b[H"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[F"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[1~"), key(KeyCode::Home));
        assert_eq!(parse_one(b"\x1b[4~"), key(KeyCode::End));
        assert_eq!(parse_one(b"\x1b[3~"), key(KeyCode::Delete));
        assert_eq!(parse_one(b"\x1b[5~"), key(KeyCode::PageUp));
        assert_eq!(parse_one(b"\x1b[6~"), key(KeyCode::PageDown));
    }

    #[test]
    fn function_keys() {
        assert_eq!(parse_one(b"\x1bOP"), key(KeyCode::F(1)));
        assert_eq!(parse_one(b"\x1b[15~"), key(KeyCode::F(5)));
        assert_eq!(parse_one(b"\x1b[24~"), key(KeyCode::F(12)));
    }

    #[test]
    fn shift_tab() {
        assert_eq!(parse_one(b"\x1b[Z"), key_mod(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(parse(b"\x1b[99~x"), vec![key(KeyCode::Char('x'))]);
        assert_eq!(parse(b"\x1b[?1;2cx"), vec![key(KeyCode::Char('x'))]);
    }

    #[test]
    fn csi_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert_eq!(p.advance(b"B"), vec![key(KeyCode::Down)]);
    }

    // ── Escape handling ─────────────────────────────────────────────────

    #[test]
    fn lone_escape_waits_for_flush() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b").is_empty());
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![key(KeyCode::Escape)]);
        assert!(!p.has_pending());
    }

    #[test]
    fn alt_char() {
        assert_eq!(parse_one(b"\x1bx"), key_mod(KeyCode::Char('x'), Modifiers::ALT));
    }

    #[test]
    fn flush_truncated_sequence() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[").is_empty());
        assert_eq!(p.flush(), vec![key(KeyCode::Escape), key(KeyCode::Char('['))]);
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    #[test]
    fn mouse_left_press_is_zero_based() {
        assert_eq!(
            parse_one(b"\x1b[<0;10;5M"),
            Event::Mouse(MouseEvent {
                kind: MouseEventKind::Press(MouseButton::Left),
                x: 9,
                y: 4,
                modifiers: Modifiers::empty(),
            })
        );
    }

    #[test]
    fn mouse_release_and_drag() {
        let Event::Mouse(release) = parse_one(b"\x1b[<0;1;1m") else {
            panic!("expected mouse event");
        };
        assert_eq!(release.kind, MouseEventKind::Release(MouseButton::Left));

        let Event::Mouse(drag) = parse_one(b"\x1b[<32;3;3M") else {
            panic!("expected mouse event");
        };
        assert_eq!(drag.kind, MouseEventKind::Drag(MouseButton::Left));
    }

    #[test]
    fn mouse_scroll_and_modifiers() {
        let Event::Mouse(up) = parse_one(b"\x1b[<64;1;1M") else {
            panic!("expected mouse event");
        };
        assert_eq!(up.kind, MouseEventKind::ScrollUp);

        let Event::Mouse(ctrl_click) = parse_one(b"\x1b[<18;1;1M") else {
            panic!("expected mouse event");
        };
        assert_eq!(ctrl_click.kind, MouseEventKind::Press(MouseButton::Right));
        assert_eq!(ctrl_click.modifiers, Modifiers::CTRL);
    }

    #[test]
    fn mouse_motion_and_garbage() {
        let Event::Mouse(motion) = parse_one(b"\x1b[<35;4;4M") else {
            panic!("expected mouse event");
        };
        assert_eq!(motion.kind, MouseEventKind::Move);

        let events = parse(b"\x1b[<0;x;1Mq");
        assert!(!events.iter().any(|e| matches!(e, Event::Mouse(_))));
        assert_eq!(events.last(), Some(&key(KeyCode::Char('q'))));
    }

    #[test]
    fn mouse_split_across_reads() {
        let mut p = Parser::new();
        assert!(p.advance(b"\x1b[<0;1").is_empty());
        assert_eq!(p.advance(b"2;3M").len(), 1);
    }

    // ── KeyEvent::printable ─────────────────────────────────────────────

    #[test]
    fn printable_filters_modified_keys() {
        assert_eq!(KeyEvent::plain(KeyCode::Char('a')).printable(), Some('a'));
        let shifted = KeyEvent { code: KeyCode::Char('A'), modifiers: Modifiers::SHIFT };
        assert_eq!(shifted.printable(), Some('A'));
        let ctrl_s = KeyEvent { code: KeyCode::Char('s'), modifiers: Modifiers::CTRL };
        assert_eq!(ctrl_s.printable(), None);
        let alt_x = KeyEvent { code: KeyCode::Char('x'), modifiers: Modifiers::ALT };
        assert_eq!(alt_x.printable(), None);
        assert_eq!(KeyEvent::plain(KeyCode::Enter).printable(), None);
    }
}
