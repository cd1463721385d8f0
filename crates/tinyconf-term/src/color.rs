// SPDX-License-Identifier: MIT
//
// Terminal colors as they land in cells.
//
// The editor paints with three colors (text foreground, text background,
// status background) given as `#rrggbb` triples on the command line. A
// `CellColor` is the resolved form: 24-bit RGB, a palette index, or the
// terminal's own default. Nothing here blends or converts color spaces.

use std::fmt;
use std::str::FromStr;

// ─── CellColor ───────────────────────────────────────────────────────────────

/// Compact color for terminal cell storage.
///
/// This is what gets written to the [`FrameBuffer`](crate::buffer::FrameBuffer)
/// and converted to SGR sequences on output. Four bytes, cheap to compare in
/// the diff renderer's inner loop.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CellColor {
    /// 24-bit `TrueColor`.
    Rgb(u8, u8, u8),

    /// ANSI 256-color palette index.
    Ansi256(u8),

    /// Terminal default color (inherits from terminal settings).
    #[default]
    Default,
}

impl CellColor {
    /// Parse a hex color: `#RGB` or `#RRGGBB`, with or without the `#`.
    ///
    /// ```
    /// use tinyconf_term::color::CellColor;
    ///
    /// assert_eq!(CellColor::hex("#646464"), Some(CellColor::Rgb(100, 100, 100)));
    /// assert_eq!(CellColor::hex("fff"), Some(CellColor::Rgb(255, 255, 255)));
    /// assert_eq!(CellColor::hex("#12345"), None);
    /// ```
    #[must_use]
    pub fn hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if !digits.is_ascii() {
            return None;
        }
        match digits.len() {
            3 => {
                let mut rgb = [0u8; 3];
                for (slot, ch) in rgb.iter_mut().zip(digits.chars()) {
                    let v = u8::try_from(ch.to_digit(16)?).ok()?;
                    *slot = v * 17;
                }
                Some(Self::Rgb(rgb[0], rgb[1], rgb[2]))
            }
            6 => {
                let r = u8::from_str_radix(&digits[0..2], 16).ok()?;
                let g = u8::from_str_radix(&digits[2..4], 16).ok()?;
                let b = u8::from_str_radix(&digits[4..6], 16).ok()?;
                Some(Self::Rgb(r, g, b))
            }
            _ => None,
        }
    }

    /// Whether this is the terminal default color.
    #[inline]
    #[must_use]
    pub const fn is_default(self) -> bool {
        matches!(self, Self::Default)
    }
}

/// Error returned when a string is not a hex color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color {:?}: expected #rrggbb", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for CellColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::hex(s.trim()).ok_or_else(|| ParseColorError(s.to_string()))
    }
}

impl fmt::Debug for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
            Self::Ansi256(idx) => write!(f, "ansi({idx})"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl fmt::Display for CellColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
