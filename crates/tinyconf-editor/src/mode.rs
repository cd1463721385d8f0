//! Input modes.
//!
//! The editor is always in exactly one [`Mode`]:
//!
//! | Mode         | Keys go to                 | Left by                   |
//! |--------------|----------------------------|---------------------------|
//! | Normal       | the buffer                 | `/`                       |
//! | CommandEntry | the command line           | Enter or Escape           |
//! | ConfirmSave  | the save-before-quit prompt | `y`, `n` or Escape       |
//!
//! `Mode` only says where input goes. The handlers that act on it live in
//! [`crate::editor`].

use std::fmt;

use crate::command::CommandLine;

/// The current input mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    /// Typing edits the buffer.
    #[default]
    Normal,
    /// Typing edits the command line.
    CommandEntry(CommandLine),
    /// Quitting with unsaved changes; waiting for y/n/Escape.
    ConfirmSave,
}

impl Mode {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::CommandEntry(_) => "command",
            Self::ConfirmSave => "confirm-save",
        }
    }

    /// True in [`Mode::Normal`].
    #[inline]
    #[must_use]
    pub const fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
