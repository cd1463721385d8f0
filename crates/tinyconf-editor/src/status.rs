//! The status line's message and its countdown.
//!
//! A message set with [`StatusChannel::set_ephemeral`] stays for a number
//! of render cycles, then the line falls back to [`DEFAULT_HINT`]. The
//! countdown advances only through [`StatusChannel::tick`], which the
//! session calls once after drawing each frame, so decay is measured in
//! frames rather than wall-clock time.

use std::borrow::Cow;

use crate::mode::Mode;

/// Shown when no message is active.
pub const DEFAULT_HINT: &str = "type /q to quit, /s to save";

/// Prompt shown while confirming a quit with unsaved changes.
pub const CONFIRM_PROMPT: &str = "Save before quitting? (y/N/esc)";

/// Render cycles a message stays visible.
pub const EPHEMERAL_CYCLES: u32 = 20;

/// Status message plus remaining render cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChannel {
    message: String,
    remaining: u32,
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusChannel {
    /// Showing the default hint.
    #[must_use]
    pub fn new() -> Self {
        Self {
            message: DEFAULT_HINT.to_string(),
            remaining: 0,
        }
    }

    /// Replace the message for `cycles` render cycles.
    pub fn set_ephemeral(&mut self, message: impl Into<String>, cycles: u32) {
        self.message = message.into();
        self.remaining = cycles;
    }

    /// Count down one render cycle; restore the hint when it runs out.
    pub fn tick(&mut self) {
        if self.remaining > 0 {
            self.remaining -= 1;
            if self.remaining == 0 {
                DEFAULT_HINT.clone_into(&mut self.message);
            }
        }
    }

    /// The current message, ignoring mode.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Cycles left before the hint returns.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// What the status row shows in `mode`.
    #[must_use]
    pub fn display<'a>(&'a self, mode: &Mode) -> Cow<'a, str> {
        match mode {
            Mode::Normal => Cow::Borrowed(&self.message),
            Mode::CommandEntry(line) => Cow::Owned(format!("/{}", line.input())),
            Mode::ConfirmSave => Cow::Borrowed(CONFIRM_PROMPT),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandLine;

    #[test]
    fn starts_with_hint() {
        let status = StatusChannel::new();
        assert_eq!(status.message(), DEFAULT_HINT);
        assert_eq!(status.remaining(), 0);
    }

    #[test]
    fn message_decays_after_exact_cycle_count() {
        let mut status = StatusChannel::new();
        status.set_ephemeral("File saved.", 3);
        status.tick();
        status.tick();
        assert_eq!(status.message(), "File saved.");
        status.tick();
        assert_eq!(status.message(), DEFAULT_HINT);
        status.tick();
        assert_eq!(status.message(), DEFAULT_HINT);
    }

    #[test]
    fn new_message_resets_countdown() {
        let mut status = StatusChannel::new();
        status.set_ephemeral("one", 2);
        status.tick();
        status.set_ephemeral("two", 2);
        status.tick();
        assert_eq!(status.message(), "two");
        status.tick();
        assert_eq!(status.message(), DEFAULT_HINT);
    }

    #[test]
    fn zero_cycles_sticks_until_replaced() {
        let mut status = StatusChannel::new();
        status.set_ephemeral("sticky", 0);
        for _ in 0..50 {
            status.tick();
        }
        assert_eq!(status.message(), "sticky");
    }

    #[test]
    fn display_depends_on_mode() {
        let mut status = StatusChannel::new();
        status.set_ephemeral("Canceled.", EPHEMERAL_CYCLES);
        assert_eq!(status.display(&Mode::Normal), "Canceled.");

        let mut line = CommandLine::new();
        line.push('s');
        assert_eq!(status.display(&Mode::CommandEntry(line)), "/s");
        assert_eq!(
            status.display(&Mode::CommandEntry(CommandLine::new())),
            "/"
        );
        assert_eq!(status.display(&Mode::ConfirmSave), CONFIRM_PROMPT);
    }
}
