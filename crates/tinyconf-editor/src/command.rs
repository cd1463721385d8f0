//! The slash command line at the bottom of the screen.
//!
//! Typing `/` in normal mode opens it. Characters append, Backspace removes
//! the last one, Escape cancels and Enter evaluates.
//!
//! | Input              | Command                          |
//! |--------------------|----------------------------------|
//! | `/`                | insert a literal `/` at the cursor |
//! | `q`, `quit`        | quit (asks first if unsaved)     |
//! | `s`, `save`        | save to the current path         |
//! | `s <path>`, `save <path>` | set the path, then save   |
//!
//! Anything else is returned as [`Command::Unknown`] and ignored by the
//! editor.

use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/`: type the prefix character itself.
    InsertPrefix,
    /// `q` / `quit`.
    Quit,
    /// `s` / `save`.
    Save,
    /// `s <path>` / `save <path>`.
    SaveAs(PathBuf),
    /// Anything else, trimmed.
    Unknown(String),
}

// ---------------------------------------------------------------------------
// CommandLine
// ---------------------------------------------------------------------------

/// Text typed after the `/` prefix. The prefix itself is not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLine {
    input: String,
}

impl CommandLine {
    /// An empty command line.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            input: String::new(),
        }
    }

    /// The typed text.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Append a character.
    pub fn push(&mut self, ch: char) {
        self.input.push(ch);
    }

    /// Remove the last character. Returns `false` if already empty.
    pub fn backspace(&mut self) -> bool {
        self.input.pop().is_some()
    }

    /// Parse the typed text.
    #[must_use]
    pub fn parse(&self) -> Command {
        parse_command(&self.input)
    }
}

fn parse_command(input: &str) -> Command {
    let trimmed = input.trim();

    let (cmd, arg) = trimmed
        .find(char::is_whitespace)
        .map_or((trimmed, ""), |pos| {
            (&trimmed[..pos], trimmed[pos..].trim_start())
        });

    match (cmd, arg.is_empty()) {
        ("/", true) => Command::InsertPrefix,
        ("q" | "quit", true) => Command::Quit,
        ("s" | "save", true) => Command::Save,
        ("s" | "save", false) => Command::SaveAs(PathBuf::from(arg)),
        _ => Command::Unknown(trimmed.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
