//! Where documents come from and go to.
//!
//! The editor only talks to the [`Storage`] trait: load a path into lines,
//! save lines to a path. [`FileStorage`] is the real filesystem;
//! [`MemoryStorage`] keeps documents in a map and can be told to fail.
//!
//! On disk a document is UTF-8 text. Saving joins lines with `\n`; loading
//! splits on `\n`, `\r\n` or `\r`, so a trailing terminator comes back as a
//! final empty line and save-then-load gives the same lines.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Load and save documents as line sequences.
pub trait Storage {
    /// Read `path`. A missing file is an empty document (`[""]`).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or decoded.
    fn load(&self, path: &Path) -> Result<Vec<String>>;

    /// Write `lines` to `path`, replacing its contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    fn save(&self, path: &Path, lines: &[String]) -> Result<()>;
}

/// Split text into lines on `\n`, `\r\n` or `\r`.
///
/// The inverse of joining with `\n`: `"a\n"` is `["a", ""]` and the empty
/// string is one empty line.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            '\n' => lines.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }

    lines.push(current);
    lines
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// The local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStorage;

impl FileStorage {
    /// Create `path` as an empty file unless something is already there.
    /// Returns whether a file was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing and cannot be created.
    pub fn create_if_missing(path: &Path) -> Result<bool> {
        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => {
                tracing::debug!(target: "io", path = %path.display(), "created empty file");
                Ok(true)
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(source) => Err(Error::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

impl Storage for FileStorage {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(target: "io", path = %path.display(), "new file");
                return Ok(vec![String::new()]);
            }
            Err(source) => {
                return Err(Error::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let text = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 {
            path: path.to_path_buf(),
        })?;
        let lines = split_lines(&text);
        tracing::debug!(target: "io", path = %path.display(), lines = lines.len(), "loaded");
        Ok(lines)
    }

    fn save(&self, path: &Path, lines: &[String]) -> Result<()> {
        fs::write(path, lines.join("\n")).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(target: "io", path = %path.display(), lines = lines.len(), "saved");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// Documents held in memory, keyed by path.
///
/// Saves are recorded in order. [`fail_saves`](Self::fail_saves) makes
/// every later save return a permission error.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RefCell<HashMap<PathBuf, Vec<String>>>,
    saves: RefCell<Vec<PathBuf>>,
    failing: Cell<bool>,
}

impl MemoryStorage {
    /// No documents.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&self, path: impl Into<PathBuf>, lines: Vec<String>) {
        self.files.borrow_mut().insert(path.into(), lines);
    }

    /// The stored document at `path`.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Vec<String>> {
        self.files.borrow().get(path.as_ref()).cloned()
    }

    /// Paths of successful saves, oldest first.
    #[must_use]
    pub fn saves(&self) -> Vec<PathBuf> {
        self.saves.borrow().clone()
    }

    /// Make subsequent saves fail (or succeed again).
    pub fn fail_saves(&self, fail: bool) {
        self.failing.set(fail);
    }
}

impl Storage for MemoryStorage {
    fn load(&self, path: &Path) -> Result<Vec<String>> {
        Ok(self.get(path).unwrap_or_else(|| vec![String::new()]))
    }

    fn save(&self, path: &Path, lines: &[String]) -> Result<()> {
        if self.failing.get() {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            });
        }
        self.insert(path, lines.to_vec());
        self.saves.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
