//! Errors from loading and saving documents.

use std::io;
use std::path::PathBuf;

/// A persistence failure, always tied to the path involved.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file exists but is not UTF-8 text.
    #[error("{}: not valid UTF-8", path.display())]
    InvalidUtf8 { path: PathBuf },
}

impl Error {
    /// The failure without the path, for messages that already name it.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Io { source, .. } => source.to_string(),
            Self::InvalidUtf8 { .. } => "not valid UTF-8".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_path() {
        let err = Error::InvalidUtf8 {
            path: PathBuf::from("a.conf"),
        };
        assert_eq!(err.to_string(), "a.conf: not valid UTF-8");
        assert_eq!(err.reason(), "not valid UTF-8");
    }

    #[test]
    fn io_error_keeps_source() {
        let err = Error::Io {
            path: PathBuf::from("/nope/x"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.to_string(), "/nope/x: denied");
        assert_eq!(err.reason(), "denied");
        assert!(std::error::Error::source(&err).is_some());
    }
}
