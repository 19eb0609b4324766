//! Error types for persistence.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while encoding, decoding, reading, or writing records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A single line could not be decoded.
    #[error("malformed {kind} record: {reason}")]
    Malformed { kind: &'static str, reason: String },

    /// A line in a file could not be decoded. Loading stops here.
    #[error("{}:{line}: malformed {kind} record: {reason}", path.display())]
    Format {
        path: PathBuf,
        line: usize,
        kind: &'static str,
        reason: String,
    },

    /// A text field holds the delimiter or a line break.
    #[error("cannot store {kind} {field} {value:?}: contains '|' or a line break")]
    Unencodable {
        kind: &'static str,
        field: &'static str,
        value: String,
    },

    /// I/O error while reading or writing a data file.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn malformed(kind: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            kind,
            reason: reason.into(),
        }
    }

    /// Attach a file location to a [`StoreError::Malformed`] error.
    pub(crate) fn at(self, path: &std::path::Path, line: usize) -> Self {
        match self {
            Self::Malformed { kind, reason } => Self::Format {
                path: path.to_path_buf(),
                line,
                kind,
                reason,
            },
            other => other,
        }
    }

    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns `true` for decoding failures (the `FormatError` kind).
    pub fn is_format(&self) -> bool {
        matches!(self, Self::Malformed { .. } | Self::Format { .. })
    }
}

/// Convenience alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
