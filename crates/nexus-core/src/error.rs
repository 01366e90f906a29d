//! Error types for classification and extraction.
//!
//! None of these are fatal to a scan. Every variant describes why one
//! file contributes nothing to the index, and callers log it and move on.

use crate::record::FileKind;
use std::path::PathBuf;
use thiserror::Error;

/// Convenience type for functions that can fail while indexing a file.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Things that can go wrong when turning a file into a record.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Couldn't read the file from disk.
    #[error("failed to read file '{path}': {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file was read but isn't valid JSON.
    #[error("malformed JSON in '{path}': {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No classification rule matched this path.
    #[error("unrecognized file kind for '{0}'")]
    UnknownKind(PathBuf),

    /// The content parsed, but the identifier field the kind requires
    /// is absent or empty.
    #[error("no {kind} identifier found in '{path}'")]
    MissingIdentifier { path: PathBuf, kind: FileKind },

    /// A manifest that names neither a resource nor a behavior module,
    /// or that couldn't be parsed at all.
    #[error("invalid pack manifest '{path}': {reason}")]
    InvalidManifest { path: PathBuf, reason: String },
}

impl IndexError {
    /// Creates a read error with the path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    /// Creates a JSON syntax error with the path for context.
    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Malformed {
            path: path.into(),
            source,
        }
    }

    /// Creates a schema miss for a kind.
    pub fn missing(path: impl Into<PathBuf>, kind: FileKind) -> Self {
        Self::MissingIdentifier {
            path: path.into(),
            kind,
        }
    }

    /// True for errors that mean the file's content couldn't be loaded,
    /// as opposed to content that loaded but didn't fit the schema.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, Self::Unreadable { .. } | Self::Malformed { .. })
    }
}
