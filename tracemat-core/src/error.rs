//! Error types for tracemat
//!
//! Domain errors raised by the parsers, the file store and the table session.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, editing or saving traceability tables
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("List file '{name}' could not be loaded from {path:?}: {source}")]
    UnresolvedListReference {
        name: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed arrow on line {line_no}: {reason} ({line})")]
    MalformedArrowLine {
        line_no: usize,
        line: String,
        reason: String,
    },

    #[error("Edge key '{key}' cannot be written to a table file: {reason}")]
    UnrepresentableKey { key: String, reason: String },

    #[error("Invalid list file selection: {0}")]
    InvalidListSelection(String),

    #[error("Unknown group: {0}")]
    UnknownGroup(String),

    #[error("Cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

impl TraceError {
    /// Wraps an `std::io::Error` together with the path that caused it
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TraceError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures that came from the file system
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            TraceError::Io { .. } | TraceError::UnresolvedListReference { .. }
        )
    }
}

pub type TraceResult<T> = std::result::Result<T, TraceError>;
