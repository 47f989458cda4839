//! Error types for record parsing
//!
//! Two layers of failure exist:
//!
//! - [`SyntaxError`] - raised by the record builder when a line cannot be
//!   placed in a record. Both kinds abort the parse of that source.
//! - [`RecordError`] - everything a caller of the library can see, which adds
//!   the I/O failures of the line source on top of syntax errors.

use std::path::PathBuf;
use thiserror::Error;

/// A malformed line in the input. Carries the 1-based line number and the raw
/// line text, terminator included.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    /// An indented line appeared before any `id: value` line in the block.
    #[error("line {line_number}: bad start of a data block, expected \"id: value\": {line:?}")]
    UnexpectedContinuation { line_number: usize, line: String },

    /// A non-indented data line without a `:` separator.
    #[error("line {line_number}: expected \"id: value\", got: {line:?}")]
    MalformedFieldLine { line_number: usize, line: String },
}

impl SyntaxError {
    /// The offending line, as read from the source.
    pub fn line(&self) -> &str {
        match self {
            Self::UnexpectedContinuation { line, .. } | Self::MalformedFieldLine { line, .. } => {
                line
            }
        }
    }

    pub fn line_number(&self) -> usize {
        match self {
            Self::UnexpectedContinuation { line_number, .. }
            | Self::MalformedFieldLine { line_number, .. } => *line_number,
        }
    }
}

/// The error type for all library operations.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Reading or decoding a line failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source file could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RecordError {
    /// Returns the syntax error, if this is one.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Self::Syntax(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, RecordError>;
