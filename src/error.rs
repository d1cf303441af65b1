//! Error types for buffer editing
//!
//! Mutation requests are normalised permissively; only the cases below are
//! surfaced to the caller.

use thiserror::Error;

use crate::text::cursor::TextPos;

/// Failure to resolve an index expression against the buffer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    /// The expression text could not be parsed
    #[error("bad text index \"{0}\"")]
    Malformed(String),

    /// The expression names a mark that was never set
    #[error("there is no mark named \"{0}\"")]
    UnknownMark(String),

    /// `sel.first` / `sel.last` used while nothing is selected
    #[error("text doesn't contain any characters tagged with \"sel\"")]
    NoSelection,
}

/// Top-level editing error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// A range whose start lies after its end
    #[error("invalid range: {start} is after {end}")]
    InvalidRange { start: TextPos, end: TextPos },

    /// Operation kind that the normaliser does not know (indicates a caller bug)
    #[error("unsupported operation \"{0}\"")]
    UnsupportedOperation(String),

    /// Command string form called with too few arguments
    #[error("wrong # args: should be \"{0}\"")]
    WrongArgs(&'static str),

    #[error(transparent)]
    Index(#[from] IndexError),
}
