//! Style Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A style extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for style extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The document is not JSON, or not the JSON shape expected.
    #[display("malformed {_0} document")]
    Malformed(#[error(not(source))] &'static str),
    /// A field was found but holds a value that can't be used.
    #[display("invalid value for field '{field}': {value}")]
    InvalidField {
        /// The field that failed to parse.
        field: &'static str,
        /// The offending value.
        value: String,
    },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A document is either parseable or it isn't; fetching it again
        // only helps if the server changes its answer.
        false
    }
}
