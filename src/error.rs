//! Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A tessera error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for tessera operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("unable to prepare the cache directory")]
    Io,
    #[display("offline store error")]
    Store,
    #[display("region download error")]
    Download,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Io | ErrorKind::Store | ErrorKind::Download => true,
            ErrorKind::Config => false,
        }
    }
}
