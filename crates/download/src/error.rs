//! Download Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.
//!
//! Only control operations return errors. Failures while a download runs are
//! reported as [`RegionEvent`](crate::RegionEvent)s instead.

use derive_more::{Display, Error};
use tessera_cache::DownloadState;

/// A download error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for download operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("offline store error")]
    Store,
    /// Only the download itself decides when a region is complete.
    #[display("cannot request the {_0} download state")]
    InvalidTransition(#[error(not(source))] DownloadState),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ErrorKind::Store => true,
            ErrorKind::InvalidTransition(_) => false,
        }
    }
}
