//! Cache Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A cache error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for cache operations.
pub type Result<T> = std::result::Result<T, Error>;

/// SQLite primary result codes that mean the file can't be trusted anymore.
const SQLITE_CORRUPT: i32 = 11;
const SQLITE_NOTADB: i32 = 26;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("database error")]
    Database,
    /// The schema could not be brought up to date (including a database
    /// written by a newer, unknown schema).
    #[display("database migration error")]
    Migration,
    /// The database file is corrupt or not a database. The store resets
    /// itself when it sees this; the failed operation is not retried.
    #[display("database is corrupt")]
    Corrupt,
    #[display("payload compression error")]
    Compression,
    /// Serialization/deserialization error.
    #[display("invalid cache data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    #[display("region not found: {_0}")]
    RegionNotFound(#[error(not(source))] i64),
    #[display("invalid region definition: {_0}")]
    InvalidDefinition(#[error(not(source))] String),
    /// Linking the resource would retain more hosted tiles than allowed.
    #[display("hosted tile count limit of {_0} exceeded")]
    TileCountLimitExceeded(#[error(not(source))] u64),
    /// Eviction ran out of unretained entries before the budget was met.
    #[display("unable to make space in the ambient cache")]
    NoSpace,
    /// The store actor has shut down.
    #[display("offline store is closed")]
    Closed,
}
impl ErrorKind {
    /// Classify a sqlx error, preserving it as the child of the returned
    /// error tree.
    #[track_caller]
    pub(crate) fn database(err: sqlx::Error) -> Error {
        let kind = match &err {
            sqlx::Error::Database(db) if db.code().is_some_and(|code| is_corruption_code(&code)) => Self::Corrupt,
            _ => Self::Database,
        };
        exn::Exn::from(err).raise(kind)
    }

    #[track_caller]
    pub(crate) fn migration(err: sqlx::migrate::MigrateError) -> Error {
        let kind = match &err {
            sqlx::migrate::MigrateError::Execute(sqlx::Error::Database(db))
                if db.code().is_some_and(|code| is_corruption_code(&code)) =>
            {
                Self::Corrupt
            },
            _ => Self::Migration,
        };
        exn::Exn::from(err).raise(kind)
    }

    /// Whether the store must be deleted and recreated after this error.
    pub fn requires_reset(&self) -> bool {
        matches!(self, Self::Corrupt | Self::Migration)
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // A reset store is usable again, the operation itself is not replayed.
        matches!(self, Self::Corrupt)
    }
}

/// Extended result codes carry the primary code in the low byte.
fn is_corruption_code(code: &str) -> bool {
    code.parse::<i32>().is_ok_and(|code| matches!(code & 0xff, SQLITE_CORRUPT | SQLITE_NOTADB))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("11", true)]
    #[case("267", true)]
    #[case("779", true)]
    #[case("26", true)]
    #[case("5", false)]
    #[case("2067", false)]
    #[case("SQLITE_CORRUPT", false)]
    fn test_corruption_codes(#[case] code: &str, #[case] expected: bool) {
        assert_eq!(is_corruption_code(code), expected);
    }

    #[test]
    fn test_reset_kinds() {
        assert!(ErrorKind::Corrupt.requires_reset());
        assert!(ErrorKind::Migration.requires_reset());
        assert!(!ErrorKind::Database.requires_reset());
        assert!(!ErrorKind::RegionNotFound(1).requires_reset());
    }

    #[test]
    fn test_non_database_errors_are_not_corruption() {
        let err = ErrorKind::database(sqlx::Error::RowNotFound);
        assert_eq!(*err, ErrorKind::Database);
    }
}
