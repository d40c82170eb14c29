//! Database connection and pool management.

use exn::ResultExt;
use sqlx::SqliteConnection;
use sqlx::pool::PoolConnectionMetadata;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use tracing::instrument;

use crate::error::{ErrorKind, Result};

/// Embedded migrations; the applied set doubles as the schema version marker.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
// Every access goes through the store actor, so only one connection is ever
// busy. A second one lets `close()` run `PRAGMA optimize` without waiting.
const MAX_CONNECTIONS: u32 = 2;

/// Database connection pool for the offline cache.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let db = Self::open_pool(options, max).await?;
        if let Err(err) = db.migrate().await {
            db.pool.close().await;
            return Err(err);
        }
        Ok(db)
    }

    async fn open_pool(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            // This is IMPORTANT to apply the query-based PRAGMAs to EVERY
            // connection (set by max connections) instead of only the
            // first connection returned by the pool.
            .after_connect(|conn, meta| Box::pin(async move { Self::apply_pragmas(conn, meta).await }))
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            // An in-memory database lives exactly as long as its connection.
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(ErrorKind::database)?;
        Ok(Self { pool })
    }

    /// Connect to the cache database at the given path.
    ///
    /// Creates the database file if it doesn't exist and runs migrations.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect without touching the schema, used to salvage information from
    /// a database that is about to be reset.
    pub(crate) async fn connect_unmigrated(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref());
        Self::open_pool(options, Some(1)).await
    }

    /// Connect to an in-memory database (useful for testing).
    ///
    /// Note:
    /// - In-memory databases are destroyed when the connection closes.
    /// - Do NOT apply `#[cfg(test)]` so that other crates can also use this in their tests.
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        // In-memory database must either use the same cache `.shared_cache(true)`,
        // or be limited to one connection. Otherwise parallel connections will
        // see different databases that contain different data.
        Self::new(options, Some(1)).await
    }

    /// Base connection options shared between file and in-memory databases.
    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            // Retention links rely on cascading deletes from `regions`.
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_millis(1500))
            // Eviction measures usage as `page_count - freelist_count`, which
            // only makes sense while freed pages stay in the file.
            .auto_vacuum(sqlx::sqlite::SqliteAutoVacuum::None)
    }

    /// Apply additional PRAGMA settings that aren't exposed via SqliteConnectOptions.
    async fn apply_pragmas(conn: &mut SqliteConnection, _meta: PoolConnectionMetadata) -> sqlx::Result<()> {
        sqlx::query(
            r#"
                PRAGMA locking_mode = NORMAL;
                PRAGMA wal_autocheckpoint = 800;
                PRAGMA cache_size = -8192;
                PRAGMA temp_store = MEMORY;
            "#,
        )
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Run database migrations.
    ///
    /// This is called automatically by `connect` and `connect_in_memory`.
    #[instrument("performing database migrations", skip(self))]
    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.map_err(ErrorKind::migration)
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Store-reported size in bytes: allocated pages minus free pages.
    pub async fn used_size(&self) -> Result<u64> {
        let page_size: i64 =
            sqlx::query_scalar("PRAGMA page_size").fetch_one(&self.pool).await.map_err(ErrorKind::database)?;
        let page_count: i64 =
            sqlx::query_scalar("PRAGMA page_count").fetch_one(&self.pool).await.map_err(ErrorKind::database)?;
        let freelist_count: i64 =
            sqlx::query_scalar("PRAGMA freelist_count").fetch_one(&self.pool).await.map_err(ErrorKind::database)?;
        u64::try_from(page_size * (page_count - freelist_count)).or_raise(|| ErrorKind::InvalidData("page count"))
    }

    pub async fn page_size(&self) -> Result<u64> {
        let page_size: i64 =
            sqlx::query_scalar("PRAGMA page_size").fetch_one(&self.pool).await.map_err(ErrorKind::database)?;
        u64::try_from(page_size).or_raise(|| ErrorKind::InvalidData("page size"))
    }

    /// Close the database connection pool.
    ///
    /// This waits for all connections to be returned to the pool and then
    /// closes them. After calling this, the Database instance should not
    /// be used.
    pub async fn close(&self) {
        // Let SQLite update query planner statistics
        _ = sqlx::query("PRAGMA optimize").execute(&self.pool).await;
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_in_memory() {
        let db = Database::connect_in_memory().await.unwrap();
        assert!(!db.pool().is_closed());
        db.close().await;
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::connect_in_memory().await.unwrap();
        // Running migrate again should succeed (already applied)
        db.migrate().await.unwrap();
        db.close().await;
    }

    #[tokio::test]
    async fn test_pragmas_are_applied() {
        let db = Database::connect_in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("PRAGMA foreign_keys").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, 1, "foreign_keys should be ON");
        let row: (i64,) = sqlx::query_as("PRAGMA cache_size").fetch_one(db.pool()).await.unwrap();
        assert_eq!(row.0, -8192, "cache_size should be set by after_connect()");
        db.close().await;
    }

    #[tokio::test]
    async fn test_used_size_is_page_aligned() {
        let db = Database::connect_in_memory().await.unwrap();
        let used = db.used_size().await.unwrap();
        let page_size = db.page_size().await.unwrap();
        assert!(used > 0);
        assert_eq!(used % page_size, 0);
    }
}
