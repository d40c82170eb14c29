//! Persistent cache store: lookups, writes and self-healing on corruption.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{CacheEntry, EntryRow, PutOutcome};
use crate::quota::TileQuota;
use exn::ResultExt;
use sqlx::SqliteConnection;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tessera_compress::Compression;
use tessera_source::{CacheKey, Resource, Response, TileCoordinates};
use time::UtcDateTime;
use tracing::{debug, error, instrument, warn};

/// 50 MiB
pub const DEFAULT_MAX_AMBIENT_SIZE: u64 = 50 * 1024 * 1024;
pub const DEFAULT_TILE_COUNT_LIMIT: u64 = 6000;
pub const DEFAULT_HOSTED_URL_PREFIX: &str = "mapbox://";

const UPDATE_RESOURCE: &str = include_str!("../queries/update_resource.sql");
const INSERT_RESOURCE: &str = include_str!("../queries/insert_resource.sql");
const UPDATE_TILE: &str = include_str!("../queries/update_tile.sql");
const INSERT_TILE: &str = include_str!("../queries/insert_tile.sql");

/// Tunables of an [`OfflineDatabase`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Byte budget eviction enforces before every ambient write.
    pub max_ambient_size: u64,
    /// Codec new payloads are stored with, when it makes them smaller.
    pub compression: Compression,
    /// Maximum number of distinct hosted tiles retained across all regions.
    pub tile_count_limit: u64,
    /// URL prefix identifying tiles served by the hosted provider.
    pub hosted_url_prefix: String,
}
impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            max_ambient_size: DEFAULT_MAX_AMBIENT_SIZE,
            compression: Compression::Deflate,
            tile_count_limit: DEFAULT_TILE_COUNT_LIMIT,
            hosted_url_prefix: DEFAULT_HOSTED_URL_PREFIX.to_string(),
        }
    }
}

/// Record of a destructive reset of the database.
///
/// Ambient data loss is expected and harmless; `regions_lost` is the part a
/// shell should tell its user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreReset {
    pub reason: ErrorKind,
    /// Regions that existed before the reset, `None` if they couldn't be
    /// counted.
    pub regions_lost: Option<u64>,
}

/// The offline database. Owns the connection pool, the ambient byte budget
/// and the memoized hosted tile count.
///
/// Methods take `&mut self`: all access is expected to be serialized, see
/// [`OfflineStore`](crate::OfflineStore).
#[derive(Debug)]
pub struct OfflineDatabase {
    pub(crate) db: Database,
    path: Option<PathBuf>,
    pub(crate) options: StoreOptions,
    pub(crate) quota: TileQuota,
    reset: Option<StoreReset>,
}

impl OfflineDatabase {
    fn new(db: Database, path: Option<PathBuf>, options: StoreOptions, reset: Option<StoreReset>) -> Self {
        let quota = TileQuota::new(options.tile_count_limit, options.hosted_url_prefix.clone());
        Self { db, path, options, quota, reset }
    }

    /// Open (or create) the database at `path`.
    ///
    /// A corrupt file, a file that isn't a database, or a schema that can't
    /// be migrated is deleted and recreated; see [`reset_report`](Self::reset_report).
    #[instrument(skip(options), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (db, reset) = match Database::connect(&path).await {
            Ok(db) => (db, None),
            Err(err) if err.requires_reset() => {
                let reason = (*err).clone();
                let regions_lost = count_regions_at(&path).await;
                error!(%reason, ?regions_lost, "offline database is unusable, recreating it");
                remove_database_files(&path).await?;
                (Database::connect(&path).await?, Some(StoreReset { reason, regions_lost }))
            },
            Err(err) => return Err(err),
        };
        Ok(Self::new(db, Some(path), options, reset))
    }

    /// Open a fresh in-memory database (useful for testing).
    pub async fn open_in_memory(options: StoreOptions) -> Result<Self> {
        Ok(Self::new(Database::connect_in_memory().await?, None, options, None))
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The most recent destructive reset, if one happened since opening.
    pub fn reset_report(&self) -> Option<&StoreReset> {
        self.reset.as_ref()
    }

    pub async fn close(self) {
        self.db.close().await;
    }

    /// Pass `result` through, resetting the database first when it reports
    /// corruption.
    pub(crate) async fn recover<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result
            && matches!(**err, ErrorKind::Corrupt)
            && let Err(reset_err) = self.reset_in_place().await
        {
            error!(error = ?reset_err, "unable to recreate offline database");
        }
        result
    }

    async fn reset_in_place(&mut self) -> Result<()> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };
        error!(path = %path.display(), "offline database is corrupt, recreating it");
        self.db.close().await;
        remove_database_files(&path).await?;
        self.db = Database::connect(&path).await?;
        self.quota.invalidate();
        self.reset = Some(StoreReset { reason: ErrorKind::Corrupt, regions_lost: None });
        Ok(())
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Look up a cached entry, refreshing its access time.
    #[instrument(skip(self), fields(url = %resource.url(), kind = %resource.kind()))]
    pub async fn get(&mut self, resource: &Resource) -> Result<Option<CacheEntry>> {
        let result = self.get_entry(resource).await;
        self.recover(result).await
    }

    async fn get_entry(&self, resource: &Resource) -> Result<Option<CacheEntry>> {
        let now = UtcDateTime::now().unix_timestamp();
        let pool = self.db.pool();
        let row: Option<EntryRow> = match resource.key() {
            CacheKey::Url(url) => {
                let touched = sqlx::query(include_str!("../queries/touch_resource.sql"))
                    .bind(now)
                    .bind(url)
                    .execute(pool)
                    .await
                    .map_err(ErrorKind::database)?;
                match touched.rows_affected() {
                    0 => None,
                    _ => Some(
                        sqlx::query_as(include_str!("../queries/get_resource.sql"))
                            .bind(url)
                            .fetch_one(pool)
                            .await
                            .map_err(ErrorKind::database)?,
                    ),
                }
            },
            CacheKey::Tile(tile) => {
                let touched = sqlx::query(include_str!("../queries/touch_tile.sql"))
                    .bind(now)
                    .bind(tile.url_template.as_str())
                    .bind(tile.pixel_ratio)
                    .bind(tile.x)
                    .bind(tile.y)
                    .bind(tile.z)
                    .execute(pool)
                    .await
                    .map_err(ErrorKind::database)?;
                match touched.rows_affected() {
                    0 => None,
                    _ => Some(
                        sqlx::query_as(include_str!("../queries/get_tile.sql"))
                            .bind(tile.url_template.as_str())
                            .bind(tile.pixel_ratio)
                            .bind(tile.x)
                            .bind(tile.y)
                            .bind(tile.z)
                            .fetch_one(pool)
                            .await
                            .map_err(ErrorKind::database)?,
                    ),
                }
            },
        };
        match row {
            Some(row) => {
                debug!("cache hit");
                Ok(Some(CacheEntry::try_from(row)?))
            },
            None => {
                debug!("cache miss");
                Ok(None)
            },
        }
    }

    /// Stored size of an entry without reading or decompressing it.
    ///
    /// `Some(0)` is a cached "no content" answer, `None` means not cached.
    pub async fn has(&mut self, resource: &Resource) -> Result<Option<u64>> {
        let result = self.has_entry(resource).await;
        self.recover(result).await
    }

    async fn has_entry(&self, resource: &Resource) -> Result<Option<u64>> {
        let size: Option<i64> = match resource.key() {
            CacheKey::Url(url) => sqlx::query_scalar(include_str!("../queries/has_resource.sql"))
                .bind(url)
                .fetch_optional(self.db.pool())
                .await
                .map_err(ErrorKind::database)?,
            CacheKey::Tile(tile) => sqlx::query_scalar(include_str!("../queries/has_tile.sql"))
                .bind(tile.url_template.as_str())
                .bind(tile.pixel_ratio)
                .bind(tile.x)
                .bind(tile.y)
                .bind(tile.z)
                .fetch_optional(self.db.pool())
                .await
                .map_err(ErrorKind::database)?,
        };
        size.map(|size| u64::try_from(size).or_raise(|| ErrorKind::InvalidData("entry size"))).transpose()
    }

    // =========================================================================
    // Write
    // =========================================================================

    /// Write a fetch response to the ambient cache, evicting least recently
    /// used unretained entries first to stay within the byte budget.
    ///
    /// Error responses are ignored. "Not modified" responses only refresh the
    /// freshness metadata of the existing entry. When eviction can't free
    /// enough space nothing is written and the outcome reports a size of 0.
    #[instrument(skip(self, response), fields(url = %resource.url(), kind = %resource.kind()))]
    pub async fn put(&mut self, resource: &Resource, response: &Response) -> Result<PutOutcome> {
        let result = self.put_entry(resource, response, true).await;
        self.recover(result).await
    }

    pub(crate) async fn put_entry(&self, resource: &Resource, response: &Response, evict: bool) -> Result<PutOutcome> {
        if let Some(error) = &response.error {
            debug!(%error, "not caching error response");
            return Ok(PutOutcome::default());
        }
        let now = UtcDateTime::now().unix_timestamp();
        if response.not_modified {
            self.refresh_entry(resource, response, now).await?;
            return Ok(PutOutcome::default());
        }

        let (blob, compression) = match response.data.as_deref() {
            Some(data) => {
                let (blob, compression) =
                    self.options.compression.shrink(data).or_raise(|| ErrorKind::Compression)?;
                (Some(blob), compression)
            },
            None => (None, Compression::None),
        };
        let stored_size = blob.as_ref().map_or(0, |blob| blob.len() as u64);
        if evict && !self.evict(stored_size).await? {
            warn!(size = stored_size, "unable to make space for entry");
            return Ok(PutOutcome::default());
        }

        let write = EntryWrite {
            etag: response.etag.as_deref(),
            modified: response.modified.map(UtcDateTime::unix_timestamp),
            expires: response.expires.map(UtcDateTime::unix_timestamp),
            must_revalidate: response.must_revalidate,
            accessed: now,
            data: blob.as_ref().map(Cow::as_ref),
            compression: compression.as_str(),
        };
        // Update first so the row (and every retention link to it) keeps its
        // id; only a missing row is inserted.
        let mut tx = self.db.pool().begin().await.map_err(ErrorKind::database)?;
        let inserted = match resource.key() {
            CacheKey::Url(url) => {
                let kind = resource.kind().code();
                let updated = write.resource(&mut tx, UPDATE_RESOURCE, url, kind).await?;
                updated == 0 && write.resource(&mut tx, INSERT_RESOURCE, url, kind).await? > 0
            },
            CacheKey::Tile(tile) => {
                let updated = write.tile(&mut tx, UPDATE_TILE, tile).await?;
                updated == 0 && write.tile(&mut tx, INSERT_TILE, tile).await? > 0
            },
        };
        tx.commit().await.map_err(ErrorKind::database)?;
        debug!(inserted, stored_size, %compression, "stored entry");
        Ok(PutOutcome { inserted, stored_size })
    }

    async fn refresh_entry(&self, resource: &Resource, response: &Response, now: i64) -> Result<()> {
        let expires = response.expires.map(UtcDateTime::unix_timestamp);
        let query = match resource.key() {
            CacheKey::Url(url) => sqlx::query(include_str!("../queries/refresh_resource.sql"))
                .bind(now)
                .bind(expires)
                .bind(response.must_revalidate)
                .bind(url),
            CacheKey::Tile(tile) => sqlx::query(include_str!("../queries/refresh_tile.sql"))
                .bind(now)
                .bind(expires)
                .bind(response.must_revalidate)
                .bind(tile.url_template.as_str())
                .bind(tile.pixel_ratio)
                .bind(tile.x)
                .bind(tile.y)
                .bind(tile.z),
        };
        query.execute(self.db.pool()).await.map_err(ErrorKind::database)?;
        Ok(())
    }
}

/// Column values shared by the update and insert statements, which bind
/// their parameters in the same order.
struct EntryWrite<'a> {
    etag: Option<&'a str>,
    modified: Option<i64>,
    expires: Option<i64>,
    must_revalidate: bool,
    accessed: i64,
    data: Option<&'a [u8]>,
    compression: &'static str,
}
impl EntryWrite<'_> {
    async fn resource(&self, conn: &mut SqliteConnection, sql: &'static str, url: &str, kind: i64) -> Result<u64> {
        let result = sqlx::query(sql)
            .bind(kind)
            .bind(self.etag)
            .bind(self.modified)
            .bind(self.expires)
            .bind(self.must_revalidate)
            .bind(self.accessed)
            .bind(self.data)
            .bind(self.compression)
            .bind(url)
            .execute(conn)
            .await
            .map_err(ErrorKind::database)?;
        Ok(result.rows_affected())
    }

    async fn tile(&self, conn: &mut SqliteConnection, sql: &'static str, tile: &TileCoordinates) -> Result<u64> {
        let result = sqlx::query(sql)
            .bind(self.etag)
            .bind(self.modified)
            .bind(self.expires)
            .bind(self.must_revalidate)
            .bind(self.accessed)
            .bind(self.data)
            .bind(self.compression)
            .bind(tile.url_template.as_str())
            .bind(tile.pixel_ratio)
            .bind(tile.x)
            .bind(tile.y)
            .bind(tile.z)
            .execute(conn)
            .await
            .map_err(ErrorKind::database)?;
        Ok(result.rows_affected())
    }
}

/// Best-effort count of the regions in a database that failed to open.
async fn count_regions_at(path: &Path) -> Option<u64> {
    let db = Database::connect_unmigrated(path).await.ok()?;
    let count: Option<i64> =
        sqlx::query_scalar(include_str!("../queries/count_regions.sql")).fetch_one(db.pool()).await.ok();
    db.pool().close().await;
    count.and_then(|count| u64::try_from(count).ok())
}

async fn remove_database_files(path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.as_os_str().to_owned();
        file.push(suffix);
        if let Err(err) = tokio::fs::remove_file(&file).await
            && err.kind() != std::io::ErrorKind::NotFound
        {
            return Err(err).or_raise(|| ErrorKind::Database);
        }
    }
    Ok(())
}
