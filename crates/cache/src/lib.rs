//! SQLite offline cache for map resources.
//!
//! One database holds two kinds of entries: **ambient** entries written by
//! ordinary cache traffic, bounded by a byte budget and evicted least
//! recently used first, and entries **retained** by one or more offline
//! regions, which are never evicted while a region links to them.
//!
//! # Architecture
//! - [`OfflineDatabase`] owns the connection pool and implements every
//!   operation: lookups and writes, eviction, regions and their retention
//!   links, and the hosted tile quota.
//! - [`OfflineStore`] moves the database onto a background task and hands out
//!   cloneable handles, serializing every operation.
//!
//! Tiles are keyed by their URL template and coordinates rather than by URL,
//! so a style pointing at different tile hosts over time still hits the cache.
//!
//! A corrupt or unmigratable database file is deleted and recreated; the
//! loss is reported through [`OfflineDatabase::reset_report`].

mod actor;
mod db;
pub mod error;
mod evict;
mod models;
mod quota;
mod regions;
mod store;

pub use crate::actor::OfflineStore;
pub use crate::db::Database;
pub use crate::models::{
    CacheEntry, DownloadState, LatLngBounds, PutOutcome, Region, RegionCompletedStatus, RegionDefinition,
};
pub use crate::store::{
    DEFAULT_HOSTED_URL_PREFIX, DEFAULT_MAX_AMBIENT_SIZE, DEFAULT_TILE_COUNT_LIMIT, OfflineDatabase, StoreOptions,
    StoreReset,
};

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tessera_compress::Compression;

    pub(crate) async fn memory_store(options: StoreOptions) -> OfflineDatabase {
        OfflineDatabase::open_in_memory(options).await.unwrap()
    }

    /// Options that store payloads verbatim, so stored sizes are predictable.
    pub(crate) fn uncompressed() -> StoreOptions {
        StoreOptions { compression: Compression::None, ..StoreOptions::default() }
    }

    pub(crate) fn definition() -> RegionDefinition {
        RegionDefinition::new("mapbox://styles/test/style", LatLngBounds::new(0.0, 0.0, 1.0, 1.0), 0.0, 2.0, 1.0)
    }

    /// Force an access time so eviction order is deterministic.
    pub(crate) async fn set_accessed(db: &OfflineDatabase, url: &str, accessed: i64) {
        sqlx::query("UPDATE resources SET accessed = ?1 WHERE url = ?2")
            .bind(accessed)
            .bind(url)
            .execute(db.db.pool())
            .await
            .unwrap();
    }
}
