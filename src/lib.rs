//! Offline map resource cache.
//!
//! [`OfflineManager`] ties the pieces together: a configured
//! [`OfflineStore`], the [`FileSource`](tessera_source::FileSource) that
//! fetches from the network, and a [`RegionDownload`] per region being
//! downloaded.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tessera::{Config, LatLngBounds, OfflineManager, RegionDefinition};
//! use tessera_source::{MockSource, SourceHandle};
//!
//! # #[tokio::main]
//! # async fn main() -> tessera::error::Result<()> {
//! let source: SourceHandle = Arc::new(MockSource::default());
//! let config = Config::load(None).unwrap();
//! let manager = OfflineManager::open(&config, source).await?;
//! let definition = RegionDefinition::new(
//!     "mapbox://styles/mapbox/streets-v12",
//!     LatLngBounds::new(51.28, -0.51, 51.69, 0.33),
//!     0.0,
//!     14.0,
//!     2.0,
//! );
//! let region = manager.create_region(definition, "London").await?;
//! let (download, mut events) = manager.download(&region);
//! download.set_state(tessera::DownloadState::Active).await.unwrap();
//! while let Some(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
pub use tessera_cache::{
    CacheEntry, DownloadState, LatLngBounds, OfflineStore, Region, RegionDefinition, StoreOptions, StoreReset,
};
pub use tessera_config::Config;
pub use tessera_download::{DownloadOptions, RegionDownload, RegionEvent, RegionStatus};
use tessera_source::SourceHandle;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};

/// Entry point for applications: owns the store handle and the fetch source
/// every region download shares.
#[derive(Clone)]
pub struct OfflineManager {
    store: OfflineStore,
    source: SourceHandle,
    download: DownloadOptions,
}

impl OfflineManager {
    /// Open the database `config` points at, creating its directory when
    /// needed.
    #[instrument(skip_all)]
    pub async fn open(config: &Config, source: SourceHandle) -> Result<Self> {
        let options = StoreOptions {
            max_ambient_size: config.cache.max_ambient_size,
            compression: config.compression().or_raise(|| ErrorKind::Config)?,
            tile_count_limit: config.cache.tile_count_limit,
            hosted_url_prefix: config.cache.hosted_url_prefix.clone(),
        };
        let path = config.database_path().or_raise(|| ErrorKind::Config)?;
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.or_raise(|| ErrorKind::Io)?;
        }
        info!(path = %path.display(), "opening offline database");
        let store = OfflineStore::open(&path, options).await.or_raise(|| ErrorKind::Store)?;
        let download = DownloadOptions { max_concurrent_requests: config.download.max_concurrent_requests };
        let manager = Self { store, source, download };
        if let Some(reset) = manager.reset_report().await? {
            warn!(reason = %reset.reason, regions_lost = ?reset.regions_lost, "offline database was reset");
        }
        Ok(manager)
    }

    /// A manager over a throwaway in-memory database.
    pub async fn open_in_memory(options: StoreOptions, source: SourceHandle) -> Result<Self> {
        let store = OfflineStore::open_in_memory(options).await.or_raise(|| ErrorKind::Store)?;
        Ok(Self { store, source, download: DownloadOptions::default() })
    }

    pub fn with_download_options(mut self, options: DownloadOptions) -> Self {
        self.download = options;
        self
    }

    /// The underlying store, for ambient cache traffic and maintenance.
    pub fn store(&self) -> &OfflineStore {
        &self.store
    }

    /// What was lost when the database had to be recreated on open.
    pub async fn reset_report(&self) -> Result<Option<StoreReset>> {
        self.store.reset_report().await.or_raise(|| ErrorKind::Store)
    }

    pub async fn create_region(&self, definition: RegionDefinition, metadata: impl Into<Vec<u8>>) -> Result<Region> {
        self.store.create_region(definition, metadata.into()).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.store.list_regions().await.or_raise(|| ErrorKind::Store)
    }

    pub async fn get_region(&self, id: i64) -> Result<Region> {
        self.store.get_region(id).await.or_raise(|| ErrorKind::Store)
    }

    pub async fn update_metadata(&self, id: i64, metadata: impl Into<Vec<u8>>) -> Result<()> {
        self.store.update_metadata(id, metadata.into()).await.or_raise(|| ErrorKind::Store)
    }

    /// Delete a region. Resources no other region retains become ambient
    /// and are subject to eviction again.
    pub async fn delete_region(&self, id: i64) -> Result<()> {
        self.store.delete_region(id).await.or_raise(|| ErrorKind::Store)
    }

    /// Progress of a region without downloading anything. The required
    /// count is unknown until a download has run, so it reports what the
    /// store holds.
    pub async fn region_status(&self, id: i64) -> Result<RegionStatus> {
        let region = self.get_region(id).await?;
        let completed = self.store.region_completed_status(id).await.or_raise(|| ErrorKind::Store)?;
        Ok(RegionStatus {
            download_state: region.download_state,
            required_resource_count: completed.completed_count(),
            required_resource_count_is_precise: false,
            completed_resource_count: completed.completed_count(),
            completed_resource_size: completed.completed_size(),
            completed_tile_count: completed.completed_tile_count,
            completed_tile_size: completed.completed_tile_size,
        })
    }

    /// Start the download state machine of `region`. It stays idle until set
    /// active, unless the region was persisted as active.
    pub fn download(&self, region: &Region) -> (RegionDownload, mpsc::UnboundedReceiver<RegionEvent>) {
        RegionDownload::spawn(region, self.store.clone(), self.source.clone(), self.download)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessera_source::{MockSource, Resource, Response};

    const STYLE_URL: &str = "https://example.com/style.json";

    fn definition() -> RegionDefinition {
        RegionDefinition::new(STYLE_URL, LatLngBounds::world(), 0.0, 0.0, 1.0)
    }

    fn source() -> SourceHandle {
        Arc::new(MockSource::with_responses([(STYLE_URL, Response::ok(br#"{"version": 8}"#.to_vec()))]))
    }

    fn config(path: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.cache.path = Some(path.join("nested").join("offline.db"));
        config
    }

    #[test]
    fn test_config_defaults_match_store_defaults() {
        let config = Config::default();
        let options = StoreOptions::default();
        assert_eq!(config.cache.max_ambient_size, options.max_ambient_size);
        assert_eq!(config.compression().unwrap(), options.compression);
        assert_eq!(config.cache.tile_count_limit, options.tile_count_limit);
        assert_eq!(config.cache.hosted_url_prefix, options.hosted_url_prefix);
        assert_eq!(config.download.max_concurrent_requests, DownloadOptions::default().max_concurrent_requests);
    }

    #[tokio::test]
    async fn test_open_creates_database_directory() {
        let dir = tempfile::tempdir().unwrap();
        let manager = OfflineManager::open(&config(dir.path()), source()).await.unwrap();
        assert!(dir.path().join("nested").join("offline.db").exists());
        assert_eq!(manager.reset_report().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_regions_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path());
        let id = {
            let manager = OfflineManager::open(&config, source()).await.unwrap();
            let region = manager.create_region(definition(), "home").await.unwrap();
            manager.update_metadata(region.id, "work").await.unwrap();
            region.id
        };
        // The store task closes the database once the last handle is gone.
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;

        let manager = OfflineManager::open(&config, source()).await.unwrap();
        let regions = manager.list_regions().await.unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].id, id);
        assert_eq!(regions[0].metadata, b"work");
    }

    #[tokio::test]
    async fn test_download_through_manager() {
        let manager = OfflineManager::open_in_memory(StoreOptions::default(), source()).await.unwrap();
        let region = manager.create_region(definition(), Vec::new()).await.unwrap();
        let (download, mut events) = manager.download(&region);
        download.set_state(DownloadState::Active).await.unwrap();
        loop {
            match events.recv().await.unwrap() {
                RegionEvent::Status(status) if status.download_state == DownloadState::Complete => break,
                _ => {},
            }
        }

        let status = manager.region_status(region.id).await.unwrap();
        assert_eq!(status.download_state, DownloadState::Complete);
        assert_eq!(status.completed_resource_count, 1);
        assert!(manager.store().has(Resource::style(STYLE_URL)).await.unwrap().is_some());

        manager.delete_region(region.id).await.unwrap();
        let err = manager.get_region(region.id).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Store);
    }
}
