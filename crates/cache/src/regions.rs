//! Offline regions and the retention links that pin entries to them.

use crate::OfflineDatabase;
use crate::error::{ErrorKind, Result};
use crate::models::{DownloadState, Region, RegionCompletedStatus, RegionDefinition, RegionRow};
use exn::ResultExt;
use tessera_source::{CacheKey, Resource};
use tracing::{debug, info, instrument};

impl OfflineDatabase {
    /// Persist a new region. The download state starts out inactive.
    #[instrument(skip_all, fields(style = %definition.style_url))]
    pub async fn create_region(&mut self, definition: &RegionDefinition, metadata: &[u8]) -> Result<Region> {
        definition.validate()?;
        let json = definition.to_json()?;
        let result = sqlx::query(include_str!("../queries/insert_region.sql"))
            .bind(&json)
            .bind(metadata)
            .bind(DownloadState::Inactive.as_str())
            .execute(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        let id = self.recover(result).await?.last_insert_rowid();
        info!(id, "created region");
        Ok(Region {
            id,
            definition: definition.clone(),
            metadata: metadata.to_vec(),
            download_state: DownloadState::Inactive,
        })
    }

    /// All regions, oldest first.
    pub async fn list_regions(&mut self) -> Result<Vec<Region>> {
        let result = sqlx::query_as::<_, RegionRow>(include_str!("../queries/list_regions.sql"))
            .fetch_all(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        self.recover(result).await?.into_iter().map(Region::try_from).collect()
    }

    pub async fn get_region(&mut self, id: i64) -> Result<Region> {
        let result = sqlx::query_as::<_, RegionRow>(include_str!("../queries/get_region.sql"))
            .bind(id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        match self.recover(result).await? {
            Some(row) => Region::try_from(row),
            None => exn::bail!(ErrorKind::RegionNotFound(id)),
        }
    }

    /// Replace the opaque metadata of a region.
    pub async fn update_metadata(&mut self, id: i64, metadata: &[u8]) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/update_region_metadata.sql"))
            .bind(metadata)
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        if self.recover(result).await?.rows_affected() == 0 {
            exn::bail!(ErrorKind::RegionNotFound(id));
        }
        Ok(())
    }

    pub async fn set_region_download_state(&mut self, id: i64, state: DownloadState) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/update_region_download_state.sql"))
            .bind(state.as_str())
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        if self.recover(result).await?.rows_affected() == 0 {
            exn::bail!(ErrorKind::RegionNotFound(id));
        }
        debug!(id, %state, "updated region download state");
        Ok(())
    }

    /// Delete a region together with its retention links.
    ///
    /// Entries it retained become ambient and are evicted right away if the
    /// store is over its ambient budget.
    #[instrument(skip(self))]
    pub async fn delete_region(&mut self, id: i64) -> Result<()> {
        let result = sqlx::query(include_str!("../queries/delete_region.sql"))
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        if self.recover(result).await?.rows_affected() == 0 {
            exn::bail!(ErrorKind::RegionNotFound(id));
        }
        self.quota.invalidate();
        let result = self.evict(0).await;
        if !self.recover(result).await? {
            debug!("ambient cache still over budget after deleting region");
        }
        info!("deleted region");
        Ok(())
    }

    /// Mark everything a region retains as stale, so it is revalidated before
    /// its next use.
    pub async fn invalidate_region(&mut self, id: i64) -> Result<()> {
        let result = self.invalidate_region_entries(id).await;
        self.recover(result).await
    }

    async fn invalidate_region_entries(&self, id: i64) -> Result<()> {
        let mut tx = self.db.pool().begin().await.map_err(ErrorKind::database)?;
        for sql in [
            include_str!("../queries/invalidate_region_resources.sql"),
            include_str!("../queries/invalidate_region_tiles.sql"),
        ] {
            sqlx::query(sql).bind(id).execute(&mut *tx).await.map_err(ErrorKind::database)?;
        }
        tx.commit().await.map_err(ErrorKind::database)?;
        Ok(())
    }

    /// Link an existing entry to a region.
    ///
    /// Returns `true` only if this created the link and no other region
    /// retained the entry before, i.e. the entry just stopped being ambient.
    /// Missing entries and existing links yield `false`.
    ///
    /// Unlike [`link_region_resource`](Self::link_region_resource) the hosted
    /// tile quota isn't enforced, but the tile still counts toward it.
    pub async fn mark_used(&mut self, region_id: i64, resource: &Resource) -> Result<bool> {
        let result = self.link_entry(region_id, resource).await;
        let first = self.recover(result).await?;
        self.quota.on_linked(resource, first);
        Ok(first)
    }

    pub(crate) async fn link_entry(&self, region_id: i64, resource: &Resource) -> Result<bool> {
        let mut tx = self.db.pool().begin().await.map_err(ErrorKind::database)?;
        let first = match resource.key() {
            CacheKey::Url(url) => {
                let linked = sqlx::query(include_str!("../queries/mark_resource_used.sql"))
                    .bind(region_id)
                    .bind(url)
                    .execute(&mut *tx)
                    .await
                    .map_err(ErrorKind::database)?
                    .rows_affected();
                linked > 0
                    && sqlx::query_scalar::<_, i64>(include_str!("../queries/resource_retained_elsewhere.sql"))
                        .bind(region_id)
                        .bind(url)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(ErrorKind::database)?
                        == 0
            },
            CacheKey::Tile(tile) => {
                let linked = sqlx::query(include_str!("../queries/mark_tile_used.sql"))
                    .bind(region_id)
                    .bind(tile.url_template.as_str())
                    .bind(tile.pixel_ratio)
                    .bind(tile.x)
                    .bind(tile.y)
                    .bind(tile.z)
                    .execute(&mut *tx)
                    .await
                    .map_err(ErrorKind::database)?
                    .rows_affected();
                linked > 0
                    && sqlx::query_scalar::<_, i64>(include_str!("../queries/tile_retained_elsewhere.sql"))
                        .bind(region_id)
                        .bind(tile.url_template.as_str())
                        .bind(tile.pixel_ratio)
                        .bind(tile.x)
                        .bind(tile.y)
                        .bind(tile.z)
                        .fetch_one(&mut *tx)
                        .await
                        .map_err(ErrorKind::database)?
                        == 0
            },
        };
        tx.commit().await.map_err(ErrorKind::database)?;
        Ok(first)
    }

    /// Count and total stored size of what a region retains right now.
    pub async fn region_completed_status(&mut self, id: i64) -> Result<RegionCompletedStatus> {
        let result = self.completed_status(id).await;
        self.recover(result).await
    }

    async fn completed_status(&self, id: i64) -> Result<RegionCompletedStatus> {
        let (resource_count, resource_size): (i64, i64) =
            sqlx::query_as(include_str!("../queries/region_resources_status.sql"))
                .bind(id)
                .fetch_one(self.db.pool())
                .await
                .map_err(ErrorKind::database)?;
        let (tile_count, tile_size): (i64, i64) = sqlx::query_as(include_str!("../queries/region_tiles_status.sql"))
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(ErrorKind::database)?;
        let unsigned = |value: i64| u64::try_from(value).or_raise(|| ErrorKind::InvalidData("region status"));
        Ok(RegionCompletedStatus {
            completed_resource_count: unsigned(resource_count)?,
            completed_resource_size: unsigned(resource_size)?,
            completed_tile_count: unsigned(tile_count)?,
            completed_tile_size: unsigned(tile_size)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreOptions;
    use crate::testing::{definition, memory_store, uncompressed};
    use tessera_source::Response;

    const TEMPLATE: &str = "https://tiles.example.com/{z}/{x}/{y}.pbf";

    #[tokio::test]
    async fn test_region_lifecycle() {
        let mut db = memory_store(StoreOptions::default()).await;
        let first = db.create_region(&definition(), b"home").await.unwrap();
        let second = db.create_region(&definition().with_ideographs(true), b"work").await.unwrap();
        assert!(second.id > first.id);
        assert_eq!(first.download_state, DownloadState::Inactive);

        let regions = db.list_regions().await.unwrap();
        assert_eq!(regions, vec![first.clone(), second.clone()]);

        db.update_metadata(first.id, b"cabin").await.unwrap();
        db.set_region_download_state(first.id, DownloadState::Active).await.unwrap();
        let fetched = db.get_region(first.id).await.unwrap();
        assert_eq!(fetched.metadata, b"cabin");
        assert_eq!(fetched.download_state, DownloadState::Active);
        assert_eq!(fetched.definition, definition());

        db.delete_region(first.id).await.unwrap();
        assert_eq!(db.list_regions().await.unwrap(), vec![second]);
    }

    #[tokio::test]
    async fn test_missing_region() {
        let mut db = memory_store(StoreOptions::default()).await;
        assert_eq!(*db.get_region(42).await.unwrap_err(), ErrorKind::RegionNotFound(42));
        assert_eq!(*db.update_metadata(42, b"").await.unwrap_err(), ErrorKind::RegionNotFound(42));
        assert_eq!(*db.delete_region(42).await.unwrap_err(), ErrorKind::RegionNotFound(42));
        let err = db.set_region_download_state(42, DownloadState::Active).await.unwrap_err();
        assert_eq!(*err, ErrorKind::RegionNotFound(42));
    }

    #[tokio::test]
    async fn test_invalid_definition_is_rejected() {
        let mut db = memory_store(StoreOptions::default()).await;
        let invalid = RegionDefinition { min_zoom: 5.0, max_zoom: 1.0, ..definition() };
        let err = db.create_region(&invalid, b"").await.unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidDefinition(_)));
        assert!(db.list_regions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_used_is_idempotent() {
        let mut db = memory_store(StoreOptions::default()).await;
        let region = db.create_region(&definition(), b"").await.unwrap();
        let style = Resource::style("https://example.com/style.json");
        assert!(!db.mark_used(region.id, &style).await.unwrap(), "missing entries can't be linked");

        db.put(&style, &Response::ok(b"{}".to_vec())).await.unwrap();
        assert!(db.mark_used(region.id, &style).await.unwrap());
        assert!(!db.mark_used(region.id, &style).await.unwrap());
        let links: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM region_resources").fetch_one(db.db.pool()).await.unwrap();
        assert_eq!(links, 1);
    }

    #[tokio::test]
    async fn test_mark_used_reports_retention_elsewhere() {
        let mut db = memory_store(StoreOptions::default()).await;
        let first = db.create_region(&definition(), b"").await.unwrap();
        let second = db.create_region(&definition(), b"").await.unwrap();
        let tile = Resource::tile(TEMPLATE, 1.0, 0, 0, 0);
        db.put(&tile, &Response::ok(b"tile".to_vec())).await.unwrap();

        assert!(db.mark_used(first.id, &tile).await.unwrap());
        assert!(!db.mark_used(second.id, &tile).await.unwrap());
        assert!(!db.mark_used(second.id, &tile).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_keeps_retention_links() {
        let mut db = memory_store(uncompressed()).await;
        let region = db.create_region(&definition(), b"").await.unwrap();
        let tile = Resource::tile(TEMPLATE, 1.0, 3, 4, 5);
        db.put_region_resource(region.id, &tile, &Response::ok(b"old".to_vec())).await.unwrap();
        db.put(&tile, &Response::ok(b"newer".to_vec())).await.unwrap();

        let status = db.region_completed_status(region.id).await.unwrap();
        assert_eq!(status.completed_tile_count, 1);
        assert_eq!(status.completed_tile_size, 5);
        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tiles").fetch_one(db.db.pool()).await.unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn test_completed_status_counts_links() {
        let mut db = memory_store(uncompressed()).await;
        let region = db.create_region(&definition(), b"").await.unwrap();
        let other = db.create_region(&definition(), b"").await.unwrap();
        let style = Resource::style("https://example.com/style.json");
        db.put_region_resource(region.id, &style, &Response::ok(b"style".to_vec())).await.unwrap();
        let source = Resource::source("https://example.com/source.json");
        db.put_region_resource(region.id, &source, &Response::ok(b"source".to_vec())).await.unwrap();
        let tile = Resource::tile(TEMPLATE, 1.0, 0, 0, 0);
        db.put_region_resource(region.id, &tile, &Response::no_content()).await.unwrap();
        db.put(&Resource::style("https://example.com/ambient.json"), &Response::ok(b"x".to_vec())).await.unwrap();

        let status = db.region_completed_status(region.id).await.unwrap();
        assert_eq!(
            status,
            RegionCompletedStatus {
                completed_resource_count: 2,
                completed_resource_size: 11,
                completed_tile_count: 1,
                completed_tile_size: 0,
            }
        );
        assert_eq!(db.region_completed_status(other.id).await.unwrap(), RegionCompletedStatus::default());
    }

    #[tokio::test]
    async fn test_delete_region_releases_entries() {
        let mut db = memory_store(StoreOptions::default()).await;
        let region = db.create_region(&definition(), b"").await.unwrap();
        let style = Resource::style("https://example.com/style.json");
        db.put_region_resource(region.id, &style, &Response::ok(b"{}".to_vec())).await.unwrap();

        db.delete_region(region.id).await.unwrap();
        // Still cached, but ambient now.
        assert!(db.has(&style).await.unwrap().is_some());
        db.clear_ambient_cache().await.unwrap();
        assert_eq!(db.has(&style).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_invalidate_region() {
        let mut db = memory_store(StoreOptions::default()).await;
        let region = db.create_region(&definition(), b"").await.unwrap();
        let tile = Resource::tile(TEMPLATE, 1.0, 0, 0, 0);
        db.put_region_resource(region.id, &tile, &Response::ok(b"tile".to_vec())).await.unwrap();
        let ambient = Resource::style("https://example.com/style.json");
        db.put(&ambient, &Response::ok(b"{}".to_vec())).await.unwrap();

        db.invalidate_region(region.id).await.unwrap();
        let entry = db.get(&tile).await.unwrap().unwrap();
        assert_eq!(entry.expires.map(|e| e.unix_timestamp()), Some(0));
        assert!(entry.must_revalidate);
        assert!(!db.get(&ambient).await.unwrap().unwrap().must_revalidate);
    }
}
