//! Hosted tile quota: a cap on distinct hosted-provider tiles retained across
//! all regions.

use crate::OfflineDatabase;
use crate::error::{ErrorKind, Result};
use crate::models::PutOutcome;
use exn::ResultExt;
use tessera_source::{Resource, ResourceKind, Response};
use tracing::{debug, info, warn};

/// Quota settings plus the memoized count of retained hosted tiles.
#[derive(Debug, Clone)]
pub(crate) struct TileQuota {
    limit: u64,
    prefix: String,
    count: Option<u64>,
}
impl TileQuota {
    pub(crate) fn new(limit: u64, prefix: String) -> Self {
        Self { limit, prefix, count: None }
    }

    fn is_hosted(&self, resource: &Resource) -> bool {
        resource.kind() == ResourceKind::Tile && resource.url().starts_with(&self.prefix)
    }

    /// Forget the memoized count; the next read recomputes it.
    pub(crate) fn invalidate(&mut self) {
        self.count = None;
    }

    /// Account for a link created by a region write or cache hit.
    pub(crate) fn on_linked(&mut self, resource: &Resource, first: bool) {
        if first
            && self.is_hosted(resource)
            && let Some(count) = &mut self.count
        {
            *count += 1;
        }
    }
}

impl OfflineDatabase {
    pub fn tile_count_limit(&self) -> u64 {
        self.quota.limit
    }

    pub fn set_tile_count_limit(&mut self, limit: u64) {
        info!(limit, "setting hosted tile count limit");
        self.quota.limit = limit;
    }

    /// Distinct hosted tiles retained by at least one region.
    pub async fn hosted_tile_count(&mut self) -> Result<u64> {
        if let Some(count) = self.quota.count {
            return Ok(count);
        }
        let result = sqlx::query_scalar::<_, i64>(include_str!("../queries/hosted_tile_count.sql"))
            .bind(self.quota.prefix.as_str())
            .fetch_one(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        let count = u64::try_from(self.recover(result).await?).or_raise(|| ErrorKind::InvalidData("tile count"))?;
        debug!(count, "counted hosted tiles");
        self.quota.count = Some(count);
        Ok(count)
    }

    /// Whether the hosted tile count has reached the limit.
    pub async fn tile_count_limit_exceeded(&mut self) -> Result<bool> {
        Ok(self.hosted_tile_count().await? >= self.quota.limit)
    }

    /// Whether retaining `resource` would push the hosted tile count past the
    /// limit. Only hosted tiles no region retains yet count against it.
    pub async fn exceeds_tile_count_limit(&mut self, resource: &Resource) -> Result<bool> {
        let Some(tile) = resource.tile_coordinates().filter(|_| self.quota.is_hosted(resource)) else {
            return Ok(false);
        };
        let result = sqlx::query_scalar::<_, i64>(include_str!("../queries/tile_retained.sql"))
            .bind(tile.url_template.as_str())
            .bind(tile.pixel_ratio)
            .bind(tile.x)
            .bind(tile.y)
            .bind(tile.z)
            .fetch_one(self.db.pool())
            .await
            .map_err(ErrorKind::database);
        if self.recover(result).await? > 0 {
            return Ok(false);
        }
        self.tile_count_limit_exceeded().await
    }

    async fn check_tile_count_limit(&mut self, resource: &Resource) -> Result<()> {
        if self.exceeds_tile_count_limit(resource).await? {
            warn!(url = %resource.url(), limit = self.quota.limit, "hosted tile count limit exceeded");
            exn::bail!(ErrorKind::TileCountLimitExceeded(self.quota.limit));
        }
        Ok(())
    }

    /// Link an already cached entry to a region, subject to the hosted tile
    /// quota. Returns what [`mark_used`](Self::mark_used) returns.
    pub async fn link_region_resource(&mut self, region_id: i64, resource: &Resource) -> Result<bool> {
        self.check_tile_count_limit(resource).await?;
        let result = self.link_entry(region_id, resource).await;
        let first = self.recover(result).await?;
        self.quota.on_linked(resource, first);
        Ok(first)
    }

    /// Write a response fetched for a region and link it, subject to the
    /// hosted tile quota.
    ///
    /// Unlike [`put`](Self::put) this never evicts: region data may exceed the
    /// ambient budget.
    pub async fn put_region_resource(
        &mut self,
        region_id: i64,
        resource: &Resource,
        response: &Response,
    ) -> Result<PutOutcome> {
        self.check_tile_count_limit(resource).await?;
        let result = self.write_region_entry(region_id, resource, response).await;
        let (outcome, first) = self.recover(result).await?;
        self.quota.on_linked(resource, first);
        Ok(outcome)
    }

    async fn write_region_entry(
        &self,
        region_id: i64,
        resource: &Resource,
        response: &Response,
    ) -> Result<(PutOutcome, bool)> {
        let outcome = self.put_entry(resource, response, false).await?;
        let first = self.link_entry(region_id, resource).await?;
        debug!(url = %resource.url(), first, stored_size = outcome.stored_size, "stored region resource");
        Ok((outcome, first))
    }
}
