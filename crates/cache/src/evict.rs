//! Least-recently-used eviction of ambient entries.

use crate::OfflineDatabase;
use crate::error::{ErrorKind, Result};
use tracing::{debug, info, instrument};

/// Entries considered per eviction round; the newest access time among them
/// becomes the cutoff.
const EVICTION_BATCH: i64 = 50;

impl OfflineDatabase {
    /// Delete least recently used unretained entries until `needed` more
    /// bytes fit within the ambient budget.
    ///
    /// Returns `false` when no unretained entry is left to delete and the
    /// budget still isn't met. Entries retained by a region are never
    /// touched, so a store full of region data can legitimately exceed the
    /// budget.
    #[instrument(skip(self))]
    pub(crate) async fn evict(&self, needed: u64) -> Result<bool> {
        let page_size = self.db.page_size().await?;
        loop {
            let used = self.db.used_size().await?;
            // One page of headroom for the row itself.
            if used.saturating_add(needed).saturating_add(page_size) <= self.options.max_ambient_size {
                return Ok(true);
            }
            let cutoff: Option<i64> = sqlx::query_scalar(include_str!("../queries/eviction_cutoff.sql"))
                .bind(EVICTION_BATCH)
                .fetch_one(self.db.pool())
                .await
                .map_err(ErrorKind::database)?;
            let Some(cutoff) = cutoff else {
                debug!(used, "nothing left to evict");
                return Ok(false);
            };
            let resources = sqlx::query(include_str!("../queries/evict_resources.sql"))
                .bind(cutoff)
                .execute(self.db.pool())
                .await
                .map_err(ErrorKind::database)?
                .rows_affected();
            let tiles = sqlx::query(include_str!("../queries/evict_tiles.sql"))
                .bind(cutoff)
                .execute(self.db.pool())
                .await
                .map_err(ErrorKind::database)?
                .rows_affected();
            debug!(used, cutoff, resources, tiles, "evicted ambient entries");
            if resources + tiles == 0 {
                return Ok(false);
            }
        }
    }

    /// Change the ambient byte budget and evict down to it right away.
    ///
    /// The new budget stays in effect even when eviction can't reach it, in
    /// which case [`ErrorKind::NoSpace`] is returned.
    pub async fn set_maximum_ambient_cache_size(&mut self, size: u64) -> Result<()> {
        info!(size, "setting maximum ambient cache size");
        self.options.max_ambient_size = size;
        let result = self.evict(0).await;
        match self.recover(result).await? {
            true => Ok(()),
            false => exn::bail!(ErrorKind::NoSpace),
        }
    }

    /// Delete every entry not retained by a region.
    #[instrument(skip(self))]
    pub async fn clear_ambient_cache(&mut self) -> Result<()> {
        let statements = [
            include_str!("../queries/clear_ambient_resources.sql"),
            include_str!("../queries/clear_ambient_tiles.sql"),
        ];
        let result = self.run_pair(statements).await;
        let (resources, tiles) = self.recover(result).await?;
        info!(resources, tiles, "cleared ambient cache");
        Ok(())
    }

    /// Mark every entry not retained by a region as stale, so it is
    /// revalidated before its next use.
    #[instrument(skip(self))]
    pub async fn invalidate_ambient_cache(&mut self) -> Result<()> {
        let statements = [
            include_str!("../queries/invalidate_ambient_resources.sql"),
            include_str!("../queries/invalidate_ambient_tiles.sql"),
        ];
        let result = self.run_pair(statements).await;
        let (resources, tiles) = self.recover(result).await?;
        info!(resources, tiles, "invalidated ambient cache");
        Ok(())
    }

    /// Store-reported size of the database in bytes.
    pub async fn database_size(&mut self) -> Result<u64> {
        let result = self.db.used_size().await;
        self.recover(result).await
    }

    /// Run a resources statement and its tiles twin in one transaction.
    async fn run_pair(&self, [resources, tiles]: [&'static str; 2]) -> Result<(u64, u64)> {
        let mut tx = self.db.pool().begin().await.map_err(ErrorKind::database)?;
        let resources = sqlx::query(resources).execute(&mut *tx).await.map_err(ErrorKind::database)?;
        let tiles = sqlx::query(tiles).execute(&mut *tx).await.map_err(ErrorKind::database)?;
        tx.commit().await.map_err(ErrorKind::database)?;
        Ok((resources.rows_affected(), tiles.rows_affected()))
    }
}
