//! A cloneable handle that serializes every store operation onto one task.

use crate::error::{ErrorKind, Result};
use crate::models::{CacheEntry, DownloadState, PutOutcome, Region, RegionCompletedStatus, RegionDefinition};
use crate::{OfflineDatabase, StoreOptions, StoreReset};
use futures::future::BoxFuture;
use std::path::Path;
use tessera_source::{Resource, Response};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

type Job = Box<dyn for<'a> FnOnce(&'a mut OfflineDatabase) -> BoxFuture<'a, ()> + Send>;

fn job<F>(f: F) -> Job
where
    F: for<'a> FnOnce(&'a mut OfflineDatabase) -> BoxFuture<'a, ()> + Send + 'static,
{
    Box::new(f)
}

/// Handle to an [`OfflineDatabase`] owned by a background task.
///
/// Operations run one at a time in the order they were submitted, so each one
/// observes the effects of every operation before it. The task stops, closing
/// the database, once the last handle is dropped.
#[derive(Debug, Clone)]
pub struct OfflineStore {
    jobs: mpsc::UnboundedSender<Job>,
}

impl OfflineStore {
    /// Move `db` onto a background task. Must be called within a Tokio
    /// runtime.
    pub fn spawn(db: OfflineDatabase) -> Self {
        let (jobs, mut queue) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            let mut db = db;
            while let Some(job) = queue.recv().await {
                job(&mut db).await;
            }
            db.close().await;
            debug!("offline store stopped");
        });
        Self { jobs }
    }

    pub async fn open(path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        Ok(Self::spawn(OfflineDatabase::open(path, options).await?))
    }

    pub async fn open_in_memory(options: StoreOptions) -> Result<Self> {
        Ok(Self::spawn(OfflineDatabase::open_in_memory(options).await?))
    }

    /// Run `f` against the database once every earlier operation finished.
    pub async fn call<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: for<'a> FnOnce(&'a mut OfflineDatabase) -> BoxFuture<'a, Result<T>> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let job = job(move |db| {
            Box::pin(async move {
                // The caller may have given up waiting.
                _ = reply.send(f(db).await);
            })
        });
        if self.jobs.send(job).is_err() {
            exn::bail!(ErrorKind::Closed);
        }
        match response.await {
            Ok(result) => result,
            Err(_) => exn::bail!(ErrorKind::Closed),
        }
    }

    pub async fn get(&self, resource: Resource) -> Result<Option<CacheEntry>> {
        self.call(move |db| Box::pin(async move { db.get(&resource).await })).await
    }

    pub async fn has(&self, resource: Resource) -> Result<Option<u64>> {
        self.call(move |db| Box::pin(async move { db.has(&resource).await })).await
    }

    pub async fn put(&self, resource: Resource, response: Response) -> Result<PutOutcome> {
        self.call(move |db| Box::pin(async move { db.put(&resource, &response).await })).await
    }

    pub async fn put_region_resource(
        &self,
        region_id: i64,
        resource: Resource,
        response: Response,
    ) -> Result<PutOutcome> {
        self.call(move |db| Box::pin(async move { db.put_region_resource(region_id, &resource, &response).await }))
            .await
    }

    pub async fn link_region_resource(&self, region_id: i64, resource: Resource) -> Result<bool> {
        self.call(move |db| Box::pin(async move { db.link_region_resource(region_id, &resource).await })).await
    }

    pub async fn mark_used(&self, region_id: i64, resource: Resource) -> Result<bool> {
        self.call(move |db| Box::pin(async move { db.mark_used(region_id, &resource).await })).await
    }

    pub async fn create_region(&self, definition: RegionDefinition, metadata: Vec<u8>) -> Result<Region> {
        self.call(move |db| Box::pin(async move { db.create_region(&definition, &metadata).await })).await
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>> {
        self.call(|db| Box::pin(db.list_regions())).await
    }

    pub async fn get_region(&self, id: i64) -> Result<Region> {
        self.call(move |db| Box::pin(db.get_region(id))).await
    }

    pub async fn update_metadata(&self, id: i64, metadata: Vec<u8>) -> Result<()> {
        self.call(move |db| Box::pin(async move { db.update_metadata(id, &metadata).await })).await
    }

    pub async fn set_region_download_state(&self, id: i64, state: DownloadState) -> Result<()> {
        self.call(move |db| Box::pin(db.set_region_download_state(id, state))).await
    }

    pub async fn delete_region(&self, id: i64) -> Result<()> {
        self.call(move |db| Box::pin(db.delete_region(id))).await
    }

    pub async fn invalidate_region(&self, id: i64) -> Result<()> {
        self.call(move |db| Box::pin(db.invalidate_region(id))).await
    }

    pub async fn region_completed_status(&self, id: i64) -> Result<RegionCompletedStatus> {
        self.call(move |db| Box::pin(db.region_completed_status(id))).await
    }

    pub async fn set_maximum_ambient_cache_size(&self, size: u64) -> Result<()> {
        self.call(move |db| Box::pin(db.set_maximum_ambient_cache_size(size))).await
    }

    pub async fn clear_ambient_cache(&self) -> Result<()> {
        self.call(|db| Box::pin(db.clear_ambient_cache())).await
    }

    pub async fn invalidate_ambient_cache(&self) -> Result<()> {
        self.call(|db| Box::pin(db.invalidate_ambient_cache())).await
    }

    pub async fn database_size(&self) -> Result<u64> {
        self.call(|db| Box::pin(db.database_size())).await
    }

    pub async fn hosted_tile_count(&self) -> Result<u64> {
        self.call(|db| Box::pin(db.hosted_tile_count())).await
    }

    pub async fn tile_count_limit_exceeded(&self) -> Result<bool> {
        self.call(|db| Box::pin(db.tile_count_limit_exceeded())).await
    }

    pub async fn exceeds_tile_count_limit(&self, resource: Resource) -> Result<bool> {
        self.call(move |db| Box::pin(async move { db.exceeds_tile_count_limit(&resource).await })).await
    }

    pub async fn tile_count_limit(&self) -> Result<u64> {
        self.call(|db| Box::pin(async move { Ok(db.tile_count_limit()) })).await
    }

    pub async fn set_tile_count_limit(&self, limit: u64) -> Result<()> {
        self.call(move |db| {
            Box::pin(async move {
                db.set_tile_count_limit(limit);
                Ok(())
            })
        })
        .await
    }

    pub async fn reset_report(&self) -> Result<Option<StoreReset>> {
        self.call(|db| Box::pin(async move { Ok(db.reset_report().cloned()) })).await
    }
}
