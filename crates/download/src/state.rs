use crate::plan::Plan;
use tessera_cache::error::ErrorKind as CacheErrorKind;
use tessera_cache::{DownloadState, RegionCompletedStatus};
use tessera_source::ResponseError;

/// Progress of a region download.
///
/// The completed figures are counted from what the store retains for the
/// region, so they include resources linked by earlier activations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionStatus {
    pub download_state: DownloadState,
    /// Distinct resources the region needs, as far as discovered.
    pub required_resource_count: u64,
    /// Once `true` for an activation, stays `true` until it ends.
    pub required_resource_count_is_precise: bool,
    /// Resources and tiles together.
    pub completed_resource_count: u64,
    pub completed_resource_size: u64,
    pub completed_tile_count: u64,
    pub completed_tile_size: u64,
}
impl RegionStatus {
    pub(crate) fn new(download_state: DownloadState, plan: &Plan, completed: RegionCompletedStatus) -> Self {
        Self {
            download_state,
            required_resource_count: plan.required(),
            required_resource_count_is_precise: plan.is_precise(),
            completed_resource_count: completed.completed_count(),
            completed_resource_size: completed.completed_size(),
            completed_tile_count: completed.completed_tile_count,
            completed_tile_size: completed.completed_tile_size,
        }
    }

    /// Every required resource is in the store, and the requirement is final.
    pub fn is_complete(&self) -> bool {
        self.required_resource_count_is_precise && self.completed_resource_count >= self.required_resource_count
    }
}

/// Something a region observer should know about.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    /// Progress changed; sent after every resource settles.
    Status(RegionStatus),
    /// The fetch source failed to deliver a resource. The download carries
    /// on; reactivating the region retries it.
    ResponseError(ResponseError),
    /// The store failed to read or write a resource.
    StorageError(CacheErrorKind),
    /// The hosted tile quota stopped the download. Sent once per
    /// activation, after which the region is inactive.
    TileCountLimitExceeded(u64),
}
