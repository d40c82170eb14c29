mod entry;
mod facet;
mod region;

pub(crate) use self::entry::EntryRow;
pub use self::entry::{CacheEntry, PutOutcome};
pub(crate) use self::region::RegionRow;
pub use self::region::{DownloadState, LatLngBounds, Region, RegionCompletedStatus, RegionDefinition};
