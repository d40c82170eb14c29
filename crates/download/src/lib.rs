//! Offline region downloads.
//!
//! A [`RegionDownload`] drives one region from its style URL to a complete
//! set of retained resources:
//!
//! 1. The style is fetched and parsed for sources, sprites and glyphs.
//! 2. TileJSON sources are fetched and parsed for their tile templates.
//! 3. Every tile covering the region's bounds and zoom range is fetched.
//!
//! Everything is read from the cache first; the fetch source only sees what
//! the store doesn't already hold. Resources are written to the store and
//! linked to the region as they arrive, so an interrupted download resumes
//! where it left off.

mod cover;
mod download;
pub mod error;
mod plan;
mod state;

pub use crate::cover::{MAX_LATITUDE, covering_zoom, covering_zoom_range, tile_count, tile_cover};
pub use crate::download::{DEFAULT_MAX_CONCURRENT_REQUESTS, DownloadOptions, RegionDownload};
pub use crate::state::{RegionEvent, RegionStatus};
