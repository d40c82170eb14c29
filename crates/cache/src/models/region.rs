use crate::error::{Error, ErrorKind, Result};
use crate::models::facet::RegionDefinitionProxy;
use derive_more::Display;
use exn::ResultExt;
use facet_json::{from_str as from_json, to_string as to_json};
use std::str::FromStr;

/// A geographic bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}
impl LatLngBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self { south, west, north, east }
    }

    /// The whole world, as far as Web Mercator reaches.
    pub fn world() -> Self {
        Self::new(-90.0, -180.0, 90.0, 180.0)
    }
}

/// What an offline region covers: a style rendered over a bounding box for a
/// zoom range at a given pixel density.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDefinition {
    pub style_url: String,
    pub bounds: LatLngBounds,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub pixel_ratio: f32,
    /// Download CJK and Hangul glyph ranges too. Off by default since the
    /// renderer can draw those locally.
    pub include_ideographs: bool,
}
impl RegionDefinition {
    pub fn new(
        style_url: impl Into<String>,
        bounds: LatLngBounds,
        min_zoom: f64,
        max_zoom: f64,
        pixel_ratio: f32,
    ) -> Self {
        Self {
            style_url: style_url.into(),
            bounds,
            min_zoom,
            max_zoom,
            pixel_ratio,
            include_ideographs: false,
        }
    }

    pub fn with_ideographs(mut self, include_ideographs: bool) -> Self {
        self.include_ideographs = include_ideographs;
        self
    }

    /// Reject definitions that can't describe a tile pyramid.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| ErrorKind::InvalidDefinition(reason.to_string());
        if self.style_url.is_empty() {
            exn::bail!(invalid("style URL is empty"));
        }
        if !self.min_zoom.is_finite() || !self.max_zoom.is_finite() || self.min_zoom < 0.0 {
            exn::bail!(invalid("zoom levels must be finite and not negative"));
        }
        if self.max_zoom < self.min_zoom {
            exn::bail!(invalid("maximum zoom is below minimum zoom"));
        }
        if !(self.pixel_ratio.is_finite() && self.pixel_ratio > 0.0) {
            exn::bail!(invalid("pixel ratio must be positive"));
        }
        let LatLngBounds { south, west, north, east } = self.bounds;
        if !(south <= north && west <= east) || [south, west, north, east].iter().any(|v| !v.is_finite()) {
            exn::bail!(invalid("bounds are inverted"));
        }
        Ok(())
    }

    pub(crate) fn to_json(&self) -> Result<String> {
        to_json(&RegionDefinitionProxy::from(self)).or_raise(|| ErrorKind::InvalidData("region definition"))
    }

    pub(crate) fn from_json(json: &str) -> Result<Self> {
        Ok(from_json::<RegionDefinitionProxy>(json).or_raise(|| ErrorKind::InvalidData("region definition"))?.into())
    }
}

/// Persisted download state of a region.
///
/// Shells use it to resume regions that were active when the process exited.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DownloadState {
    #[default]
    #[display("inactive")]
    Inactive,
    #[display("active")]
    Active,
    #[display("complete")]
    Complete,
}
impl DownloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadState::Inactive => "inactive",
            DownloadState::Active => "active",
            DownloadState::Complete => "complete",
        }
    }
}
impl FromStr for DownloadState {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "inactive" => Ok(DownloadState::Inactive),
            "active" => Ok(DownloadState::Active),
            "complete" => Ok(DownloadState::Complete),
            _ => exn::bail!(ErrorKind::InvalidData("download state")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: i64,
    pub definition: RegionDefinition,
    /// Opaque to the cache; usually a serialized name or description.
    pub metadata: Vec<u8>,
    pub download_state: DownloadState,
}

/// What a region has in the store right now, counted over its retention links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegionCompletedStatus {
    pub completed_resource_count: u64,
    pub completed_resource_size: u64,
    pub completed_tile_count: u64,
    pub completed_tile_size: u64,
}
impl RegionCompletedStatus {
    /// Resources and tiles together.
    pub fn completed_count(&self) -> u64 {
        self.completed_resource_count + self.completed_tile_count
    }

    pub fn completed_size(&self) -> u64 {
        self.completed_resource_size + self.completed_tile_size
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct RegionRow {
    pub(crate) id: i64,
    pub(crate) definition: String,
    pub(crate) metadata: Option<Vec<u8>>,
    pub(crate) download_state: String,
}
impl TryFrom<RegionRow> for Region {
    type Error = Error;
    fn try_from(row: RegionRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            definition: RegionDefinition::from_json(&row.definition)?,
            metadata: row.metadata.unwrap_or_default(),
            download_state: row.download_state.parse()?,
        })
    }
}
