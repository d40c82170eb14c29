use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use tracing::instrument;

pub const DEFAULT_MIN_ZOOM: u8 = 0;
pub const DEFAULT_MAX_ZOOM: u8 = 22;

/// The tile URL templates and zoom bounds of a tiled source, either declared
/// inline in a style or fetched as a TileJSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Tileset {
    pub tiles: Vec<String>,
    pub min_zoom: u8,
    pub max_zoom: u8,
}
impl Tileset {
    pub fn new(tiles: Vec<String>) -> Self {
        Self { tiles, min_zoom: DEFAULT_MIN_ZOOM, max_zoom: DEFAULT_MAX_ZOOM }
    }

    pub fn with_zoom_range(mut self, min_zoom: Option<f64>, max_zoom: Option<f64>) -> Self {
        self.min_zoom = clamp_zoom(min_zoom, DEFAULT_MIN_ZOOM);
        self.max_zoom = clamp_zoom(max_zoom, DEFAULT_MAX_ZOOM).max(self.min_zoom);
        self
    }

    /// Parse a TileJSON document.
    ///
    /// Only the fields needed to enumerate tiles are read; everything else
    /// (attribution, bounds, vector layers) is ignored.
    #[instrument(skip(json), fields(json_size = json.len()))]
    pub fn from_tilejson(json: &[u8]) -> Result<Self> {
        let raw: RawTileJson = serde_json::from_slice(json).or_raise(|| ErrorKind::Malformed("TileJSON"))?;
        Ok(Self::new(raw.tiles).with_zoom_range(raw.minzoom, raw.maxzoom))
    }

    /// The template tiles are requested from. Only the first one is used.
    pub fn template(&self) -> Option<&str> {
        self.tiles.first().map(String::as_str)
    }
}

#[derive(Deserialize)]
struct RawTileJson {
    #[serde(default)]
    tiles: Vec<String>,
    minzoom: Option<f64>,
    maxzoom: Option<f64>,
}

fn clamp_zoom(zoom: Option<f64>, default: u8) -> u8 {
    match zoom {
        Some(zoom) if zoom.is_finite() => zoom.clamp(0.0, f64::from(DEFAULT_MAX_ZOOM)) as u8,
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_tilejson() {
        let json = br#"{
            "tilejson": "2.2.0",
            "tiles": ["https://a.example/{z}/{x}/{y}.pbf", "https://b.example/{z}/{x}/{y}.pbf"],
            "minzoom": 2,
            "maxzoom": 14,
            "attribution": "ignored"
        }"#;
        let tileset = Tileset::from_tilejson(json).unwrap();
        assert_eq!(tileset.template(), Some("https://a.example/{z}/{x}/{y}.pbf"));
        assert_eq!((tileset.min_zoom, tileset.max_zoom), (2, 14));
    }

    #[rstest]
    #[case(br#"{"tiles": ["t"]}"#.as_slice(), 0, 22)]
    #[case(br#"{"tiles": ["t"], "maxzoom": 40}"#.as_slice(), 0, 22)]
    #[case(br#"{"tiles": ["t"], "minzoom": 6, "maxzoom": 3}"#.as_slice(), 6, 6)]
    #[case(br#"{"tiles": ["t"], "minzoom": 4.7}"#.as_slice(), 4, 22)]
    fn test_zoom_defaults_and_clamping(#[case] json: &[u8], #[case] min: u8, #[case] max: u8) {
        let tileset = Tileset::from_tilejson(json).unwrap();
        assert_eq!((tileset.min_zoom, tileset.max_zoom), (min, max));
    }

    #[test]
    fn test_malformed_tilejson() {
        let err = Tileset::from_tilejson(b"<html>").unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed("TileJSON"));
    }
}
