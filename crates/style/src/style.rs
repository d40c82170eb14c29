use crate::error::{ErrorKind, Result};
use crate::glyphs::DEFAULT_FONT_STACK;
use crate::tileset::Tileset;
use derive_more::Display;
use exn::ResultExt;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

pub const DEFAULT_TILE_SIZE: u16 = 512;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    #[display("vector")]
    Vector,
    #[display("raster")]
    Raster,
    #[display("raster-dem")]
    RasterDem,
    #[display("geojson")]
    GeoJson,
    #[display("image")]
    Image,
    #[display("video")]
    Video,
}
impl SourceKind {
    fn from_type(value: &str) -> Option<Self> {
        match value {
            "vector" => Some(Self::Vector),
            "raster" => Some(Self::Raster),
            "raster-dem" => Some(Self::RasterDem),
            "geojson" => Some(Self::GeoJson),
            "image" => Some(Self::Image),
            "video" => Some(Self::Video),
            _ => None,
        }
    }

    /// Whether this source is rendered from a tile pyramid.
    pub fn is_tiled(&self) -> bool {
        matches!(self, Self::Vector | Self::Raster | Self::RasterDem)
    }
}

/// Where the data of a source comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLocation {
    /// Tile templates declared inline in the style.
    Tiles(Tileset),
    /// A URL to fetch: TileJSON for tiled sources, the data itself for
    /// GeoJSON, image and video sources.
    Url(String),
    /// Data embedded in the style; nothing to fetch.
    Inline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSource {
    pub id: String,
    pub kind: SourceKind,
    pub tile_size: u16,
    pub location: SourceLocation,
}

/// Everything a style document references that has to be downloaded for
/// the style to render offline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleResources {
    pub sources: Vec<StyleSource>,
    /// Sprite base URL, without the `.json`/`.png` suffix.
    pub sprite: Option<String>,
    /// Glyph URL template with `{fontstack}` and `{range}` tokens.
    pub glyphs: Option<String>,
    pub font_stacks: BTreeSet<Vec<String>>,
}
impl StyleResources {
    /// Extract resource references from a style document.
    ///
    /// Sources of unknown types are skipped. Font stacks are collected from
    /// the `text-font` property of symbol layers, falling back to the default
    /// stack when the property is unset.
    #[instrument(skip(json), fields(json_size = json.len()))]
    pub fn parse(json: &[u8]) -> Result<Self> {
        let raw: RawStyle = serde_json::from_slice(json).or_raise(|| ErrorKind::Malformed("style"))?;
        let mut sources = Vec::with_capacity(raw.sources.len());
        for (id, source) in raw.sources {
            let Some(kind) = SourceKind::from_type(&source.kind) else {
                debug!(source = %id, kind = %source.kind, "skipping source of unsupported type");
                continue;
            };
            let location = match (kind, source.tiles, source.url, source.data) {
                (_, Some(tiles), _, _) if kind.is_tiled() => {
                    SourceLocation::Tiles(Tileset::new(tiles).with_zoom_range(source.minzoom, source.maxzoom))
                },
                (SourceKind::GeoJson, _, _, Some(Value::String(url))) => SourceLocation::Url(url),
                (SourceKind::GeoJson, _, _, _) => SourceLocation::Inline,
                (_, _, Some(url), _) => SourceLocation::Url(url),
                _ => SourceLocation::Inline,
            };
            let tile_size = match source.tile_size {
                Some(0) => exn::bail!(ErrorKind::InvalidField { field: "tileSize", value: "0".to_string() }),
                Some(size) => size,
                None => DEFAULT_TILE_SIZE,
            };
            sources.push(StyleSource { id, kind, tile_size, location });
        }

        let mut font_stacks = BTreeSet::new();
        for layer in raw.layers.iter().filter(|layer| layer.kind == "symbol") {
            match layer.layout.as_ref().and_then(|layout| layout.text_font.as_ref()) {
                Some(value) => collect_font_stacks(value, &mut font_stacks),
                None => {
                    font_stacks.insert(DEFAULT_FONT_STACK.iter().map(ToString::to_string).collect());
                },
            }
        }

        let sprite = match raw.sprite {
            Some(Value::String(url)) => Some(url),
            // Multi-sprite form: `[{"id": "default", "url": "..."}]`.
            Some(Value::Array(entries)) => {
                entries.iter().find_map(|entry| entry.get("url").and_then(Value::as_str)).map(ToString::to_string)
            },
            _ => None,
        };

        Ok(Self { sources, sprite, glyphs: raw.glyphs, font_stacks })
    }
}

/// Collect literal font stacks from a `text-font` value.
///
/// Handles the plain array form, the legacy `{"stops": [[zoom, [...]]]}`
/// function form, and expressions, from which every `["literal", [...]]`
/// operand is taken.
fn collect_font_stacks(value: &Value, stacks: &mut BTreeSet<Vec<String>>) {
    match value {
        Value::Object(object) => {
            if let Some(Value::Array(stops)) = object.get("stops") {
                stops.iter().filter_map(|stop| stop.get(1)).filter_map(as_string_array).for_each(|stack| {
                    stacks.insert(stack);
                });
            }
        },
        Value::Array(items) if items.first().is_some_and(|first| !is_operator(first)) => {
            if let Some(stack) = as_string_array(value) {
                stacks.insert(stack);
            }
        },
        _ => collect_literals(value, stacks),
    }
}

fn collect_literals(value: &Value, stacks: &mut BTreeSet<Vec<String>>) {
    let Value::Array(items) = value else {
        return;
    };
    if items.first().and_then(Value::as_str) == Some("literal") {
        if let Some(stack) = items.get(1).and_then(as_string_array) {
            stacks.insert(stack);
        }
        return;
    }
    items.iter().for_each(|item| collect_literals(item, stacks));
}

/// Expression operators that can produce a font stack; a plain font stack
/// never starts with one of these.
fn is_operator(value: &Value) -> bool {
    matches!(
        value.as_str(),
        Some("literal" | "step" | "match" | "case" | "coalesce" | "interpolate" | "get" | "let" | "var")
    )
}

fn as_string_array(value: &Value) -> Option<Vec<String>> {
    value.as_array()?.iter().map(|item| item.as_str().map(ToString::to_string)).collect()
}

#[derive(Deserialize)]
struct RawStyle {
    #[serde(default)]
    sources: BTreeMap<String, RawSource>,
    sprite: Option<Value>,
    glyphs: Option<String>,
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Deserialize)]
struct RawSource {
    #[serde(rename = "type")]
    kind: String,
    url: Option<String>,
    tiles: Option<Vec<String>>,
    minzoom: Option<f64>,
    maxzoom: Option<f64>,
    #[serde(rename = "tileSize")]
    tile_size: Option<u16>,
    data: Option<Value>,
}

#[derive(Deserialize)]
struct RawLayer {
    #[serde(rename = "type")]
    kind: String,
    layout: Option<RawLayout>,
}

#[derive(Deserialize)]
struct RawLayout {
    #[serde(rename = "text-font")]
    text_font: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn stack(fonts: &[&str]) -> Vec<String> {
        fonts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_style() {
        let resources = StyleResources::parse(br#"{"version": 8, "sources": {}, "layers": []}"#).unwrap();
        assert_eq!(resources, StyleResources::default());
    }

    #[test]
    fn test_sources() {
        let json = br#"{
            "version": 8,
            "sources": {
                "a-inline": {"type": "vector", "tiles": ["https://t.example/{z}/{x}/{y}.pbf"], "maxzoom": 14},
                "b-tilejson": {"type": "raster", "url": "mapbox://mapbox.satellite", "tileSize": 256},
                "c-geojson-url": {"type": "geojson", "data": "https://d.example/points.geojson"},
                "d-geojson-inline": {"type": "geojson", "data": {"type": "FeatureCollection", "features": []}},
                "e-image": {"type": "image", "url": "https://i.example/radar.gif", "coordinates": []},
                "f-custom": {"type": "canvas"}
            },
            "layers": []
        }"#;
        let resources = StyleResources::parse(json).unwrap();
        let kinds: Vec<_> = resources.sources.iter().map(|s| (s.id.as_str(), s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("a-inline", SourceKind::Vector),
                ("b-tilejson", SourceKind::Raster),
                ("c-geojson-url", SourceKind::GeoJson),
                ("d-geojson-inline", SourceKind::GeoJson),
                ("e-image", SourceKind::Image),
            ]
        );
        let SourceLocation::Tiles(tileset) = &resources.sources[0].location else {
            panic!("inline tiles expected");
        };
        assert_eq!((tileset.min_zoom, tileset.max_zoom), (0, 14));
        assert_eq!(resources.sources[1].tile_size, 256);
        assert_eq!(resources.sources[1].location, SourceLocation::Url("mapbox://mapbox.satellite".to_string()));
        assert_eq!(resources.sources[2].location, SourceLocation::Url("https://d.example/points.geojson".to_string()));
        assert_eq!(resources.sources[3].location, SourceLocation::Inline);
        assert_eq!(resources.sources[4].location, SourceLocation::Url("https://i.example/radar.gif".to_string()));
    }

    #[rstest]
    #[case(r#""https://s.example/sprite""#, Some("https://s.example/sprite"))]
    #[case(r#"[{"id": "default", "url": "https://s.example/multi"}]"#, Some("https://s.example/multi"))]
    #[case(r#"[]"#, None)]
    fn test_sprite(#[case] sprite: &str, #[case] expected: Option<&str>) {
        let json = format!(r#"{{"version": 8, "sources": {{}}, "sprite": {sprite}, "layers": []}}"#);
        let resources = StyleResources::parse(json.as_bytes()).unwrap();
        assert_eq!(resources.sprite.as_deref(), expected);
    }

    #[rstest]
    #[case(r#"["Roboto Bold"]"#, vec![stack(&["Roboto Bold"])])]
    #[case(r#"["literal", ["Roboto Bold", "Noto Sans"]]"#, vec![stack(&["Roboto Bold", "Noto Sans"])])]
    #[case(
        r#"{"stops": [[5, ["Roboto Regular"]], [10, ["Roboto Bold"]]]}"#,
        vec![stack(&["Roboto Bold"]), stack(&["Roboto Regular"])]
    )]
    #[case(
        r#"["step", ["zoom"], ["literal", ["Roboto Regular"]], 8, ["literal", ["Roboto Bold"]]]"#,
        vec![stack(&["Roboto Bold"]), stack(&["Roboto Regular"])]
    )]
    fn test_font_stacks(#[case] text_font: &str, #[case] expected: Vec<Vec<String>>) {
        let json = format!(
            r#"{{"version": 8, "sources": {{}}, "glyphs": "https://f.example/{{fontstack}}/{{range}}.pbf",
                "layers": [{{"id": "labels", "type": "symbol", "layout": {{"text-font": {text_font}}}}}]}}"#
        );
        let resources = StyleResources::parse(json.as_bytes()).unwrap();
        assert_eq!(resources.font_stacks.into_iter().collect::<Vec<_>>(), expected);
        assert_eq!(resources.glyphs.as_deref(), Some("https://f.example/{fontstack}/{range}.pbf"));
    }

    #[test]
    fn test_default_font_stack() {
        let json = br#"{"version": 8, "sources": {}, "layers": [
            {"id": "bg", "type": "background"},
            {"id": "labels", "type": "symbol", "layout": {"text-field": "{name}"}}
        ]}"#;
        let resources = StyleResources::parse(json).unwrap();
        assert_eq!(resources.font_stacks.into_iter().collect::<Vec<_>>(), vec![stack(&DEFAULT_FONT_STACK)]);
    }

    #[rstest]
    #[case(b"not json".as_slice())]
    #[case(br#"{"sources": {"a": {"url": "missing type"}}}"#.as_slice())]
    fn test_malformed_style(#[case] json: &[u8]) {
        let err = StyleResources::parse(json).unwrap_err();
        assert_eq!(*err, ErrorKind::Malformed("style"));
    }

    #[test]
    fn test_zero_tile_size_is_rejected() {
        let json = br#"{"sources": {"a": {"type": "raster", "tiles": ["t"], "tileSize": 0}}, "layers": []}"#;
        let err = StyleResources::parse(json).unwrap_err();
        assert!(matches!(*err, ErrorKind::InvalidField { field: "tileSize", .. }));
    }
}
