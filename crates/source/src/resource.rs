//! Resource identity model.

use derive_more::Display;
use std::ops::RangeInclusive;

/// What a cached item is used for.
///
/// The kind decides which table an entry lives in (tiles are keyed by their
/// coordinates, everything else by URL) and is persisted as a small integer
/// code, see [`code`](Self::code).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    #[display("unknown")]
    Unknown,
    #[display("style")]
    Style,
    #[display("source")]
    Source,
    #[display("tile")]
    Tile,
    #[display("glyphs")]
    Glyphs,
    #[display("sprite image")]
    SpriteImage,
    #[display("sprite json")]
    SpriteJson,
}
impl ResourceKind {
    /// Stable integer code written to the `kind` column.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            ResourceKind::Unknown => 0,
            ResourceKind::Style => 1,
            ResourceKind::Source => 2,
            ResourceKind::Tile => 3,
            ResourceKind::Glyphs => 4,
            ResourceKind::SpriteImage => 5,
            ResourceKind::SpriteJson => 6,
        }
    }

    /// Inverse of [`code`](Self::code). Codes written by a newer schema fall
    /// back to [`Unknown`](Self::Unknown) instead of failing the read.
    #[must_use]
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ResourceKind::Style,
            2 => ResourceKind::Source,
            3 => ResourceKind::Tile,
            4 => ResourceKind::Glyphs,
            5 => ResourceKind::SpriteImage,
            6 => ResourceKind::SpriteJson,
            _ => ResourceKind::Unknown,
        }
    }
}

/// Identity of a single map tile: the unexpanded URL template plus the
/// pixel ratio and the tile address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileCoordinates {
    pub url_template: String,
    /// 1 or 2; only templates containing `{ratio}` ever get 2.
    pub pixel_ratio: u8,
    pub x: u32,
    pub y: u32,
    pub z: u8,
}
impl TileCoordinates {
    /// Substitute the tile address into the URL template.
    ///
    /// Supported tokens: `{z}`, `{x}`, `{y}`, `{ratio}` (`@2x` or empty),
    /// `{prefix}` (two hex digits from `x % 16` and `y % 16`) and `{quadkey}`.
    /// Unknown tokens are left untouched.
    ///
    /// ```
    /// use tessera_source::TileCoordinates;
    ///
    /// let tile = TileCoordinates {
    ///     url_template: "https://tiles.example.com/{z}/{x}/{y}{ratio}.png".to_string(),
    ///     pixel_ratio: 2,
    ///     x: 3,
    ///     y: 5,
    ///     z: 4,
    /// };
    /// assert_eq!(tile.expand(), "https://tiles.example.com/4/3/5@2x.png");
    /// ```
    #[must_use]
    pub fn expand(&self) -> String {
        let mut output = String::with_capacity(self.url_template.len() + 16);
        let mut rest = self.url_template.as_str();
        while let Some(open) = rest.find('{') {
            output.push_str(&rest[..open]);
            let Some(close) = rest[open..].find('}').map(|c| open + c) else {
                break;
            };
            let token = &rest[open + 1..close];
            match token {
                "z" => output.push_str(&self.z.to_string()),
                "x" => output.push_str(&self.x.to_string()),
                "y" => output.push_str(&self.y.to_string()),
                "ratio" if self.pixel_ratio > 1 => output.push_str(&format!("@{}x", self.pixel_ratio)),
                "ratio" => {},
                "prefix" => output.push_str(&format!("{:x}{:x}", self.x % 16, self.y % 16)),
                "quadkey" => output.push_str(&self.quadkey()),
                _ => output.push_str(&rest[open..=close]),
            }
            rest = &rest[close + 1..];
        }
        output.push_str(rest);
        output
    }

    fn quadkey(&self) -> String {
        (1..=self.z)
            .rev()
            .map(|level| {
                let mask = 1u32 << (level - 1);
                let digit = u8::from(self.x & mask != 0) + 2 * u8::from(self.y & mask != 0);
                char::from(b'0' + digit)
            })
            .collect()
    }
}

/// The primary key a resource is stored under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    Url(&'a str),
    Tile(&'a TileCoordinates),
}

/// A cacheable item. Immutable once constructed.
///
/// Identity for every kind except [`Tile`](ResourceKind::Tile) is the URL;
/// tiles are identified by their [`TileCoordinates`]. The only way to build a
/// tile resource is [`Resource::tile`], so a tile always carries coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    kind: ResourceKind,
    url: String,
    tile: Option<TileCoordinates>,
}
impl Resource {
    fn new(kind: ResourceKind, url: impl Into<String>) -> Self {
        Self { kind, url: url.into(), tile: None }
    }

    pub fn style(url: impl Into<String>) -> Self {
        Self::new(ResourceKind::Style, url)
    }

    /// A TileJSON document or a GeoJSON data URL referenced by a style source.
    pub fn source(url: impl Into<String>) -> Self {
        Self::new(ResourceKind::Source, url)
    }

    /// Anything else a style references by URL (image and video sources).
    pub fn unknown(url: impl Into<String>) -> Self {
        Self::new(ResourceKind::Unknown, url)
    }

    pub fn sprite_image(base: &str, pixel_ratio: f32) -> Self {
        Self::new(ResourceKind::SpriteImage, sprite_url(base, pixel_ratio, "png"))
    }

    pub fn sprite_json(base: &str, pixel_ratio: f32) -> Self {
        Self::new(ResourceKind::SpriteJson, sprite_url(base, pixel_ratio, "json"))
    }

    /// A single glyph range PBF for one font stack.
    ///
    /// ```
    /// use tessera_source::Resource;
    ///
    /// let fonts = ["Open Sans Regular".to_string(), "Arial Unicode MS Regular".to_string()];
    /// let glyphs = Resource::glyphs("https://fonts.example.com/{fontstack}/{range}.pbf", &fonts, 256..=511);
    /// assert_eq!(
    ///     glyphs.url(),
    ///     "https://fonts.example.com/Open%20Sans%20Regular,Arial%20Unicode%20MS%20Regular/256-511.pbf"
    /// );
    /// ```
    pub fn glyphs(url_template: &str, font_stack: &[String], range: RangeInclusive<u32>) -> Self {
        let stack = font_stack.join(",").replace(' ', "%20");
        let range = format!("{}-{}", range.start(), range.end());
        Self::new(ResourceKind::Glyphs, url_template.replace("{fontstack}", &stack).replace("{range}", &range))
    }

    /// A tile of the pyramid described by `url_template`.
    ///
    /// The stored pixel ratio collapses to 1 when the template cannot serve
    /// high-density tiles, so the same tile is not cached twice.
    pub fn tile(url_template: impl Into<String>, pixel_ratio: f32, x: u32, y: u32, z: u8) -> Self {
        let url_template = url_template.into();
        let pixel_ratio = match url_template.contains("{ratio}") && pixel_ratio > 1.0 {
            true => 2,
            false => 1,
        };
        let tile = TileCoordinates { url_template: url_template.clone(), pixel_ratio, x, y, z };
        Self { kind: ResourceKind::Tile, url: url_template, tile: Some(tile) }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// The resource URL; for tiles this is the unexpanded template.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn tile_coordinates(&self) -> Option<&TileCoordinates> {
        self.tile.as_ref()
    }

    /// The primary key this resource is stored under.
    pub fn key(&self) -> CacheKey<'_> {
        match (self.kind, &self.tile) {
            (ResourceKind::Tile, Some(tile)) => CacheKey::Tile(tile),
            (
                ResourceKind::Tile
                | ResourceKind::Unknown
                | ResourceKind::Style
                | ResourceKind::Source
                | ResourceKind::Glyphs
                | ResourceKind::SpriteImage
                | ResourceKind::SpriteJson,
                _,
            ) => CacheKey::Url(&self.url),
        }
    }

    /// The URL a fetch source should actually request.
    pub fn request_url(&self) -> String {
        match self.key() {
            CacheKey::Tile(tile) => tile.expand(),
            CacheKey::Url(url) => url.to_string(),
        }
    }
}

fn sprite_url(base: &str, pixel_ratio: f32, extension: &str) -> String {
    let density = if pixel_ratio > 1.0 { "@2x" } else { "" };
    // Keep any query string (access tokens) after the suffix.
    match base.split_once('?') {
        Some((path, query)) => format!("{path}{density}.{extension}?{query}"),
        None => format!("{base}{density}.{extension}"),
    }
}
