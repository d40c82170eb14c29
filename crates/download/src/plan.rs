//! The set of resources a region needs, discovered incrementally.
//!
//! Only the style URL is known up front. Parsing the style reveals sources,
//! sprites and glyphs; parsing TileJSON sources reveals tile pyramids. Until
//! every such metadata document (the sprite JSON included) has been fetched
//! the required count is an estimate.

use crate::cover::{covering_zoom_range, tile_cover};
use std::collections::{HashSet, VecDeque};
use tessera_cache::RegionDefinition;
use tessera_source::Resource;
use tessera_style::{SourceKind, SourceLocation, StyleResources, Tileset, glyph_ranges};
use tracing::{debug, warn};

/// How a fetched document feeds back into the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metadata {
    Style,
    TileJson { kind: SourceKind, tile_size: u16 },
    /// Describes no further resources, but the renderer can't use the
    /// sprite without it.
    SpriteJson,
}

/// One resource to fetch, plus how to read it if it describes more
/// resources.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Job {
    pub(crate) resource: Resource,
    pub(crate) metadata: Option<Metadata>,
}

#[derive(Debug)]
pub(crate) struct Plan {
    definition: RegionDefinition,
    seen: HashSet<Resource>,
    metadata: VecDeque<Job>,
    leaves: VecDeque<Resource>,
    /// Metadata documents queued or in flight.
    pending: usize,
    /// Metadata documents that could not be fetched or parsed.
    unresolved: usize,
    style_parsed: bool,
}
impl Plan {
    pub(crate) fn new(definition: RegionDefinition) -> Self {
        let mut plan = Self {
            seen: HashSet::new(),
            metadata: VecDeque::new(),
            leaves: VecDeque::new(),
            pending: 0,
            unresolved: 0,
            style_parsed: false,
            definition,
        };
        let style = Resource::style(plan.definition.style_url.clone());
        plan.push(style, Some(Metadata::Style));
        plan
    }

    fn push(&mut self, resource: Resource, metadata: Option<Metadata>) {
        if !self.seen.insert(resource.clone()) {
            return;
        }
        match metadata {
            Some(metadata) => {
                self.pending += 1;
                self.metadata.push_back(Job { resource, metadata: Some(metadata) });
            },
            None => self.leaves.push_back(resource),
        }
    }

    /// Next resource to fetch. Metadata goes first so the plan converges on
    /// its precise size as early as possible.
    pub(crate) fn next_job(&mut self) -> Option<Job> {
        self.metadata
            .pop_front()
            .or_else(|| self.leaves.pop_front().map(|resource| Job { resource, metadata: None }))
    }

    /// Every distinct resource discovered so far, the style included.
    pub(crate) fn required(&self) -> u64 {
        self.seen.len() as u64
    }

    /// Whether [`required`](Self::required) is final: the style and every
    /// metadata document it references have been parsed.
    pub(crate) fn is_precise(&self) -> bool {
        self.style_parsed && self.pending == 0 && self.unresolved == 0
    }

    pub(crate) fn is_drained(&self) -> bool {
        self.metadata.is_empty() && self.leaves.is_empty()
    }

    /// Feed a metadata document back into the plan. `None` means the fetch
    /// failed; the plan then can't become precise in this activation.
    pub(crate) fn settle(&mut self, metadata: Metadata, data: Option<&[u8]>) {
        self.pending = self.pending.saturating_sub(1);
        let parsed = match (metadata, data) {
            (_, None) => false,
            (Metadata::Style, Some(data)) => match StyleResources::parse(data) {
                Ok(style) => {
                    self.add_style(&style);
                    self.style_parsed = true;
                    true
                },
                Err(err) => {
                    warn!(url = %self.definition.style_url, error = ?err, "unable to parse style");
                    false
                },
            },
            (Metadata::TileJson { kind, tile_size }, Some(data)) => match Tileset::from_tilejson(data) {
                Ok(tileset) => {
                    self.add_tileset(kind, tile_size, &tileset);
                    true
                },
                Err(err) => {
                    warn!(error = ?err, "unable to parse TileJSON");
                    false
                },
            },
            (Metadata::SpriteJson, Some(_)) => true,
        };
        if !parsed {
            self.unresolved += 1;
        }
    }

    fn add_style(&mut self, style: &StyleResources) {
        for source in &style.sources {
            match (&source.location, source.kind) {
                (SourceLocation::Tiles(tileset), kind) if kind.is_tiled() => {
                    self.add_tileset(kind, source.tile_size, tileset);
                },
                (SourceLocation::Url(url), kind) if kind.is_tiled() => {
                    let metadata = Metadata::TileJson { kind, tile_size: source.tile_size };
                    self.push(Resource::source(url.clone()), Some(metadata));
                },
                (SourceLocation::Url(url), SourceKind::GeoJson) => self.push(Resource::source(url.clone()), None),
                (SourceLocation::Url(url), SourceKind::Image | SourceKind::Video) => {
                    self.push(Resource::unknown(url.clone()), None);
                },
                (SourceLocation::Tiles(_) | SourceLocation::Url(_) | SourceLocation::Inline, _) => {},
            }
        }
        let pixel_ratio = self.definition.pixel_ratio;
        if let Some(sprite) = &style.sprite {
            self.push(Resource::sprite_json(sprite, pixel_ratio), Some(Metadata::SpriteJson));
            self.push(Resource::sprite_image(sprite, pixel_ratio), None);
        }
        if let Some(glyphs) = &style.glyphs {
            for stack in &style.font_stacks {
                for range in glyph_ranges(self.definition.include_ideographs) {
                    self.push(Resource::glyphs(glyphs, stack, range), None);
                }
            }
        }
        debug!(required = self.required(), "expanded style");
    }

    fn add_tileset(&mut self, kind: SourceKind, tile_size: u16, tileset: &Tileset) {
        let Some(template) = tileset.template() else {
            return;
        };
        let (min_zoom, max_zoom) = (self.definition.min_zoom, self.definition.max_zoom);
        let Some(zooms) = covering_zoom_range(kind, tile_size, tileset, min_zoom, max_zoom) else {
            return;
        };
        let bounds = self.definition.bounds;
        let pixel_ratio = self.definition.pixel_ratio;
        for z in zooms {
            for (x, y) in tile_cover(&bounds, z) {
                self.push(Resource::tile(template, pixel_ratio, x, y, z), None);
            }
        }
    }
}
