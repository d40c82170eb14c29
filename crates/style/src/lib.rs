//! Resource reference extraction for map styles.
//!
//! A style document is only parsed far enough to enumerate what it needs
//! downloaded: its sources (inline tile templates, TileJSON URLs, GeoJSON
//! data URLs), the sprite sheet, and the glyph template plus the font stacks
//! symbol layers use. Rendering properties are never interpreted.

pub mod error;
mod glyphs;
mod style;
mod tileset;

pub use crate::glyphs::{DEFAULT_FONT_STACK, GLYPH_RANGE_COUNT, GLYPHS_PER_RANGE, glyph_ranges, is_ideographic_range};
pub use crate::style::{DEFAULT_TILE_SIZE, SourceKind, SourceLocation, StyleResources, StyleSource};
pub use crate::tileset::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, Tileset};
