use std::ops::RangeInclusive;

/// Number of code points per glyph PBF.
pub const GLYPHS_PER_RANGE: u32 = 256;
/// Ranges needed to cover the Basic Multilingual Plane.
pub const GLYPH_RANGE_COUNT: u32 = 256;

/// Font stack used by symbol layers that do not set `text-font`.
pub const DEFAULT_FONT_STACK: [&str; 2] = ["Open Sans Regular", "Arial Unicode MS Regular"];

/// Code point blocks whose glyphs the renderer can draw locally, so there is
/// no need to download them unless the region explicitly asks for them.
const IDEOGRAPHIC_BLOCKS: [RangeInclusive<u32>; 3] = [
    // CJK Unified Ideographs Extension A
    0x3400..=0x4DBF,
    // CJK Unified Ideographs
    0x4E00..=0x9FFF,
    // Hangul Syllables
    0xAC00..=0xD7AF,
];

/// Whether the glyph range beginning at `start` falls inside an ideographic
/// block.
pub fn is_ideographic_range(start: u32) -> bool {
    IDEOGRAPHIC_BLOCKS.iter().any(|block| block.contains(&start))
}

/// Every glyph range a region needs for one font stack: `0-255` through
/// `65280-65535`, minus the ideographic ranges unless `include_ideographs`.
///
/// ```
/// use tessera_style::glyph_ranges;
///
/// let all = glyph_ranges(true).count();
/// let without = glyph_ranges(false).count();
/// assert_eq!(all, 256);
/// assert!(without < all);
/// assert_eq!(glyph_ranges(false).next(), Some(0..=255));
/// ```
pub fn glyph_ranges(include_ideographs: bool) -> impl Iterator<Item = RangeInclusive<u32>> {
    (0..GLYPH_RANGE_COUNT)
        .map(|index| index * GLYPHS_PER_RANGE)
        .filter(move |start| include_ideographs || !is_ideographic_range(*start))
        .map(|start| start..=start + GLYPHS_PER_RANGE - 1)
}
