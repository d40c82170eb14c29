//! Which tiles of a pyramid cover a region.

use std::f64::consts::PI;
use std::ops::RangeInclusive;
use tessera_cache::LatLngBounds;
use tessera_style::{DEFAULT_TILE_SIZE, SourceKind, Tileset};

/// Web Mercator stops here; the poles are unreachable.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// The tile zoom level a source needs to render at map zoom `zoom`.
///
/// Tiles smaller than 512 pixels come from deeper zoom levels. Raster tiles
/// are rounded to the nearest level, everything else floored.
pub fn covering_zoom(zoom: f64, kind: SourceKind, tile_size: u16) -> f64 {
    let zoom = zoom + (f64::from(DEFAULT_TILE_SIZE) / f64::from(tile_size.max(1))).log2();
    match kind {
        SourceKind::Raster => zoom.round(),
        SourceKind::Vector | SourceKind::RasterDem | SourceKind::GeoJson | SourceKind::Image | SourceKind::Video => {
            zoom.floor()
        },
    }
}

/// Tile zoom levels to download for a region's map zoom range, limited to
/// what the tileset provides. `None` when the ranges don't overlap.
pub fn covering_zoom_range(
    kind: SourceKind,
    tile_size: u16,
    tileset: &Tileset,
    min_zoom: f64,
    max_zoom: f64,
) -> Option<RangeInclusive<u8>> {
    let min = covering_zoom(min_zoom, kind, tile_size).max(f64::from(tileset.min_zoom));
    let max = covering_zoom(max_zoom, kind, tile_size).min(f64::from(tileset.max_zoom));
    // Both ends are whole numbers within the tileset's u8 range by now.
    (min <= max).then(|| (min as u8)..=(max as u8))
}

/// Tiles at zoom `z` intersecting `bounds`, column by column.
pub fn tile_cover(bounds: &LatLngBounds, z: u8) -> impl Iterator<Item = (u32, u32)> + use<> {
    let (x0, x1) = span(lon_to_x(bounds.west, z), lon_to_x(bounds.east, z), z);
    let (y0, y1) = span(lat_to_y(bounds.north, z), lat_to_y(bounds.south, z), z);
    (x0..=x1).flat_map(move |x| (y0..=y1).map(move |y| (x, y)))
}

/// Number of tiles [`tile_cover`] yields across `zooms`.
pub fn tile_count(bounds: &LatLngBounds, zooms: RangeInclusive<u8>) -> u64 {
    zooms
        .map(|z| {
            let (x0, x1) = span(lon_to_x(bounds.west, z), lon_to_x(bounds.east, z), z);
            let (y0, y1) = span(lat_to_y(bounds.north, z), lat_to_y(bounds.south, z), z);
            u64::from(x1 - x0 + 1) * u64::from(y1 - y0 + 1)
        })
        .sum()
}

/// Inclusive tile index range for fractional tile coordinates. An edge that
/// falls exactly on a tile boundary doesn't pull in the next tile.
fn span(start: f64, end: f64, z: u8) -> (u32, u32) {
    let last = f64::from((1u32 << z) - 1);
    let first = start.floor().clamp(0.0, last);
    let end = (end.ceil() - 1.0).clamp(first, last);
    (first as u32, end as u32)
}

fn lon_to_x(lon: f64, z: u8) -> f64 {
    (lon.clamp(-180.0, 180.0) + 180.0) / 360.0 * f64::from(1u32 << z)
}

fn lat_to_y(lat: f64, z: u8) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * f64::from(1u32 << z)
}
