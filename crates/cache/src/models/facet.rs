use crate::models::{LatLngBounds, RegionDefinition};

/// JSON shape of a region definition in the `regions.definition` column.
#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct RegionDefinitionProxy {
    style_url: String,
    bounds: BoundsProxy,
    min_zoom: f64,
    max_zoom: f64,
    pixel_ratio: f32,
    #[facet(default)]
    include_ideographs: bool,
}
impl From<&RegionDefinition> for RegionDefinitionProxy {
    fn from(definition: &RegionDefinition) -> Self {
        Self {
            style_url: definition.style_url.clone(),
            bounds: BoundsProxy::from(&definition.bounds),
            min_zoom: definition.min_zoom,
            max_zoom: definition.max_zoom,
            pixel_ratio: definition.pixel_ratio,
            include_ideographs: definition.include_ideographs,
        }
    }
}
impl From<RegionDefinitionProxy> for RegionDefinition {
    fn from(proxy: RegionDefinitionProxy) -> Self {
        Self {
            style_url: proxy.style_url,
            bounds: proxy.bounds.into(),
            min_zoom: proxy.min_zoom,
            max_zoom: proxy.max_zoom,
            pixel_ratio: proxy.pixel_ratio,
            include_ideographs: proxy.include_ideographs,
        }
    }
}

#[derive(facet::Facet)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct BoundsProxy {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}
impl From<&LatLngBounds> for BoundsProxy {
    fn from(bounds: &LatLngBounds) -> Self {
        Self {
            south: bounds.south,
            west: bounds.west,
            north: bounds.north,
            east: bounds.east,
        }
    }
}
impl From<BoundsProxy> for LatLngBounds {
    fn from(bounds: BoundsProxy) -> Self {
        Self::new(bounds.south, bounds.west, bounds.north, bounds.east)
    }
}
