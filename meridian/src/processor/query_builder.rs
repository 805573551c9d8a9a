use std::collections::BTreeSet;

use meridian_types::Rect;

use crate::map::Map;
use crate::query::{Query, Resolution};

/// Builds the query of a layer.
///
/// Resolution is computed from the current (not buffered) extent of the map, so it matches the output pixels.
pub fn build_query(
    map: &Map,
    layer_extent: Rect,
    scale_denominator: f64,
    property_names: &BTreeSet<String>,
    filter_factor: f64,
) -> Query {
    let extent = map.current_extent();
    let resolution = Resolution {
        x: map.width() as f64 / extent.width(),
        y: map.height() as f64 / extent.height(),
    };

    let mut query = Query::new(layer_extent, resolution, scale_denominator);
    for name in property_names {
        query.add_property_name(name.clone());
    }
    query.set_filter_factor(filter_factor);

    query
}
