use meridian_types::geo::ProjTransform;
use meridian_types::Rect;

/// Finds the part of the layer that is visible in the map extent.
///
/// `transform` converts coordinates from the map into the layer reference system. Returns the extent to query in
/// the layer reference system, or `None` if the layer has nothing to show in the map extent.
///
/// Reprojecting a whole map extent can fail (e.g. a world extent in a projection with limited area of use), so
/// when the map extent cannot be used directly, the layer envelope is projected into the map instead, clipped
/// there and projected back.
pub fn negotiate_extent(
    map_extent: &Rect,
    layer_envelope: &Rect,
    transform: &ProjTransform,
    layer_name: &str,
) -> Option<Rect> {
    if let Some(visible) = transform
        .forward(map_extent)
        .and_then(|projected| layer_envelope.intersection(&projected))
    {
        return Some(visible);
    }

    if transform.is_identity() {
        return None;
    }

    let clipped = transform
        .backward(layer_envelope)?
        .intersection(map_extent)?;
    match transform.forward(&clipped) {
        Some(extent) => Some(extent),
        None => {
            log::warn!(
                "Extent {clipped:?} of layer '{layer_name}' in map projection did not reproject properly back to \
                 layer projection, querying the whole layer envelope"
            );
            Some(*layer_envelope)
        }
    }
}
