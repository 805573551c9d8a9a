use meridian_types::geo::ProjTransform;

use crate::feature::Feature;
use crate::render::Processor;
use crate::style::Symbolizer;

/// Sends the symbolizer to the processing method of its kind.
pub fn dispatch_symbolizer<P: Processor + ?Sized>(
    processor: &mut P,
    symbolizer: &Symbolizer,
    feature: &Feature,
    transform: &ProjTransform,
) {
    match symbolizer {
        Symbolizer::Point(s) => processor.process_point(s, feature, transform),
        Symbolizer::Line(s) => processor.process_line(s, feature, transform),
        Symbolizer::LinePattern(s) => processor.process_line_pattern(s, feature, transform),
        Symbolizer::Polygon(s) => processor.process_polygon(s, feature, transform),
        Symbolizer::PolygonExpression(s) => {
            processor.process_polygon_expression(s, feature, transform)
        }
        Symbolizer::PolygonPattern(s) => processor.process_polygon_pattern(s, feature, transform),
        Symbolizer::Raster(s) => processor.process_raster(s, feature, transform),
        Symbolizer::Shield(s) => processor.process_shield(s, feature, transform),
        Symbolizer::Text(s) => processor.process_text(s, feature, transform),
        Symbolizer::Building(s) => processor.process_building(s, feature, transform),
        Symbolizer::Markers(s) => processor.process_markers(s, feature, transform),
        Symbolizer::Glyph(s) => processor.process_glyph(s, feature, transform),
    }
}

/// Renders the symbolizers of a rule for the feature.
///
/// The processor gets the chance to render the whole list at once. If it declines, every symbolizer is
/// dispatched separately, in order.
pub fn dispatch_symbolizers<P: Processor + ?Sized>(
    processor: &mut P,
    symbolizers: &[Symbolizer],
    feature: &Feature,
    transform: &ProjTransform,
) {
    if processor.process_all(symbolizers, feature, transform) {
        return;
    }

    for symbolizer in symbolizers {
        dispatch_symbolizer(processor, symbolizer, feature, transform);
    }
}
