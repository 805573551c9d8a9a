//! Interface between the rendering pipeline and renderer backends.
//!
//! A backend (raster painter, vector document writer, hit grid builder) implements [`Processor`]. The
//! [`FeatureStyleProcessor`](crate::FeatureStyleProcessor) calls the lifecycle hooks of the processor in a fixed
//! order and sends every symbolizer a feature matched to the `process_*` method for the symbolizer kind:
//!
//! ```text
//! start_map_processing
//!     start_layer_processing
//!         process_* ... painted ...
//!     end_layer_processing
//!     ...
//! end_map_processing
//! ```

use meridian_types::geo::ProjTransform;

use crate::feature::Feature;
use crate::layer::Layer;
use crate::map::Map;
use crate::style::{
    BuildingSymbolizer, GlyphSymbolizer, LinePatternSymbolizer, LineSymbolizer, MarkersSymbolizer,
    PointSymbolizer, PolygonExpressionSymbolizer, PolygonPatternSymbolizer, PolygonSymbolizer,
    RasterSymbolizer, ShieldSymbolizer, Symbolizer, TextSymbolizer,
};

mod dispatch;

pub use dispatch::{dispatch_symbolizer, dispatch_symbolizers};

/// Renderer backend.
///
/// Every `process_*` method receives the symbolizer, the feature and the transform from the map reference system
/// into the reference system of the layer the feature comes from. Backends leave the default implementations of the
/// symbolizer kinds they do not support, which ignore the call.
#[allow(unused_variables)]
pub trait Processor {
    /// Called once at the start of a rendering pass.
    fn start_map_processing(&mut self, map: &Map) {}
    /// Called once at the end of a rendering pass.
    fn end_map_processing(&mut self, map: &Map) {}
    /// Called before the features of a layer are rendered.
    fn start_layer_processing(&mut self, layer: &Layer) {}
    /// Called after all features of a layer are rendered.
    fn end_layer_processing(&mut self, layer: &Layer) {}

    /// Renders all symbolizers of a rule for the feature at once.
    ///
    /// Returns `false` if the backend cannot do this, in which case the symbolizers are sent one by one to the
    /// `process_*` methods.
    fn process_all(
        &mut self,
        symbolizers: &[Symbolizer],
        feature: &Feature,
        transform: &ProjTransform,
    ) -> bool {
        false
    }

    /// Renders a point symbolizer.
    fn process_point(
        &mut self,
        symbolizer: &PointSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a line symbolizer.
    fn process_line(
        &mut self,
        symbolizer: &LineSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a line pattern symbolizer.
    fn process_line_pattern(
        &mut self,
        symbolizer: &LinePatternSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a polygon symbolizer.
    fn process_polygon(
        &mut self,
        symbolizer: &PolygonSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a polygon symbolizer with attribute-driven opacity.
    fn process_polygon_expression(
        &mut self,
        symbolizer: &PolygonExpressionSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a polygon pattern symbolizer.
    fn process_polygon_pattern(
        &mut self,
        symbolizer: &PolygonPatternSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a raster symbolizer.
    fn process_raster(
        &mut self,
        symbolizer: &RasterSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a shield symbolizer.
    fn process_shield(
        &mut self,
        symbolizer: &ShieldSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a text symbolizer.
    fn process_text(
        &mut self,
        symbolizer: &TextSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a building symbolizer.
    fn process_building(
        &mut self,
        symbolizer: &BuildingSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a markers symbolizer.
    fn process_markers(
        &mut self,
        symbolizer: &MarkersSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }
    /// Renders a glyph symbolizer.
    fn process_glyph(
        &mut self,
        symbolizer: &GlyphSymbolizer,
        feature: &Feature,
        transform: &ProjTransform,
    ) {
    }

    /// Called once for every feature that matched at least one rule of a style.
    fn painted(&mut self) {}
}
