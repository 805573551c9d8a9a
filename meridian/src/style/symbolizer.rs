//! Rendering instructions attached to style rules.

use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::expression::Expression;
use crate::feature::{Feature, Value};

/// Typed rendering instruction of a [`Rule`](super::Rule).
///
/// The set of variants is closed: a renderer backend gets one processing method per variant in the
/// [`Processor`](crate::render::Processor) trait.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "kebab-case"))]
pub enum Symbolizer {
    /// Image placed at point geometries.
    Point(PointSymbolizer),
    /// Stroke along line geometries and polygon outlines.
    Line(LineSymbolizer),
    /// Image repeated along lines.
    LinePattern(LinePatternSymbolizer),
    /// Polygon fill with a solid color.
    Polygon(PolygonSymbolizer),
    /// Polygon fill with an attribute-driven opacity and gamma.
    PolygonExpression(PolygonExpressionSymbolizer),
    /// Polygon fill with a repeated image.
    PolygonPattern(PolygonPatternSymbolizer),
    /// Raster data drawing.
    Raster(RasterSymbolizer),
    /// Text label with a background image.
    Shield(ShieldSymbolizer),
    /// Text label.
    Text(TextSymbolizer),
    /// Pseudo-3d extrusion of polygons.
    Building(BuildingSymbolizer),
    /// Markers placed at points or along lines.
    Markers(MarkersSymbolizer),
    /// Single font glyph placed at points.
    Glyph(GlyphSymbolizer),
}

impl Symbolizer {
    /// Name of the symbolizer kind, as used in style definitions.
    pub fn kind(&self) -> &'static str {
        match self {
            Symbolizer::Point(_) => "point",
            Symbolizer::Line(_) => "line",
            Symbolizer::LinePattern(_) => "line-pattern",
            Symbolizer::Polygon(_) => "polygon",
            Symbolizer::PolygonExpression(_) => "polygon-expression",
            Symbolizer::PolygonPattern(_) => "polygon-pattern",
            Symbolizer::Raster(_) => "raster",
            Symbolizer::Shield(_) => "shield",
            Symbolizer::Text(_) => "text",
            Symbolizer::Building(_) => "building",
            Symbolizer::Markers(_) => "markers",
            Symbolizer::Glyph(_) => "glyph",
        }
    }

    /// Metawriter the symbolizer reports its output to.
    pub fn metawriter(&self) -> Option<&MetawriterRef> {
        match self {
            Symbolizer::Point(s) => s.metawriter.as_ref(),
            Symbolizer::Line(s) => s.metawriter.as_ref(),
            Symbolizer::LinePattern(s) => s.metawriter.as_ref(),
            Symbolizer::Polygon(s) => s.metawriter.as_ref(),
            Symbolizer::PolygonExpression(s) => s.metawriter.as_ref(),
            Symbolizer::PolygonPattern(s) => s.metawriter.as_ref(),
            Symbolizer::Raster(s) => s.metawriter.as_ref(),
            Symbolizer::Shield(s) => s.metawriter.as_ref(),
            Symbolizer::Text(s) => s.metawriter.as_ref(),
            Symbolizer::Building(s) => s.metawriter.as_ref(),
            Symbolizer::Markers(s) => s.metawriter.as_ref(),
            Symbolizer::Glyph(s) => s.metawriter.as_ref(),
        }
    }

    /// Returns the raster symbolizer, if this is one.
    pub fn as_raster(&self) -> Option<&RasterSymbolizer> {
        match self {
            Symbolizer::Raster(s) => Some(s),
            _ => None,
        }
    }
}

/// Reference from a symbolizer to a named [`Metawriter`](crate::metawriter::Metawriter) of the map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetawriterRef {
    /// Name of the metawriter in the map.
    pub name: String,
    /// Feature attributes the metawriter should output, in addition to the metawriter defaults.
    #[cfg_attr(feature = "serde", serde(default))]
    pub properties: BTreeSet<String>,
}

impl MetawriterRef {
    /// Creates a reference without extra properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: BTreeSet::new(),
        }
    }
}

/// Image placed at point geometries.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PointSymbolizer {
    /// Path to the image. A small square is drawn if not set.
    pub file: Option<String>,
    /// Opacity of the image.
    pub opacity: f64,
    /// Draw the point even if it overlaps previously placed ones.
    pub allow_overlap: bool,
    /// Do not reserve the space of the point for later placements.
    pub ignore_placement: bool,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for PointSymbolizer {
    fn default() -> Self {
        Self {
            file: None,
            opacity: 1.0,
            allow_overlap: false,
            ignore_placement: false,
            metawriter: None,
        }
    }
}

/// Stroke along line geometries and polygon outlines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSymbolizer {
    /// Stroke color.
    pub stroke: Color,
    /// Stroke width in pixels.
    pub stroke_width: f64,
    /// Stroke opacity.
    pub stroke_opacity: f64,
    /// Alternating lengths of dashes and gaps, in pixels. Solid line if empty.
    pub dash_array: Vec<f64>,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for LineSymbolizer {
    fn default() -> Self {
        Self {
            stroke: Color::BLACK,
            stroke_width: 1.0,
            stroke_opacity: 1.0,
            dash_array: vec![],
            metawriter: None,
        }
    }
}

/// Image repeated along lines.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinePatternSymbolizer {
    /// Path to the pattern image.
    pub file: String,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

/// Polygon fill with a solid color.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolygonSymbolizer {
    /// Fill color.
    pub fill: Color,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Antialiasing gamma.
    pub gamma: f64,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for PolygonSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::GRAY,
            fill_opacity: 1.0,
            gamma: 1.0,
            metawriter: None,
        }
    }
}

/// Polygon fill with opacity and gamma computed from feature attributes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolygonExpressionSymbolizer {
    /// Fill color.
    pub fill: Color,
    /// Opacity expression. The result is clamped to `[0, 1]`, fully opaque if not set.
    pub opacity: Option<Expression>,
    /// Gamma expression. `1.0` if not set.
    pub gamma: Option<Expression>,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for PolygonExpressionSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::GRAY,
            opacity: None,
            gamma: None,
            metawriter: None,
        }
    }
}

impl PolygonExpressionSymbolizer {
    const DEFAULT_OPACITY: f64 = 1.0;
    const DEFAULT_GAMMA: f64 = 1.0;

    /// Opacity of the fill for the feature.
    pub fn opacity(&self, feature: &Feature) -> f64 {
        match &self.opacity {
            None => Self::DEFAULT_OPACITY,
            Some(expr) => expr
                .evaluate(feature)
                .as_f64()
                .map_or(Self::DEFAULT_OPACITY, |v| v.clamp(0.0, 1.0)),
        }
    }

    /// Antialiasing gamma for the feature.
    pub fn gamma(&self, feature: &Feature) -> f64 {
        self.gamma
            .as_ref()
            .and_then(|expr| expr.evaluate(feature).as_f64())
            .unwrap_or(Self::DEFAULT_GAMMA)
    }
}

/// Polygon fill with a repeated image.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PolygonPatternSymbolizer {
    /// Path to the pattern image.
    pub file: String,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

/// Resampling method used when raster data is scaled to the output resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ScalingMethod {
    /// Nearest neighbour.
    #[default]
    Near,
    /// Bilinear interpolation.
    Bilinear,
    /// Bicubic interpolation.
    Bicubic,
    /// Spline16 kernel.
    Spline16,
    /// Spline36 kernel.
    Spline36,
    /// Gaussian kernel.
    Gaussian,
    /// Mitchell kernel.
    Mitchell,
    /// Lanczos kernel.
    Lanczos,
}

impl ScalingMethod {
    /// How many source pixels around the output pixel the method reads.
    pub fn filter_factor(self) -> f64 {
        match self {
            ScalingMethod::Near => 1.0,
            ScalingMethod::Bilinear => 2.0,
            ScalingMethod::Bicubic
            | ScalingMethod::Spline16
            | ScalingMethod::Spline36
            | ScalingMethod::Gaussian
            | ScalingMethod::Mitchell
            | ScalingMethod::Lanczos => 3.0,
        }
    }
}

/// Raster data drawing.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RasterSymbolizer {
    /// Opacity of the raster.
    pub opacity: f64,
    /// Resampling method.
    pub scaling: ScalingMethod,
    /// Explicit filter factor. Derived from `scaling` if not set.
    pub filter_factor: Option<f64>,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for RasterSymbolizer {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            scaling: ScalingMethod::default(),
            filter_factor: None,
            metawriter: None,
        }
    }
}

impl RasterSymbolizer {
    /// Filter factor that the raster query should use for this symbolizer.
    pub fn filter_factor(&self) -> f64 {
        match self.filter_factor {
            Some(factor) if factor > 0.0 => factor,
            _ => self.scaling.filter_factor(),
        }
    }
}

/// Text label with a background image.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShieldSymbolizer {
    /// Label text.
    pub text: Expression,
    /// Font face name.
    pub face_name: String,
    /// Font size in pixels.
    pub size: f64,
    /// Text color.
    pub fill: Color,
    /// Path to the shield image.
    pub file: String,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for ShieldSymbolizer {
    fn default() -> Self {
        Self {
            text: empty_text(),
            face_name: String::new(),
            size: 10.0,
            fill: Color::BLACK,
            file: String::new(),
            metawriter: None,
        }
    }
}

/// Text label.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextSymbolizer {
    /// Label text.
    pub text: Expression,
    /// Font face name.
    pub face_name: String,
    /// Font size in pixels.
    pub size: f64,
    /// Text color.
    pub fill: Color,
    /// Halo color.
    pub halo_fill: Color,
    /// Halo radius in pixels. No halo is drawn if zero.
    pub halo_radius: f64,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for TextSymbolizer {
    fn default() -> Self {
        Self {
            text: empty_text(),
            face_name: String::new(),
            size: 10.0,
            fill: Color::BLACK,
            halo_fill: Color::WHITE,
            halo_radius: 0.0,
            metawriter: None,
        }
    }
}

impl TextSymbolizer {
    /// Label text for the feature.
    pub fn label(&self, feature: &Feature) -> String {
        self.text.evaluate(feature).to_string()
    }
}

/// Pseudo-3d extrusion of polygons.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BuildingSymbolizer {
    /// Fill color of the roof.
    pub fill: Color,
    /// Fill opacity.
    pub fill_opacity: f64,
    /// Height of the extrusion in map units.
    pub height: f64,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for BuildingSymbolizer {
    fn default() -> Self {
        Self {
            fill: Color::GRAY,
            fill_opacity: 1.0,
            height: 0.0,
            metawriter: None,
        }
    }
}

/// Markers placed at points or along lines.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MarkersSymbolizer {
    /// Path to the marker image. An ellipse of `width` x `height` is drawn if not set.
    pub file: Option<String>,
    /// Fill color of the ellipse marker.
    pub fill: Color,
    /// Marker width in pixels.
    pub width: f64,
    /// Marker height in pixels.
    pub height: f64,
    /// Distance between markers along lines, in pixels.
    pub spacing: f64,
    /// Draw the marker even if it overlaps previously placed ones.
    pub allow_overlap: bool,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for MarkersSymbolizer {
    fn default() -> Self {
        Self {
            file: None,
            fill: Color::BLUE,
            width: 10.0,
            height: 10.0,
            spacing: 100.0,
            allow_overlap: false,
            metawriter: None,
        }
    }
}

/// Single font glyph placed at points.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GlyphSymbolizer {
    /// Font face name.
    pub face_name: String,
    /// Character to draw.
    pub char: Expression,
    /// Glyph size in pixels.
    pub size: f64,
    /// Glyph color.
    pub color: Color,
    /// Metawriter for the symbolizer output.
    pub metawriter: Option<MetawriterRef>,
}

impl Default for GlyphSymbolizer {
    fn default() -> Self {
        Self {
            face_name: String::new(),
            char: empty_text(),
            size: 10.0,
            color: Color::BLACK,
            metawriter: None,
        }
    }
}

fn empty_text() -> Expression {
    Expression::Literal(Value::String(String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn raster_filter_factor() {
        let mut symbolizer = RasterSymbolizer::default();
        assert_abs_diff_eq!(symbolizer.filter_factor(), 1.0);

        symbolizer.scaling = ScalingMethod::Bilinear;
        assert_abs_diff_eq!(symbolizer.filter_factor(), 2.0);

        symbolizer.scaling = ScalingMethod::Lanczos;
        assert_abs_diff_eq!(symbolizer.filter_factor(), 3.0);

        symbolizer.filter_factor = Some(4.5);
        assert_abs_diff_eq!(symbolizer.filter_factor(), 4.5);
    }

    #[test]
    fn polygon_expression_values() {
        let symbolizer = PolygonExpressionSymbolizer {
            opacity: Some("[density] / 100".parse().expect("valid")),
            gamma: Some("[gamma]".parse().expect("valid")),
            ..Default::default()
        };

        let sparse = Feature::new(1).with_attribute("density", 25.0);
        let dense = Feature::new(2)
            .with_attribute("density", 250.0)
            .with_attribute("gamma", 0.5);

        assert_abs_diff_eq!(symbolizer.opacity(&sparse), 0.25);
        assert_abs_diff_eq!(symbolizer.opacity(&dense), 1.0);
        assert_abs_diff_eq!(symbolizer.opacity(&Feature::new(3)), 1.0);
        assert_abs_diff_eq!(symbolizer.gamma(&sparse), 1.0);
        assert_abs_diff_eq!(symbolizer.gamma(&dense), 0.5);
        assert_abs_diff_eq!(PolygonExpressionSymbolizer::default().opacity(&dense), 1.0);
    }

    #[test]
    fn text_label() {
        let symbolizer = TextSymbolizer {
            text: "[name] + ' (' + [ele] + ')'".parse().expect("valid"),
            ..Default::default()
        };
        let peak = Feature::new(1)
            .with_attribute("name", "Elbrus")
            .with_attribute("ele", 5642);
        assert_eq!(symbolizer.label(&peak), "Elbrus (5642)");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn symbolizer_serialization() {
        let json = r##"[
            {"type": "polygon", "fill": "#ff0000"},
            {"type": "line-pattern", "file": "rail.png", "metawriter": {"name": "json"}},
            {"type": "raster", "scaling": "bilinear"},
            {"type": "text", "text": "[name]", "size": 12.0}
        ]"##;
        let symbolizers: Vec<Symbolizer> = serde_json::from_str(json).expect("valid style");

        assert_eq!(
            symbolizers.iter().map(Symbolizer::kind).collect::<Vec<_>>(),
            vec!["polygon", "line-pattern", "raster", "text"]
        );
        assert_eq!(
            symbolizers[0],
            Symbolizer::Polygon(PolygonSymbolizer {
                fill: Color::RED,
                ..Default::default()
            })
        );
        assert_eq!(symbolizers[1].metawriter(), Some(&MetawriterRef::new("json")));
        assert_abs_diff_eq!(
            symbolizers[2].as_raster().expect("raster").filter_factor(),
            2.0
        );

        let restored: Vec<Symbolizer> =
            serde_json::from_str(&serde_json::to_string(&symbolizers).expect("serializable"))
                .expect("deserializable");
        assert_eq!(restored, symbolizers);
    }
}
