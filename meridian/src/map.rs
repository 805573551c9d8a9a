use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use meridian_types::geo::Crs;
use meridian_types::Rect;

use crate::color::Color;
use crate::datasource::Parameters;
use crate::layer::Layer;
use crate::metawriter::{Metawriter, ResolvedMetawriter};
use crate::style::{MetawriterRef, Style};

/// Size of a pixel in meters that scale denominators are computed for (0.28 mm).
pub const STANDARDIZED_PIXEL_SIZE: f64 = 0.00028;

/// Declarative definition of a map: output size, reference system, visible extent, layers and styles.
///
/// The map is not changed by rendering. The same map can be rendered by several pipelines at once.
#[derive(Clone)]
pub struct Map {
    srs: Crs,
    width: u32,
    height: u32,
    current_extent: Rect,
    buffer_size: u32,
    maximum_extent: Option<Rect>,
    background: Option<Color>,
    layers: Vec<Layer>,
    styles: AHashMap<String, Style>,
    metawriters: BTreeMap<String, Arc<dyn Metawriter>>,
    metawriter_output_properties: Parameters,
}

impl Map {
    /// Creates an empty map with output of the given size in pixels.
    ///
    /// The initial extent covers `width` x `height` map units starting at the origin.
    pub fn new(width: u32, height: u32, srs: Crs) -> Self {
        Self {
            srs,
            width,
            height,
            current_extent: Rect::new(0.0, 0.0, width as f64, height as f64),
            buffer_size: 0,
            maximum_extent: None,
            background: None,
            layers: vec![],
            styles: AHashMap::new(),
            metawriters: BTreeMap::new(),
            metawriter_output_properties: Parameters::new(),
        }
    }

    /// Reference system of the map.
    pub fn srs(&self) -> &Crs {
        &self.srs
    }

    /// Output width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Output height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Adds a layer on top of the existing ones.
    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Adds a layer on top of the existing ones.
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.add_layer(layer);
        self
    }

    /// Layers in rendering order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Mutable access to the layers.
    pub fn layers_mut(&mut self) -> &mut Vec<Layer> {
        &mut self.layers
    }

    /// Registers a style under the name. Returns the style previously registered under the name.
    pub fn insert_style(&mut self, name: impl Into<String>, style: Style) -> Option<Style> {
        self.styles.insert(name.into(), style)
    }

    /// Registers a style under the name.
    pub fn with_style(mut self, name: impl Into<String>, style: Style) -> Self {
        self.insert_style(name, style);
        self
    }

    /// Style with the given name.
    pub fn find_style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    /// Registers a metawriter under the name.
    pub fn insert_metawriter(&mut self, name: impl Into<String>, metawriter: Arc<dyn Metawriter>) {
        self.metawriters.insert(name.into(), metawriter);
    }

    /// Metawriter with the given name.
    pub fn find_metawriter(&self, name: &str) -> Option<&Arc<dyn Metawriter>> {
        self.metawriters.get(name)
    }

    /// Looks up the metawriter a symbolizer refers to and computes the properties it should output.
    pub fn resolve_metawriter(&self, reference: &MetawriterRef) -> Option<ResolvedMetawriter> {
        self.find_metawriter(&reference.name)
            .map(|writer| ResolvedMetawriter::new(writer.clone(), reference))
    }

    /// All metawriters of the map, ordered by name.
    pub fn metawriters(&self) -> impl Iterator<Item = (&str, &Arc<dyn Metawriter>)> + '_ {
        self.metawriters.iter().map(|(name, w)| (name.as_str(), w))
    }

    /// Properties given to every metawriter when it is started.
    pub fn metawriter_output_properties(&self) -> &Parameters {
        &self.metawriter_output_properties
    }

    /// Sets a property given to every metawriter when it is started.
    pub fn set_metawriter_property(&mut self, name: impl Into<String>, value: impl ToString) {
        self.metawriter_output_properties.insert(name, value);
    }

    /// Background color of the map.
    pub fn background(&self) -> Option<Color> {
        self.background
    }

    /// Sets the background color.
    pub fn set_background(&mut self, color: Color) {
        self.background = Some(color);
    }

    /// Currently displayed extent in the map reference system.
    pub fn current_extent(&self) -> Rect {
        self.current_extent
    }

    /// Displays the given extent.
    ///
    /// The extent is grown in one direction to keep its aspect ratio equal to that of the output, so that pixels
    /// are square.
    pub fn zoom_to_box(&mut self, extent: Rect) {
        self.current_extent = self.fix_aspect_ratio(extent);
    }

    fn fix_aspect_ratio(&self, extent: Rect) -> Rect {
        if self.width == 0 || self.height == 0 || extent.width() <= 0.0 || extent.height() <= 0.0 {
            return extent;
        }

        let output_ratio = self.width as f64 / self.height as f64;
        let extent_ratio = extent.width() / extent.height();
        if extent_ratio > output_ratio {
            let dy = (extent.width() / output_ratio - extent.height()) / 2.0;
            extent.expand_by(0.0, dy)
        } else {
            let dx = (extent.height() * output_ratio - extent.width()) / 2.0;
            extent.expand_by(dx, 0.0)
        }
    }

    /// Number of pixels around the output that are rendered too, so that symbols crossing the output border are
    /// drawn correctly.
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// Sets the buffer size in pixels.
    pub fn set_buffer_size(&mut self, buffer_size: u32) {
        self.buffer_size = buffer_size;
    }

    /// Current extent grown by the buffer size on all sides.
    pub fn buffered_extent(&self) -> Rect {
        let extra = self.scale() * self.buffer_size as f64;
        self.current_extent.expand_by(extra, extra)
    }

    /// Extent data is never requested outside of.
    pub fn maximum_extent(&self) -> Option<Rect> {
        self.maximum_extent
    }

    /// Sets the maximum extent.
    pub fn set_maximum_extent(&mut self, extent: Option<Rect>) {
        self.maximum_extent = extent;
    }

    /// Map units per pixel along the x axis.
    pub fn scale(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }

        self.current_extent.width() / self.width as f64
    }

    /// Scale denominator of the map at the current extent.
    ///
    /// For geographic reference systems map units are converted from degrees into meters along the equator.
    pub fn scale_denominator(&self) -> f64 {
        let mut denominator = self.scale();
        if self.srs.is_geographic() {
            denominator *= self.srs.datum().meters_per_degree();
        }

        denominator / STANDARDIZED_PIXEL_SIZE
    }
}

impl std::fmt::Debug for Map {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Map")
            .field("srs", &self.srs)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("current_extent", &self.current_extent)
            .field("buffer_size", &self.buffer_size)
            .field("maximum_extent", &self.maximum_extent)
            .field("layers", &self.layers)
            .field("styles", &self.styles.keys().collect::<Vec<_>>())
            .field("metawriters", &self.metawriters.keys().collect::<Vec<_>>())
            .finish()
    }
}
