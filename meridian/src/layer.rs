use std::sync::Arc;

use meridian_types::geo::Crs;
use meridian_types::Rect;

use crate::datasource::registry::create_datasource;
use crate::datasource::{Datasource, Parameters};
use crate::error::MeridianError;

/// Tolerance of the layer scale range checks.
const SCALE_EPSILON: f64 = 1e-6;

/// Layer of a [`Map`](crate::Map): a datasource with a list of styles to render it with.
///
/// Layers are rendered in the order they are added to the map, the first layer at the bottom.
#[derive(Clone)]
pub struct Layer {
    name: String,
    srs: Crs,
    styles: Vec<String>,
    cache_features: bool,
    datasource: Option<Arc<dyn Datasource>>,
    min_scale: f64,
    max_scale: f64,
    active: bool,
}

impl Layer {
    /// Creates an active layer without datasource and styles.
    pub fn new(name: impl Into<String>, srs: Crs) -> Self {
        Self {
            name: name.into(),
            srs,
            styles: vec![],
            cache_features: false,
            datasource: None,
            min_scale: 0.0,
            max_scale: f64::MAX,
            active: true,
        }
    }

    /// Appends a style name to the list of the layer styles.
    pub fn with_style(mut self, style_name: impl Into<String>) -> Self {
        self.styles.push(style_name.into());
        self
    }

    /// Sets the datasource of the layer.
    pub fn with_datasource(mut self, datasource: Arc<dyn Datasource>) -> Self {
        self.datasource = Some(datasource);
        self
    }

    /// Creates the datasource from its parameters using the datasource
    /// [registry](crate::datasource::registry).
    pub fn with_datasource_params(mut self, params: &Parameters) -> Result<Self, MeridianError> {
        self.datasource = Some(create_datasource(params)?);
        Ok(self)
    }

    /// Sets whether features should be kept in memory between the styles of the layer, instead of querying the
    /// datasource once per style.
    pub fn with_cache_features(mut self, cache_features: bool) -> Self {
        self.cache_features = cache_features;
        self
    }

    /// Sets the range of scale denominators the layer is visible at.
    pub fn with_scale_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    /// Name of the layer.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference system of the layer data.
    pub fn srs(&self) -> &Crs {
        &self.srs
    }

    /// Names of the styles of the layer, in rendering order.
    pub fn styles(&self) -> &[String] {
        &self.styles
    }

    /// Whether features are cached between styles.
    pub fn cache_features(&self) -> bool {
        self.cache_features
    }

    /// Datasource of the layer.
    pub fn datasource(&self) -> Option<&Arc<dyn Datasource>> {
        self.datasource.as_ref()
    }

    /// Extent of the layer data in the layer reference system.
    pub fn envelope(&self) -> Option<Rect> {
        self.datasource.as_ref().map(|ds| ds.envelope())
    }

    /// Whether the layer is switched on.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Switches the layer on or off.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Returns true if the layer is active and the scale denominator is inside its scale range.
    pub fn is_visible(&self, scale_denominator: f64) -> bool {
        self.active
            && scale_denominator >= self.min_scale - SCALE_EPSILON
            && scale_denominator < self.max_scale + SCALE_EPSILON
    }
}

impl std::fmt::Debug for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Layer")
            .field("name", &self.name)
            .field("srs", &self.srs)
            .field("styles", &self.styles)
            .field("cache_features", &self.cache_features)
            .field("has_datasource", &self.datasource.is_some())
            .field("min_scale", &self.min_scale)
            .field("max_scale", &self.max_scale)
            .field("active", &self.active)
            .finish()
    }
}
