use std::collections::BTreeSet;

use meridian_types::Rect;

/// Number of pixels per map unit, horizontally and vertically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Pixels per map unit along the x axis.
    pub x: f64,
    /// Pixels per map unit along the y axis.
    pub y: f64,
}

/// Request for features sent to a [`Datasource`](crate::datasource::Datasource).
///
/// A query is built once per layer per render pass and is not modified after the retrieval has started.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    bbox: Rect,
    resolution: Resolution,
    scale_denominator: f64,
    property_names: BTreeSet<String>,
    filter_factor: f64,
}

impl Query {
    /// Creates a query for the given extent (in the layer reference system).
    pub fn new(bbox: Rect, resolution: Resolution, scale_denominator: f64) -> Self {
        Self {
            bbox,
            resolution,
            scale_denominator,
            property_names: BTreeSet::new(),
            filter_factor: 1.0,
        }
    }

    /// Requested extent in the layer reference system.
    pub fn bbox(&self) -> &Rect {
        &self.bbox
    }

    /// Output resolution.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    /// Scale denominator of the rendering.
    pub fn scale_denominator(&self) -> f64 {
        self.scale_denominator
    }

    /// Names of the attributes the features must carry. Datasources may return more attributes.
    pub fn property_names(&self) -> &BTreeSet<String> {
        &self.property_names
    }

    /// Resampling filter factor for raster sources.
    pub fn filter_factor(&self) -> f64 {
        self.filter_factor
    }

    /// Adds an attribute name to the request.
    pub fn add_property_name(&mut self, name: impl Into<String>) {
        self.property_names.insert(name.into());
    }

    /// Sets the resampling filter factor.
    pub fn set_filter_factor(&mut self, filter_factor: f64) {
        self.filter_factor = filter_factor;
    }
}
