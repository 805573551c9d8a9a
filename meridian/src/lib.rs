//! Meridian is a rule-based map rendering pipeline. It takes a declarative [`Map`] definition (layers, styles,
//! reference system and extent), retrieves features from pluggable [datasources](datasource), decides which style
//! rules apply to each feature at the current scale and sends the features with their symbolizers to a renderer
//! backend.
//!
//! # Main components
//!
//! * [`Map`] holds ordered [`Layer`]s and named [`Style`](style::Style)s. A style is a list of
//!   [`Rule`](style::Rule)s, each with a scale range, a [filter expression](expression) and a list of
//!   [`Symbolizer`](style::Symbolizer)s.
//! * [`Datasource`](datasource::Datasource) provides features for a layer. Concrete sources are plugged in
//!   directly or through the [datasource registry](datasource::registry).
//! * [`Processor`] is implemented by renderer backends. It receives lifecycle notifications and one call per
//!   symbolizer to render.
//! * [`FeatureStyleProcessor`] connects all of the above. It retrieves features of the layers on a [`WorkerPool`]
//!   and dispatches them to the processor.
//!
//! ```
//! use std::sync::Arc;
//! use meridian::datasource::MemoryDatasource;
//! use meridian::meridian_types::{geo::Crs, Geom, Point2d, Rect};
//! use meridian::style::{PointSymbolizer, Rule, Style, Symbolizer};
//! use meridian::{Feature, FeatureStyleProcessor, Layer, Map, Processor, WorkerPool};
//!
//! struct PointCounter(usize);
//!
//! impl Processor for PointCounter {
//!     fn process_point(
//!         &mut self,
//!         _: &PointSymbolizer,
//!         _: &Feature,
//!         _: &meridian::meridian_types::geo::ProjTransform,
//!     ) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let cities = MemoryDatasource::with_features([
//!     Feature::new(1).with_geometry(Geom::Point(Point2d::new(10.0, 10.0))),
//!     Feature::new(2).with_geometry(Geom::Point(Point2d::new(20.0, 20.0))),
//! ]);
//!
//! let mut map = Map::new(256, 256, Crs::EPSG3857)
//!     .with_style(
//!         "cities",
//!         Style::new(vec![Rule::new(None, vec![Symbolizer::Point(PointSymbolizer::default())])]),
//!     )
//!     .with_layer(
//!         Layer::new("cities", Crs::EPSG3857)
//!             .with_style("cities")
//!             .with_datasource(Arc::new(cities)),
//!     );
//! map.zoom_to_box(Rect::new(0.0, 0.0, 100.0, 100.0));
//!
//! let pool = WorkerPool::new(4).unwrap();
//! let mut counter = PointCounter(0);
//! let stats = FeatureStyleProcessor::new(&map, pool).apply(&mut counter);
//!
//! assert_eq!(counter.0, 2);
//! assert_eq!(stats.rendered_features(), 2);
//! ```


mod color;
mod config;
pub mod datasource;
pub mod error;
pub mod expression;
mod feature;
mod featureset;
mod layer;
mod map;
pub mod metawriter;
pub mod processor;
mod query;
pub mod render;
pub mod retrieval;
pub mod style;

#[cfg(test)]
mod tests;

pub use color::Color;
pub use config::RenderConfig;
pub use error::MeridianError;
pub use feature::{Feature, FeatureId, FeatureRef, Value};
pub use featureset::Featureset;
pub use layer::Layer;
pub use map::{Map, STANDARDIZED_PIXEL_SIZE};
pub use processor::{FeatureStyleProcessor, RenderStats};
pub use query::{Query, Resolution};
pub use render::Processor;
pub use retrieval::WorkerPool;

// Reexport meridian_types
pub use meridian_types;
