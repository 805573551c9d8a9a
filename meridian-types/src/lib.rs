//! Geometry and coordinate reference system types used by the `meridian` rendering pipeline.
//!
//! The crate is intentionally small: it provides plain value types ([`Point2d`], [`Rect`], [`Geom`]),
//! a description of a coordinate reference system ([`Crs`](geo::Crs)) and the machinery to move points and
//! bounding boxes between two reference systems ([`ProjTransform`](geo::ProjTransform)).

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod error;
pub mod geo;
mod geometry;
mod point;
mod rect;

pub use error::MeridianTypesError;
pub use geometry::{Geom, Polygon};
pub use point::Point2d;
pub use rect::Rect;
