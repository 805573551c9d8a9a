//! Geographic coordinates, coordinate reference systems ([`Crs`]) and conversions between them
//! ([`Projection`], [`ProjTransform`]).

mod crs;
mod datum;
mod point;
pub mod projection;
mod transform;

pub use crs::{Crs, ProjectionType};
pub use datum::Datum;
pub use point::GeoPoint2d;
pub use projection::{ChainProjection, InvertedProjection, Projection};
pub use transform::ProjTransform;
