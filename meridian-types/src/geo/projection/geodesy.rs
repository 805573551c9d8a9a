use crate::geo::point::GeoPoint2d;
use crate::geo::projection::Projection;
use crate::point::Point2d;
use geodesy::prelude::*;

/// Projection backed by the `geodesy` crate. Used for reference systems that have no built-in implementation.
pub struct GeodesyProjection {
    context: Minimal,
    op: OpHandle,
}

impl GeodesyProjection {
    /// Creates a projection from the operator definition, e.g. `laea lon_0=10 lat_0=52`. Returns `None` if the
    /// definition is not understood by `geodesy`.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        let op = context.op(definition).ok()?;
        Some(Self { context, op })
    }
}

impl Projection for GeodesyProjection {
    type InPoint = GeoPoint2d;
    type OutPoint = Point2d;

    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        let mut data = [Coor2D::geo(input.lat(), input.lon())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        let point = Point2d::new(data[0].0[0], data[0].0[1]);
        point.is_finite().then_some(point)
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        let point = GeoPoint2d::latlon(data[0].0[1].to_degrees(), data[0].0[0].to_degrees());
        (point.lat().is_finite() && point.lon().is_finite()).then_some(point)
    }
}
