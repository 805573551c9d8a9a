use crate::geo::point::GeoPoint2d;
use crate::geo::projection::Projection;
use crate::point::Point2d;

/// Geographic coordinates laid out on a plane: x is longitude and y is latitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct LonLat;

impl Projection for LonLat {
    type InPoint = GeoPoint2d;
    type OutPoint = Point2d;

    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        let point = Point2d::new(input.lon(), input.lat());
        point.is_finite().then_some(point)
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        input
            .is_finite()
            .then(|| GeoPoint2d::latlon(input.y(), input.x()))
    }
}
