use crate::geo::datum::Datum;
use crate::geo::point::GeoPoint2d;
use crate::geo::projection::Projection;
use crate::point::Point2d;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Latitude at which the projected world becomes a square. Points closer to the poles are not projected.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Spherical Mercator projection (EPSG:3857).
#[derive(Debug, Copy, Clone, Default)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection for the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }
}

impl Projection for WebMercator {
    type InPoint = GeoPoint2d;
    type OutPoint = Point2d;

    fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        if input.lat().abs() > MAX_LATITUDE {
            return None;
        }

        let x = self.datum.semimajor() * input.lon_rad();
        let y = self.datum.semimajor() * (FRAC_PI_4 + input.lat_rad() / 2.0).tan().ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2d::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2d) -> Option<GeoPoint2d> {
        if !input.is_finite() {
            return None;
        }

        let lat = 2.0 * (input.y() / self.datum.semimajor()).exp().atan() - FRAC_PI_2;
        let lon = input.x() / self.datum.semimajor();

        Some(GeoPoint2d::latlon(lat.to_degrees(), lon.to_degrees()))
    }
}
