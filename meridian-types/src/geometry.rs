use crate::point::Point2d;
use crate::rect::Rect;
use serde::{Deserialize, Serialize};

/// Polygon with an outer ring and optional holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon<P = Point2d> {
    /// Outer boundary of the polygon.
    pub outer: Vec<P>,
    /// Holes.
    #[serde(default = "Vec::new")]
    pub inner: Vec<Vec<P>>,
}

impl<P> Polygon<P> {
    /// Creates a polygon without holes.
    pub fn new(outer: Vec<P>) -> Self {
        Self {
            outer,
            inner: vec![],
        }
    }

    fn map<Out>(&self, f: &mut impl FnMut(&P) -> Option<Out>) -> Option<Polygon<Out>> {
        Some(Polygon {
            outer: self.outer.iter().map(&mut *f).collect::<Option<_>>()?,
            inner: self
                .inner
                .iter()
                .map(|ring| ring.iter().map(&mut *f).collect::<Option<_>>())
                .collect::<Option<_>>()?,
        })
    }
}

/// Geometry of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geom<P = Point2d> {
    /// Single point.
    Point(P),
    /// Set of points.
    MultiPoint(Vec<P>),
    /// Open line.
    LineString(Vec<P>),
    /// Set of lines.
    MultiLineString(Vec<Vec<P>>),
    /// Polygon.
    Polygon(Polygon<P>),
    /// Set of polygons.
    MultiPolygon(Vec<Polygon<P>>),
}

impl<P> Geom<P> {
    /// Converts every point of the geometry with `f`. Returns `None` if any of the points cannot be converted.
    pub fn try_map<Out>(&self, mut f: impl FnMut(&P) -> Option<Out>) -> Option<Geom<Out>> {
        let f = &mut f;
        Some(match self {
            Geom::Point(p) => Geom::Point(f(p)?),
            Geom::MultiPoint(points) => {
                Geom::MultiPoint(points.iter().map(&mut *f).collect::<Option<_>>()?)
            }
            Geom::LineString(points) => {
                Geom::LineString(points.iter().map(&mut *f).collect::<Option<_>>()?)
            }
            Geom::MultiLineString(lines) => Geom::MultiLineString(
                lines
                    .iter()
                    .map(|line| line.iter().map(&mut *f).collect::<Option<_>>())
                    .collect::<Option<_>>()?,
            ),
            Geom::Polygon(polygon) => Geom::Polygon(polygon.map(f)?),
            Geom::MultiPolygon(polygons) => Geom::MultiPolygon(
                polygons
                    .iter()
                    .map(|polygon| polygon.map(&mut *f))
                    .collect::<Option<_>>()?,
            ),
        })
    }

    /// Iterates over all vertices of the geometry.
    pub fn points(&self) -> Box<dyn Iterator<Item = &P> + '_> {
        match self {
            Geom::Point(p) => Box::new(std::iter::once(p)),
            Geom::MultiPoint(points) | Geom::LineString(points) => Box::new(points.iter()),
            Geom::MultiLineString(lines) => Box::new(lines.iter().flatten()),
            Geom::Polygon(polygon) => Box::new(
                polygon
                    .outer
                    .iter()
                    .chain(polygon.inner.iter().flatten()),
            ),
            Geom::MultiPolygon(polygons) => Box::new(
                polygons
                    .iter()
                    .flat_map(|polygon| polygon.outer.iter().chain(polygon.inner.iter().flatten())),
            ),
        }
    }
}

impl Geom<Point2d> {
    /// Bounding rectangle of the geometry. Returns `None` for empty geometries.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points())
    }
}
