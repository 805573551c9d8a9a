use crate::error::MeridianTypesError;
use crate::geo::crs::Crs;
use crate::geo::point::GeoPoint2d;
use crate::geo::projection::{ChainProjection, InvertedProjection, Projection};
use crate::point::Point2d;
use crate::rect::Rect;

/// Number of segments each edge of a rectangle is split into before transforming it. Curved edges of the
/// transformed rectangle are thus approximated by the envelope of these samples.
const DENSIFY_SEGMENTS: usize = 8;

/// Transformation of coordinates from a `source` reference system into a `dest` one.
///
/// `forward` methods convert from the source into the destination, `backward` ones do the opposite. When both
/// reference systems are equal, the transform is an identity and never fails.
pub struct ProjTransform {
    source: Crs,
    dest: Crs,
    projection: Option<ChainProjection<Point2d, GeoPoint2d, Point2d>>,
}

impl ProjTransform {
    /// Creates a transform between two reference systems.
    ///
    /// Fails if a projection for any of the reference systems is not available.
    pub fn new(source: &Crs, dest: &Crs) -> Result<Self, MeridianTypesError> {
        let projection = if source == dest {
            None
        } else {
            let source_projection = source.get_projection()?;
            let dest_projection = dest.get_projection()?;
            Some(ChainProjection::new(
                Box::new(InvertedProjection::new(source_projection)),
                dest_projection,
            ))
        };

        Ok(Self {
            source: source.clone(),
            dest: dest.clone(),
            projection,
        })
    }

    /// Source reference system.
    pub fn source(&self) -> &Crs {
        &self.source
    }

    /// Destination reference system.
    pub fn dest(&self) -> &Crs {
        &self.dest
    }

    /// Returns true if the transform does not change coordinates.
    pub fn is_identity(&self) -> bool {
        self.projection.is_none()
    }

    /// Converts a point from the source into the destination reference system.
    pub fn forward_point(&self, point: &Point2d) -> Option<Point2d> {
        match &self.projection {
            None => Some(*point),
            Some(projection) => projection.project(point).filter(Point2d::is_finite),
        }
    }

    /// Converts a point from the destination into the source reference system.
    pub fn backward_point(&self, point: &Point2d) -> Option<Point2d> {
        match &self.projection {
            None => Some(*point),
            Some(projection) => projection.unproject(point).filter(Point2d::is_finite),
        }
    }

    /// Converts a bounding box from the source into the destination reference system.
    ///
    /// Returns `None` if any of the sampled points of the box border cannot be transformed.
    pub fn forward(&self, rect: &Rect) -> Option<Rect> {
        self.transform_rect(rect, |p| self.forward_point(p))
    }

    /// Converts a bounding box from the destination into the source reference system.
    ///
    /// Returns `None` if any of the sampled points of the box border cannot be transformed.
    pub fn backward(&self, rect: &Rect) -> Option<Rect> {
        self.transform_rect(rect, |p| self.backward_point(p))
    }

    fn transform_rect(
        &self,
        rect: &Rect,
        transform: impl Fn(&Point2d) -> Option<Point2d>,
    ) -> Option<Rect> {
        if self.is_identity() {
            return Some(*rect);
        }

        let points = densify(rect)
            .iter()
            .map(&transform)
            .collect::<Option<Vec<_>>>()?;
        Rect::from_points(points.iter())
    }
}

impl std::fmt::Debug for ProjTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjTransform")
            .field("source", &self.source)
            .field("dest", &self.dest)
            .field("is_identity", &self.is_identity())
            .finish()
    }
}

fn densify(rect: &Rect) -> Vec<Point2d> {
    let corners = rect.into_quadrangle();
    let mut points = Vec::with_capacity(corners.len() * DENSIFY_SEGMENTS);
    for i in 0..corners.len() {
        let from = corners[i];
        let to = corners[(i + 1) % corners.len()];
        for step in 0..DENSIFY_SEGMENTS {
            let k = step as f64 / DENSIFY_SEGMENTS as f64;
            points.push(Point2d::new(
                from.x() + (to.x() - from.x()) * k,
                from.y() + (to.y() - from.y()) * k,
            ));
        }
    }

    points
}
