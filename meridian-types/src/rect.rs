use crate::point::Point2d;
use num_traits::{FromPrimitive, Num};
use serde::{Deserialize, Serialize};

/// Axis aligned bounding box.
///
/// Edges are inclusive: two rectangles that share only a border line are considered intersecting.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    x_min: N,
    y_min: N,
    x_max: N,
    y_max: N,
}

impl<N: Num + Copy + PartialOrd + FromPrimitive> Rect<N> {
    /// Creates a new rectangle. Coordinates are reordered if the given minimum is greater than the maximum.
    pub fn new(x1: N, y1: N, x2: N, y2: N) -> Self {
        Self {
            x_min: min(x1, x2),
            y_min: min(y1, y2),
            x_max: max(x1, x2),
            y_max: max(y1, y2),
        }
    }

    /// Minimum x.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Maximum x.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Minimum y.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Maximum y.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2d<N> {
        let two = N::one() + N::one();
        Point2d::new(
            (self.x_min + self.x_max) / two,
            (self.y_min + self.y_max) / two,
        )
    }

    /// Returns true if the rectangles have at least one common point.
    pub fn intersects(&self, other: &Self) -> bool {
        !(other.x_min > self.x_max
            || other.x_max < self.x_min
            || other.y_min > self.y_max
            || other.y_max < self.y_min)
    }

    /// Common part of two rectangles, or `None` if they do not intersect.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        Some(self.clip(other))
    }

    /// Limits this rectangle by the bounds of `other`.
    ///
    /// If the rectangles do not intersect, the result is degenerate. Use [`Rect::intersection`] if that case
    /// must be detected.
    pub fn clip(&self, other: &Self) -> Self {
        Self {
            x_min: max(self.x_min, other.x_min),
            y_min: max(self.y_min, other.y_min),
            x_max: min(self.x_max, other.x_max),
            y_max: min(self.y_max, other.y_max),
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            x_min: min(self.x_min, other.x_min),
            y_min: min(self.y_min, other.y_min),
            x_max: max(self.x_max, other.x_max),
            y_max: max(self.y_max, other.y_max),
        }
    }

    /// Grows the rectangle by `dx` to the left and right, and by `dy` to the top and bottom.
    pub fn expand_by(&self, dx: N, dy: N) -> Self {
        Self {
            x_min: self.x_min - dx,
            y_min: self.y_min - dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Returns true if the point lies inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2d<N>) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }

    /// Returns true if `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && self.y_min <= other.y_min
            && self.x_max >= other.x_max
            && self.y_max >= other.y_max
    }

    /// Bounding rectangle of the point sequence. Returns `None` for empty sequence.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2d<N>>) -> Option<Self>
    where
        N: 'a,
    {
        let first = points.next()?;
        let mut rect = Self::new(first.x(), first.y(), first.x(), first.y());
        for p in points {
            rect.x_min = min(rect.x_min, p.x());
            rect.y_min = min(rect.y_min, p.y());
            rect.x_max = max(rect.x_max, p.x());
            rect.y_max = max(rect.y_max, p.y());
        }

        Some(rect)
    }

    /// Smallest rectangle containing all the given ones. Returns `None` for empty sequence.
    pub fn merge_all(rects: impl IntoIterator<Item = Self>) -> Option<Self> {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        Some(iter.fold(first, |acc, rect| acc.merge(&rect)))
    }

    /// Four corners of the rectangle, counter-clockwise starting from the bottom-left one.
    pub fn into_quadrangle(self) -> [Point2d<N>; 4] {
        [
            Point2d::new(self.x_min, self.y_min),
            Point2d::new(self.x_max, self.y_min),
            Point2d::new(self.x_max, self.y_max),
            Point2d::new(self.x_min, self.y_max),
        ]
    }
}

fn min<N: PartialOrd>(a: N, b: N) -> N {
    if a < b {
        a
    } else {
        b
    }
}

fn max<N: PartialOrd>(a: N, b: N) -> N {
    if a > b {
        a
    } else {
        b
    }
}
