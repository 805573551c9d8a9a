use serde::{Deserialize, Serialize};

/// Point in a 2d cartesian space. Coordinates are expressed in the units of the reference system the point
/// belongs to (meters for projected systems, degrees for geographic ones).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2d<Num = f64> {
    x: Num,
    y: Num,
}

impl<Num: num_traits::Num + Copy> Point2d<Num> {
    /// Creates a new point.
    pub const fn new(x: Num, y: Num) -> Self {
        Self { x, y }
    }

    /// X coordinate.
    pub fn x(&self) -> Num {
        self.x
    }

    /// Y coordinate.
    pub fn y(&self) -> Num {
        self.y
    }

    /// Multiplies both coordinates by `k`.
    pub fn multiply(&self, k: Num) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
        }
    }
}

impl Point2d<f64> {
    /// Returns true if both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl<Num: num_traits::Num + Copy> std::ops::Add<Point2d<Num>> for Point2d<Num> {
    type Output = Self;

    fn add(self, rhs: Point2d<Num>) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl<Num: num_traits::Num + Copy> std::ops::Sub<Point2d<Num>> for Point2d<Num> {
    type Output = Self;

    fn sub(self, rhs: Point2d<Num>) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
