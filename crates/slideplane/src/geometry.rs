use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

/// A displacement on the plane, in multiples of screen size.
///
/// Serialized as a `[dx, dy]` pair so deck files stay compact.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Vector2 {
    pub dx: f64,
    pub dy: f64,
}

impl Vector2 {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Flip the vertical axis (screen space grows down, the plane grows up).
    pub fn inverted_dy(self) -> Self {
        Self {
            dx: self.dx,
            dy: -self.dy,
        }
    }

    pub fn is_zero(self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl From<[f64; 2]> for Vector2 {
    fn from([dx, dy]: [f64; 2]) -> Self {
        Self { dx, dy }
    }
}

impl From<Vector2> for [f64; 2] {
    fn from(v: Vector2) -> Self {
        [v.dx, v.dy]
    }
}

impl Add for Vector2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

impl Neg for Vector2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.dx, -self.dy)
    }
}

impl Mul<f64> for Vector2 {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.dx * rhs, self.dy * rhs)
    }
}

impl Div<f64> for Vector2 {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.dx / rhs, self.dy / rhs)
    }
}

/// A window position in pixels, origin at the top-left, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Width and height, either in pixels or in screen-relative units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Div<f64> for Size {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.width / rhs, self.height / rhs)
    }
}

/// Axis-aligned rectangle on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vector2,
    pub size: Size,
}

impl Rect {
    pub fn from_center_size(center: Vector2, size: Size) -> Self {
        Self {
            min: Vector2::new(center.dx - size.width / 2.0, center.dy - size.height / 2.0),
            size,
        }
    }

    pub fn max(&self) -> Vector2 {
        Vector2::new(self.min.dx + self.size.width, self.min.dy + self.size.height)
    }

    /// Half-open containment: the min edges are inside, the max edges are not.
    pub fn contains(&self, point: Vector2) -> bool {
        let max = self.max();
        point.dx >= self.min.dx && point.dx < max.dx && point.dy >= self.min.dy && point.dy < max.dy
    }
}

/// Bounding box of a set of plane points, tracked per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vector2,
    pub max: Vector2,
}

impl Bounds {
    /// Returns `None` for an empty iterator.
    pub fn of_points(points: impl IntoIterator<Item = Vector2>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: Vector2::new(acc.min.dx.min(p.dx), acc.min.dy.min(p.dy)),
                max: Vector2::new(acc.max.dx.max(p.dx), acc.max.dy.max(p.dy)),
            },
        ))
    }

    pub fn span(&self) -> Vector2 {
        self.max - self.min
    }

    pub fn center(&self) -> Vector2 {
        self.min + self.span() / 2.0
    }
}
