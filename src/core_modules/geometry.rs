// THEORY:
// The `geometry` module holds the two "dumb" primitives everything else is
// built from: a 2D floating-point point and an integer pixel rectangle. They
// carry no screen-mapping knowledge of their own; they exist so that the
// curve, patch, and mask layers can share one vocabulary for positions and
// regions instead of re-inventing tuple math in every file.
//
// Key architectural principles:
// 1.  **Operator-friendly points**: `Point2` implements the arithmetic ops the
//     Coons blend formula needs, so `(1.0 - v) * c0 + v * c1` reads exactly
//     like the math it implements.
// 2.  **Pixel rectangles are integer and half-open in size**: `Rect` stores an
//     origin plus width/height, and intersection against the frame rectangle
//     is the one operation the mask layer needs. An empty intersection is a
//     valid, representable state (zero width or height), not an error.

use std::ops::{Add, Mul, Sub};

/// A 2D point in continuous (sub-pixel) image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation between `self` and `other` at weight `w` in [0, 1].
    pub fn lerp(&self, other: &Point2, w: f64) -> Point2 {
        let w = w as f32;
        Point2 {
            x: (1.0 - w) * self.x + w * other.x,
            y: (1.0 - w) * self.y + w * other.y,
        }
    }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, rhs: Point2) -> Point2 {
        Point2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, rhs: Point2) -> Point2 {
        Point2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<Point2> for f32 {
    type Output = Point2;
    fn mul(self, rhs: Point2) -> Point2 {
        Point2::new(self * rhs.x, self * rhs.y)
    }
}

/// An integer point in pixel coordinates, produced by clamping a `Point2`
/// into the frame. Cell polygons are sequences of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// An axis-aligned pixel rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The tight bounding box of a polygon. An empty polygon yields an
    /// empty rectangle at the origin.
    pub fn bounding(points: &[PixelPoint]) -> Rect {
        if points.is_empty() {
            return Rect::default();
        }
        let mut min_x = i32::MAX;
        let mut min_y = i32::MAX;
        let mut max_x = i32::MIN;
        let mut max_y = i32::MIN;
        for p in points {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1)
    }

    /// Intersection with another rectangle. May be empty.
    pub fn intersect(&self, other: &Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        Rect::new(x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}
