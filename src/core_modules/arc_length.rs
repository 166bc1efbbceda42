// THEORY:
// The `arc_length` module wraps a boundary polyline with a cumulative-length
// table so a point at any normalized distance along the curve can be found in
// O(log n). The Coons blend queries each boundary thousands of times per
// geometry (once per polygon vertex per cell), while the polyline itself only
// changes when the calibration changes — so the table is built once and the
// per-query cost is a binary search plus one linear interpolation.
//
// Without the table every query would re-walk the polyline (O(n)), which is
// what the earliest revision of this engine did; the index is the cached
// replacement.
//
// Invariants:
// - `cumulative[0] == 0` and `cumulative` is non-decreasing.
// - `cumulative.len() == points.len()`.
// - `interp(0)` is exactly the first point, `interp(1)` exactly the last.

use crate::core_modules::curve::curve::BoundaryCurve;
use crate::core_modules::geometry::Point2;

/// A boundary curve indexed by normalized arc length.
#[derive(Debug, Clone)]
pub struct ArcLengthIndex {
    points: Vec<Point2>,
    /// Cumulative distance from the first point to point `i`.
    cumulative: Vec<f64>,
    total_length: f64,
}

impl ArcLengthIndex {
    pub fn new(curve: &BoundaryCurve) -> Self {
        let points = curve.points().to_vec();
        let mut cumulative = Vec::with_capacity(points.len());
        cumulative.push(0.0);
        let mut total_length = 0.0;
        for i in 1..points.len() {
            total_length += points[i - 1].distance(&points[i]);
            cumulative.push(total_length);
        }
        Self { points, cumulative, total_length }
    }

    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// The point at normalized arc-length position `t`, clamped to [0, 1].
    ///
    /// Binary-searches the cumulative table for the bracketing segment, then
    /// interpolates linearly within it. A zero-length segment interpolates
    /// with weight 0 (its start point).
    pub fn interp(&self, t: f64) -> Point2 {
        if self.points.len() == 1 {
            return self.points[0];
        }

        let d = t.clamp(0.0, 1.0) * self.total_length;

        let mut i = 0;
        if self.cumulative.len() > 2 {
            let mut left = 0;
            let mut right = self.cumulative.len() - 1;
            while left < right - 1 {
                let mid = (left + right) / 2;
                if d <= self.cumulative[mid] {
                    right = mid;
                } else {
                    left = mid;
                }
            }
            i = left;
        }
        i = i.min(self.points.len() - 2);

        let span = self.cumulative[i + 1] - self.cumulative[i];
        let w = if span == 0.0 { 0.0 } else { (d - self.cumulative[i]) / span };
        self.points[i].lerp(&self.points[i + 1], w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::curve::curve::BoundaryCurve;

    fn polyline(points: &[(f32, f32)]) -> BoundaryCurve {
        BoundaryCurve::from_points(points.iter().map(|&(x, y)| Point2::new(x, y)).collect())
            .unwrap()
    }

    #[test]
    fn endpoints_are_exact() {
        let index = ArcLengthIndex::new(&polyline(&[(0.0, 0.0), (3.0, 4.0), (10.0, 4.0)]));
        assert_eq!(index.interp(0.0), Point2::new(0.0, 0.0));
        assert_eq!(index.interp(1.0), Point2::new(10.0, 4.0));
        // Out-of-range parameters clamp to the endpoints.
        assert_eq!(index.interp(-0.5), Point2::new(0.0, 0.0));
        assert_eq!(index.interp(1.5), Point2::new(10.0, 4.0));
    }

    #[test]
    fn interpolation_is_uniform_in_distance() {
        // Two segments: length 5 then length 7, total 12.
        let index = ArcLengthIndex::new(&polyline(&[(0.0, 0.0), (3.0, 4.0), (10.0, 4.0)]));
        assert!((index.total_length() - 12.0).abs() < 1e-9);
        // t = 5/12 lands exactly on the joint.
        let joint = index.interp(5.0 / 12.0);
        assert!((joint.x - 3.0).abs() < 1e-4 && (joint.y - 4.0).abs() < 1e-4);
    }

    #[test]
    fn arc_position_is_monotonic_and_uniform_speed() {
        // A straight polyline with uneven sample spacing: arc length equals x,
        // so interp(t).x must be t * total regardless of where the original
        // samples sit.
        let index = ArcLengthIndex::new(&polyline(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (1.5, 0.0),
            (8.0, 0.0),
            (10.0, 0.0),
        ]));
        let mut last = -1.0f32;
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let p = index.interp(t);
            assert!(p.x >= last);
            assert!((p.x as f64 - t * 10.0).abs() < 1e-4);
            last = p.x;
        }
    }

    #[test]
    fn zero_length_segment_does_not_divide_by_zero() {
        let index = ArcLengthIndex::new(&polyline(&[(0.0, 0.0), (0.0, 0.0), (10.0, 0.0)]));
        let mid = index.interp(0.5);
        assert!((mid.x - 5.0).abs() < 1e-4);
    }

    #[test]
    fn single_point_curve_always_returns_that_point() {
        let index = ArcLengthIndex::new(&polyline(&[(7.0, 8.0)]));
        assert_eq!(index.interp(0.0), Point2::new(7.0, 8.0));
        assert_eq!(index.interp(0.7), Point2::new(7.0, 8.0));
        assert_eq!(index.interp(1.0), Point2::new(7.0, 8.0));
    }
}
