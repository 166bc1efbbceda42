// THEORY:
// The `patch` module is the geometric core of the engine. A photographed
// screen is not a rectangle: its edges are curved by the lens and skewed by
// perspective. `ScreenPatch` combines the four boundary curves and the four
// corner points into a single continuous map from the unit parametric square
// (u, v) ∈ [0,1]² onto the curved screen region in pixel space — a Coons
// patch.
//
// The blend is a ruled-surface sum: a linear blend between the top and bottom
// curves, plus a linear blend between the left and right curves, minus the
// bilinear corner term that both blends count twice:
//
//     result = (1-v)·top(u) + v·bottom(u)
//            + (1-u)·left(v) + u·right(v)
//            - [(1-u)(1-v)·TL + u(1-v)·TR + uv·BR + (1-u)v·BL]
//
// Key architectural principles:
// 1.  **Normalized storage direction**: the blend needs all four curves to run
//     consistently (top and bottom left-to-right, left and right
//     top-to-bottom). Callers supply bottom and left as drawn by the
//     calibration trace (continuing clockwise around the perimeter), and the
//     constructor reverses them once.
// 2.  **Corner exactness by construction**: the corners are *derived from* the
//     curve endpoints, so interpolate(0,0) == TL etc. holds identically.
// 3.  **Arc-length queries**: each boundary is queried through its
//     `ArcLengthIndex`, so parameter speed along an edge is uniform in
//     distance, not in the curve's original sample spacing.

use crate::core_modules::arc_length::ArcLengthIndex;
use crate::core_modules::curve::curve::BoundaryCurve;
use crate::core_modules::geometry::{PixelPoint, Point2};
use crate::error::SetupError;

/// Adjacent-curve endpoints further apart than this (in pixels) suggest a bad
/// calibration; the patch still builds but the mismatch is logged.
const CORNER_MISMATCH_WARN_PX: f64 = 0.5;

/// A continuous 2D coordinate map over the photographed screen region.
/// Immutable once built; rebuild it when curves or frame dimensions change.
#[derive(Debug)]
pub struct ScreenPatch {
    top: ArcLengthIndex,
    right: ArcLengthIndex,
    /// Stored left-to-right (reversed from the supplied drawing direction).
    bottom: ArcLengthIndex,
    /// Stored top-to-bottom (reversed from the supplied drawing direction).
    left: ArcLengthIndex,
    /// TL, TR, BR, BL — derived from curve endpoints.
    corners: [Point2; 4],
    width: u32,
    height: u32,
}

impl ScreenPatch {
    /// Build a patch from the four boundary curves and the frame dimensions.
    ///
    /// `top` and `right` are supplied in their natural direction (left-to-
    /// right, top-to-bottom). `bottom` and `left` are supplied as drawn
    /// (right-to-left and bottom-to-top) and are reversed internally.
    pub fn new(
        top: &BoundaryCurve,
        right: &BoundaryCurve,
        bottom: &BoundaryCurve,
        left: &BoundaryCurve,
        width: u32,
        height: u32,
    ) -> Result<Self, SetupError> {
        for (name, curve) in [("top", top), ("right", right), ("bottom", bottom), ("left", left)] {
            if curve.is_empty() {
                return Err(SetupError::Geometry(format!("{name} boundary curve is empty")));
            }
        }
        if width == 0 || height == 0 {
            return Err(SetupError::Geometry(format!(
                "frame dimensions must be non-zero, got {width}x{height}"
            )));
        }

        let bottom_ltr = bottom.reversed();
        let left_ttb = left.reversed();

        let corners = [
            top.first(),      // TL
            top.last(),       // TR
            bottom_ltr.last(),  // BR
            bottom_ltr.first(), // BL
        ];

        for (name, a, b) in [
            ("top-left", corners[0], left_ttb.first()),
            ("top-right", corners[1], right.first()),
            ("bottom-right", corners[2], right.last()),
            ("bottom-left", corners[3], left_ttb.last()),
        ] {
            let gap = a.distance(&b);
            if gap > CORNER_MISMATCH_WARN_PX {
                log::warn!("adjacent boundary curves disagree at the {name} corner by {gap:.2} px");
            }
        }

        log::debug!(
            "screen patch corners: TL {:?} TR {:?} BR {:?} BL {:?}",
            corners[0], corners[1], corners[2], corners[3]
        );

        Ok(Self {
            top: ArcLengthIndex::new(top),
            right: ArcLengthIndex::new(right),
            bottom: ArcLengthIndex::new(&bottom_ltr),
            left: ArcLengthIndex::new(&left_ttb),
            corners,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Corner points in TL, TR, BR, BL order.
    pub fn corners(&self) -> &[Point2; 4] {
        &self.corners
    }

    /// The Coons blend at (u, v) ∈ [0,1]².
    pub fn interpolate(&self, u: f64, v: f64) -> Point2 {
        let c0 = self.top.interp(u);
        let c1 = self.bottom.interp(u);
        let d0 = self.left.interp(v);
        let d1 = self.right.interp(v);

        let uf = u as f32;
        let vf = v as f32;
        let [tl, tr, br, bl] = self.corners;
        let b = (1.0 - uf) * (1.0 - vf) * tl + uf * (1.0 - vf) * tr + uf * vf * br
            + (1.0 - uf) * vf * bl;

        (1.0 - vf) * c0 + vf * c1 + (1.0 - uf) * d0 + uf * d1 - b
    }

    /// Sample the closed pixel-space polygon of the parametric sub-rectangle
    /// [u0, u1] x [v0, v1], sweeping `samples` points per edge (>= 2).
    ///
    /// Edge order: top (u0→u1 at v0), right (v0→v1 at u1), bottom (u1→u0 at
    /// v1), left (v1→v0 at u0). Shared corner points are emitted once, so the
    /// result has 4·(samples − 1) vertices; the polygon closes implicitly.
    /// Every vertex is clamped into [0, width-1] x [0, height-1].
    pub fn build_cell_polygon(
        &self,
        u0: f64,
        u1: f64,
        v0: f64,
        v1: f64,
        samples: usize,
    ) -> Vec<PixelPoint> {
        let samples = samples.max(2);
        let mut poly = Vec::with_capacity(4 * (samples - 1));
        let du = (u1 - u0) / (samples - 1) as f64;
        let dv = (v1 - v0) / (samples - 1) as f64;

        // Top edge: u0 -> u1 at v0, both corners included.
        for i in 0..samples {
            poly.push(self.clamp_to_frame(self.interpolate(u0 + du * i as f64, v0)));
        }
        // Right edge: v0 -> v1 at u1, skipping the shared corner.
        for i in 1..samples {
            poly.push(self.clamp_to_frame(self.interpolate(u1, v0 + dv * i as f64)));
        }
        // Bottom edge: u1 -> u0 at v1, reversed.
        for i in 1..samples {
            poly.push(self.clamp_to_frame(self.interpolate(u1 - du * i as f64, v1)));
        }
        // Left edge: v1 -> v0 at u0, reversed, stopping short of the start point.
        for i in 1..samples - 1 {
            poly.push(self.clamp_to_frame(self.interpolate(u0, v1 - dv * i as f64)));
        }

        poly
    }

    fn clamp_to_frame(&self, p: Point2) -> PixelPoint {
        PixelPoint {
            x: p.x.clamp(0.0, (self.width - 1) as f32) as i32,
            y: p.y.clamp(0.0, (self.height - 1) as f32) as i32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::curve::curve::BoundaryCurve;

    const EPS: f32 = 1e-4;

    /// A straight-edged square patch with corners (0,0), (100,0), (100,100),
    /// (0,100), with bottom and left supplied in clockwise drawing direction.
    pub(crate) fn square_patch(size: f32, width: u32, height: u32) -> ScreenPatch {
        let line = |a: Point2, b: Point2| {
            BoundaryCurve::from_points(vec![a, a.lerp(&b, 0.5), b]).unwrap()
        };
        let tl = Point2::new(0.0, 0.0);
        let tr = Point2::new(size, 0.0);
        let br = Point2::new(size, size);
        let bl = Point2::new(0.0, size);
        ScreenPatch::new(
            &line(tl, tr), // top, L->R
            &line(tr, br), // right, T->B
            &line(br, bl), // bottom, R->L as drawn
            &line(bl, tl), // left, B->T as drawn
            width,
            height,
        )
        .unwrap()
    }

    fn assert_close(p: Point2, x: f32, y: f32) {
        assert!(
            (p.x - x).abs() < EPS && (p.y - y).abs() < EPS,
            "expected ({x}, {y}), got {p:?}"
        );
    }

    #[test]
    fn corners_are_exact() {
        let patch = square_patch(100.0, 200, 200);
        assert_close(patch.interpolate(0.0, 0.0), 0.0, 0.0);
        assert_close(patch.interpolate(1.0, 0.0), 100.0, 0.0);
        assert_close(patch.interpolate(1.0, 1.0), 100.0, 100.0);
        assert_close(patch.interpolate(0.0, 1.0), 0.0, 100.0);
    }

    #[test]
    fn square_patch_center_is_the_centroid() {
        let patch = square_patch(100.0, 200, 200);
        assert_close(patch.interpolate(0.5, 0.5), 50.0, 50.0);
    }

    #[test]
    fn unit_cell_polygon_with_two_samples_is_the_four_corners() {
        let patch = square_patch(100.0, 200, 200);
        let poly = patch.build_cell_polygon(0.0, 1.0, 0.0, 1.0, 2);
        assert_eq!(
            poly,
            vec![
                PixelPoint { x: 0, y: 0 },
                PixelPoint { x: 100, y: 0 },
                PixelPoint { x: 100, y: 100 },
                PixelPoint { x: 0, y: 100 },
            ]
        );
    }

    #[test]
    fn polygon_vertex_count_is_four_times_samples_minus_one() {
        let patch = square_patch(100.0, 200, 200);
        for samples in [2, 5, 15, 40] {
            let poly = patch.build_cell_polygon(0.1, 0.6, 0.2, 0.9, samples);
            assert_eq!(poly.len(), 4 * (samples - 1));
        }
    }

    #[test]
    fn polygon_vertices_stay_inside_the_frame() {
        // Frame smaller than the patch footprint: clamping must engage.
        let patch = square_patch(100.0, 80, 60);
        let poly = patch.build_cell_polygon(0.0, 1.0, 0.0, 1.0, 20);
        for p in poly {
            assert!(p.x >= 0 && p.x <= 79);
            assert!(p.y >= 0 && p.y <= 59);
        }
    }

    #[test]
    fn zero_frame_dimension_is_a_geometry_error() {
        let line = BoundaryCurve::from_points(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)])
            .unwrap();
        assert!(matches!(
            ScreenPatch::new(&line, &line, &line, &line, 0, 100),
            Err(SetupError::Geometry(_))
        ));
    }
}
