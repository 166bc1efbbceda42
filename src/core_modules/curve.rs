// THEORY:
// The `curve` module turns a textual screen-boundary description into a
// `BoundaryCurve`: an ordered polyline of 2D points along one physical edge
// of the photographed screen. Boundary descriptions use the SVG path
// vocabulary the calibration tooling exports — one absolute move directive
// (`M x y`) naming the start point and one cubic directive
// (`C x1 y1 x2 y2 x3 y3`) naming the two control points and the end point.
//
// Key architectural principles:
// 1.  **Sample once, query forever**: the cubic is evaluated at N uniform
//     parameter values during setup and never again. Everything downstream
//     (arc-length indexing, Coons blending) works on the polyline.
// 2.  **All-or-nothing parsing**: a malformed description produces an error
//     and no points. There is no partially parsed curve.
// 3.  **Placement is separate from shape**: the calibration coordinates are
//     usually not in frame pixels, so curves support scale / translate /
//     clamp, plus a joint fit that places all four edges inside a frame.

pub mod curve {
    use crate::core_modules::geometry::Point2;
    use crate::error::SetupError;
    use regex::Regex;
    use std::sync::OnceLock;

    fn move_directive() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| Regex::new(r"M\s*([\d.eE+-]+)[\s,]+([\d.eE+-]+)").unwrap())
    }

    fn cubic_directive() -> &'static Regex {
        static RE: OnceLock<Regex> = OnceLock::new();
        RE.get_or_init(|| {
            Regex::new(
                r"C\s*([\d.eE+-]+)[\s,]+([\d.eE+-]+)[\s,]+([\d.eE+-]+)[\s,]+([\d.eE+-]+)[\s,]+([\d.eE+-]+)[\s,]+([\d.eE+-]+)",
            )
            .unwrap()
        })
    }

    fn coord(token: &str) -> Result<f32, SetupError> {
        token
            .parse::<f32>()
            .map_err(|_| SetupError::Format(format!("coordinate token `{token}` is not numeric")))
    }

    /// An ordered, immutable-after-setup sequence of points along one screen
    /// edge, monotonic in the edge's travel direction.
    #[derive(Debug, Clone, PartialEq)]
    pub struct BoundaryCurve {
        points: Vec<Point2>,
    }

    impl BoundaryCurve {
        /// Parse a single cubic curve description and sample it at `samples`
        /// uniform parameter values (`samples` >= 2, so both endpoints are
        /// always present).
        ///
        /// The blend is the standard cubic Bernstein form:
        /// P(t) = (1-t)³·P0 + 3(1-t)²t·P1 + 3(1-t)t²·P2 + t³·P3
        pub fn parse(description: &str, samples: usize) -> Result<Self, SetupError> {
            if samples < 2 {
                return Err(SetupError::Geometry(format!(
                    "curve sample count must be at least 2, got {samples}"
                )));
            }

            let m = move_directive()
                .captures(description)
                .ok_or_else(|| SetupError::Format("move directive (M) not found".into()))?;
            let p0 = Point2::new(coord(&m[1])?, coord(&m[2])?);

            let c = cubic_directive()
                .captures(description)
                .ok_or_else(|| SetupError::Format("cubic directive (C) not found".into()))?;
            let p1 = Point2::new(coord(&c[1])?, coord(&c[2])?);
            let p2 = Point2::new(coord(&c[3])?, coord(&c[4])?);
            let p3 = Point2::new(coord(&c[5])?, coord(&c[6])?);

            let mut points = Vec::with_capacity(samples);
            for i in 0..samples {
                let t = i as f32 / (samples - 1) as f32;
                let s = 1.0 - t;
                let b0 = s * s * s;
                let b1 = 3.0 * s * s * t;
                let b2 = 3.0 * s * t * t;
                let b3 = t * t * t;
                points.push(b0 * p0 + b1 * p1 + b2 * p2 + b3 * p3);
            }

            Ok(Self { points })
        }

        /// Build a curve directly from points. Used by tests and by callers
        /// that already have a polyline (e.g. straight screen edges).
        pub fn from_points(points: Vec<Point2>) -> Result<Self, SetupError> {
            if points.is_empty() {
                return Err(SetupError::Geometry("boundary curve has no points".into()));
            }
            Ok(Self { points })
        }

        pub fn points(&self) -> &[Point2] {
            &self.points
        }

        pub fn len(&self) -> usize {
            self.points.len()
        }

        pub fn is_empty(&self) -> bool {
            self.points.is_empty()
        }

        pub fn first(&self) -> Point2 {
            self.points[0]
        }

        pub fn last(&self) -> Point2 {
            self.points[self.points.len() - 1]
        }

        /// The same polyline with its travel direction flipped.
        pub fn reversed(&self) -> BoundaryCurve {
            let mut points = self.points.clone();
            points.reverse();
            BoundaryCurve { points }
        }

        pub fn scale(&mut self, factor: f32) {
            for p in &mut self.points {
                p.x *= factor;
                p.y *= factor;
            }
        }

        pub fn translate(&mut self, dx: f32, dy: f32) {
            for p in &mut self.points {
                p.x += dx;
                p.y += dy;
            }
        }

        pub fn clamp(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32) {
            for p in &mut self.points {
                p.x = p.x.clamp(min_x, max_x);
                p.y = p.y.clamp(min_y, max_y);
            }
        }
    }

    /// Place a set of calibration curves inside a frame: scale by
    /// `scale_factor`, center the joint bounding box of all curves in the
    /// frame, then clamp every point into `[0, width-1] x [0, height-1]`.
    pub fn fit_to_frame(curves: &mut [BoundaryCurve], scale_factor: f32, width: u32, height: u32) {
        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;
        for curve in curves.iter() {
            for p in curve.points() {
                min_x = min_x.min(p.x);
                max_x = max_x.max(p.x);
                min_y = min_y.min(p.y);
                max_y = max_y.max(p.y);
            }
        }

        let scaled_width = (max_x - min_x) * scale_factor;
        let scaled_height = (max_y - min_y) * scale_factor;
        let offset_x = (0.0f32).max((width as f32 - scaled_width) / 2.0 - min_x * scale_factor);
        let offset_y = (0.0f32).max((height as f32 - scaled_height) / 2.0 - min_y * scale_factor);

        for curve in curves.iter_mut() {
            curve.scale(scale_factor);
            curve.translate(offset_x, offset_y);
            curve.clamp(0.0, (width - 1) as f32, 0.0, (height - 1) as f32);
        }
    }
}
