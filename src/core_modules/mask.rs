// THEORY:
// The `mask` module converts each cell's curved polygon into a binary
// coverage mask: one byte per pixel of the polygon's bounding box, 255 where
// the pixel center falls inside the polygon. Rasterization is the classic
// even-odd scanline fill — intersect each row's center line with every
// polygon edge, sort the crossings, fill between alternate pairs.
//
// Key architectural principles:
// 1.  **One-time cost per geometry**: masks depend only on the cell polygons
//     and the frame rectangle, so `MaskCache::precompute` runs once at setup
//     and every frame reuses the result. Extraction must never rasterize if a
//     valid cache exists.
// 2.  **Degradation, not failure**: a polygon whose bounding box misses the
//     frame entirely gets an empty mask. Extraction over an empty mask yields
//     black for that one cell; the frame as a whole still succeeds.
// 3.  **Bounding-box-local storage**: masks are sized to the (frame-clipped)
//     bounding box, not the frame, keeping the per-cell memory and the
//     per-frame scan proportional to the cell area.

use crate::core_modules::cells::Cell;
use crate::core_modules::geometry::{PixelPoint, Rect};

/// Mask byte for a covered pixel.
const COVERED: u8 = 255;

/// A binary coverage mask over a cell's frame-clipped bounding box.
#[derive(Debug, Clone)]
pub struct CellMask {
    /// The polygon bounding box intersected with the frame rectangle.
    /// May be empty, in which case `data` is empty too.
    pub bbox: Rect,
    /// Row-major bytes, `bbox.area()` long; 255 = covered, 0 = outside.
    pub data: Vec<u8>,
}

impl CellMask {
    /// Rasterize a closed polygon, clipped to `frame`.
    pub fn rasterize(polygon: &[PixelPoint], frame: &Rect) -> CellMask {
        let bbox = Rect::bounding(polygon).intersect(frame);
        if bbox.is_empty() || polygon.len() < 3 {
            return CellMask { bbox: Rect::new(bbox.x, bbox.y, 0, 0), data: Vec::new() };
        }

        let mut data = vec![0u8; bbox.area()];
        let mut crossings: Vec<f64> = Vec::with_capacity(8);

        for row in 0..bbox.height {
            // Sample at the pixel center of this row.
            let yc = (bbox.y + row) as f64 + 0.5;
            crossings.clear();

            for i in 0..polygon.len() {
                let a = polygon[i];
                let b = polygon[(i + 1) % polygon.len()];
                let (ya, yb) = (a.y as f64, b.y as f64);
                if ya == yb {
                    continue;
                }
                // Half-open span [min, max) so shared vertices count once.
                if (yc >= ya.min(yb)) && (yc < ya.max(yb)) {
                    let w = (yc - ya) / (yb - ya);
                    crossings.push(a.x as f64 + w * (b.x as f64 - a.x as f64));
                }
            }

            crossings.sort_by(|p, q| p.partial_cmp(q).unwrap());

            for pair in crossings.chunks_exact(2) {
                let (x_enter, x_exit) = (pair[0], pair[1]);
                // Covered pixels are those whose center lies inside the span.
                let first = (x_enter - 0.5).ceil().max(bbox.x as f64) as i32;
                let last = ((x_exit - 0.5).floor() as i32).min(bbox.x + bbox.width - 1);
                for x in first..=last {
                    if x >= bbox.x {
                        data[(row * bbox.width + (x - bbox.x)) as usize] = COVERED;
                    }
                }
            }
        }

        CellMask { bbox, data }
    }

    pub fn is_empty(&self) -> bool {
        self.bbox.is_empty()
    }

    /// Number of covered pixels.
    pub fn coverage(&self) -> usize {
        self.data.iter().filter(|&&m| m != 0).count()
    }
}

/// Per-geometry cache of every cell's coverage mask.
///
/// Rebuilt whenever cell polygons change (new curves, new frame size, new
/// layout). If the cache size disagrees with the current cell count,
/// extraction falls back to per-call rasterization for that frame only.
#[derive(Debug, Clone)]
pub struct MaskCache {
    masks: Vec<CellMask>,
    frame: Rect,
}

impl MaskCache {
    pub fn precompute(cells: &[Cell], frame_width: u32, frame_height: u32) -> MaskCache {
        let frame = Rect::new(0, 0, frame_width as i32, frame_height as i32);
        let masks: Vec<CellMask> = cells
            .iter()
            .map(|cell| {
                let mask = CellMask::rasterize(&cell.polygon, &frame);
                if mask.is_empty() {
                    log::warn!(
                        "cell {} lies outside the {}x{} frame; it will sample black",
                        cell.index, frame_width, frame_height
                    );
                }
                mask
            })
            .collect();
        log::debug!("precomputed {} cell masks", masks.len());
        MaskCache { masks, frame }
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// True when the cache was built for exactly `cell_count` cells.
    pub fn matches(&self, cell_count: usize) -> bool {
        self.masks.len() == cell_count
    }

    pub fn frame(&self) -> &Rect {
        &self.frame
    }

    pub fn masks(&self) -> &[CellMask] {
        &self.masks
    }

    pub fn mask_for(&self, cell_index: usize) -> &CellMask {
        &self.masks[cell_index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<PixelPoint> {
        vec![
            PixelPoint { x: x0, y: y0 },
            PixelPoint { x: x1, y: y0 },
            PixelPoint { x: x1, y: y1 },
            PixelPoint { x: x0, y: y1 },
        ]
    }

    #[test]
    fn axis_aligned_square_fills_its_interior() {
        let frame = Rect::new(0, 0, 100, 100);
        let mask = CellMask::rasterize(&square(10, 10, 20, 20), &frame);
        assert_eq!(mask.bbox, Rect::new(10, 10, 11, 11));
        // Pixel centers in [10, 20) x [10, 20) are covered: a 10x10 block.
        assert_eq!(mask.coverage(), 100);
        // Corner pixel (10, 10) covered, (20, 20) outside the half-open span.
        assert_eq!(mask.data[0], 255);
        assert_eq!(mask.data[mask.data.len() - 1], 0);
    }

    #[test]
    fn triangle_covers_about_half_its_bbox() {
        let frame = Rect::new(0, 0, 100, 100);
        let tri = vec![
            PixelPoint { x: 0, y: 0 },
            PixelPoint { x: 40, y: 0 },
            PixelPoint { x: 0, y: 40 },
        ];
        let mask = CellMask::rasterize(&tri, &frame);
        let half = (40 * 40) / 2;
        let coverage = mask.coverage() as i32;
        assert!((coverage - half).abs() < 40, "coverage {coverage} vs {half}");
    }

    #[test]
    fn polygon_outside_the_frame_yields_an_empty_mask() {
        let frame = Rect::new(0, 0, 50, 50);
        let mask = CellMask::rasterize(&square(60, 60, 80, 80), &frame);
        assert!(mask.is_empty());
        assert_eq!(mask.coverage(), 0);
    }

    #[test]
    fn degenerate_polygon_yields_zero_coverage() {
        let frame = Rect::new(0, 0, 50, 50);
        let line = vec![
            PixelPoint { x: 5, y: 5 },
            PixelPoint { x: 30, y: 5 },
            PixelPoint { x: 17, y: 5 },
        ];
        let mask = CellMask::rasterize(&line, &frame);
        assert_eq!(mask.coverage(), 0);
    }

    #[test]
    fn cache_reports_size_mismatches() {
        let cache = MaskCache { masks: Vec::new(), frame: Rect::new(0, 0, 10, 10) };
        assert!(cache.matches(0));
        assert!(!cache.matches(3));
    }
}
