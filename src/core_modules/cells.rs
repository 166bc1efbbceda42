// THEORY:
// The `cells` module slices the unit parametric square into the logical
// sampling regions — one per LED — and materializes each as a `Cell`: the
// parametric rectangle it covers, the curved pixel-space polygon the patch
// maps it to, and that polygon's bounding box. Cells are built once per
// geometry configuration and destroyed when the grid dimensions, slice
// counts, curves, or frame size change.
//
// Two slicing schemes exist:
// - **Grid**: rows × cols sub-rectangles covering the whole patch, row-major.
//   Used for LED matrix panels behind the screen.
// - **EdgeSlices**: shallow strips hugging each screen edge, for TV-backlight
//   strips. Coverage percentages control how deep into the screen each strip
//   reaches. Corner regions are intentionally covered by both a horizontal
//   and a vertical strip; the overlap softens corner transitions.
//
// Cell order for edge slices is a fixed generation order (top strips
// left-to-right, then bottom, then left, then right); mapping that order onto
// the physical LED strip is `layout.rs`'s job, not this module's.

use crate::core_modules::geometry::{PixelPoint, Rect};
use crate::core_modules::patch::ScreenPatch;
use crate::error::SetupError;
use serde::{Deserialize, Serialize};

/// How the parametric square is sliced into per-LED sampling regions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SamplingLayout {
    /// rows × cols full-coverage grid, row-major cell order.
    Grid { rows: u32, cols: u32 },
    /// Edge strips: `horizontal_slices` cells along each of the top and
    /// bottom edges, `vertical_slices` along each of the left and right
    /// edges. Coverage percentages give the strip depth into the screen.
    EdgeSlices {
        horizontal_slices: u32,
        vertical_slices: u32,
        horizontal_coverage_percent: f32,
        vertical_coverage_percent: f32,
    },
}

impl SamplingLayout {
    pub fn cell_count(&self) -> usize {
        match *self {
            SamplingLayout::Grid { rows, cols } => (rows * cols) as usize,
            SamplingLayout::EdgeSlices { horizontal_slices, vertical_slices, .. } => {
                2 * (horizontal_slices + vertical_slices) as usize
            }
        }
    }

    fn validate(&self) -> Result<(), SetupError> {
        match *self {
            SamplingLayout::Grid { rows, cols } => {
                if rows == 0 || cols == 0 {
                    return Err(SetupError::Geometry(format!(
                        "grid layout must be non-empty, got {rows}x{cols}"
                    )));
                }
            }
            SamplingLayout::EdgeSlices {
                horizontal_slices,
                vertical_slices,
                horizontal_coverage_percent,
                vertical_coverage_percent,
            } => {
                if horizontal_slices == 0 || vertical_slices == 0 {
                    return Err(SetupError::Geometry(
                        "edge-slice layout must have at least one slice per edge".into(),
                    ));
                }
                for (name, pct) in [
                    ("horizontal", horizontal_coverage_percent),
                    ("vertical", vertical_coverage_percent),
                ] {
                    if !(pct > 0.0 && pct <= 100.0) {
                        return Err(SetupError::Geometry(format!(
                            "{name} coverage must be in (0, 100], got {pct}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// The parametric rectangle a cell covers, in [0,1]².
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRect {
    pub u0: f64,
    pub u1: f64,
    pub v0: f64,
    pub v1: f64,
}

/// One logical sampling region: a parametric rectangle, its curved
/// pixel-space polygon, and the polygon's bounding box.
#[derive(Debug, Clone)]
pub struct Cell {
    /// Position in the layout's generation order.
    pub index: usize,
    /// The parametric sub-rectangle this cell covers.
    pub rect: ParamRect,
    /// Closed pixel-space outline, clamped to frame bounds.
    pub polygon: Vec<PixelPoint>,
    /// Tight bounding box of `polygon` (not yet intersected with the frame).
    pub bbox: Rect,
}

/// Build all cells for a layout over a patch. `polygon_samples` is the
/// per-edge sweep density passed to the polygon builder (typical 10-50;
/// higher follows curved boundaries more closely at higher setup cost).
pub fn build_cells(
    patch: &ScreenPatch,
    layout: &SamplingLayout,
    polygon_samples: usize,
) -> Result<Vec<Cell>, SetupError> {
    layout.validate()?;

    let mut rects = Vec::with_capacity(layout.cell_count());
    match *layout {
        SamplingLayout::Grid { rows, cols } => {
            for r in 0..rows {
                for c in 0..cols {
                    rects.push(ParamRect {
                        u0: c as f64 / cols as f64,
                        u1: (c + 1) as f64 / cols as f64,
                        v0: r as f64 / rows as f64,
                        v1: (r + 1) as f64 / rows as f64,
                    });
                }
            }
        }
        SamplingLayout::EdgeSlices {
            horizontal_slices,
            vertical_slices,
            horizontal_coverage_percent,
            vertical_coverage_percent,
        } => {
            let h_cov = (horizontal_coverage_percent / 100.0) as f64;
            let v_cov = (vertical_coverage_percent / 100.0) as f64;
            let h = horizontal_slices as f64;
            let v = vertical_slices as f64;

            // Top strips, left to right.
            for i in 0..horizontal_slices {
                rects.push(ParamRect {
                    u0: i as f64 / h,
                    u1: (i + 1) as f64 / h,
                    v0: 0.0,
                    v1: h_cov,
                });
            }
            // Bottom strips, left to right.
            for i in 0..horizontal_slices {
                rects.push(ParamRect {
                    u0: i as f64 / h,
                    u1: (i + 1) as f64 / h,
                    v0: 1.0 - h_cov,
                    v1: 1.0,
                });
            }
            // Left strips, top to bottom (full height, overlapping corners).
            for i in 0..vertical_slices {
                rects.push(ParamRect {
                    u0: 0.0,
                    u1: v_cov,
                    v0: i as f64 / v,
                    v1: (i + 1) as f64 / v,
                });
            }
            // Right strips, top to bottom.
            for i in 0..vertical_slices {
                rects.push(ParamRect {
                    u0: 1.0 - v_cov,
                    u1: 1.0,
                    v0: i as f64 / v,
                    v1: (i + 1) as f64 / v,
                });
            }
        }
    }

    let cells = rects
        .into_iter()
        .enumerate()
        .map(|(index, rect)| {
            let polygon =
                patch.build_cell_polygon(rect.u0, rect.u1, rect.v0, rect.v1, polygon_samples);
            let bbox = Rect::bounding(&polygon);
            Cell { index, rect, polygon, bbox }
        })
        .collect();

    log::debug!("built {} cell polygons ({:?})", layout.cell_count(), layout);
    Ok(cells)
}
