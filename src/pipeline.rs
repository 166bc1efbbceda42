// THEORY:
// The `pipeline` module is the final, top-level API for the entire engine.
// It encapsulates the full stack into a single, easy-to-use interface with a
// strict two-phase lifecycle:
//
// - **Setup** (`LedPipeline::new`): parse the four boundary-curve
//   descriptions, optionally fit them into the frame, build the Coons patch,
//   slice it into cells, rasterize every cell mask, and resolve the LED
//   ordering and per-LED gamma exponents. Runs once per geometry
//   configuration; any failure aborts with a `SetupError` and no pipeline.
//
// - **Steady state** (`process_frame`): per frame, aggregate the pixels
//   under each cached mask into one color, reorder cell colors into LED
//   order, and gamma-correct. This phase never fails: invalid cells sample
//   black, a stale mask cache falls back to per-call rasterization for that
//   frame, and the caller always receives a full-length output array.
//
// The engine performs no I/O. Frames come from a capture collaborator,
// colors go to a transmission collaborator; both live outside this crate.

use crate::core_modules::cells::{self, Cell, SamplingLayout};
use crate::core_modules::color::color::{ChannelOrder, Rgb};
use crate::core_modules::curve::curve::{self, BoundaryCurve};
use crate::core_modules::extractor::{self, ExtractionStrategy};
use crate::core_modules::gamma::{GammaBlender, GammaProfile};
use crate::core_modules::layout::{Direction, LedLayout, StartCorner};
use crate::core_modules::mask::{CellMask, MaskCache};
use crate::core_modules::patch::ScreenPatch;
use crate::error::SetupError;
use serde::{Deserialize, Serialize};

const DEFAULT_CURVE_SAMPLES: usize = 50;
const DEFAULT_POLYGON_SAMPLES: usize = 15;

fn default_curve_samples() -> usize {
    DEFAULT_CURVE_SAMPLES
}

fn default_polygon_samples() -> usize {
    DEFAULT_POLYGON_SAMPLES
}

fn default_scale_factor() -> f32 {
    1.0
}

fn default_strategy() -> ExtractionStrategy {
    ExtractionStrategy::Mean
}

fn default_channel_order() -> ChannelOrder {
    ChannelOrder::Bgr
}

fn default_start_corner() -> StartCorner {
    StartCorner::TopLeft
}

fn default_direction() -> Direction {
    Direction::Clockwise
}

/// Configuration for the LedPipeline. The configuration collaborator
/// deserializes this from whatever format it likes; the engine only sees
/// the struct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// SVG-style cubic descriptions (`M x y C x1 y1 x2 y2 x3 y3`), one per
    /// screen edge, drawn clockwise around the perimeter: top left-to-right,
    /// right top-to-bottom, bottom right-to-left, left bottom-to-top.
    pub top_curve: String,
    pub right_curve: String,
    pub bottom_curve: String,
    pub left_curve: String,
    /// Points sampled per boundary curve.
    #[serde(default = "default_curve_samples")]
    pub curve_samples: usize,
    /// Points swept per cell-polygon edge. Higher follows curved boundaries
    /// more closely at higher setup cost (typical 10-50).
    #[serde(default = "default_polygon_samples")]
    pub polygon_samples: usize,
    /// When set, scale the calibration curves and center them in the frame.
    /// Leave unset for curves already in frame pixel coordinates.
    #[serde(default)]
    pub fit_curves: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f32,
    pub layout: SamplingLayout,
    #[serde(default = "default_strategy")]
    pub strategy: ExtractionStrategy,
    /// Channel order of incoming frame buffers, as the capture device
    /// documents it.
    #[serde(default = "default_channel_order")]
    pub channel_order: ChannelOrder,
    /// Wiring of edge strips: where LED 0 sits and which way indices run.
    /// Ignored for grid layouts.
    #[serde(default = "default_start_corner")]
    pub start_corner: StartCorner,
    #[serde(default = "default_direction")]
    pub direction: Direction,
    /// Optional eight-anchor gamma profile; absent means no correction.
    #[serde(default)]
    pub gamma: Option<GammaProfile>,
}

/// The main, top-level struct for the engine. Immutable after setup, so a
/// single instance can serve any number of concurrent extraction calls.
#[derive(Debug)]
pub struct LedPipeline {
    config: PipelineConfig,
    patch: ScreenPatch,
    cells: Vec<Cell>,
    masks: MaskCache,
    layout: LedLayout,
    blender: GammaBlender,
}

impl LedPipeline {
    /// Run the whole setup phase. Any failure aborts setup; no partial
    /// pipeline is ever returned.
    pub fn new(config: PipelineConfig) -> Result<Self, SetupError> {
        let samples = config.curve_samples;
        let mut top = parse_edge("top", &config.top_curve, samples)?;
        let mut right = parse_edge("right", &config.right_curve, samples)?;
        let mut bottom = parse_edge("bottom", &config.bottom_curve, samples)?;
        let mut left = parse_edge("left", &config.left_curve, samples)?;

        if config.fit_curves {
            let mut all = [top, right, bottom, left];
            curve::fit_to_frame(
                &mut all,
                config.scale_factor,
                config.frame_width,
                config.frame_height,
            );
            [top, right, bottom, left] = all;
        }

        let patch = ScreenPatch::new(
            &top,
            &right,
            &bottom,
            &left,
            config.frame_width,
            config.frame_height,
        )?;

        let cells = cells::build_cells(&patch, &config.layout, config.polygon_samples)?;
        let masks = MaskCache::precompute(&cells, config.frame_width, config.frame_height);

        let layout = match config.layout {
            SamplingLayout::Grid { rows, cols } => LedLayout::grid(rows, cols),
            SamplingLayout::EdgeSlices { horizontal_slices, vertical_slices, .. } => {
                LedLayout::edge(
                    horizontal_slices,
                    vertical_slices,
                    horizontal_slices,
                    vertical_slices,
                    config.start_corner,
                    config.direction,
                )
            }
        };
        debug_assert_eq!(layout.total(), cells.len());

        let blender = match &config.gamma {
            Some(profile) => GammaBlender::new(profile, &layout),
            None => GammaBlender::disabled(),
        };

        log::info!(
            "pipeline ready: {} cells, {} LEDs, {:?} extraction, gamma {}",
            cells.len(),
            layout.total(),
            config.strategy,
            if blender.is_enabled() { "on" } else { "off" }
        );

        Ok(Self { config, patch, cells, masks, layout, blender })
    }

    /// Extract one frame. `frame` is row-major, three bytes per pixel in the
    /// configured channel order, `frame_width * frame_height` pixels.
    ///
    /// Never fails: a malformed frame or degraded cell yields black samples,
    /// and the result always has `total_leds()` entries in LED order.
    pub fn process_frame(&self, frame: &[u8]) -> Vec<Rgb> {
        if !self.frame_is_valid(frame) {
            return vec![Rgb::BLACK; self.layout.total()];
        }
        let cell_colors = self.extract_range(frame, 0, self.cells.len());
        self.finalize(cell_colors)
    }

    /// Extract a contiguous range of cells, in cell order. Reads only the
    /// shared frame and the per-cell masks, so disjoint ranges can run
    /// concurrently.
    pub(crate) fn extract_range(&self, frame: &[u8], start: usize, end: usize) -> Vec<Rgb> {
        let cached = self.masks.matches(self.cells.len());
        if !cached {
            log::warn!(
                "mask cache holds {} masks for {} cells; rasterizing on the fly this frame",
                self.masks.len(),
                self.cells.len()
            );
        }
        (start..end)
            .map(|i| {
                if cached {
                    extractor::extract_cell(
                        self.config.strategy,
                        frame,
                        self.config.frame_width,
                        self.config.channel_order,
                        self.masks.mask_for(i),
                    )
                } else {
                    let mask = CellMask::rasterize(&self.cells[i].polygon, self.masks.frame());
                    extractor::extract_cell(
                        self.config.strategy,
                        frame,
                        self.config.frame_width,
                        self.config.channel_order,
                        &mask,
                    )
                }
            })
            .collect()
    }

    /// Reorder cell colors into LED order and gamma-correct.
    pub(crate) fn finalize(&self, cell_colors: Vec<Rgb>) -> Vec<Rgb> {
        let mut output: Vec<Rgb> =
            self.layout.led_order().iter().map(|&cell| cell_colors[cell]).collect();
        self.blender.apply(&mut output);
        output
    }

    pub(crate) fn frame_is_valid(&self, frame: &[u8]) -> bool {
        let expected = self.config.frame_width as usize * self.config.frame_height as usize * 3;
        if frame.len() < expected {
            log::error!(
                "frame buffer holds {} bytes, expected {expected}; emitting black",
                frame.len()
            );
            return false;
        }
        true
    }

    pub fn total_leds(&self) -> usize {
        self.layout.total()
    }

    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn patch(&self) -> &ScreenPatch {
        &self.patch
    }

    /// Read-only cell geometry, for external debug renderers.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Read-only coverage masks, for external debug renderers.
    pub fn masks(&self) -> &MaskCache {
        &self.masks
    }

    pub fn layout(&self) -> &LedLayout {
        &self.layout
    }
}

fn parse_edge(
    edge: &'static str,
    description: &str,
    samples: usize,
) -> Result<BoundaryCurve, SetupError> {
    BoundaryCurve::parse(description, samples).map_err(|err| match err {
        SetupError::Format(reason) => SetupError::Format(format!("{edge} curve: {reason}")),
        other => other,
    })
}
