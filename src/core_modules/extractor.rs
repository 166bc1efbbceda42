// THEORY:
// The `extractor` module aggregates the pixels under one cell mask into a
// single representative color. It is the per-frame hot path: everything
// before it runs once per geometry, everything after it is a cheap per-LED
// transform. Two strategies exist:
//
// - **Mean**: the channel-wise integer-truncated average of every covered
//   pixel. The inner loop walks the mask in 16-pixel lane groups and skips a
//   whole group when none of its mask bytes are set — cells cover a small
//   curved region of a large bounding box, so most groups are empty. A scalar
//   tail handles the remainder. The grouped walk performs the same integer
//   arithmetic as the plain scalar walk, so both produce identical results;
//   `mean_color_scalar` is the reference the tests compare against.
//
// - **Dominant**: quantize each covered pixel to 3 bits per channel (512
//   bins), find the bin holding the most pixels, and return the unweighted
//   average of that bin's members. Ties go to the lowest bin index. Below 10
//   covered pixels the histogram is statistically meaningless and the
//   strategy falls back to the mean.
//
// Frames arrive in whatever channel order the capture device produces;
// accumulation happens in buffer order and the conversion to canonical RGB
// happens exactly once, on the final triplet.
//
// Extraction is pure and per-cell independent: it reads the shared frame and
// one mask, and returns one color. Any execution order (or thread) produces
// the same result.

use crate::core_modules::color::color::{ChannelOrder, Rgb};
use crate::core_modules::mask::CellMask;
use serde::{Deserialize, Serialize};

/// Width of a mask lane group in the accelerated mean path.
const LANES: usize = 16;

/// Minimum covered-pixel count for histogram binning to be trusted.
const MIN_DOMINANT_SAMPLES: usize = 10;

/// Channel quantization for the dominant-color histogram: 3 bits, 8 levels.
const QUANT_SHIFT: u8 = 5;
const BINS: usize = 512;

/// How the pixels under a mask become one color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStrategy {
    /// Channel-wise average of all covered pixels.
    Mean,
    /// Average of the most populated quantized-color bin.
    Dominant,
}

/// Extract one cell's color from a frame buffer (row-major, three bytes per
/// pixel in `order`). An empty or zero-coverage mask yields black.
pub fn extract_cell(
    strategy: ExtractionStrategy,
    frame: &[u8],
    frame_width: u32,
    order: ChannelOrder,
    mask: &CellMask,
) -> Rgb {
    match strategy {
        ExtractionStrategy::Mean => mean_color(frame, frame_width, order, mask),
        ExtractionStrategy::Dominant => dominant_color(frame, frame_width, order, mask),
    }
}

/// Accelerated mean: 16-pixel lane groups with an all-zero early exit and a
/// scalar tail. Identical integer arithmetic to `mean_color_scalar`.
pub fn mean_color(frame: &[u8], frame_width: u32, order: ChannelOrder, mask: &CellMask) -> Rgb {
    if mask.is_empty() {
        return Rgb::BLACK;
    }
    let bbox = mask.bbox;
    let row_len = bbox.width as usize;
    let mut sums = [0u64; 3];
    let mut count: u64 = 0;

    for row in 0..bbox.height as usize {
        let mask_row = &mask.data[row * row_len..(row + 1) * row_len];
        let base = ((bbox.y as usize + row) * frame_width as usize + bbox.x as usize) * 3;

        let mut x = 0;
        while x + LANES <= row_len {
            let group = &mask_row[x..x + LANES];
            if group.iter().all(|&m| m == 0) {
                x += LANES;
                continue;
            }
            for (j, &m) in group.iter().enumerate() {
                if m != 0 {
                    let p = base + (x + j) * 3;
                    sums[0] += frame[p] as u64;
                    sums[1] += frame[p + 1] as u64;
                    sums[2] += frame[p + 2] as u64;
                    count += 1;
                }
            }
            x += LANES;
        }
        for (j, &m) in mask_row.iter().enumerate().skip(x) {
            if m != 0 {
                let p = base + j * 3;
                sums[0] += frame[p] as u64;
                sums[1] += frame[p + 1] as u64;
                sums[2] += frame[p + 2] as u64;
                count += 1;
            }
        }
    }

    finish_mean(sums, count, order)
}

/// Plain scalar mean. Reference implementation for the accelerated path.
pub fn mean_color_scalar(
    frame: &[u8],
    frame_width: u32,
    order: ChannelOrder,
    mask: &CellMask,
) -> Rgb {
    if mask.is_empty() {
        return Rgb::BLACK;
    }
    let bbox = mask.bbox;
    let row_len = bbox.width as usize;
    let mut sums = [0u64; 3];
    let mut count: u64 = 0;

    for row in 0..bbox.height as usize {
        let mask_row = &mask.data[row * row_len..(row + 1) * row_len];
        let base = ((bbox.y as usize + row) * frame_width as usize + bbox.x as usize) * 3;
        for (j, &m) in mask_row.iter().enumerate() {
            if m != 0 {
                let p = base + j * 3;
                sums[0] += frame[p] as u64;
                sums[1] += frame[p + 1] as u64;
                sums[2] += frame[p + 2] as u64;
                count += 1;
            }
        }
    }

    finish_mean(sums, count, order)
}

fn finish_mean(sums: [u64; 3], count: u64, order: ChannelOrder) -> Rgb {
    if count == 0 {
        log::debug!("cell mask covers no pixels; sampling black");
        return Rgb::BLACK;
    }
    order.to_rgb(
        (sums[0] / count) as u8,
        (sums[1] / count) as u8,
        (sums[2] / count) as u8,
    )
}

/// Histogram-dominant color: 512 quantized bins, winner's unweighted average.
pub fn dominant_color(
    frame: &[u8],
    frame_width: u32,
    order: ChannelOrder,
    mask: &CellMask,
) -> Rgb {
    if mask.is_empty() {
        return Rgb::BLACK;
    }
    let bbox = mask.bbox;
    let row_len = bbox.width as usize;

    let mut bin_counts = vec![0u32; BINS];
    let mut bin_sums = vec![[0u64; 3]; BINS];
    let mut total: usize = 0;

    for row in 0..bbox.height as usize {
        let mask_row = &mask.data[row * row_len..(row + 1) * row_len];
        let base = ((bbox.y as usize + row) * frame_width as usize + bbox.x as usize) * 3;
        for (j, &m) in mask_row.iter().enumerate() {
            if m == 0 {
                continue;
            }
            let p = base + j * 3;
            let (c0, c1, c2) = (frame[p], frame[p + 1], frame[p + 2]);
            let bin = (((c0 >> QUANT_SHIFT) as usize) << 6)
                | (((c1 >> QUANT_SHIFT) as usize) << 3)
                | ((c2 >> QUANT_SHIFT) as usize);
            bin_counts[bin] += 1;
            bin_sums[bin][0] += c0 as u64;
            bin_sums[bin][1] += c1 as u64;
            bin_sums[bin][2] += c2 as u64;
            total += 1;
        }
    }

    if total == 0 {
        log::debug!("cell mask covers no pixels; sampling black");
        return Rgb::BLACK;
    }
    if total < MIN_DOMINANT_SAMPLES {
        // Too few samples for the histogram to mean anything; average instead.
        let mut sums = [0u64; 3];
        for bin in &bin_sums {
            sums[0] += bin[0];
            sums[1] += bin[1];
            sums[2] += bin[2];
        }
        return finish_mean(sums, total as u64, order);
    }

    // Strict `>` keeps the first-encountered (lowest) bin on ties.
    let mut best = 0;
    for (bin, &n) in bin_counts.iter().enumerate() {
        if n > bin_counts[best] {
            best = bin;
        }
    }

    let n = bin_counts[best] as u64;
    order.to_rgb(
        (bin_sums[best][0] / n) as u8,
        (bin_sums[best][1] / n) as u8,
        (bin_sums[best][2] / n) as u8,
    )
}
