// THEORY:
// The `gamma` module corrects for the fact that LEDs at different positions
// behind a screen bezel are viewed through different amounts of diffuser and
// ambient spill — a single global gamma exponent over- or under-corrects
// somewhere. Instead, eight named anchor positions around the perimeter
// (four corners, four edge centers) each carry a per-channel gamma exponent,
// and every LED gets a *blended* exponent interpolated from the four anchors
// nearest to it along the perimeter.
//
// Blending uses inverse-distance weights, w = 1 / (distance + 1), normalized
// to sum to one. An LED sitting exactly on an anchor is dominated by it; an
// LED halfway between two anchors splits the difference. Distances are
// measured along the perimeter (wrapping), in LED units.
//
// The correction itself is `out = round(255 · (in/255)^(1/γ))` per channel.
// The blended exponent is continuous across the strip, so a single 256-entry
// lookup table cannot serve every LED; instead the per-LED exponents are
// resolved once at setup and the `powf` runs per LED per frame. A strip has
// hundreds of LEDs, not millions of pixels — this is nowhere near the hot
// path.
//
// Grid layouts have no meaningful perimeter, so the blender applies the
// unweighted average of the eight anchors uniformly.

use crate::core_modules::color::color::Rgb;
use crate::core_modules::layout::LedLayout;
use serde::{Deserialize, Serialize};

/// Exponent applied when an anchor is left unconfigured.
pub const DEFAULT_GAMMA: f32 = 2.2;

/// How many anchors contribute to each LED's blended exponent.
const BLEND_NEIGHBORS: usize = 4;

/// The eight named perimeter positions an anchor can occupy, clockwise from
/// the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPosition {
    TopLeft,
    TopCenter,
    TopRight,
    RightCenter,
    BottomRight,
    BottomCenter,
    BottomLeft,
    LeftCenter,
}

impl AnchorPosition {
    pub const ALL: [AnchorPosition; 8] = [
        AnchorPosition::TopLeft,
        AnchorPosition::TopCenter,
        AnchorPosition::TopRight,
        AnchorPosition::RightCenter,
        AnchorPosition::BottomRight,
        AnchorPosition::BottomCenter,
        AnchorPosition::BottomLeft,
        AnchorPosition::LeftCenter,
    ];

    /// The clockwise-from-top-left perimeter coordinate of this anchor, in
    /// LED units, for the given per-edge counts.
    fn coordinate(self, top: f64, right: f64, bottom: f64, left: f64) -> f64 {
        match self {
            AnchorPosition::TopLeft => 0.0,
            AnchorPosition::TopCenter => top / 2.0,
            AnchorPosition::TopRight => top,
            AnchorPosition::RightCenter => top + right / 2.0,
            AnchorPosition::BottomRight => top + right,
            AnchorPosition::BottomCenter => top + right + bottom / 2.0,
            AnchorPosition::BottomLeft => top + right + bottom,
            AnchorPosition::LeftCenter => top + right + bottom + left / 2.0,
        }
    }
}

/// One anchor: a named perimeter position with per-channel gamma exponents
/// in red, green, blue order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaAnchor {
    pub position: AnchorPosition,
    pub gamma: [f32; 3],
}

/// A full eight-anchor gamma profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaProfile {
    anchors: [GammaAnchor; 8],
}

impl Default for GammaProfile {
    fn default() -> Self {
        Self {
            anchors: AnchorPosition::ALL
                .map(|position| GammaAnchor { position, gamma: [DEFAULT_GAMMA; 3] }),
        }
    }
}

impl GammaProfile {
    /// Replace one anchor's exponents; the other seven keep their values.
    pub fn with_anchor(mut self, position: AnchorPosition, gamma: [f32; 3]) -> Self {
        for anchor in &mut self.anchors {
            if anchor.position == position {
                anchor.gamma = gamma;
            }
        }
        self
    }

    pub fn anchors(&self) -> &[GammaAnchor; 8] {
        &self.anchors
    }

    /// A 256-entry correction table for a single anchor's exponent. Only
    /// valid for that one exponent — diagnostics use, never the applied
    /// path, which blends a continuous exponent per LED.
    pub fn anchor_table(&self, position: AnchorPosition, channel: usize) -> [u8; 256] {
        let gamma = self
            .anchors
            .iter()
            .find(|a| a.position == position)
            .map(|a| a.gamma[channel])
            .unwrap_or(DEFAULT_GAMMA);
        let mut table = [0u8; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = correct_channel(i as u8, gamma);
        }
        table
    }
}

fn correct_channel(value: u8, gamma: f32) -> u8 {
    let normalized = value as f32 / 255.0;
    (255.0 * normalized.powf(1.0 / gamma)).round().clamp(0.0, 255.0) as u8
}

/// Per-LED spatially blended gamma correction. Built once per geometry,
/// applied to every frame's output array.
#[derive(Debug, Clone)]
pub struct GammaBlender {
    /// One blended exponent triplet per LED; `None` when disabled.
    exponents: Option<Vec<[f32; 3]>>,
}

impl GammaBlender {
    /// A blender that passes colors through unchanged.
    pub fn disabled() -> Self {
        Self { exponents: None }
    }

    pub fn new(profile: &GammaProfile, layout: &LedLayout) -> Self {
        let total = layout.total();
        let exponents = match layout.edge_counts() {
            Some((top, right, bottom, left)) => {
                let (t, r, b, l) = (top as f64, right as f64, bottom as f64, left as f64);
                let perimeter = t + r + b + l;
                let anchor_coords: Vec<f64> = profile
                    .anchors
                    .iter()
                    .map(|a| a.position.coordinate(t, r, b, l))
                    .collect();

                (0..total)
                    .map(|led| {
                        // The layout's coordinate is defined for every LED of
                        // an edge layout.
                        let pos = layout.perimeter_coordinate(led).unwrap_or(0.0);
                        blend_at(pos, perimeter, &anchor_coords, &profile.anchors)
                    })
                    .collect()
            }
            // No perimeter to measure along: flat average of all anchors.
            None => {
                let mut mean = [0.0f32; 3];
                for anchor in &profile.anchors {
                    for c in 0..3 {
                        mean[c] += anchor.gamma[c] / 8.0;
                    }
                }
                vec![mean; total]
            }
        };
        Self { exponents: Some(exponents) }
    }

    pub fn is_enabled(&self) -> bool {
        self.exponents.is_some()
    }

    /// The blended exponent triplet for one LED, if enabled.
    pub fn exponent_for(&self, led: usize) -> Option<[f32; 3]> {
        self.exponents.as_ref().map(|e| e[led])
    }

    /// Correct an output array in place, one LED per slot.
    pub fn apply(&self, colors: &mut [Rgb]) {
        let Some(exponents) = &self.exponents else {
            return;
        };
        for (color, gamma) in colors.iter_mut().zip(exponents) {
            color.red = correct_channel(color.red, gamma[0]);
            color.green = correct_channel(color.green, gamma[1]);
            color.blue = correct_channel(color.blue, gamma[2]);
        }
    }
}

/// Blend the anchor exponents at one perimeter position: inverse-distance
/// weights over the `BLEND_NEIGHBORS` nearest anchors, normalized to 1.
fn blend_at(
    pos: f64,
    perimeter: f64,
    anchor_coords: &[f64],
    anchors: &[GammaAnchor; 8],
) -> [f32; 3] {
    let mut distances: Vec<(usize, f64)> = anchor_coords
        .iter()
        .enumerate()
        .map(|(i, &coord)| {
            let direct = (pos - coord).abs();
            (i, direct.min(perimeter - direct))
        })
        .collect();
    distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());

    let nearest = &distances[..BLEND_NEIGHBORS.min(distances.len())];
    let weights: Vec<f64> = nearest.iter().map(|&(_, d)| 1.0 / (d + 1.0)).collect();
    let norm: f64 = weights.iter().sum();

    let mut blended = [0.0f32; 3];
    for (&(anchor, _), &w) in nearest.iter().zip(&weights) {
        let w = (w / norm) as f32;
        for c in 0..3 {
            blended[c] += w * anchors[anchor].gamma[c];
        }
    }
    blended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::layout::LedLayout;

    #[test]
    fn led_on_an_anchor_gets_that_anchor_gamma() {
        // Long edges keep the other anchors far away, so the on-anchor
        // weight dominates.
        let layout = LedLayout::edge_clockwise(100, 100, 100, 100);
        let profile = GammaProfile::default()
            .with_anchor(AnchorPosition::TopCenter, [3.0, 3.0, 3.0]);
        let blender = GammaBlender::new(&profile, &layout);

        // LED 50 sits exactly on the top-center anchor (coordinate 50).
        let gamma = blender.exponent_for(50).unwrap();
        for c in gamma {
            assert!((c - 3.0).abs() < 0.1, "blended gamma {c} too far from 3.0");
        }
        // A corner LED is unaffected within tolerance.
        let corner = blender.exponent_for(0).unwrap();
        for c in corner {
            assert!((c - DEFAULT_GAMMA).abs() < 0.1);
        }
    }

    #[test]
    fn uniform_profile_blends_to_the_same_exponent_everywhere() {
        let layout = LedLayout::edge_clockwise(10, 5, 10, 5);
        let blender = GammaBlender::new(&GammaProfile::default(), &layout);
        for led in 0..layout.total() {
            let gamma = blender.exponent_for(led).unwrap();
            for c in gamma {
                assert!((c - DEFAULT_GAMMA).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn disabled_blender_passes_colors_through() {
        let mut colors = vec![Rgb::new(10, 128, 250); 4];
        GammaBlender::disabled().apply(&mut colors);
        assert_eq!(colors, vec![Rgb::new(10, 128, 250); 4]);
    }

    #[test]
    fn correction_brightens_midtones_and_fixes_the_extremes() {
        // gamma 2.2 lifts midtones; 0 and 255 are fixed points.
        assert_eq!(correct_channel(0, 2.2), 0);
        assert_eq!(correct_channel(255, 2.2), 255);
        assert!(correct_channel(64, 2.2) > 64);
    }

    #[test]
    fn grid_layouts_use_the_anchor_average() {
        let layout = LedLayout::grid(2, 3);
        let profile = GammaProfile::default()
            .with_anchor(AnchorPosition::TopLeft, [1.0, 1.0, 1.0]);
        let blender = GammaBlender::new(&profile, &layout);
        let expected = (7.0 * DEFAULT_GAMMA + 1.0) / 8.0;
        for led in 0..layout.total() {
            let gamma = blender.exponent_for(led).unwrap();
            assert!((gamma[0] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn anchor_table_matches_direct_correction() {
        let profile =
            GammaProfile::default().with_anchor(AnchorPosition::BottomLeft, [1.8, 2.0, 2.4]);
        let table = profile.anchor_table(AnchorPosition::BottomLeft, 2);
        for v in [0usize, 1, 64, 128, 254, 255] {
            assert_eq!(table[v], correct_channel(v as u8, 2.4));
        }
    }
}
