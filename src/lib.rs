// THEORY:
// This file is the main entry point for the `glowcast` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (capture and
// transmission collaborators).
//
// The primary goal is to export the `LedPipeline` and its associated data
// structures (`PipelineConfig`, `Rgb`, the layout and gamma descriptors) as
// the clean, high-level interface for the engine. The internal modules
// (`core_modules`) stay public for debug renderers that want to inspect cell
// polygons and coverage masks, but `pipeline` is the intended surface.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use crate::core_modules::cells::SamplingLayout;
pub use crate::core_modules::color::color::{ChannelOrder, Rgb};
pub use crate::core_modules::extractor::ExtractionStrategy;
pub use crate::core_modules::gamma::{AnchorPosition, GammaProfile};
pub use crate::core_modules::layout::{Direction, StartCorner};
pub use crate::error::SetupError;
pub use crate::parallel_pipeline::ParallelPipeline;
pub use crate::pipeline::{LedPipeline, PipelineConfig};
