// THEORY:
// The `core_modules` tree contains the engine's building blocks, listed here
// in dependency order (leaves first). `geometry` and `color` are shared
// primitives; `curve` through `mask` form the one-time setup chain that turns
// boundary descriptions into cached per-cell coverage masks; `extractor`,
// `layout`, and `gamma` form the per-frame chain that turns a frame buffer
// into an ordered, corrected LED color sequence. The `pipeline` module at the
// crate root is the only intended consumer; these modules stay public so
// external debug renderers can inspect polygons and masks.

pub mod geometry;

pub mod color;

pub mod curve;
pub mod arc_length;
pub mod patch;
pub mod cells;
pub mod mask;

pub mod extractor;
pub mod layout;
pub mod gamma;
