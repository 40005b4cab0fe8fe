//! Raster output: diagnostic overlays and synthetic scans.

mod overlay;
mod synth;

pub use overlay::render_overlay;
pub use synth::{ScanOptions, render_scan};
