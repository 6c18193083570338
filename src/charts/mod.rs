//! Charts module - dashboard rendering

mod export;
mod hexbin;
mod plotter;

pub use export::{export_minute_histogram, ExportError};
pub use hexbin::{bin_points, HexBin, DEFAULT_RADIUS_DEG};
pub use plotter::ChartPlotter;
