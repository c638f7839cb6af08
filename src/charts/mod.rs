//! Charts module - Tick placement, styling and chart rendering

pub mod renderer;
pub mod style;
pub mod ticks;

pub use renderer::{ColumnSpec, PlotOptions, RenderError, RenderReport, TimeSeriesRenderer};
pub use style::{palette_color, pt_to_px, ChartStyle, PALETTE};
pub use ticks::hour_ticks;
