//! thermoplot - Time-series line chart rendering for tabular sensor data
//!
//! A thin presentation layer over Polars and plotters: one or more
//! DataFrames carrying a "Date" column and numeric readings go in, a single
//! raster image with shared time axis, gridlines, ticks and legend comes
//! out. Optional bucket-mean resampling averages readings over fixed
//! intervals before plotting.
//!
//! ```no_run
//! use polars::prelude::*;
//! use thermoplot::{PlotOptions, TimeSeriesRenderer};
//!
//! fn render(frames: &[DataFrame]) -> anyhow::Result<()> {
//!     let renderer = TimeSeriesRenderer::new();
//!     let opts = PlotOptions {
//!         title: Some("Furnace temperatures".to_string()),
//!         unit_label: Some("°C".to_string()),
//!         ..Default::default()
//!     };
//!     let columns = vec!["T".to_string(); frames.len()];
//!     renderer.plot_time_series(frames, &columns, None, &opts)?;
//!     Ok(())
//! }
//! ```

pub mod charts;
pub mod data;

pub use charts::{
    hour_ticks, palette_color, ChartStyle, ColumnSpec, PlotOptions, RenderError, RenderReport,
    TimeSeriesRenderer, PALETTE,
};
pub use data::{
    date_millis, ensure_date_column, parse_interval, resample_mean, ResampleError, DATE_COLUMN,
    DATE_FORMAT,
};
