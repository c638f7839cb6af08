//! Time-Series Renderer Module
//! Renders one or more datasets as line charts on a shared time axis and
//! saves the result as a raster image.
//!
//! Layout:
//! 1. Optional title, centered above the axes
//! 2. Optional unit label, horizontal, above the y-axis
//! 3. Line series with gridlines at the computed time ticks
//! 4. Multi-source variant only: legend centered below the axes, one or two
//!    columns depending on how many series were actually drawn

use std::path::PathBuf;

use chrono::{Duration, NaiveDateTime};
use plotters::coord::combinators::BindKeyPoints;
use plotters::coord::types::RangedDateTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::{DataFrame, DataType, PolarsError};
use thiserror::Error;

use crate::charts::style::{palette_color, pt_to_px, ChartStyle};
use crate::charts::ticks::hour_ticks;
use crate::data::datetime::{date_millis, ensure_date_column, millis_to_datetime, DATE_COLUMN};
use crate::data::resample::resample_mean;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("drawing error: {0}")]
    Drawing(String),
}

fn draw_err<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}

/// Per-call rendering parameters. Everything has a usable default.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    /// Chart title; absent means no title is drawn.
    pub title: Option<String>,
    /// Unit label drawn horizontally above the y-axis.
    pub unit_label: Option<String>,
    /// Where the image is written.
    pub output_path: PathBuf,
    /// Figure size in inches, (width, height).
    pub size: (f64, f64),
    /// Output resolution in dots per inch.
    pub dpi: u32,
    /// Spacing between time ticks, in hours.
    pub hour_interval: u32,
    /// Optional averaging interval, e.g. "1H" or "1D".
    pub resample_interval: Option<String>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            title: None,
            unit_label: None,
            output_path: PathBuf::from("temperature_plot.png"),
            size: (10.0, 65.0 / 18.0),
            dpi: 200,
            hour_interval: 6,
            resample_interval: None,
        }
    }
}

/// Column selection for the single-source variant: one name or several.
#[derive(Debug, Clone)]
pub enum ColumnSpec {
    Single(String),
    Columns(Vec<String>),
}

impl ColumnSpec {
    fn into_names(self) -> Vec<String> {
        match self {
            ColumnSpec::Single(name) => vec![name],
            ColumnSpec::Columns(names) => names,
        }
    }
}

impl From<&str> for ColumnSpec {
    fn from(name: &str) -> Self {
        ColumnSpec::Single(name.to_string())
    }
}

impl From<String> for ColumnSpec {
    fn from(name: String) -> Self {
        ColumnSpec::Single(name)
    }
}

impl From<Vec<String>> for ColumnSpec {
    fn from(names: Vec<String>) -> Self {
        ColumnSpec::Columns(names)
    }
}

impl From<&[String]> for ColumnSpec {
    fn from(names: &[String]) -> Self {
        ColumnSpec::Columns(names.to_vec())
    }
}

impl From<Vec<&str>> for ColumnSpec {
    fn from(names: Vec<&str>) -> Self {
        ColumnSpec::Columns(names.iter().map(|n| n.to_string()).collect())
    }
}

/// Summary of what a render call actually drew.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    /// Series that survived the column and sparsity checks.
    pub series_drawn: usize,
    /// Legend labels of the drawn series, in draw order.
    pub legend_labels: Vec<String>,
    /// Time ticks placed on the x-axis.
    pub ticks: Vec<NaiveDateTime>,
}

struct SeriesLine {
    label: String,
    color: RGBColor,
    points: Vec<(NaiveDateTime, f64)>,
}

struct WorkingSet {
    frame: DataFrame,
    stamps: Vec<Option<i64>>,
}

/// Renders labeled time-indexed series as line charts.
///
/// Holds an immutable [`ChartStyle`] so repeated calls share one explicit
/// configuration instead of mutable process-global plotting state.
pub struct TimeSeriesRenderer {
    style: ChartStyle,
}

impl Default for TimeSeriesRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesRenderer {
    pub fn new() -> Self {
        Self {
            style: ChartStyle::default(),
        }
    }

    pub fn with_style(style: ChartStyle) -> Self {
        Self { style }
    }

    /// Plot one column from each of several datasets on a shared time axis.
    ///
    /// `columns` picks one column per dataset and must match the dataset
    /// count, as must `legend_labels` when provided; either mismatch is a
    /// hard [`RenderError::InvalidArgument`]. Absent labels default to
    /// "Dataset 1", "Dataset 2", ... A legend is drawn centered below the
    /// axes, sized to the number of series that survived the sparsity check.
    pub fn plot_time_series(
        &self,
        frames: &[DataFrame],
        columns: &[String],
        legend_labels: Option<&[String]>,
        opts: &PlotOptions,
    ) -> Result<RenderReport, RenderError> {
        if let Some(labels) = legend_labels {
            if labels.len() != frames.len() {
                return Err(RenderError::InvalidArgument(format!(
                    "legend_labels length ({}) must match the number of datasets ({})",
                    labels.len(),
                    frames.len()
                )));
            }
        }
        if columns.len() != frames.len() {
            return Err(RenderError::InvalidArgument(format!(
                "columns length ({}) must match the number of datasets ({})",
                columns.len(),
                frames.len()
            )));
        }

        let labels: Vec<String> = match legend_labels {
            Some(labels) => labels.to_vec(),
            None => (0..frames.len())
                .map(|i| format!("Dataset {}", i + 1))
                .collect(),
        };

        let working: Vec<WorkingSet> = frames
            .iter()
            .enumerate()
            .map(|(i, frame)| prepare_frame(frame, i, opts.resample_interval.as_deref()))
            .collect();

        let total = frames.len();
        let mut series: Vec<SeriesLine> = Vec::new();
        for (i, ws) in working.iter().enumerate() {
            if let Some(points) = extract_points(ws, &columns[i], i) {
                series.push(SeriesLine {
                    label: labels[i].clone(),
                    color: palette_color(i, total),
                    points,
                });
            }
        }

        let all_ms: Vec<i64> = working
            .iter()
            .flat_map(|ws| ws.stamps.iter().flatten().copied())
            .collect();

        let ticks = self.render(&series, &all_ms, opts, true)?;
        tracing::info!(
            "chart saved to {} ({} of {} series drawn)",
            opts.output_path.display(),
            series.len(),
            total
        );
        Ok(RenderReport {
            series_drawn: series.len(),
            legend_labels: series.iter().map(|s| s.label.clone()).collect(),
            ticks,
        })
    }

    /// Plot one or more columns of a single dataset.
    ///
    /// A single column name is accepted as-is and treated as a one-element
    /// list. A legend-label count mismatch is not an error here: it is
    /// logged and the column names are used instead. No legend is rendered
    /// in this variant; the axes keep the default plot region.
    pub fn plot_time_series_one(
        &self,
        frame: &DataFrame,
        columns: impl Into<ColumnSpec>,
        legend_labels: Option<&[String]>,
        opts: &PlotOptions,
    ) -> Result<RenderReport, RenderError> {
        let names = columns.into().into_names();

        let labels: Vec<String> = match legend_labels {
            Some(labels) if labels.len() == names.len() => labels.to_vec(),
            Some(labels) => {
                tracing::warn!(
                    "legend_labels length ({}) does not match the number of columns ({}); using column names",
                    labels.len(),
                    names.len()
                );
                names.clone()
            }
            None => names.clone(),
        };

        // Resample once, before the per-column loop, so later columns never
        // see an already-averaged frame being averaged again.
        let ws = prepare_frame(frame, 0, opts.resample_interval.as_deref());

        let total = names.len();
        let mut series: Vec<SeriesLine> = Vec::new();
        for (i, name) in names.iter().enumerate() {
            if let Some(points) = extract_points(&ws, name, 0) {
                series.push(SeriesLine {
                    label: labels[i].clone(),
                    color: palette_color(i, total),
                    points,
                });
            }
        }

        let all_ms: Vec<i64> = ws.stamps.iter().flatten().copied().collect();

        let ticks = self.render(&series, &all_ms, opts, false)?;
        tracing::info!("chart saved to {}", opts.output_path.display());
        Ok(RenderReport {
            series_drawn: series.len(),
            legend_labels: series.iter().map(|s| s.label.clone()).collect(),
            ticks,
        })
    }

    fn render(
        &self,
        series: &[SeriesLine],
        all_ms: &[i64],
        opts: &PlotOptions,
        below_legend: bool,
    ) -> Result<Vec<NaiveDateTime>, RenderError> {
        let style = &self.style;
        let dpi = opts.dpi;

        let px_w = ((opts.size.0 * dpi as f64).round() as u32).max(1);
        let px_h = ((opts.size.1 * dpi as f64).round() as u32).max(1);

        let ticks = match (all_ms.iter().min(), all_ms.iter().max()) {
            (Some(&lo), Some(&hi)) => match (millis_to_datetime(lo), millis_to_datetime(hi)) {
                (Some(start), Some(end)) => hour_ticks(start, end, opts.hour_interval),
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        let (x_min, x_max) = match (ticks.first(), ticks.last()) {
            (Some(&first), Some(&last)) if first < last => (first, last),
            (Some(&first), _) => (first, first + Duration::hours(1)),
            _ => {
                let epoch = NaiveDateTime::default();
                (epoch, epoch + Duration::hours(1))
            }
        };

        let mut y_lo = f64::INFINITY;
        let mut y_hi = f64::NEG_INFINITY;
        for line in series {
            for &(_, value) in &line.points {
                y_lo = y_lo.min(value);
                y_hi = y_hi.max(value);
            }
        }
        let (y_lo, y_hi) = if y_lo.is_finite() && y_hi.is_finite() {
            if y_lo == y_hi {
                (y_lo - 1.0, y_hi + 1.0)
            } else {
                let pad = (y_hi - y_lo) * 0.05;
                (y_lo - pad, y_hi + pad)
            }
        } else {
            (0.0, 1.0)
        };

        let stroke = pt_to_px(style.line_width_pt, dpi).round().max(1.0) as u32;
        let tick_px = pt_to_px(style.tick_label_pt, dpi);

        let root = BitMapBackend::new(&opts.output_path, (px_w, px_h)).into_drawing_area();
        root.fill(&style.background).map_err(draw_err)?;

        let (chart_area, legend_area) = if below_legend {
            let split = (px_h as f64 * plot_fraction(series.len())).round() as u32;
            let (upper, lower) = root.clone().split_vertically(split);
            (upper, Some(lower))
        } else {
            (root.clone(), None)
        };

        let mut builder = ChartBuilder::on(&chart_area);
        builder
            .margin((tick_px * 0.8) as u32)
            .x_label_area_size((tick_px * 2.8) as u32)
            .y_label_area_size((tick_px * 2.4) as u32);
        if let Some(title) = &opts.title {
            builder.caption(
                title,
                (style.font_family.as_str(), pt_to_px(style.title_pt, dpi)).into_font(),
            );
        }

        let x_spec = RangedDateTime::from(x_min..x_max).with_key_points(ticks.clone());
        let mut chart = builder
            .build_cartesian_2d(x_spec, y_lo..y_hi)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .x_labels(ticks.len().max(2))
            .x_label_formatter(&|t: &NaiveDateTime| t.format("%H:%M\n%Y-%m-%d").to_string())
            .bold_line_style(ShapeStyle {
                color: style.grid_color.mix(style.grid_alpha),
                filled: false,
                stroke_width: 1,
            })
            .light_line_style(ShapeStyle {
                color: style.grid_color.mix(style.grid_alpha * 0.4),
                filled: false,
                stroke_width: 1,
            })
            .label_style((style.font_family.as_str(), tick_px).into_font())
            .draw()
            .map_err(draw_err)?;

        if let Some(unit) = &opts.unit_label {
            let font = (
                style.font_family.as_str(),
                pt_to_px(style.axis_label_pt, dpi),
            )
                .into_font();
            chart_area
                .draw(&Text::new(unit.clone(), (8, 8), font))
                .map_err(draw_err)?;
        }

        for line in series {
            let line_style = ShapeStyle {
                color: line.color.mix(style.line_alpha),
                filled: false,
                stroke_width: stroke,
            };
            chart
                .draw_series(LineSeries::new(line.points.iter().copied(), line_style))
                .map_err(draw_err)?;
        }

        if let Some(area) = &legend_area {
            self.draw_legend(area, series, stroke, dpi)?;
        }

        root.present().map_err(draw_err)?;
        Ok(ticks)
    }

    /// Legend entries centered below the axes: a color swatch line plus the
    /// series label, in one or two columns.
    fn draw_legend<DB: DrawingBackend>(
        &self,
        area: &DrawingArea<DB, Shift>,
        series: &[SeriesLine],
        stroke: u32,
        dpi: u32,
    ) -> Result<(), RenderError> {
        if series.is_empty() {
            return Ok(());
        }
        let style = &self.style;
        let font_px = pt_to_px(style.legend_pt, dpi);
        let font = (style.font_family.as_str(), font_px).into_font();

        let ncol = if series.len() >= 4 { 2 } else { 1 };
        let char_w = (font_px * 0.6).round() as i32;
        let swatch_w = (font_px * 1.8).round() as i32;
        let gap = (font_px * 0.5).round().max(1.0) as i32;
        let row_h = (font_px * 1.6).round() as i32;
        let longest = series
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0) as i32;
        let cell_w = swatch_w + gap + longest * char_w + 3 * gap;

        let (area_w, _) = area.dim_in_pixel();
        let x0 = (area_w as i32 - cell_w * ncol as i32) / 2;
        let y0 = (font_px * 0.6).round() as i32;

        for (i, line) in series.iter().enumerate() {
            let row = (i / ncol) as i32;
            let col = (i % ncol) as i32;
            let x = x0 + col * cell_w;
            let mid = y0 + row * row_h + row_h / 2;

            let swatch_style = ShapeStyle {
                color: line.color.mix(style.line_alpha),
                filled: false,
                stroke_width: stroke,
            };
            area.draw(&PathElement::new(
                vec![(x, mid), (x + swatch_w, mid)],
                swatch_style,
            ))
            .map_err(draw_err)?;
            area.draw(&Text::new(
                line.label.clone(),
                (x + swatch_w + gap, mid - (font_px / 2.0) as i32),
                font.clone(),
            ))
            .map_err(draw_err)?;
        }
        Ok(())
    }
}

/// Fraction of the figure height given to the axes; the rest holds the
/// legend. More drawn series leave less room for the plot.
fn plot_fraction(drawn: usize) -> f64 {
    if drawn >= 8 {
        0.50
    } else if drawn >= 4 {
        0.55
    } else {
        0.65
    }
}

/// Clone a caller frame and bring it into plottable shape: datetime-typed
/// "Date" column, optional bucket-mean resampling. Every failure here is
/// soft; the worst outcome is an empty timestamp vector, which later skips
/// the affected series.
fn prepare_frame(frame: &DataFrame, index: usize, resample: Option<&str>) -> WorkingSet {
    let mut working = frame.clone();
    if let Err(err) = ensure_date_column(&mut working) {
        tracing::warn!(
            "dataset {}: cannot coerce '{}' column: {}",
            index + 1,
            DATE_COLUMN,
            err
        );
        return WorkingSet {
            frame: working,
            stamps: Vec::new(),
        };
    }

    if let Some(every) = resample {
        match resample_mean(&working, every) {
            Ok(resampled) => {
                tracing::info!(
                    "dataset {}: averaged over {} buckets ({} rows)",
                    index + 1,
                    every,
                    resampled.height()
                );
                working = resampled;
            }
            Err(err) => {
                tracing::warn!(
                    "dataset {}: resampling by {} failed: {}; plotting raw points",
                    index + 1,
                    every,
                    err
                );
            }
        }
    }

    let stamps = date_millis(&working).unwrap_or_default();
    WorkingSet {
        frame: working,
        stamps,
    }
}

/// Pair timestamps with one column's values. Returns None, with a log line,
/// when the column is absent, not castable to float, or has two or fewer
/// usable values.
fn extract_points(
    ws: &WorkingSet,
    column: &str,
    index: usize,
) -> Option<Vec<(NaiveDateTime, f64)>> {
    let values = match ws.frame.column(column) {
        Ok(values) => values,
        Err(_) => {
            tracing::warn!(
                "dataset {}: column '{}' not found; skipping series",
                index + 1,
                column
            );
            return None;
        }
    };
    let cast = match values.cast(&DataType::Float64) {
        Ok(cast) => cast,
        Err(err) => {
            tracing::warn!(
                "dataset {}: column '{}' is not numeric ({}); skipping series",
                index + 1,
                column,
                err
            );
            return None;
        }
    };
    let ca = cast.f64().ok()?;

    let usable = ca
        .into_iter()
        .filter(|v| matches!(v, Some(x) if !x.is_nan()))
        .count();
    if usable <= 2 {
        tracing::warn!(
            "dataset {}: column '{}' has only {} usable values; skipping series",
            index + 1,
            column,
            usable
        );
        return None;
    }
    if ws.stamps.is_empty() {
        tracing::warn!(
            "dataset {}: no usable timestamps; skipping series for column '{}'",
            index + 1,
            column
        );
        return None;
    }

    let points: Vec<(NaiveDateTime, f64)> = ws
        .stamps
        .iter()
        .zip(ca.into_iter())
        .filter_map(|(stamp, value)| match (stamp, value) {
            (Some(ms), Some(v)) if !v.is_nan() => millis_to_datetime(*ms).map(|t| (t, v)),
            _ => None,
        })
        .collect();
    Some(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plot_region_shrinks_as_the_legend_grows() {
        assert_eq!(plot_fraction(0), 0.65);
        assert_eq!(plot_fraction(3), 0.65);
        assert_eq!(plot_fraction(4), 0.55);
        assert_eq!(plot_fraction(7), 0.55);
        assert_eq!(plot_fraction(8), 0.50);
    }

    #[test]
    fn column_spec_normalizes_a_single_name() {
        let spec: ColumnSpec = "T".into();
        assert_eq!(spec.into_names(), vec!["T".to_string()]);

        let spec: ColumnSpec = vec!["a".to_string(), "b".to_string()].into();
        assert_eq!(spec.into_names().len(), 2);
    }

    #[test]
    fn default_options_match_the_documented_surface() {
        let opts = PlotOptions::default();
        assert_eq!(opts.output_path, PathBuf::from("temperature_plot.png"));
        assert_eq!(opts.dpi, 200);
        assert_eq!(opts.hour_interval, 6);
        assert!(opts.resample_interval.is_none());
        assert!((opts.size.0 - 10.0).abs() < f64::EPSILON);
    }
}
