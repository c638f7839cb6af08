//! Resampling Module
//! Handles bucket-mean averaging of datasets over fixed time intervals.

use std::collections::BTreeMap;

use chrono::Duration;
use polars::prelude::*;
use thiserror::Error;

use super::datetime::{date_millis, DATE_COLUMN};

#[derive(Error, Debug)]
pub enum ResampleError {
    #[error("invalid resample interval '{0}'")]
    InvalidInterval(String),
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Parse an interval specifier such as "1H", "30min" or "1D" into a duration.
///
/// The count defaults to 1 when omitted ("H" == "1H"). Supported units:
/// s/sec, t/min, h/hour, d/day, w/week, case-insensitive.
pub fn parse_interval(spec: &str) -> Result<Duration, ResampleError> {
    let trimmed = spec.trim();
    let digits = trimmed.chars().take_while(|c| c.is_ascii_digit()).count();

    let amount: i64 = if digits == 0 {
        1
    } else {
        trimmed[..digits]
            .parse()
            .map_err(|_| ResampleError::InvalidInterval(spec.to_string()))?
    };
    if amount == 0 {
        return Err(ResampleError::InvalidInterval(spec.to_string()));
    }

    let unit = trimmed[digits..].to_lowercase();
    let duration = match unit.as_str() {
        "s" | "sec" => Duration::seconds(amount),
        "t" | "min" => Duration::minutes(amount),
        "h" | "hour" => Duration::hours(amount),
        "d" | "day" => Duration::days(amount),
        "w" | "week" => Duration::weeks(amount),
        _ => return Err(ResampleError::InvalidInterval(spec.to_string())),
    };
    Ok(duration)
}

/// Average every numeric column over fixed time buckets.
///
/// Buckets are aligned to the epoch, so "1D" produces calendar days and "1H"
/// clock hours. Each output row is a bucket start plus the arithmetic mean of
/// the bucket's non-missing values per column; rows with a null timestamp are
/// dropped. Non-numeric columns other than "Date" do not survive resampling.
pub fn resample_mean(df: &DataFrame, every: &str) -> Result<DataFrame, ResampleError> {
    let step = parse_interval(every)?;
    let step_ms = step.num_milliseconds();
    let stamps = date_millis(df)?;

    // Materialize numeric columns as f64 up front.
    let mut numeric: Vec<(PlSmallStr, Vec<Option<f64>>)> = Vec::new();
    for column in df.get_columns() {
        if column.name().as_str() == DATE_COLUMN {
            continue;
        }
        let is_numeric = matches!(
            column.dtype(),
            DataType::Float32
                | DataType::Float64
                | DataType::Int8
                | DataType::Int16
                | DataType::Int32
                | DataType::Int64
                | DataType::UInt8
                | DataType::UInt16
                | DataType::UInt32
                | DataType::UInt64
        );
        if !is_numeric {
            continue;
        }
        let cast = column.cast(&DataType::Float64)?;
        let values: Vec<Option<f64>> = cast.f64()?.into_iter().collect();
        numeric.push((column.name().clone(), values));
    }

    // (sum, count) accumulator per bucket and numeric column, ordered by
    // bucket start.
    let mut buckets: BTreeMap<i64, Vec<(f64, u32)>> = BTreeMap::new();
    for (row, stamp) in stamps.iter().enumerate() {
        let Some(ms) = stamp else { continue };
        let key = ms.div_euclid(step_ms) * step_ms;
        let acc = buckets
            .entry(key)
            .or_insert_with(|| vec![(0.0, 0); numeric.len()]);
        for (slot, (_, values)) in acc.iter_mut().zip(numeric.iter()) {
            if let Some(v) = values[row] {
                if !v.is_nan() {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
        }
    }

    let starts: Vec<i64> = buckets.keys().copied().collect();
    let date = Int64Chunked::from_vec(DATE_COLUMN.into(), starts)
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();

    let mut out: Vec<Column> = vec![date.into_column()];
    for (idx, (name, _)) in numeric.iter().enumerate() {
        let means: Vec<Option<f64>> = buckets
            .values()
            .map(|acc| {
                let (sum, count) = acc[idx];
                if count > 0 {
                    Some(sum / count as f64)
                } else {
                    None
                }
            })
            .collect();
        out.push(Column::new(name.clone(), means));
    }

    Ok(DataFrame::new(out)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datetime::millis_to_datetime;

    const HOUR_MS: i64 = 3_600_000;

    fn hourly_frame(start_ms: i64, values: Vec<Option<f64>>) -> DataFrame {
        let stamps: Vec<i64> = (0..values.len() as i64)
            .map(|i| start_ms + i * HOUR_MS)
            .collect();
        let date = Int64Chunked::from_vec(DATE_COLUMN.into(), stamps)
            .into_datetime(TimeUnit::Milliseconds, None)
            .into_series();
        DataFrame::new(vec![date.into_column(), Column::new("T".into(), values)]).unwrap()
    }

    #[test]
    fn parses_common_intervals() {
        assert_eq!(parse_interval("1H").unwrap(), Duration::hours(1));
        assert_eq!(parse_interval("30min").unwrap(), Duration::minutes(30));
        assert_eq!(parse_interval("30T").unwrap(), Duration::minutes(30));
        assert_eq!(parse_interval("1D").unwrap(), Duration::days(1));
        assert_eq!(parse_interval("2w").unwrap(), Duration::weeks(2));
        assert_eq!(parse_interval("D").unwrap(), Duration::days(1));
    }

    #[test]
    fn rejects_malformed_intervals() {
        assert!(matches!(
            parse_interval("5x"),
            Err(ResampleError::InvalidInterval(_))
        ));
        assert!(parse_interval("abc").is_err());
        assert!(parse_interval("0H").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn daily_buckets_over_two_calendar_days() {
        // 48 hourly readings starting at midnight: values 0..=23 on day one,
        // 24..=47 on day two.
        let values: Vec<Option<f64>> = (0..48).map(|v| Some(v as f64)).collect();
        let df = hourly_frame(0, values);

        let out = resample_mean(&df, "1D").unwrap();
        assert_eq!(out.height(), 2);

        let means: Vec<Option<f64>> = out.column("T").unwrap().f64().unwrap().into_iter().collect();
        assert_eq!(means, vec![Some(11.5), Some(35.5)]);

        let starts = date_millis(&out).unwrap();
        let day_two = millis_to_datetime(starts[1].unwrap()).unwrap();
        assert_eq!(day_two.to_string(), "1970-01-02 00:00:00");
    }

    #[test]
    fn missing_values_are_excluded_from_the_mean() {
        let df = hourly_frame(0, vec![Some(10.0), None, Some(20.0)]);
        let out = resample_mean(&df, "1D").unwrap();
        assert_eq!(out.height(), 1);
        let mean = out.column("T").unwrap().f64().unwrap().get(0);
        assert_eq!(mean, Some(15.0));
    }

    #[test]
    fn rows_with_null_timestamps_are_dropped() {
        let date = Int64Chunked::from_iter_options(
            DATE_COLUMN.into(),
            vec![Some(0), None, Some(HOUR_MS)].into_iter(),
        )
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
        let df = DataFrame::new(vec![
            date.into_column(),
            Column::new("T".into(), vec![1.0f64, 100.0, 3.0]),
        ])
        .unwrap();

        let out = resample_mean(&df, "1D").unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(out.column("T").unwrap().f64().unwrap().get(0), Some(2.0));
    }

    #[test]
    fn non_numeric_columns_are_dropped() {
        let mut df = hourly_frame(0, vec![Some(1.0), Some(2.0)]);
        df.with_column(Column::new("probe".into(), vec!["a", "b"]))
            .unwrap();

        let out = resample_mean(&df, "1H").unwrap();
        assert!(out.column("probe").is_err());
        assert_eq!(out.height(), 2);
    }
}
