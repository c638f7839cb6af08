//! Date Column Module
//! Handles coercion of the "Date" column to a datetime type and
//! extraction of timestamps for plotting.

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;

/// Name of the timestamp column every dataset must carry.
pub const DATE_COLUMN: &str = "Date";

/// Expected textual timestamp layout, day-month-year hour:minute:second.
pub const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Ensure the "Date" column is datetime-typed.
///
/// Already-datetime columns are left untouched. Anything else is cast to
/// string and parsed with [`DATE_FORMAT`]; entries that fail to parse become
/// null rather than aborting.
pub fn ensure_date_column(df: &mut DataFrame) -> PolarsResult<()> {
    let column = df.column(DATE_COLUMN)?;
    if matches!(column.dtype(), DataType::Datetime(_, _)) {
        return Ok(());
    }

    let as_string = column.as_materialized_series().cast(&DataType::String)?;
    let raw = as_string.str()?;

    let millis = Int64Chunked::from_iter_options(
        DATE_COLUMN.into(),
        raw.into_iter().map(|opt| {
            opt.and_then(|text| NaiveDateTime::parse_from_str(text.trim(), DATE_FORMAT).ok())
                .map(|dt| dt.and_utc().timestamp_millis())
        }),
    );

    let parsed = millis
        .into_datetime(TimeUnit::Milliseconds, None)
        .into_series();
    df.with_column(parsed)?;
    Ok(())
}

/// Read the "Date" column as epoch milliseconds, one entry per row.
///
/// Fails if the column is missing or not datetime-typed; callers are expected
/// to run [`ensure_date_column`] first.
pub fn date_millis(df: &DataFrame) -> PolarsResult<Vec<Option<i64>>> {
    let column = df.column(DATE_COLUMN)?;
    let series = column.as_materialized_series();
    let ca = series.datetime()?;

    let unit = ca.time_unit();
    Ok(ca
        .into_iter()
        .map(|opt| {
            opt.map(|raw| match unit {
                TimeUnit::Nanoseconds => raw / 1_000_000,
                TimeUnit::Microseconds => raw / 1_000,
                TimeUnit::Milliseconds => raw,
            })
        })
        .collect())
}

/// Convert epoch milliseconds back to a naive timestamp.
pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}
