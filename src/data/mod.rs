//! Data module - Date coercion and time-based resampling

pub mod datetime;
pub mod resample;

pub use datetime::{date_millis, ensure_date_column, millis_to_datetime, DATE_COLUMN, DATE_FORMAT};
pub use resample::{parse_interval, resample_mean, ResampleError};
