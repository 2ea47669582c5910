use crate::error::ConversionError;
use chrono::{DateTime, NaiveTime, Timelike, Utc};
use prost_types::Timestamp;

const TIME_ONLY_FORMAT: &str = "%H:%M:%S";

/// Wire timestamp to a UTC instant.
pub fn datetime_from_timestamp(ts: &Timestamp) -> Result<DateTime<Utc>, ConversionError> {
    let out_of_range = || ConversionError::Timestamp {
        seconds: ts.seconds,
        nanos: ts.nanos,
    };
    let nanos = u32::try_from(ts.nanos).map_err(|_| out_of_range())?;

    DateTime::from_timestamp(ts.seconds, nanos).ok_or_else(out_of_range)
}

/// UTC instant to a wire timestamp.
#[must_use]
pub fn datetime_to_timestamp(dt: &DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: dt.timestamp(),
        // subsec nanos are always below 2e9
        nanos: i32::try_from(dt.timestamp_subsec_nanos()).unwrap_or(i32::MAX),
    }
}

/// Seconds since midnight to `HH:MM:SS`.
pub fn time_only_from_secs(secs: u32) -> Result<String, ConversionError> {
    NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
        .map(|t| t.format(TIME_ONLY_FORMAT).to_string())
        .ok_or_else(|| ConversionError::TimeOnly(secs.to_string()))
}

/// `HH:MM:SS` to seconds since midnight.
pub fn time_only_to_secs(value: &str) -> Result<u32, ConversionError> {
    NaiveTime::parse_from_str(value, TIME_ONLY_FORMAT)
        .map(|t| t.num_seconds_from_midnight())
        .map_err(|_| ConversionError::TimeOnly(value.to_string()))
}

///
/// TESTS
///
