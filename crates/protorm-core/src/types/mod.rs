//! Storage-side special column types and the conversions generated code
//! uses between them and their wire messages.

mod array;
mod inet;
mod json;
pub mod pb;
mod time;

pub use array::{BoolArray, Float64Array, Int64Array, StringArray};
pub use chrono::{DateTime, Utc};
pub use inet::Inet;
pub use json::Jsonb;
pub use time::{datetime_from_timestamp, datetime_to_timestamp, time_only_from_secs, time_only_to_secs};
pub use uuid::Uuid;

use crate::error::ConversionError;

/// Parse a wire UUID string.
pub fn parse_uuid(value: &str) -> Result<Uuid, ConversionError> {
    Uuid::parse_str(value).map_err(|_| ConversionError::Uuid(value.to_string()))
}
