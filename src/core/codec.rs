//! Conversions between datastore value types and JSON-safe primitives
//!
//! Timestamps travel as milliseconds since the Unix epoch (UTC), references
//! as their url-safe string and blob keys as their raw identifier.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::core::reference::{BlobKey, Reference};

/// Failures of a single value conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("invalid reference '{value}': {reason}")]
    InvalidReference { value: String, reason: String },

    #[error("reference kind mismatch: expected '{expected}', found '{found}'")]
    KindMismatch { expected: String, found: String },

    #[error("timestamp out of range: {millis} ms")]
    TimestampOutOfRange { millis: i64 },

    #[error("blob key must not be empty")]
    EmptyBlobKey,

    #[error("invalid cursor '{value}'")]
    InvalidCursor { value: String },
}

/// Milliseconds since the Unix epoch; sub-millisecond precision is dropped
pub fn timestamp_to_epoch_millis(value: &DateTime<Utc>) -> i64 {
    value.timestamp_millis()
}

/// Inverse of [`timestamp_to_epoch_millis`], input is UTC
pub fn epoch_millis_to_timestamp(millis: i64) -> Result<DateTime<Utc>, CodecError> {
    DateTime::from_timestamp_millis(millis).ok_or(CodecError::TimestampOutOfRange { millis })
}

/// Dates are encoded as midnight UTC of that day
pub fn date_to_epoch_millis(value: &NaiveDate) -> i64 {
    value.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Date part (UTC) of the given instant
pub fn epoch_millis_to_date(millis: i64) -> Result<NaiveDate, CodecError> {
    epoch_millis_to_timestamp(millis).map(|timestamp| timestamp.date_naive())
}

/// Accepts integer or fractional JSON numbers, truncating to whole millis
pub fn json_number_to_millis(value: &serde_json::Number) -> Option<i64> {
    if let Some(millis) = value.as_i64() {
        return Some(millis);
    }
    value
        .as_f64()
        .filter(|millis| millis.is_finite() && millis.abs() < i64::MAX as f64)
        .map(|millis| millis.trunc() as i64)
}

pub fn reference_to_string(value: &Reference) -> String {
    value.urlsafe()
}

/// Parse a url-safe reference, checking its kind when one is expected
pub fn string_to_reference(
    value: &str,
    expected_kind: Option<&str>,
) -> Result<Reference, CodecError> {
    let reference = Reference::from_urlsafe(value)?;
    match expected_kind {
        Some(expected) if reference.kind() != expected => Err(CodecError::KindMismatch {
            expected: expected.to_string(),
            found: reference.kind().to_string(),
        }),
        _ => Ok(reference),
    }
}

pub fn blob_key_to_string(value: &BlobKey) -> String {
    value.as_str().to_string()
}

pub fn string_to_blob_key(value: &str) -> Result<BlobKey, CodecError> {
    BlobKey::new(value)
}
