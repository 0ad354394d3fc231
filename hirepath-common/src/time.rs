//! Timestamp utilities

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Fractional days from `start` to `end` (negative if `end` is earlier)
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = end.signed_duration_since(start);
    match elapsed.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0 / SECONDS_PER_DAY,
        None => elapsed.num_seconds() as f64 / SECONDS_PER_DAY,
    }
}

/// Format a timestamp for storage
///
/// Fixed-width RFC 3339 with microseconds and a `Z` suffix, so stored
/// values sort chronologically as text.
pub fn to_storage(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp
pub fn from_storage(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid stored timestamp {:?}: {}", value, e)))
}
