//! Epoch-microsecond conversions (UTC, fixed-length days).
//!
//! The platform reports every timestamp as microseconds since the Unix
//! epoch. Calendar fields are read in UTC and day arithmetic uses a fixed
//! 86 400 000 000 µs day; no timezone or daylight-saving adjustment is made.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::CoreError;
use crate::types::Usecs;

/// Microseconds in one day.
pub const DAY_USECS: Usecs = 86_400_000_000;

/// Display format for run start and expiration times.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Convert an epoch-microsecond timestamp to a UTC calendar date-time.
///
/// Negative timestamps and values outside chrono's representable range are
/// rejected with [`CoreError::MalformedTimestamp`].
pub fn to_date(usecs: Usecs) -> Result<NaiveDateTime, CoreError> {
    if usecs < 0 {
        return Err(CoreError::MalformedTimestamp(usecs));
    }
    DateTime::<Utc>::from_timestamp_micros(usecs)
        .map(|dt| dt.naive_utc())
        .ok_or(CoreError::MalformedTimestamp(usecs))
}

/// Convert a UTC calendar date-time back to epoch microseconds.
pub fn from_date(date: NaiveDateTime) -> Usecs {
    date.and_utc().timestamp_micros()
}

/// Whole days by which `a` exceeds `b`: `floor((a - b) / DAY_USECS)`.
///
/// Negative when `a` is earlier than `b`. A difference outside the `i64`
/// range is reported against `b`.
pub fn day_delta(a: Usecs, b: Usecs) -> Result<i64, CoreError> {
    a.checked_sub(b)
        .map(|diff| diff.div_euclid(DAY_USECS))
        .ok_or(CoreError::MalformedTimestamp(b))
}

/// `usecs` shifted forward by `days` fixed-length days.
pub fn add_days(usecs: Usecs, days: u32) -> Result<Usecs, CoreError> {
    i64::from(days)
        .checked_mul(DAY_USECS)
        .and_then(|offset| usecs.checked_add(offset))
        .ok_or(CoreError::MalformedTimestamp(usecs))
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
pub fn format_usecs(usecs: Usecs) -> Result<String, CoreError> {
    Ok(to_date(usecs)?.format(DISPLAY_FORMAT).to_string())
}
