use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::service::Rejection;

/// Formats accepted for timestamps without an offset; these are taken as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp as received at the API boundary.
///
/// RFC 3339 strings keep their offset. Naive datetimes and bare dates
/// (midnight) are interpreted as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, Rejection> {
    let raw = raw.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(datetime.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| Rejection::InvalidTimestamp(raw.to_string()))
}

/// Parse a `YYYY-MM-DD` date of birth.
pub fn parse_date(raw: &str) -> Result<NaiveDate, Rejection> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| Rejection::InvalidDate)
}

/// Whole years elapsed since `date_of_birth`, counted as floor(days / 365).
///
/// This ignores leap days, so it can be off by a day or so around birthdays.
pub fn age_at(date_of_birth: NaiveDate, now: DateTime<Utc>) -> i64 {
    (now.date_naive() - date_of_birth).num_days().div_euclid(365)
}
