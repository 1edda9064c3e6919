//! Time related utils.

use chrono::Utc;

/// DateTime in UTC with second precision is enough for signing.
pub type DateTime = chrono::DateTime<Utc>;

/// Capture the current time in UTC.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format a datetime into the date stamp used in credential scope.
///
/// e.g. `20220313`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format a datetime into compact ISO 8601.
///
/// e.g. `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}
