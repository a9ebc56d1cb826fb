// SPDX-License-Identifier: MIT

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as ISO 8601 with milliseconds and a `Z`
/// suffix, matching JavaScript's `Date.toISOString()`.
pub fn format_iso_millis(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current time in the stored timestamp format.
pub fn now_iso() -> String {
    format_iso_millis(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_matches_js_to_iso_string() {
        let dt = Utc.with_ymd_and_hms(2026, 3, 10, 7, 30, 0).unwrap();
        assert_eq!(format_iso_millis(dt), "2026-03-10T07:30:00.000Z");
    }
}
