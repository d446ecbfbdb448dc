//! Timestamp formatting used by records, notifications and health checks.

use std::fmt::Display;

use chrono::{DateTime, Local, SecondsFormat, TimeZone};

/// Full ISO-8601 timestamp with microseconds and UTC offset.
pub fn iso8601<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// 12-hour wall clock, e.g. `03:07 PM`.
pub fn clock_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%I:%M %p").to_string()
}

pub fn now_iso8601() -> String {
    iso8601(&Local::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clock_time_uses_twelve_hour_format() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 3, 10, 2, 30, 0).unwrap();
        assert_eq!(clock_time(&at), "02:30 AM");

        let afternoon = tz.with_ymd_and_hms(2024, 3, 9, 15, 7, 0).unwrap();
        assert_eq!(clock_time(&afternoon), "03:07 PM");

        let midnight = tz.with_ymd_and_hms(2024, 3, 9, 0, 30, 0).unwrap();
        assert_eq!(clock_time(&midnight), "12:30 AM");
    }

    #[test]
    fn test_iso8601_keeps_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let at = tz.with_ymd_and_hms(2024, 10, 27, 2, 30, 0).unwrap();
        assert_eq!(iso8601(&at), "2024-10-27T02:30:00.000000+02:00");

        let stamp = now_iso8601();
        assert!(DateTime::parse_from_rfc3339(&stamp).is_ok(), "not ISO-8601: {}", stamp);
    }
}
