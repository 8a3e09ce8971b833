use crate::error::{Error, SyncResult};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Hours before "now" that the fetch window starts
pub const DEFAULT_LOOKBACK_HOURS: i64 = 6;

/// Hours after "now" that the fetch window ends
pub const DEFAULT_LOOKAHEAD_HOURS: i64 = 36;

/// Accepted range for `calendar.lookback_hours`
pub const LOOKBACK_HOURS_RANGE: std::ops::RangeInclusive<i64> = 6..=12;

/// Accepted range for `calendar.lookahead_hours` (one week at most)
pub const LOOKAHEAD_HOURS_RANGE: std::ops::RangeInclusive<i64> = 1..=168;

/// Offset-less layouts accepted and read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse an ISO-8601 timestamp, keeping its own UTC offset
pub fn parse_timestamp(iso_timestamp: &str) -> SyncResult<DateTime<FixedOffset>> {
    match DateTime::parse_from_rfc3339(iso_timestamp) {
        Ok(dt) => Ok(dt),
        Err(source) => NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(iso_timestamp, fmt).ok())
            .map(|naive| naive.and_utc().fixed_offset())
            .ok_or_else(|| Error::TimeParse {
                input: iso_timestamp.to_string(),
                source,
            }),
    }
}

/// Format a timestamp for the dashboard, e.g. `9:05AM` or `Tomorrow 12:30PM`.
///
/// Start times whose day-of-month differs from `reference_now`'s get the
/// `Tomorrow ` prefix. Only the day-of-month is compared, so an event on the
/// same day next month is not prefixed and a past day is.
pub fn format_display_time<Tz: TimeZone>(
    iso_timestamp: &str,
    is_start: bool,
    reference_now: &DateTime<Tz>,
) -> SyncResult<String> {
    let dt = parse_timestamp(iso_timestamp)?;
    let time = dt.format("%-I:%M%p").to_string();

    if is_start && dt.day() != reference_now.day() {
        Ok(format!("Tomorrow {}", time))
    } else {
        Ok(time)
    }
}

/// Compute the `[time_min, time_max)` window around `reference_now`, in UTC
pub fn fetch_window<Tz: TimeZone>(
    reference_now: &DateTime<Tz>,
    lookback_hours: i64,
    lookahead_hours: i64,
) -> (DateTime<Utc>, DateTime<Utc>) {
    let now = reference_now.with_timezone(&Utc);
    (
        now - Duration::hours(lookback_hours),
        now + Duration::hours(lookahead_hours),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 7, 30, 0).unwrap()
    }

    #[test]
    fn test_no_leading_zero_on_hour() {
        assert_eq!(
            format_display_time("2024-01-01T09:05:00Z", false, &now()).unwrap(),
            "9:05AM"
        );
    }

    #[test]
    fn test_afternoon_and_noon() {
        assert_eq!(
            format_display_time("2024-01-01T12:30:00Z", false, &now()).unwrap(),
            "12:30PM"
        );
        assert_eq!(
            format_display_time("2024-01-01T23:59:00Z", false, &now()).unwrap(),
            "11:59PM"
        );
        assert_eq!(
            format_display_time("2024-01-01T00:00:00Z", false, &now()).unwrap(),
            "12:00AM"
        );
    }

    #[test]
    fn test_start_same_day_has_no_prefix() {
        let formatted = format_display_time("2024-01-01T18:00:00Z", true, &now()).unwrap();
        assert_eq!(formatted, "6:00PM");
    }

    #[test]
    fn test_start_other_day_has_prefix() {
        let formatted = format_display_time("2024-01-02T08:15:00Z", true, &now()).unwrap();
        assert_eq!(formatted, "Tomorrow 8:15AM");
    }

    #[test]
    fn test_end_never_has_prefix() {
        for ts in [
            "2024-01-01T10:00:00Z",
            "2024-01-02T10:00:00Z",
            "2023-12-31T22:00:00Z",
        ] {
            let formatted = format_display_time(ts, false, &now()).unwrap();
            assert!(!formatted.contains("Tomorrow"), "{} -> {}", ts, formatted);
        }
    }

    #[test]
    fn test_day_comparison_uses_event_offset() {
        // 23:00 on the 1st in New York is already the 2nd in UTC
        let formatted =
            format_display_time("2024-01-01T23:00:00-05:00", true, &now()).unwrap();
        assert_eq!(formatted, "11:00PM");
    }

    #[test]
    fn test_day_of_month_only_comparison() {
        // Same day-of-month a month later is not flagged
        let formatted = format_display_time("2024-02-01T09:00:00Z", true, &now()).unwrap();
        assert_eq!(formatted, "9:00AM");

        // A past day is flagged all the same
        let formatted = format_display_time("2023-12-31T21:00:00Z", true, &now()).unwrap();
        assert_eq!(formatted, "Tomorrow 9:00PM");
    }

    #[test]
    fn test_naive_timestamp_accepted() {
        assert_eq!(
            format_display_time("2024-01-01T09:00", false, &now()).unwrap(),
            "9:00AM"
        );
        assert_eq!(
            format_display_time("2024-01-01T14:45:10", true, &now()).unwrap(),
            "2:45PM"
        );
    }

    #[test]
    fn test_invalid_timestamp_is_error() {
        let err = format_display_time("next tuesday", true, &now()).unwrap_err();
        assert!(matches!(err, Error::TimeParse { ref input, .. } if input == "next tuesday"));
    }

    #[test]
    fn test_fetch_window() {
        let local = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 0, 0)
            .unwrap();
        let (time_min, time_max) =
            fetch_window(&local, DEFAULT_LOOKBACK_HOURS, DEFAULT_LOOKAHEAD_HOURS);

        assert_eq!(time_min, Utc.with_ymd_and_hms(2024, 1, 1, 4, 0, 0).unwrap());
        assert_eq!(time_max, Utc.with_ymd_and_hms(2024, 1, 2, 22, 0, 0).unwrap());
    }
}
