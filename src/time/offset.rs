//! Target date parsing and day-offset arithmetic

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};

/// Format accepted for the target date
pub const TARGET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a target date in strict `YYYY-MM-DD` form
pub fn parse_target_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), TARGET_DATE_FORMAT).map_err(|e| {
        Error::InvalidTargetDate {
            value: value.to_string(),
            source: e,
        }
    })
}

/// Whole calendar days from `target` to the UTC date of `observed`
///
/// Both sides are truncated to midnight UTC first, so the time of day never
/// matters. Positive when `observed` falls after the target date.
pub fn day_offset(target: NaiveDate, observed: &DateTime<Utc>) -> i64 {
    let target_midnight = target.and_time(chrono::NaiveTime::MIN).and_utc();
    let observed_midnight = observed.date_naive().and_time(chrono::NaiveTime::MIN).and_utc();

    let diff = observed_midnight.signed_duration_since(target_midnight);
    debug_assert_eq!(diff.num_hours() % 24, 0, "midnight difference must be whole days");

    diff.num_hours() / 24
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn utc(s: &str) -> DateTime<Utc> {
        chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    #[test]
    fn test_parse_target_date() {
        let date = parse_target_date("2024-10-03").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 10, 3).unwrap());

        assert!(parse_target_date("2024-13-01").is_err());
        assert!(parse_target_date("03/10/2024").is_err());
        assert!(parse_target_date("").is_err());
    }

    #[test]
    fn test_same_day_is_zero() {
        let target = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();
        assert_eq!(day_offset(target, &utc("2024-10-03 00:00:00")), 0);
        assert_eq!(day_offset(target, &utc("2024-10-03 12:34:56")), 0);
        assert_eq!(day_offset(target, &utc("2024-10-03 23:59:59")), 0);
    }

    #[test]
    fn test_k_days_apart_any_time_of_day() {
        let target = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();
        let times = ["00:00:00", "06:15:00", "18:45:30", "23:59:59"];

        for k in [0i64, 1, 2, 3, 30, 366, 1000] {
            let day = target + Duration::days(k);
            for t in times {
                let observed = utc(&format!("{} {}", day.format("%Y-%m-%d"), t));
                assert_eq!(day_offset(target, &observed), k, "k={k} at {t}");
            }
        }
    }

    #[test]
    fn test_earlier_date_is_negative() {
        let target = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();
        assert_eq!(day_offset(target, &utc("2024-10-02 23:59:59")), -1);
        assert_eq!(day_offset(target, &utc("2024-09-03 08:00:00")), -30);
        assert_eq!(day_offset(target, &utc("2023-10-03 08:00:00")), -366);
    }

    #[test]
    fn test_offset_uses_utc_calendar_day() {
        // 2024-10-04 01:00 at UTC+8 is still 2024-10-03 in UTC
        let target = NaiveDate::from_ymd_opt(2024, 10, 3).unwrap();
        let east = chrono::FixedOffset::east_opt(8 * 3600).unwrap();
        let observed = east.with_ymd_and_hms(2024, 10, 4, 1, 0, 0).unwrap();
        assert_eq!(day_offset(target, &observed.with_timezone(&Utc)), 0);
    }
}
