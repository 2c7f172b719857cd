//! Clock time handling for commute targets.
//!
//! Arrival targets are configured as "HH:MM" strings in a local timezone.
//! The mapping API wants absolute instants, so a `ClockTime` is combined
//! with a travel date and a timezone before it is sent anywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

/// Error returned when parsing or placing an invalid time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A wall-clock time of day with minute precision.
///
/// # Examples
///
/// ```
/// use commute_planner::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("09:00").unwrap();
/// assert_eq!(t.to_string(), "09:00");
/// assert!(ClockTime::parse_hhmm("9:00").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Create a clock time from hour and minute.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parse a time from "HH:MM" (24-hour) format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        // Must be exactly 5 characters: HH:MM
        if s.len() != 5 {
            return Err(TimeError::new("expected HH:MM format"));
        }

        let bytes = s.as_bytes();

        if bytes[2] != b':' {
            return Err(TimeError::new("expected colon at position 2"));
        }

        let hour =
            parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new("invalid hour digits"))?;
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        let minute = parse_two_digits(&bytes[3..5])
            .ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        Self::from_hm(hour, minute).ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Place this time on a calendar date in the given timezone.
    ///
    /// Fails if the local time does not exist on that date (a DST gap).
    /// Ambiguous local times resolve to the earlier instant.
    pub fn on_date(&self, date: NaiveDate, tz: Tz) -> Result<DateTime<Utc>, TimeError> {
        tz.from_local_datetime(&date.and_time(self.0))
            .earliest()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(|| TimeError::new("time does not exist in timezone on that date"))
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({self})")
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse two ASCII digits into a number.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// The first Monday-to-Friday date strictly after `today`.
///
/// Commutes are planned for the next working day so that timetable
/// queries always point into the future.
pub fn next_weekday(today: NaiveDate) -> NaiveDate {
    let mut date = today + Duration::days(1);
    while matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
        date += Duration::days(1);
    }
    date
}

/// Format an instant as a 12-hour local clock string, e.g. "08:15 AM".
pub fn format_local(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).format("%I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_valid_times() {
        assert_eq!(ClockTime::parse_hhmm("00:00").unwrap(), ClockTime::from_hm(0, 0).unwrap());
        assert_eq!(ClockTime::parse_hhmm("17:30").unwrap(), ClockTime::from_hm(17, 30).unwrap());
        assert_eq!(ClockTime::parse_hhmm("23:59").unwrap(), ClockTime::from_hm(23, 59).unwrap());
    }

    #[test]
    fn reject_malformed_times() {
        assert!(ClockTime::parse_hhmm("").is_err());
        assert!(ClockTime::parse_hhmm("0900").is_err());
        assert!(ClockTime::parse_hhmm("9:00").is_err());
        assert!(ClockTime::parse_hhmm("09-00").is_err());
        assert!(ClockTime::parse_hhmm("24:00").is_err());
        assert!(ClockTime::parse_hhmm("12:60").is_err());
        assert!(ClockTime::parse_hhmm("ab:cd").is_err());
    }

    #[test]
    fn error_message() {
        let err = ClockTime::parse_hhmm("25:00").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: hour must be 0-23");
    }

    #[test]
    fn display_pads() {
        let t = ClockTime::from_hm(7, 5).unwrap();
        assert_eq!(t.to_string(), "07:05");
        assert_eq!(format!("{t:?}"), "ClockTime(07:05)");
    }

    #[test]
    fn on_date_converts_to_utc() {
        let t = ClockTime::parse_hhmm("09:00").unwrap();
        // New York is UTC-4 in June.
        let instant = t.on_date(date(2024, 6, 3), chrono_tz::America::New_York).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-06-03T13:00:00+00:00");
    }

    #[test]
    fn on_date_rejects_dst_gap() {
        // 02:30 does not exist in New York on the spring-forward date.
        let t = ClockTime::parse_hhmm("02:30").unwrap();
        assert!(t.on_date(date(2024, 3, 10), chrono_tz::America::New_York).is_err());
    }

    #[test]
    fn next_weekday_skips_weekend() {
        // Thursday -> Friday
        assert_eq!(next_weekday(date(2024, 6, 6)), date(2024, 6, 7));
        // Friday -> Monday
        assert_eq!(next_weekday(date(2024, 6, 7)), date(2024, 6, 10));
        // Saturday -> Monday
        assert_eq!(next_weekday(date(2024, 6, 8)), date(2024, 6, 10));
    }

    #[test]
    fn format_local_uses_twelve_hour_clock() {
        let instant = DateTime::parse_from_rfc3339("2024-06-03T21:45:00+00:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_local(instant, chrono_tz::America::New_York), "05:45 PM");
    }
}
