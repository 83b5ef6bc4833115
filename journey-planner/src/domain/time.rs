//! Service-day clock arithmetic.
//!
//! Timetables express times as seconds since the midnight of the service
//! day. A search that runs past midnight keeps counting upwards, so an
//! absolute second of `90_000` is 01:00 on the day after the departure date.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Seconds since the midnight of a service day.
pub type Seconds = u32;

/// Number of seconds in one service day.
pub const SECONDS_PER_DAY: Seconds = 86_400;

/// Error returned when parsing an invalid clock string.
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

/// Returns the seconds elapsed since midnight for an instant.
pub fn seconds_since_midnight(instant: NaiveDateTime) -> Seconds {
    instant.time().num_seconds_from_midnight()
}

/// Splits an absolute second into `(day, second of that day)`.
///
/// # Examples
///
/// ```
/// use journey_planner::domain::split_day;
///
/// assert_eq!(split_day(3_600), (0, 3_600));
/// assert_eq!(split_day(90_000), (1, 3_600));
/// ```
pub fn split_day(seconds: Seconds) -> (u32, Seconds) {
    (seconds / SECONDS_PER_DAY, seconds % SECONDS_PER_DAY)
}

/// The absolute second of a nominal time on a service day.
///
/// `service_day` counts days from the search date and may be negative for
/// trips of an earlier service day still running after midnight. Returns
/// `None` when the instant falls before the search date or out of range.
///
/// # Examples
///
/// ```
/// use journey_planner::domain::service_seconds;
///
/// assert_eq!(service_seconds(1, 3_600), Some(90_000));
/// assert_eq!(service_seconds(-1, 87_000), Some(600));
/// assert_eq!(service_seconds(-1, 600), None);
/// ```
pub fn service_seconds(service_day: i32, nominal: Seconds) -> Option<Seconds> {
    let seconds = i64::from(service_day) * i64::from(SECONDS_PER_DAY) + i64::from(nominal);
    Seconds::try_from(seconds).ok()
}

/// Converts an absolute second relative to `date` into a calendar instant.
pub fn to_datetime(date: NaiveDate, seconds: Seconds) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .checked_add_signed(Duration::seconds(i64::from(seconds)))
        .unwrap_or(NaiveDateTime::MAX)
}

/// Parses a timetable clock string.
///
/// Accepts `HH:MM:SS` or `HH:MM`. Hours may exceed 23 for trips that run
/// past midnight of their service day.
///
/// # Examples
///
/// ```
/// use journey_planner::domain::parse_clock;
///
/// assert_eq!(parse_clock("08:30:00").unwrap(), 30_600);
/// assert_eq!(parse_clock("08:30").unwrap(), 30_600);
/// assert_eq!(parse_clock("25:00:00").unwrap(), 90_000);
/// assert!(parse_clock("8h30").is_err());
/// assert!(parse_clock("08:60:00").is_err());
/// ```
pub fn parse_clock(s: &str) -> Result<Seconds, TimeError> {
    let mut parts = s.split(':');

    let hours = parse_field(parts.next(), "missing hours")?;
    let minutes = parse_field(parts.next(), "missing minutes")?;
    let seconds = match parts.next() {
        Some(field) => parse_field(Some(field), "missing seconds")?,
        None => 0,
    };

    if parts.next().is_some() {
        return Err(TimeError::new("too many fields"));
    }
    if minutes > 59 {
        return Err(TimeError::new("minutes must be 0-59"));
    }
    if seconds > 59 {
        return Err(TimeError::new("seconds must be 0-59"));
    }
    if hours > 47 {
        return Err(TimeError::new("hours must be 0-47"));
    }

    Ok(hours * 3_600 + minutes * 60 + seconds)
}

fn parse_field(field: Option<&str>, missing: &'static str) -> Result<u32, TimeError> {
    let field = field.ok_or_else(|| TimeError::new(missing))?;
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TimeError::new("expected two digits per field"));
    }
    field
        .parse()
        .map_err(|_| TimeError::new("expected two digits per field"))
}

/// Formats seconds as `HH:MM:SS`, letting hours run past 23.
pub fn format_clock(seconds: Seconds) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3_600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    #[test]
    fn seconds_since_midnight_of_instant() {
        let instant = date().and_hms_opt(8, 15, 30).unwrap();
        assert_eq!(seconds_since_midnight(instant), 29_730);
    }

    #[test]
    fn to_datetime_rolls_over_midnight() {
        let instant = to_datetime(date(), SECONDS_PER_DAY + 60);
        assert_eq!(instant.date(), NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(instant.time().num_seconds_from_midnight(), 60);
    }

    #[test]
    fn service_seconds_of_neighbouring_days() {
        assert_eq!(service_seconds(0, 600), Some(600));
        assert_eq!(service_seconds(2, 0), Some(2 * SECONDS_PER_DAY));
        // 24:10 on the previous service day is 00:10 on the search date.
        assert_eq!(service_seconds(-1, 87_000), Some(600));
        assert_eq!(service_seconds(-1, 86_399), None);
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_clock("").is_err());
        assert!(parse_clock("8:00").is_err());
        assert!(parse_clock("08:00:00:00").is_err());
        assert!(parse_clock("08:00:60").is_err());
        assert!(parse_clock("48:00:00").is_err());
        assert!(parse_clock("ab:cd").is_err());
    }

    #[test]
    fn format_pads_fields() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(3_661), "01:01:01");
        assert_eq!(format_clock(90_000), "25:00:00");
    }

    #[test]
    fn error_display() {
        let err = parse_clock("08:61").unwrap_err();
        assert_eq!(err.to_string(), "invalid time: minutes must be 0-59");
    }
}
