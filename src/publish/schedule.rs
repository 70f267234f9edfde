//! Publish-time parsing.
//!
//! Schedule strings are wall-clock times in one fixed zone (KST, +9 by
//! default). The offset is applied as-is: no zone database, no DST.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::error::{Error, Result};

/// Accepted input format
pub const INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";
/// Format the video platform expects for `publishAt`
pub const PUBLISH_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Parse `YYYY-MM-DD HH:MM` written at `utc_offset_hours` into a UTC instant.
pub fn parse_local(input: &str, utc_offset_hours: i32) -> Result<DateTime<Utc>> {
    let local = NaiveDateTime::parse_from_str(input.trim(), INPUT_FORMAT)
        .map_err(|_| Error::ScheduleFormatInvalid(input.to_owned()))?;
    let utc = local - Duration::hours(utc_offset_hours as i64);
    Ok(utc.and_utc())
}

pub fn format_publish_at(instant: &DateTime<Utc>) -> String {
    instant.format(PUBLISH_AT_FORMAT).to_string()
}

/// `parse_local` followed by `format_publish_at`
pub fn publish_at(input: &str, utc_offset_hours: i32) -> Result<String> {
    parse_local(input, utc_offset_hours).map(|t| format_publish_at(&t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kst_noon_is_three_utc() {
        assert_eq!(
            publish_at("2025-01-01 12:00", 9).unwrap(),
            "2025-01-01T03:00:00.000Z"
        );
    }

    #[test]
    fn early_morning_rolls_back_a_day() {
        assert_eq!(
            publish_at("2025-03-01 08:30", 9).unwrap(),
            "2025-02-28T23:30:00.000Z"
        );
    }

    #[test]
    fn offset_is_configurable() {
        assert_eq!(
            publish_at("2025-06-15 18:45", 0).unwrap(),
            "2025-06-15T18:45:00.000Z"
        );
        assert_eq!(
            publish_at("2025-06-15 18:45", -5).unwrap(),
            "2025-06-15T23:45:00.000Z"
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert!(parse_local("  2025-01-01 12:00\n", 9).is_ok());
    }

    #[test]
    fn malformed_input_is_rejected() {
        for input in ["not-a-date", "", "2025-01-01", "2025-13-01 12:00", "2025-01-01 25:00"] {
            match parse_local(input, 9) {
                Err(Error::ScheduleFormatInvalid(s)) => assert_eq!(s, input),
                other => panic!("{input:?}: {other:?}"),
            }
        }
    }
}
