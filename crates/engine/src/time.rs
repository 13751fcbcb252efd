//! Time-of-day primitives.
//!
//! Every other module compares times by subtraction and ordering on a
//! single numeric representation (minutes since midnight) instead of
//! re-parsing labels. Dates are timezone-naive: a calendar date is a pure
//! year/month/day triple and is never shifted by a local offset.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{EngineError, ResultEngine};

/// Start of the bookable window, 07:30.
pub const OPENING: TimeOfDay = TimeOfDay(7 * 60 + 30);
/// End of the bookable window, 17:30.
pub const CLOSING: TimeOfDay = TimeOfDay(17 * 60 + 30);

/// Minutes in a booking step.
pub const SLOT_STEP_MINUTES: u16 = 30;

/// A time of day as minutes since midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> ResultEngine<Self> {
        if minutes >= 24 * 60 {
            return Err(EngineError::Parse(format!(
                "minutes out of range: {minutes}"
            )));
        }
        Ok(Self(minutes))
    }

    /// Parses a 12-hour or 24-hour time label.
    ///
    /// Accepted forms: `"14:30"`, `"2:30 PM"`, `"12:05am"`. The meridiem
    /// marker may be upper or lower case, with or without a leading space.
    pub fn parse(label: &str) -> ResultEngine<Self> {
        let trimmed = label.trim();
        let (clock, meridiem) = split_meridiem(trimmed)?;

        let (hour_str, minute_str) = clock
            .split_once(':')
            .ok_or_else(|| EngineError::Parse(format!("malformed time: {label}")))?;
        let hour: u16 = hour_str
            .trim()
            .parse()
            .map_err(|_| EngineError::Parse(format!("malformed hour: {label}")))?;
        let minute: u16 = minute_str
            .trim()
            .parse()
            .map_err(|_| EngineError::Parse(format!("malformed minute: {label}")))?;

        if minute > 59 {
            return Err(EngineError::Parse(format!("minute out of range: {label}")));
        }

        let hour = match meridiem {
            None => {
                if hour > 23 {
                    return Err(EngineError::Parse(format!("hour out of range: {label}")));
                }
                hour
            }
            Some(meridiem) => {
                if hour == 0 || hour > 12 {
                    return Err(EngineError::Parse(format!("hour out of range: {label}")));
                }
                match meridiem {
                    Meridiem::Am => {
                        if hour == 12 {
                            0
                        } else {
                            hour
                        }
                    }
                    Meridiem::Pm => {
                        if hour == 12 {
                            12
                        } else {
                            hour + 12
                        }
                    }
                }
            }
        };

        Ok(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    /// Hours since midnight as a real number, e.g. `14:30` → `14.5`.
    pub fn decimal_hours(self) -> f64 {
        f64::from(self.0) / 60.0
    }

    /// Whether the time falls on a half-hour boundary.
    pub fn is_half_hour_aligned(self) -> bool {
        self.0 % SLOT_STEP_MINUTES == 0
    }

    /// 12-hour label, e.g. `14:45` → `"2:45 PM"`.
    pub fn format_12h(self) -> String {
        let hour = self.0 / 60;
        let minute = self.0 % 60;
        let meridiem = if hour >= 12 { "PM" } else { "AM" };
        let hour12 = match hour % 12 {
            0 => 12,
            h => h,
        };
        format!("{hour12}:{minute:02} {meridiem}")
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Duration in decimal hours between two times of day.
///
/// Callers reject non-positive durations as a validation error; the
/// subtraction itself is total.
pub fn duration_hours(start: TimeOfDay, end: TimeOfDay) -> f64 {
    end.decimal_hours() - start.decimal_hours()
}

/// Day-of-week grid column, Sunday = 0 through Saturday = 6.
pub fn day_index_of(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

#[derive(Clone, Copy)]
enum Meridiem {
    Am,
    Pm,
}

fn split_meridiem(label: &str) -> ResultEngine<(&str, Option<Meridiem>)> {
    let lower = label.to_ascii_lowercase();
    if let Some(stripped) = lower.strip_suffix("am") {
        let clock_len = stripped.trim_end().len();
        return Ok((&label[..clock_len], Some(Meridiem::Am)));
    }
    if let Some(stripped) = lower.strip_suffix("pm") {
        let clock_len = stripped.trim_end().len();
        return Ok((&label[..clock_len], Some(Meridiem::Pm)));
    }
    if lower
        .chars()
        .any(|c| c.is_ascii_alphabetic())
    {
        return Err(EngineError::Parse(format!(
            "unrecognized meridiem marker: {label}"
        )));
    }
    Ok((label, None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_24_hour_labels() {
        assert_eq!(TimeOfDay::parse("14:30").unwrap().decimal_hours(), 14.5);
        assert_eq!(TimeOfDay::parse("00:00").unwrap().minutes(), 0);
        assert_eq!(TimeOfDay::parse("23:59").unwrap().minutes(), 23 * 60 + 59);
    }

    #[test]
    fn parses_12_hour_labels() {
        assert_eq!(TimeOfDay::parse("2:45 PM").unwrap().decimal_hours(), 14.75);
        assert_eq!(TimeOfDay::parse("12:05am").unwrap().minutes(), 5);
        assert_eq!(TimeOfDay::parse("12:00 PM").unwrap().minutes(), 12 * 60);
    }

    #[test]
    fn rejects_malformed_labels() {
        for label in ["", "1430", "25:00", "10:60", "ten:30", "9:15 XM", "0:30 AM"] {
            assert!(
                matches!(TimeOfDay::parse(label), Err(EngineError::Parse(_))),
                "expected parse failure for {label:?}"
            );
        }
    }

    #[test]
    fn duration_is_positive_iff_end_after_start() {
        let start = TimeOfDay::parse("09:00").unwrap();
        let end = TimeOfDay::parse("10:30").unwrap();
        assert_eq!(duration_hours(start, end), 1.5);
        assert!(duration_hours(end, start) < 0.0);
        assert_eq!(duration_hours(start, start), 0.0);
    }

    #[test]
    fn day_index_starts_on_sunday() {
        // 2025-11-16 is a Sunday.
        let sunday = NaiveDate::from_ymd_opt(2025, 11, 16).unwrap();
        assert_eq!(day_index_of(sunday), 0);
        assert_eq!(day_index_of(sunday + chrono::Days::new(4)), 4);
        assert_eq!(day_index_of(sunday + chrono::Days::new(6)), 6);
    }

    #[test]
    fn formats_12_hour_labels() {
        assert_eq!(TimeOfDay::parse("14:45").unwrap().format_12h(), "2:45 PM");
        assert_eq!(TimeOfDay::parse("00:10").unwrap().format_12h(), "12:10 AM");
        assert_eq!(TimeOfDay::parse("12:00").unwrap().format_12h(), "12:00 PM");
    }

    #[test]
    fn half_hour_alignment() {
        assert!(TimeOfDay::parse("07:30").unwrap().is_half_hour_aligned());
        assert!(!TimeOfDay::parse("07:45").unwrap().is_half_hour_aligned());
    }
}
