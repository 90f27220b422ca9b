//! Human-readable time spans for interval tables.
//!
//! Intervals are entered and displayed as comma-separated `"<count> <unit>"`
//! strings ("1 month, 2 weeks"). Conversion to seconds uses fixed unit
//! sizes: 1 month = 30 days, 1 year = 365 days. This is deliberately not
//! calendar-exact.

use std::fmt;

use crate::error::{Result, SrsError};

const MINUTE: i64 = 60;
const HOUR: i64 = 3_600;
const DAY: i64 = 86_400;
const WEEK: i64 = 7 * DAY;
const MONTH: i64 = 30 * DAY;
const YEAR: i64 = 365 * DAY;

const UNBOUNDED_YEARS: u32 = 8_000_000;

/// Wait time of a terminal level that should never come due on its own.
pub const UNBOUNDED_SECONDS: i64 = UNBOUNDED_YEARS as i64 * YEAR;

/// True for the sentinel wait time used by unbounded terminal levels.
pub fn is_unbounded(seconds: i64) -> bool {
    seconds >= UNBOUNDED_SECONDS
}

/// A duration broken down into display units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeSpan {
    pub years: u32,
    pub months: u32,
    pub weeks: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl TimeSpan {
    /// The sentinel span rendered as "infinity".
    pub fn unbounded() -> Self {
        Self {
            years: UNBOUNDED_YEARS,
            ..Self::default()
        }
    }

    /// Parse a comma-separated list of `"<count> <unit>"` tokens.
    ///
    /// Unit synonyms are accepted ("s", "sec", "seconds", ...). The empty
    /// string is the zero span; the literal "infinity" (case-insensitive)
    /// is the unbounded sentinel. A malformed token fails with
    /// [`SrsError::Format`] naming that token.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }
        if trimmed.eq_ignore_ascii_case("infinity") {
            return Ok(Self::unbounded());
        }

        let mut span = Self::default();
        for raw in trimmed.split(',') {
            let token = raw.trim();
            let bad = || SrsError::Format {
                token: token.to_string(),
            };

            let mut parts = token.split_whitespace();
            let (count, unit) = match (parts.next(), parts.next(), parts.next()) {
                (Some(count), Some(unit), None) => (count, unit),
                _ => return Err(bad()),
            };
            let count: u32 = count.parse().map_err(|_| bad())?;

            match unit.to_ascii_lowercase().as_str() {
                "s" | "sec" | "secs" | "second" | "seconds" => span.seconds += count,
                "m" | "min" | "mins" | "minute" | "minutes" => span.minutes += count,
                "h" | "hr" | "hrs" | "hour" | "hours" => span.hours += count,
                "d" | "day" | "days" => span.days += count,
                "w" | "wk" | "wks" | "week" | "weeks" => span.weeks += count,
                "mo" | "month" | "months" => span.months += count,
                "y" | "yr" | "yrs" | "year" | "years" => span.years += count,
                _ => return Err(bad()),
            }
        }
        Ok(span)
    }

    /// Decompose seconds greedily, largest unit first.
    pub fn from_seconds(total: i64) -> Self {
        if is_unbounded(total) {
            return Self::unbounded();
        }
        let mut rest = total.max(0);
        let years = rest / YEAR;
        rest %= YEAR;
        let months = rest / MONTH;
        rest %= MONTH;
        let weeks = rest / WEEK;
        rest %= WEEK;
        let days = rest / DAY;
        rest %= DAY;
        let hours = rest / HOUR;
        rest %= HOUR;
        let minutes = rest / MINUTE;
        rest %= MINUTE;

        Self {
            years: years as u32,
            months: months as u32,
            weeks: weeks as u32,
            days: days as u32,
            hours: hours as u32,
            minutes: minutes as u32,
            seconds: rest as u32,
        }
    }

    /// Total seconds under the fixed 30-day month / 365-day year convention.
    pub fn total_seconds(&self) -> i64 {
        self.years as i64 * YEAR
            + self.months as i64 * MONTH
            + self.weeks as i64 * WEEK
            + self.days as i64 * DAY
            + self.hours as i64 * HOUR
            + self.minutes as i64 * MINUTE
            + self.seconds as i64
    }

    pub fn is_zero(&self) -> bool {
        self.total_seconds() == 0
    }
}

impl fmt::Display for TimeSpan {
    /// Canonical rendering: non-zero units only, largest to smallest,
    /// pluralized, comma-separated. The zero span renders "0 seconds" and
    /// the sentinel renders "infinity".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if is_unbounded(self.total_seconds()) {
            return f.write_str("infinity");
        }

        let units = [
            (self.years, "year"),
            (self.months, "month"),
            (self.weeks, "week"),
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
            (self.seconds, "second"),
        ];

        let mut wrote = false;
        for (count, name) in units {
            if count == 0 {
                continue;
            }
            if wrote {
                f.write_str(", ")?;
            }
            if count == 1 {
                write!(f, "1 {name}")?;
            } else {
                write!(f, "{count} {name}s")?;
            }
            wrote = true;
        }
        if !wrote {
            f.write_str("0 seconds")?;
        }
        Ok(())
    }
}
