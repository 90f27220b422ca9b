//! Scheme model: a named, ordered table of per-level wait intervals.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SrsError};
use crate::timespan::{self, TimeSpan};

/// An SRS progression: interval `i` (1-based) is the wait between reaching
/// level `i` and becoming due again. Level 0 ("not yet added") has no
/// interval. The top interval may be the unbounded sentinel, in which case
/// items parked there never come due on their own.
///
/// Intervals are not required to be monotonically increasing; the table is
/// user-editable and callers keep it sorted by convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheme {
    pub name: String,
    pub description: String,
    intervals: Vec<i64>,
}

impl Scheme {
    /// Create a scheme from interval seconds. At least one interval is
    /// required.
    pub fn new(name: String, description: String, intervals: Vec<i64>) -> Result<Self> {
        if intervals.is_empty() {
            return Err(SrsError::EmptyScheme);
        }
        Ok(Self {
            name,
            description,
            intervals,
        })
    }

    /// Create a scheme from interval strings ("4 hours", "infinity", ...).
    pub fn from_spans<S: AsRef<str>>(name: &str, description: &str, spans: &[S]) -> Result<Self> {
        let intervals = spans
            .iter()
            .map(|s| TimeSpan::parse(s.as_ref()).map(|t| t.total_seconds()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(name.to_string(), description.to_string(), intervals)
    }

    /// The stock scheme seeded on first run.
    pub fn standard() -> Self {
        Self::from_spans(
            "Default",
            "Standard progression for new collections",
            &["4 hours", "1 day", "3 days", "1 week", "1 month", "infinity"],
        )
        .expect("standard scheme is well formed")
    }

    /// Number of levels (the maximum level N).
    pub fn level_count(&self) -> u32 {
        self.intervals.len() as u32
    }

    /// Wait time in seconds after reaching `level`. None for level 0 or
    /// beyond the table.
    pub fn interval(&self, level: u32) -> Option<i64> {
        if level == 0 {
            return None;
        }
        self.intervals.get(level as usize - 1).copied()
    }

    /// The raw interval table, index 0 holding level 1's wait.
    pub fn intervals(&self) -> &[i64] {
        &self.intervals
    }

    /// True when `level` carries the unbounded sentinel interval.
    pub fn is_unbounded_at(&self, level: u32) -> bool {
        self.interval(level).is_some_and(timespan::is_unbounded)
    }

    /// Interval table rendered as canonical span strings.
    pub fn interval_spans(&self) -> Vec<String> {
        self.intervals
            .iter()
            .map(|&secs| TimeSpan::from_seconds(secs).to_string())
            .collect()
    }
}

// Wire format: `{ name, description, intervals: [string, ...] }` with each
// interval as its canonical time-span string. The level-0 slot is implicit
// and never serialized.

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            name: &'a str,
            description: &'a str,
            intervals: Vec<String>,
        }

        Wire {
            name: &self.name,
            description: &self.description,
            intervals: self.interval_spans(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Wire {
            name: String,
            description: String,
            intervals: Vec<String>,
        }

        let wire = Wire::deserialize(deserializer)?;
        Scheme::from_spans(&wire.name, &wire.description, &wire.intervals)
            .map_err(D::Error::custom)
    }
}
