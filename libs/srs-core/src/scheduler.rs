//! Level-transition policy and due-date computation.

use chrono::{DateTime, Duration, Utc};

use crate::scheme::Scheme;
use crate::types::{ItemState, LapsePolicy};

/// Timestamp `wait_seconds` after `now`, saturating at the far end of the
/// representable range so unbounded sentinel waits never wrap.
pub fn due_after(now: DateTime<Utc>, wait_seconds: i64) -> DateTime<Utc> {
    now.checked_add_signed(Duration::seconds(wait_seconds))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Scheduler for the single scheme in effect for a mode/language.
///
/// Pure transitions over [`ItemState`]; persistence and the scoring hook
/// are wired up by the caller.
#[derive(Debug, Clone)]
pub struct Scheduler {
    scheme: Scheme,
    lapse_policy: LapsePolicy,
}

impl Scheduler {
    pub fn new(scheme: Scheme) -> Self {
        Self::with_policy(scheme, LapsePolicy::default())
    }

    pub fn with_policy(scheme: Scheme, lapse_policy: LapsePolicy) -> Self {
        Self {
            scheme,
            lapse_policy,
        }
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    /// Next level after an answer.
    ///
    /// Correct answers climb one level and saturate at the top. Wrong
    /// answers follow the lapse policy but never drop an added item back
    /// to level 0; removing an item is a separate explicit action. Level 0
    /// only moves on a correct answer.
    pub fn next_level(&self, current: u32, correct: bool) -> u32 {
        let top = self.scheme.level_count();
        if correct {
            return (current + 1).min(top);
        }
        if current <= 1 {
            return current;
        }
        match self.lapse_policy {
            LapsePolicy::StepDown => current - 1,
            LapsePolicy::ResetToFirst => 1,
        }
    }

    /// Review date for an item that just reached `level`. None for level 0.
    pub fn due_date(&self, level: u32, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let wait = self.scheme.interval(level)?;
        Some(due_after(now, wait))
    }

    /// Apply an answer: level transition plus recomputed review date.
    pub fn schedule(&self, state: &ItemState, correct: bool, now: DateTime<Utc>) -> ItemState {
        let level = self.next_level(state.level, correct);
        ItemState {
            level,
            review_date: self.due_date(level, now),
        }
    }
}
