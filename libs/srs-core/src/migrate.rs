//! Migration planner: recompute level and review date for a population of
//! items when the active scheme's interval table changes shape.
//!
//! The GUI builds a [`MigrationPlan`] interactively; this module only sees
//! the resulting data structure. Planning is pure: validation runs before
//! any date math, and the caller persists the emitted updates in a single
//! store transaction per language.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};
use crate::scheduler::due_after;
use crate::scheme::Scheme;

/// How an item's position within its new interval is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modifier {
    /// "=": keep the absolute remaining wait unchanged.
    #[serde(rename = "=")]
    Keep,
    /// "+": push to the far edge, a full fresh interval.
    #[serde(rename = "+")]
    Push,
    /// "-": pull to the near edge, due immediately.
    #[serde(rename = "-")]
    Pull,
    /// "~": keep the same fractional position within the interval.
    #[serde(rename = "~")]
    Rescale,
}

impl Modifier {
    pub fn as_char(self) -> char {
        match self {
            Self::Keep => '=',
            Self::Push => '+',
            Self::Pull => '-',
            Self::Rescale => '~',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '=' => Some(Self::Keep),
            '+' => Some(Self::Push),
            '-' => Some(Self::Pull),
            '~' => Some(Self::Rescale),
            _ => None,
        }
    }
}

/// One endpoint of a migration edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationTarget {
    pub level: u32,
    pub modifier: Modifier,
}

impl MigrationTarget {
    pub fn new(level: u32, modifier: Modifier) -> Self {
        Self { level, modifier }
    }
}

/// Mapping from old level to its new-level targets, kept sorted by target
/// level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationPlan {
    edges: BTreeMap<u32, Vec<MigrationTarget>>,
}

impl MigrationPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every level 1..=`levels` straight onto the same index with "=".
    pub fn identity(levels: u32) -> Self {
        let mut plan = Self::new();
        for level in 1..=levels {
            plan.insert(level, vec![MigrationTarget::new(level, Modifier::Keep)]);
        }
        plan
    }

    pub fn insert(&mut self, old_level: u32, mut targets: Vec<MigrationTarget>) {
        targets.sort_by_key(|t| t.level);
        self.edges.insert(old_level, targets);
    }

    pub fn targets(&self, old_level: u32) -> Option<&[MigrationTarget]> {
        self.edges.get(&old_level).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Check totality and the non-crossing invariant.
    ///
    /// Every populated old level must have at least one target; every
    /// target must fall within the new scheme's range; and for any two
    /// entries `oldA < oldB`, A's lowest target may not sit above B's
    /// highest, which would invert the maturity ordering. The crossing
    /// check covers all entries, populated or not.
    pub fn validate(
        &self,
        populated_levels: impl IntoIterator<Item = u32>,
        new_level_count: u32,
    ) -> Result<()> {
        for level in populated_levels {
            match self.edges.get(&level) {
                Some(targets) if !targets.is_empty() => {}
                _ => return Err(SrsError::IncompletePlan { level }),
            }
        }

        for targets in self.edges.values() {
            for target in targets {
                if target.level == 0 || target.level > new_level_count {
                    return Err(SrsError::LevelOutOfRange {
                        level: target.level,
                        max: new_level_count,
                    });
                }
            }
        }

        let entries: Vec<(u32, &Vec<MigrationTarget>)> = self
            .edges
            .iter()
            .filter(|(_, targets)| !targets.is_empty())
            .map(|(&level, targets)| (level, targets))
            .collect();
        for (i, &(lower, lower_targets)) in entries.iter().enumerate() {
            let lower_min = lower_targets.iter().map(|t| t.level).min().unwrap_or(0);
            for &(upper, upper_targets) in &entries[i + 1..] {
                let upper_max = upper_targets.iter().map(|t| t.level).max().unwrap_or(0);
                if lower_min > upper_max {
                    return Err(SrsError::CrossingConstraint { lower, upper });
                }
            }
        }

        Ok(())
    }
}

/// Snapshot of one item fed into planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationItem {
    pub id: String,
    pub level: u32,
    pub review_date: Option<DateTime<Utc>>,
}

/// Recomputed placement for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationUpdate {
    pub id: String,
    pub level: u32,
    pub review_date: Option<DateTime<Utc>>,
}

/// Recompute every item's level and review date under `plan`.
///
/// Emits one update per leveled input item; level-0 items are not part of
/// a migration and are skipped. Items sharing an old level with several
/// targets are sorted by id and striped round-robin across the target
/// list, so the same input set always produces the same split.
pub fn plan_migration(
    old: &Scheme,
    new: &Scheme,
    plan: &MigrationPlan,
    items: &[MigrationItem],
    now: DateTime<Utc>,
) -> Result<Vec<MigrationUpdate>> {
    let populated: BTreeSet<u32> = items
        .iter()
        .filter(|item| item.level > 0)
        .map(|item| item.level)
        .collect();

    for &level in &populated {
        if level > old.level_count() {
            return Err(SrsError::LevelOutOfRange {
                level,
                max: old.level_count(),
            });
        }
    }
    plan.validate(populated.iter().copied(), new.level_count())?;

    let mut by_level: BTreeMap<u32, Vec<&MigrationItem>> = BTreeMap::new();
    for item in items.iter().filter(|item| item.level > 0) {
        by_level.entry(item.level).or_default().push(item);
    }

    let mut updates = Vec::with_capacity(items.len());
    for (level, mut group) in by_level {
        group.sort_by(|a, b| a.id.cmp(&b.id));
        let targets = plan
            .targets(level)
            .ok_or(SrsError::IncompletePlan { level })?;
        let old_wait = old.interval(level).unwrap_or(0);

        for (idx, item) in group.into_iter().enumerate() {
            let target = targets[idx % targets.len()];
            let new_wait = new.interval(target.level).ok_or(SrsError::LevelOutOfRange {
                level: target.level,
                max: new.level_count(),
            })?;
            updates.push(MigrationUpdate {
                id: item.id.clone(),
                level: target.level,
                review_date: Some(project_review_date(item, old_wait, new_wait, target.modifier, now)),
            });
        }
    }

    Ok(updates)
}

fn project_review_date(
    item: &MigrationItem,
    old_wait: i64,
    new_wait: i64,
    modifier: Modifier,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let old_due = item.review_date.unwrap_or(now);
    match modifier {
        Modifier::Keep => old_due.max(now),
        Modifier::Push => due_after(now, new_wait),
        Modifier::Pull => now,
        Modifier::Rescale => {
            let remaining = (old_due - now).num_seconds().clamp(0, old_wait.max(0));
            let elapsed_frac = if old_wait > 0 {
                (old_wait - remaining) as f64 / old_wait as f64
            } else {
                1.0
            };
            due_after(now, (elapsed_frac * new_wait as f64) as i64)
        }
    }
}
