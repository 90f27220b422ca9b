//! Core types shared across the SRS engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Test category. Level tracks in different modes are independent even
/// when they refer to the same entry (a kanji's meaning and its on-yomi
/// progress separately).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Vocab,
    KanjiMeaning,
    KanjiOnYomi,
    KanjiKunYomi,
    HanziMeaning,
    HanziReading,
}

impl Mode {
    /// Every mode, in a fixed order.
    pub const ALL: [Mode; 6] = [
        Mode::Vocab,
        Mode::KanjiMeaning,
        Mode::KanjiOnYomi,
        Mode::KanjiKunYomi,
        Mode::HanziMeaning,
        Mode::HanziReading,
    ];

    /// Get the mode name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocab => "vocab",
            Self::KanjiMeaning => "kanji_meaning",
            Self::KanjiOnYomi => "kanji_on_yomi",
            Self::KanjiKunYomi => "kanji_kun_yomi",
            Self::HanziMeaning => "hanzi_meaning",
            Self::HanziReading => "hanzi_reading",
        }
    }

    /// Parse from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "vocab" => Some(Self::Vocab),
            "kanji_meaning" => Some(Self::KanjiMeaning),
            "kanji_on_yomi" => Some(Self::KanjiOnYomi),
            "kanji_kun_yomi" => Some(Self::KanjiKunYomi),
            "hanzi_meaning" => Some(Self::HanziMeaning),
            "hanzi_reading" => Some(Self::HanziReading),
            _ => None,
        }
    }
}

/// Scheduling state of one item under the active scheme.
///
/// Level 0 means the item has never been scheduled; it carries no review
/// date and is excluded from due queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemState {
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_date: Option<DateTime<Utc>>,
}

impl Default for ItemState {
    fn default() -> Self {
        Self {
            level: 0,
            review_date: None,
        }
    }
}

impl ItemState {
    pub fn is_scheduled(&self) -> bool {
        self.level > 0
    }
}

/// Policy applied when an answer is wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapsePolicy {
    /// Step one level down, never below 1.
    StepDown,
    /// Drop straight back to level 1.
    ResetToFirst,
}

impl Default for LapsePolicy {
    fn default() -> Self {
        Self::StepDown
    }
}

impl LapsePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StepDown => "step_down",
            Self::ResetToFirst => "reset_to_first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "step_down" => Some(Self::StepDown),
            "reset_to_first" => Some(Self::ResetToFirst),
            _ => None,
        }
    }
}

/// Scoring collaborator notified on every level transition.
///
/// The scheduler carries no scoring knowledge beyond invoking this hook.
pub trait ScoreHook {
    fn on_level_change(&self, mode: Mode, old_level: u32, new_level: u32);
}

/// Hook that ignores every transition.
#[derive(Debug, Default)]
pub struct NullScoreHook;

impl ScoreHook for NullScoreHook {
    fn on_level_change(&self, _mode: Mode, _old_level: u32, _new_level: u32) {}
}
