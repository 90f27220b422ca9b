//! Study session operations.

use chrono::{DateTime, Utc};
use srs_core::{ItemState, Mode, Scheduler, ScoreHook};
use tracing::debug;

use super::ServiceError;
use crate::db::SqliteStore;

#[derive(Debug, serde::Deserialize)]
pub struct AnswerRequest {
    pub item_id: String,
    pub mode: Mode,
    pub language: String,
    pub correct: bool,
}

#[derive(Debug, serde::Serialize)]
pub struct AnswerResponse {
    pub old_level: u32,
    pub new_level: u32,
    pub review_date: Option<String>,
}

/// Schedule a newly added entry. Level defaults to 1.
pub fn add_item(
    store: &SqliteStore,
    language: &str,
    mode: Mode,
    item_id: &str,
    level: Option<u32>,
) -> Result<ItemState, ServiceError> {
    let config = store.language_config(language)?;
    let scheduler = Scheduler::with_policy(config.scheme, config.lapse_policy);
    let now = Utc::now();
    let level = level.unwrap_or(1).min(scheduler.scheme().level_count());
    let state = ItemState {
        level,
        review_date: scheduler.due_date(level, now),
    };
    store.set_item(item_id, mode, language, &state, now)?;
    debug!(item_id, mode = mode.as_str(), level, "added item");
    Ok(state)
}

/// Apply a test answer: level transition, fresh review date, score hook.
pub fn submit_answer(
    store: &SqliteStore,
    hook: &dyn ScoreHook,
    request: &AnswerRequest,
) -> Result<AnswerResponse, ServiceError> {
    let config = store.language_config(&request.language)?;
    let scheduler = Scheduler::with_policy(config.scheme, config.lapse_policy);

    let old = store
        .get_item(&request.item_id, request.mode)?
        .unwrap_or_default();
    let now = Utc::now();
    let new_state = scheduler.schedule(&old, request.correct, now);

    store.set_item(
        &request.item_id,
        request.mode,
        &request.language,
        &new_state,
        now,
    )?;
    hook.on_level_change(request.mode, old.level, new_state.level);
    debug!(
        item_id = request.item_id.as_str(),
        mode = request.mode.as_str(),
        correct = request.correct,
        old_level = old.level,
        new_level = new_state.level,
        "answer applied"
    );

    Ok(AnswerResponse {
        old_level: old.level,
        new_level: new_state.level,
        review_date: new_state.review_date.map(|d| d.to_rfc3339()),
    })
}

/// Due item ids for a mode. `since` restricts to items whose state was
/// touched after that point, for topping up a running session.
pub fn due_queue(
    store: &SqliteStore,
    mode: Mode,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<String>, ServiceError> {
    store
        .get_due_items(mode, Utc::now(), since)
        .map_err(Into::into)
}

/// Put an item back at level 1 with a fresh first interval. This is how
/// an item parked at an unbounded top level re-enters rotation.
pub fn reset_item(
    store: &SqliteStore,
    language: &str,
    mode: Mode,
    item_id: &str,
) -> Result<ItemState, ServiceError> {
    add_item(store, language, mode, item_id, Some(1))
}

pub fn remove_item(
    store: &SqliteStore,
    mode: Mode,
    item_id: &str,
) -> Result<bool, ServiceError> {
    store.remove_item(item_id, mode).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use srs_core::NullScoreHook;
    use std::cell::RefCell;

    struct RecordingHook {
        changes: RefCell<Vec<(Mode, u32, u32)>>,
    }

    impl RecordingHook {
        fn new() -> Self {
            Self {
                changes: RefCell::new(Vec::new()),
            }
        }
    }

    impl ScoreHook for RecordingHook {
        fn on_level_change(&self, mode: Mode, old_level: u32, new_level: u32) {
            self.changes.borrow_mut().push((mode, old_level, new_level));
        }
    }

    fn japanese_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set_language_scheme("Japanese", "Default").unwrap();
        store
    }

    fn answer(item_id: &str, correct: bool) -> AnswerRequest {
        AnswerRequest {
            item_id: item_id.to_string(),
            mode: Mode::KanjiMeaning,
            language: "Japanese".to_string(),
            correct,
        }
    }

    #[test]
    fn added_item_starts_at_level_one() {
        let store = japanese_store();
        let state = add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();
        assert_eq!(state.level, 1);
        assert!(state.review_date.is_some());
    }

    #[test]
    fn correct_answer_climbs_and_notifies_hook() {
        let store = japanese_store();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();

        let hook = RecordingHook::new();
        let response = submit_answer(&store, &hook, &answer("犬", true)).unwrap();
        assert_eq!(response.old_level, 1);
        assert_eq!(response.new_level, 2);
        assert_eq!(
            hook.changes.borrow().as_slice(),
            &[(Mode::KanjiMeaning, 1, 2)]
        );
    }

    #[test]
    fn wrong_answer_floors_at_level_one() {
        let store = japanese_store();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();

        let response = submit_answer(&store, &NullScoreHook, &answer("犬", false)).unwrap();
        assert_eq!(response.new_level, 1);
    }

    #[test]
    fn reset_to_first_policy_applies_per_language() {
        let store = japanese_store();
        store
            .set_lapse_policy("Japanese", srs_core::LapsePolicy::ResetToFirst)
            .unwrap();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", Some(4)).unwrap();

        let response = submit_answer(&store, &NullScoreHook, &answer("犬", false)).unwrap();
        assert_eq!(response.new_level, 1);
    }

    #[test]
    fn fresh_item_is_not_immediately_due() {
        let store = japanese_store();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();
        let due = due_queue(&store, Mode::KanjiMeaning, None).unwrap();
        assert!(due.is_empty());
    }

    #[test]
    fn zero_interval_item_is_due_at_once() {
        let store = japanese_store();
        let quick = srs_core::Scheme::from_spans("Quick", "", &["0 seconds", "1 day"]).unwrap();
        store.save_scheme(&quick).unwrap();
        store.set_language_scheme("Japanese", "Quick").unwrap();

        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();
        let due = due_queue(&store, Mode::KanjiMeaning, None).unwrap();
        assert_eq!(due, vec!["犬".to_string()]);
    }

    #[test]
    fn item_at_unbounded_top_level_is_never_due() {
        let store = japanese_store();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", Some(6)).unwrap();
        let due = due_queue(&store, Mode::KanjiMeaning, None).unwrap();
        assert!(due.is_empty());

        // Manual reset brings it back into rotation on its first interval.
        let state = reset_item(&store, "Japanese", Mode::KanjiMeaning, "犬").unwrap();
        assert_eq!(state.level, 1);
    }

    #[test]
    fn remove_item_deletes_the_row() {
        let store = japanese_store();
        add_item(&store, "Japanese", Mode::KanjiMeaning, "犬", None).unwrap();
        assert!(remove_item(&store, Mode::KanjiMeaning, "犬").unwrap());
        assert_eq!(store.get_level("犬", Mode::KanjiMeaning).unwrap(), 0);
        assert!(!remove_item(&store, Mode::KanjiMeaning, "犬").unwrap());
    }
}
