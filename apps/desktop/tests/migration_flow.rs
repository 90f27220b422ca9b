//! End-to-end scheme lifecycle tests against an in-memory store.

use std::collections::BTreeMap;

use glyphcards_desktop::db::SqliteStore;
use glyphcards_desktop::service::{
    delete_scheme, edit_scheme, languages_needing_migration, migrate_language, switch_scheme,
};
use glyphcards_desktop::service::study::add_item;
use pretty_assertions::assert_eq;
use srs_core::{MigrationPlan, MigrationTarget, Mode, Modifier};

fn japanese_store() -> SqliteStore {
    let store = SqliteStore::open_in_memory().unwrap();
    switch_scheme(&store, "Japanese", "Default").unwrap();
    store
}

/// Editing an in-use scheme to insert a level: items mapped onto the same
/// wait keep their absolute due dates; items above the insertion point
/// shift up one index.
#[test]
fn edit_in_use_scheme_inserts_a_level() {
    let store = japanese_store();

    for i in 0..50 {
        add_item(&store, "Japanese", Mode::Vocab, &format!("word-{i:02}"), Some(2)).unwrap();
    }
    for i in 0..10 {
        add_item(&store, "Japanese", Mode::Vocab, &format!("old-{i:02}"), Some(3)).unwrap();
    }

    let before: Vec<_> = (0..50)
        .map(|i| {
            store
                .get_item(&format!("word-{i:02}"), Mode::Vocab)
                .unwrap()
                .unwrap()
                .review_date
        })
        .collect();

    // "2 days" slots in between "1 day" and "3 days".
    let spans: Vec<String> = ["4 hours", "1 day", "2 days", "3 days", "1 week", "1 month", "infinity"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let mut plan = MigrationPlan::new();
    plan.insert(1, vec![MigrationTarget::new(1, Modifier::Keep)]);
    plan.insert(2, vec![MigrationTarget::new(2, Modifier::Keep)]);
    for old_level in 3..=6 {
        plan.insert(
            old_level,
            vec![MigrationTarget::new(old_level + 1, Modifier::Keep)],
        );
    }
    let plans = BTreeMap::from([("Japanese".to_string(), plan)]);

    let edited = edit_scheme(&store, "Default", "Default", "with a two-day step", &spans, &plans)
        .unwrap();
    assert_eq!(edited.level_count(), 7);

    for i in 0..50 {
        let state = store
            .get_item(&format!("word-{i:02}"), Mode::Vocab)
            .unwrap()
            .unwrap();
        assert_eq!(state.level, 2);
        assert_eq!(state.review_date, before[i]);
    }
    for i in 0..10 {
        let state = store
            .get_item(&format!("old-{i:02}"), Mode::Vocab)
            .unwrap()
            .unwrap();
        assert_eq!(state.level, 4);
    }
}

/// Editing a scheme whose non-empty language has no plan must change
/// nothing.
#[test]
fn edit_without_a_plan_is_rejected_before_writing() {
    let store = japanese_store();
    add_item(&store, "Japanese", Mode::Vocab, "word", Some(2)).unwrap();

    let spans: Vec<String> = ["1 day", "1 week"].iter().map(|s| s.to_string()).collect();
    let err = edit_scheme(&store, "Default", "Default", "", &spans, &BTreeMap::new()).unwrap_err();
    assert!(err.message.contains("needs a migration plan"));

    let state = store.get_item("word", Mode::Vocab).unwrap().unwrap();
    assert_eq!(state.level, 2);
    let registry = store.load_registry().unwrap();
    assert_eq!(registry.get("Default").unwrap().level_count(), 6);
}

/// Deleting an in-use scheme fails until its languages are migrated to a
/// replacement and switched over.
#[test]
fn delete_in_use_scheme_requires_migration_first() {
    let store = japanese_store();
    glyphcards_desktop::service::create_scheme(
        &store,
        "Koohii",
        "imported progression",
        &["8 hours", "2 days", "1 week", "2 weeks", "2 months"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    )
    .unwrap();
    switch_scheme(&store, "Japanese", "Koohii").unwrap();

    for i in 0..200 {
        let level = (i % 5) + 1;
        add_item(&store, "Japanese", Mode::Vocab, &format!("word-{i:03}"), Some(level)).unwrap();
    }

    let err = delete_scheme(&store, "Koohii").unwrap_err();
    assert!(err.message.contains("still used by"));
    assert_eq!(
        languages_needing_migration(&store, "Koohii").unwrap(),
        vec!["Japanese".to_string()]
    );

    let sample_before = store.get_item("word-000", Mode::Vocab).unwrap().unwrap();

    let report =
        migrate_language(&store, "Japanese", "Default", &MigrationPlan::identity(5)).unwrap();
    assert_eq!(report.items_moved, 200);

    // "=" keeps every item's absolute due date and level index.
    let sample_after = store.get_item("word-000", Mode::Vocab).unwrap().unwrap();
    assert_eq!(sample_after.level, sample_before.level);
    assert_eq!(sample_after.review_date, sample_before.review_date);

    delete_scheme(&store, "Koohii").unwrap();
    let registry = store.load_registry().unwrap();
    assert!(registry.get("Koohii").is_none());
    assert!(registry.languages_using("Koohii").is_empty());
    assert_eq!(registry.scheme_for("Japanese").unwrap().name, "Default");
}

/// A level fanning out to two targets redistributes its items with none
/// lost or duplicated, and the split is reproducible.
#[test]
fn fan_out_migration_is_total() {
    let store = japanese_store();
    glyphcards_desktop::service::create_scheme(
        &store,
        "Wide",
        "",
        &["1 day", "1 week", "1 month"]
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>(),
    )
    .unwrap();

    for i in 0..10 {
        add_item(&store, "Japanese", Mode::Vocab, &format!("word-{i}"), Some(2)).unwrap();
    }

    let mut plan = MigrationPlan::new();
    plan.insert(1, vec![MigrationTarget::new(1, Modifier::Keep)]);
    plan.insert(
        2,
        vec![
            MigrationTarget::new(2, Modifier::Keep),
            MigrationTarget::new(3, Modifier::Push),
        ],
    );

    let report = migrate_language(&store, "Japanese", "Wide", &plan).unwrap();
    assert_eq!(report.items_moved, 10);

    let mut by_level = BTreeMap::new();
    for i in 0..10 {
        let state = store.get_item(&format!("word-{i}"), Mode::Vocab).unwrap().unwrap();
        *by_level.entry(state.level).or_insert(0) += 1;
    }
    assert_eq!(by_level, BTreeMap::from([(2u32, 5), (3u32, 5)]));
}
