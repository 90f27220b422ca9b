//! Scheme management and migration orchestration.
//!
//! The shell collects a [`MigrationPlan`] per affected language (its
//! connector-drag editor produces exactly that data structure); these
//! functions validate, migrate, and only then touch scheme metadata.

use std::collections::BTreeMap;

use chrono::Utc;
use srs_core::{
    plan_migration, LapsePolicy, MigrationPlan, Mode, Scheme, SchemeRegistry, SrsError, TimeSpan,
};
use tracing::info;

use super::ServiceError;
use crate::db::SqliteStore;

/// Outcome of a completed migration.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MigrationReport {
    pub items_moved: usize,
}

pub fn list_schemes(store: &SqliteStore) -> Result<Vec<Scheme>, ServiceError> {
    let registry = store.load_registry()?;
    Ok(registry.schemes().cloned().collect())
}

pub fn create_scheme(
    store: &SqliteStore,
    name: &str,
    description: &str,
    spans: &[String],
) -> Result<Scheme, ServiceError> {
    let mut registry = store.load_registry()?;
    let scheme = registry
        .create_scheme(name, description, parse_intervals(spans)?)?
        .clone();
    store.save_scheme(&scheme)?;
    info!(name, levels = scheme.level_count(), "created scheme");
    Ok(scheme)
}

/// Delete a scheme no language points at anymore. Dependent languages must
/// be migrated to a replacement first.
pub fn delete_scheme(store: &SqliteStore, name: &str) -> Result<(), ServiceError> {
    let mut registry = store.load_registry()?;
    registry.delete_scheme(name)?;
    store.delete_scheme(name)?;
    info!(name, "deleted scheme");
    Ok(())
}

/// Point a language at a scheme. Assumes any required migration has
/// already completed; creates the language row on first use.
pub fn switch_scheme(
    store: &SqliteStore,
    language: &str,
    scheme_name: &str,
) -> Result<(), ServiceError> {
    let mut registry = store.load_registry()?;
    registry.switch_scheme(language, scheme_name)?;
    store.set_language_scheme(language, scheme_name)?;
    info!(language, scheme = scheme_name, "switched scheme");
    Ok(())
}

pub fn set_lapse_policy(
    store: &SqliteStore,
    language: &str,
    policy: LapsePolicy,
) -> Result<(), ServiceError> {
    store.set_lapse_policy(language, policy)?;
    info!(language, policy = policy.as_str(), "set lapse policy");
    Ok(())
}

/// Non-empty languages that must be migrated before `scheme_name` is
/// edited or deleted. Empty languages only need a pointer swap.
pub fn languages_needing_migration(
    store: &SqliteStore,
    scheme_name: &str,
) -> Result<Vec<String>, ServiceError> {
    let registry = store.load_registry()?;
    if registry.get(scheme_name).is_none() {
        return Err(SrsError::SchemeNotFound {
            name: scheme_name.to_string(),
        }
        .into());
    }
    non_empty_languages(store, &registry, scheme_name)
}

/// Move every leveled item of `language` onto `new_scheme_name` under
/// `plan`, then switch the language's pointer. The whole batch is one
/// store transaction; validation failures abort before any write.
pub fn migrate_language(
    store: &SqliteStore,
    language: &str,
    new_scheme_name: &str,
    plan: &MigrationPlan,
) -> Result<MigrationReport, ServiceError> {
    let registry = store.load_registry()?;
    let old = registry
        .scheme_for(language)
        .cloned()
        .ok_or_else(|| ServiceError {
            message: format!("no scheme assigned to language {language:?}"),
        })?;
    let new = registry
        .get(new_scheme_name)
        .cloned()
        .ok_or_else(|| SrsError::SchemeNotFound {
            name: new_scheme_name.to_string(),
        })?;

    let now = Utc::now();
    let mut batches = Vec::new();
    for mode in Mode::ALL {
        let items = store.get_all_items_with_level(mode, language)?;
        if items.is_empty() {
            continue;
        }
        batches.push((mode, plan_migration(&old, &new, plan, &items, now)?));
    }

    let items_moved = store.apply_migration(language, &batches, now)?;
    store.set_language_scheme(language, new_scheme_name)?;
    info!(
        language,
        from = old.name.as_str(),
        to = new_scheme_name,
        items_moved,
        "migrated language"
    );
    Ok(MigrationReport { items_moved })
}

/// Replace a scheme's identity and interval table. Every non-empty
/// language using it must supply a migration plan; their items are
/// recomputed against the new table before the scheme row is rewritten.
pub fn edit_scheme(
    store: &SqliteStore,
    old_name: &str,
    new_name: &str,
    description: &str,
    spans: &[String],
    plans: &BTreeMap<String, MigrationPlan>,
) -> Result<Scheme, ServiceError> {
    let mut registry = store.load_registry()?;
    let old = registry
        .get(old_name)
        .cloned()
        .ok_or_else(|| SrsError::SchemeNotFound {
            name: old_name.to_string(),
        })?;
    let intervals = parse_intervals(spans)?;
    let new_scheme = Scheme::new(new_name.to_string(), description.to_string(), intervals.clone())?;

    // Plan every language up front so a bad plan aborts with nothing
    // written.
    let now = Utc::now();
    let pending = non_empty_languages(store, &registry, old_name)?;
    let mut staged = Vec::new();
    for language in &pending {
        let plan = plans.get(language).ok_or_else(|| ServiceError {
            message: format!("language {language:?} needs a migration plan"),
        })?;
        let mut batches = Vec::new();
        for mode in Mode::ALL {
            let items = store.get_all_items_with_level(mode, language)?;
            if items.is_empty() {
                continue;
            }
            batches.push((mode, plan_migration(&old, &new_scheme, plan, &items, now)?));
        }
        staged.push((language.clone(), batches));
    }

    // Metadata validation (rename collisions, empty table) still precedes
    // any store write.
    let edited = registry
        .edit_scheme(old_name, new_name, description, intervals)?
        .clone();

    for (language, batches) in &staged {
        let moved = store.apply_migration(language, batches, now)?;
        info!(
            language = language.as_str(),
            moved, "migrated language for scheme edit"
        );
    }
    if old_name == new_name {
        store.save_scheme(&edited)?;
    } else {
        store.rename_scheme(old_name, &edited)?;
    }
    info!(
        old = old_name,
        new = new_name,
        levels = edited.level_count(),
        "edited scheme"
    );
    Ok(edited)
}

fn parse_intervals(spans: &[String]) -> Result<Vec<i64>, ServiceError> {
    spans
        .iter()
        .map(|s| TimeSpan::parse(s).map(|t| t.total_seconds()))
        .collect::<srs_core::Result<Vec<_>>>()
        .map_err(Into::into)
}

fn non_empty_languages(
    store: &SqliteStore,
    registry: &SchemeRegistry,
    scheme_name: &str,
) -> Result<Vec<String>, ServiceError> {
    let mut counts = BTreeMap::new();
    for language in registry.languages_using(scheme_name) {
        let count = store.count_items(&language)?;
        counts.insert(language, count);
    }
    Ok(registry.non_empty_languages_using(scheme_name, |language| {
        counts.get(language).is_some_and(|count| *count > 0)
    }))
}
