//! Named scheme CRUD with language assignment tracking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SrsError};
use crate::scheme::Scheme;

/// Registry of schemes plus the language -> active-scheme pointers.
///
/// An explicit value the caller owns and passes around; the scheduler
/// receives the resolved [`Scheme`] rather than reading ambient state.
/// Edits and deletes are pure metadata operations: when a scheme with
/// outstanding items changes shape, the caller runs the migration planner
/// first and only then touches the registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemeRegistry {
    schemes: BTreeMap<String, Scheme>,
    assignments: BTreeMap<String, String>,
}

impl SchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-built scheme, e.g. when loading from storage.
    pub fn add(&mut self, scheme: Scheme) -> Result<()> {
        if self.schemes.contains_key(&scheme.name) {
            return Err(SrsError::DuplicateName { name: scheme.name });
        }
        self.schemes.insert(scheme.name.clone(), scheme);
        Ok(())
    }

    pub fn create_scheme(
        &mut self,
        name: &str,
        description: &str,
        intervals: Vec<i64>,
    ) -> Result<&Scheme> {
        if self.schemes.contains_key(name) {
            return Err(SrsError::DuplicateName {
                name: name.to_string(),
            });
        }
        let scheme = Scheme::new(name.to_string(), description.to_string(), intervals)?;
        Ok(self.schemes.entry(name.to_string()).or_insert(scheme))
    }

    /// Replace a scheme's identity and interval table. Renaming is allowed
    /// and re-points every language assignment at the new name.
    pub fn edit_scheme(
        &mut self,
        old_name: &str,
        new_name: &str,
        description: &str,
        intervals: Vec<i64>,
    ) -> Result<&Scheme> {
        if !self.schemes.contains_key(old_name) {
            return Err(SrsError::SchemeNotFound {
                name: old_name.to_string(),
            });
        }
        if new_name != old_name && self.schemes.contains_key(new_name) {
            return Err(SrsError::DuplicateName {
                name: new_name.to_string(),
            });
        }
        let scheme = Scheme::new(new_name.to_string(), description.to_string(), intervals)?;

        self.schemes.remove(old_name);
        for target in self.assignments.values_mut() {
            if target == old_name {
                *target = new_name.to_string();
            }
        }
        Ok(self.schemes.entry(new_name.to_string()).or_insert(scheme))
    }

    /// Remove a scheme nothing points at anymore.
    pub fn delete_scheme(&mut self, name: &str) -> Result<()> {
        if !self.schemes.contains_key(name) {
            return Err(SrsError::SchemeNotFound {
                name: name.to_string(),
            });
        }
        let languages = self.languages_using(name);
        if !languages.is_empty() {
            return Err(SrsError::SchemeInUse {
                name: name.to_string(),
                languages,
            });
        }
        self.schemes.remove(name);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.schemes.get(name)
    }

    pub fn schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.schemes.values()
    }

    /// Languages whose active scheme is `name`, sorted.
    pub fn languages_using(&self, name: &str) -> Vec<String> {
        self.assignments
            .iter()
            .filter(|(_, scheme)| scheme.as_str() == name)
            .map(|(language, _)| language.clone())
            .collect()
    }

    /// Languages using `name` that still hold scheduled items, per the
    /// injected predicate; only these need migration before an edit or
    /// delete.
    pub fn non_empty_languages_using(
        &self,
        name: &str,
        mut has_items: impl FnMut(&str) -> bool,
    ) -> Vec<String> {
        self.languages_using(name)
            .into_iter()
            .filter(|language| has_items(language))
            .collect()
    }

    /// Point a language at a scheme. Assumes any required migration has
    /// already completed.
    pub fn switch_scheme(&mut self, language: &str, scheme_name: &str) -> Result<()> {
        if !self.schemes.contains_key(scheme_name) {
            return Err(SrsError::SchemeNotFound {
                name: scheme_name.to_string(),
            });
        }
        self.assignments
            .insert(language.to_string(), scheme_name.to_string());
        Ok(())
    }

    pub fn remove_language(&mut self, language: &str) {
        self.assignments.remove(language);
    }

    pub fn scheme_for(&self, language: &str) -> Option<&Scheme> {
        self.assignments
            .get(language)
            .and_then(|name| self.schemes.get(name))
    }

    pub fn assignments(&self) -> impl Iterator<Item = (&str, &str)> {
        self.assignments
            .iter()
            .map(|(language, scheme)| (language.as_str(), scheme.as_str()))
    }
}
