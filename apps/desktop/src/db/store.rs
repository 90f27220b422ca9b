//! SQLite store for item scheduling state and scheme metadata.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use srs_core::{
    ItemState, LapsePolicy, MigrationItem, MigrationUpdate, Mode, Scheme, SchemeRegistry,
};

use crate::db::error::StoreError;
use crate::db::schema;

type Result<T> = std::result::Result<T, StoreError>;

/// Active scheme and answer policy for one language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    pub scheme: Scheme,
    pub lapse_policy: LapsePolicy,
}

/// SQLite-backed item store and scheme registry persistence.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(schema::SCHEMA)?;
        for mode in Mode::ALL {
            self.conn
                .execute_batch(&schema::item_table_ddl(schema::item_table(mode)))?;
        }
        self.seed_standard_scheme()?;
        Ok(())
    }

    fn seed_standard_scheme(&self) -> Result<()> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM schemes", [], |row| row.get(0))?;
        if count == 0 {
            self.save_scheme(&Scheme::standard())?;
        }
        Ok(())
    }

    // Item operations, keyed by (item_id, mode).

    pub fn get_item(&self, item_id: &str, mode: Mode) -> Result<Option<ItemState>> {
        let sql = format!(
            "SELECT level, review_date FROM {} WHERE item_id = ?1",
            schema::item_table(mode)
        );
        self.conn
            .query_row(&sql, params![item_id], |row| {
                let due: Option<i64> = row.get(1)?;
                Ok(ItemState {
                    level: row.get(0)?,
                    review_date: due.and_then(|secs| DateTime::from_timestamp(secs, 0)),
                })
            })
            .optional()
            .map_err(Into::into)
    }

    /// Absent items read as level 0.
    pub fn get_level(&self, item_id: &str, mode: Mode) -> Result<u32> {
        Ok(self.get_item(item_id, mode)?.map_or(0, |state| state.level))
    }

    /// Upsert an item's scheduling state, stamping its touch time.
    pub fn set_item(
        &self,
        item_id: &str,
        mode: Mode,
        language: &str,
        state: &ItemState,
        touched_at: DateTime<Utc>,
    ) -> Result<()> {
        let sql = format!(
            "INSERT OR REPLACE INTO {} (item_id, language, level, review_date, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            schema::item_table(mode)
        );
        self.conn.execute(
            &sql,
            params![
                item_id,
                language,
                state.level,
                state.review_date.map(|d| d.timestamp()),
                touched_at.timestamp(),
            ],
        )?;
        Ok(())
    }

    pub fn remove_item(&self, item_id: &str, mode: Mode) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE item_id = ?1",
            schema::item_table(mode)
        );
        Ok(self.conn.execute(&sql, params![item_id])? > 0)
    }

    /// Item ids due at `now`, oldest first. `since` restricts to items
    /// whose state was touched after that point, so an in-progress session
    /// can top itself up without re-receiving items it already has.
    pub fn get_due_items(
        &self,
        mode: Mode,
        now: DateTime<Utc>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<String>> {
        let sql = format!(
            "SELECT item_id FROM {}
             WHERE level > 0 AND review_date IS NOT NULL AND review_date <= ?1 AND updated_at > ?2
             ORDER BY review_date",
            schema::item_table(mode)
        );
        let floor = since.map_or(0, |s| s.timestamp());
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![now.timestamp(), floor], |row| row.get(0))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .map_err(Into::into)
    }

    /// Snapshot of every leveled item of a language, for migration.
    pub fn get_all_items_with_level(&self, mode: Mode, language: &str) -> Result<Vec<MigrationItem>> {
        let sql = format!(
            "SELECT item_id, level, review_date FROM {} WHERE language = ?1 AND level > 0",
            schema::item_table(mode)
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![language], |row| {
            let due: Option<i64> = row.get(2)?;
            Ok(MigrationItem {
                id: row.get(0)?,
                level: row.get(1)?,
                review_date: due.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            })
        })?;
        rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
    }

    /// Leveled items of a language across every mode.
    pub fn count_items(&self, language: &str) -> Result<usize> {
        let mut total = 0usize;
        for mode in Mode::ALL {
            let sql = format!(
                "SELECT COUNT(*) FROM {} WHERE language = ?1 AND level > 0",
                schema::item_table(mode)
            );
            let count: usize = self.conn.query_row(&sql, params![language], |row| row.get(0))?;
            total += count;
        }
        Ok(total)
    }

    /// Apply a migration batch for one language as a single all-or-nothing
    /// transaction.
    pub fn apply_migration(
        &self,
        language: &str,
        batches: &[(Mode, Vec<MigrationUpdate>)],
        touched_at: DateTime<Utc>,
    ) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        let mut applied = 0;
        for (mode, updates) in batches {
            let sql = format!(
                "UPDATE {} SET level = ?1, review_date = ?2, updated_at = ?3
                 WHERE item_id = ?4 AND language = ?5",
                schema::item_table(*mode)
            );
            let mut stmt = tx.prepare(&sql)?;
            for update in updates {
                applied += stmt.execute(params![
                    update.level,
                    update.review_date.map(|d| d.timestamp()),
                    touched_at.timestamp(),
                    update.id,
                    language,
                ])?;
            }
        }
        tx.commit()?;
        Ok(applied)
    }

    // Scheme and language-pointer persistence.

    pub fn load_registry(&self) -> Result<SchemeRegistry> {
        let mut registry = SchemeRegistry::new();

        let mut stmt = self
            .conn
            .prepare("SELECT name, description, intervals FROM schemes")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (name, description, intervals) = row?;
            let spans: Vec<String> = serde_json::from_str(&intervals)?;
            registry.add(Scheme::from_spans(&name, &description, &spans)?)?;
        }

        let mut stmt = self
            .conn
            .prepare("SELECT name, scheme_name FROM languages")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (language, scheme_name) = row?;
            registry.switch_scheme(&language, &scheme_name)?;
        }

        Ok(registry)
    }

    pub fn save_scheme(&self, scheme: &Scheme) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO schemes (name, description, intervals) VALUES (?1, ?2, ?3)",
            params![
                scheme.name,
                scheme.description,
                serde_json::to_string(&scheme.interval_spans())?,
            ],
        )?;
        Ok(())
    }

    /// Replace a scheme row under a new name, re-pointing language rows.
    pub fn rename_scheme(&self, old_name: &str, scheme: &Scheme) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM schemes WHERE name = ?1", params![old_name])?;
        tx.execute(
            "INSERT OR REPLACE INTO schemes (name, description, intervals) VALUES (?1, ?2, ?3)",
            params![
                scheme.name,
                scheme.description,
                serde_json::to_string(&scheme.interval_spans())?,
            ],
        )?;
        tx.execute(
            "UPDATE languages SET scheme_name = ?1 WHERE scheme_name = ?2",
            params![scheme.name, old_name],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete_scheme(&self, name: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM schemes WHERE name = ?1", params![name])?;
        Ok(())
    }

    /// Point a language at a scheme, creating the language row if needed.
    pub fn set_language_scheme(&self, language: &str, scheme_name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO languages (name, scheme_name) VALUES (?1, ?2)
             ON CONFLICT(name) DO UPDATE SET scheme_name = excluded.scheme_name",
            params![language, scheme_name],
        )?;
        Ok(())
    }

    pub fn set_lapse_policy(&self, language: &str, policy: LapsePolicy) -> Result<()> {
        let changed = self.conn.execute(
            "UPDATE languages SET lapse_policy = ?1 WHERE name = ?2",
            params![policy.as_str(), language],
        )?;
        if changed == 0 {
            return Err(StoreError::NoSchemeForLanguage(language.to_string()));
        }
        Ok(())
    }

    /// Active scheme and lapse policy for a language.
    pub fn language_config(&self, language: &str) -> Result<LanguageConfig> {
        let row = self
            .conn
            .query_row(
                "SELECT s.name, s.description, s.intervals, l.lapse_policy
                 FROM languages l JOIN schemes s ON s.name = l.scheme_name
                 WHERE l.name = ?1",
                params![language],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        let (name, description, intervals, policy) = match row {
            Some(row) => row,
            None => return Err(StoreError::NoSchemeForLanguage(language.to_string())),
        };
        let spans: Vec<String> = serde_json::from_str(&intervals)?;
        Ok(LanguageConfig {
            scheme: Scheme::from_spans(&name, &description, &spans)?,
            lapse_policy: LapsePolicy::from_str(&policy).unwrap_or_default(),
        })
    }
}
