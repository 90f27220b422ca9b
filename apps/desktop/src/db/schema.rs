//! SQLite schema definitions.

use srs_core::Mode;

/// Storage table for each test mode. The scheduler never sees table names;
/// this mapping is the only place they exist.
pub fn item_table(mode: Mode) -> &'static str {
    match mode {
        Mode::Vocab => "vocab_items",
        Mode::KanjiMeaning => "kanji_meaning_items",
        Mode::KanjiOnYomi => "kanji_on_yomi_items",
        Mode::KanjiKunYomi => "kanji_kun_yomi_items",
        Mode::HanziMeaning => "hanzi_meaning_items",
        Mode::HanziReading => "hanzi_reading_items",
    }
}

/// Shared shape of every item table. Review dates and touch times are
/// seconds since epoch; review_date is NULL while an item is unleveled.
pub fn item_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            item_id TEXT PRIMARY KEY,
            language TEXT NOT NULL,
            level INTEGER NOT NULL DEFAULT 0,
            review_date INTEGER,
            updated_at INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_due ON {table}(review_date);
        CREATE INDEX IF NOT EXISTS idx_{table}_language ON {table}(language);"
    )
}

/// Scheme and language-pointer tables. A scheme row's intervals column is
/// the JSON array of canonical time-span strings.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schemes (
    name TEXT PRIMARY KEY,
    description TEXT NOT NULL DEFAULT '',
    intervals TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS languages (
    name TEXT PRIMARY KEY,
    scheme_name TEXT NOT NULL REFERENCES schemes(name),
    lapse_policy TEXT NOT NULL DEFAULT 'step_down'
);
"#;
