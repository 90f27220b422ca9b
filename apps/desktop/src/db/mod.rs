//! Local SQLite persistence for SRS state and schemes.

pub mod error;
pub mod schema;
pub mod store;

pub use error::StoreError;
pub use store::{LanguageConfig, SqliteStore};

use std::path::PathBuf;

/// Default database location under the platform app-data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("glyphcards")
        .join("glyphcards.db")
}
