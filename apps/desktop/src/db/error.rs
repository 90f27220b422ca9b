//! Database error types.

use srs_core::SrsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("scheme row is corrupt: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Srs(#[from] SrsError),

    #[error("no scheme assigned to language {0:?}")]
    NoSchemeForLanguage(String),
}
