//! Operations the GUI shell invokes.

pub mod schemes;
pub mod study;

pub use schemes::{
    create_scheme, delete_scheme, edit_scheme, languages_needing_migration, list_schemes,
    migrate_language, set_lapse_policy, switch_scheme, MigrationReport,
};
pub use study::{
    add_item, due_queue, remove_item, reset_item, submit_answer, AnswerRequest, AnswerResponse,
};

use crate::db::StoreError;
use srs_core::SrsError;

/// Error surface crossing the shell boundary.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ServiceError {
    pub message: String,
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

impl From<SrsError> for ServiceError {
    fn from(e: SrsError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}
