//! Persistence and service layer of the Glyphcards desktop application.
//!
//! The GUI shell opens a [`SqliteStore`] and calls the functions in
//! [`service`]; everything algorithmic lives in `srs-core`.

pub mod db;
pub mod service;

pub use db::{default_db_path, SqliteStore, StoreError};
pub use service::ServiceError;
