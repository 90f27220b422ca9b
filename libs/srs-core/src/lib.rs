//! SRS engine shared by the Glyphcards desktop application.
//!
//! Provides:
//! - Time-span parsing and rendering for interval tables
//! - Scheme model (named per-level interval tables) and registry
//! - Level-transition scheduler with configurable lapse policy
//! - Migration planner for moving item populations between schemes

pub mod error;
pub mod migrate;
pub mod registry;
pub mod scheduler;
pub mod scheme;
pub mod timespan;
pub mod types;

pub use error::{Result, SrsError};
pub use migrate::{
    plan_migration, MigrationItem, MigrationPlan, MigrationTarget, MigrationUpdate, Modifier,
};
pub use registry::SchemeRegistry;
pub use scheduler::{due_after, Scheduler};
pub use scheme::Scheme;
pub use timespan::{is_unbounded, TimeSpan, UNBOUNDED_SECONDS};
pub use types::{ItemState, LapsePolicy, Mode, NullScoreHook, ScoreHook};
