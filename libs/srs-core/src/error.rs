//! Error types for the SRS engine.

use thiserror::Error;

/// Result type alias using SrsError.
pub type Result<T> = std::result::Result<T, SrsError>;

/// Errors produced by scheme, scheduling, and migration operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SrsError {
    #[error("malformed time span token: {token:?}")]
    Format { token: String },

    #[error("a scheme named {name:?} already exists")]
    DuplicateName { name: String },

    #[error("scheme {name:?} is still used by: {}", languages.join(", "))]
    SchemeInUse { name: String, languages: Vec<String> },

    #[error("no scheme named {name:?}")]
    SchemeNotFound { name: String },

    #[error("migration plan crosses: level {lower} maps above level {upper}")]
    CrossingConstraint { lower: u32, upper: u32 },

    #[error("level {level} has items but no migration target")]
    IncompletePlan { level: u32 },

    #[error("level {level} is outside the scheme's range 1..={max}")]
    LevelOutOfRange { level: u32, max: u32 },

    #[error("a scheme needs at least one interval")]
    EmptyScheme,
}
