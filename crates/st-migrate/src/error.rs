//! Error types for st-migrate

use st_engine::EngineError;
use thiserror::Error;

/// Message used when the database has no version record.
pub const NOT_UNDER_CONTROL: &str = "database is not under migration control";

/// Message used when the database already has a version record.
pub const ALREADY_UNDER_CONTROL: &str = "database is already under migration control";

/// Migration control errors
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A known versioning condition reported by the controller (MG001)
    #[error("[MG001] Database migration error: {0}")]
    DatabaseMigration(String),

    /// Any other engine failure, passed through unchanged
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl MigrationError {
    /// True for the controller's own [`MigrationError::DatabaseMigration`]
    pub fn is_database_migration(&self) -> bool {
        matches!(self, MigrationError::DatabaseMigration(_))
    }
}

/// Result type alias for MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;
