//! Error types for st-engine

use crate::repository::Direction;
use crate::traits::SchemaVersion;
use thiserror::Error;

/// Versioning engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// The database has no version record for the repository (V001)
    #[error("[V001] Database is not under version control: {connection}")]
    NotControlled { connection: String },

    /// The database already has a version record for the repository (V002)
    #[error("[V002] Database is already under version control: {connection}")]
    AlreadyControlled { connection: String },

    /// Requested version is outside the repository (V003)
    #[error("[V003] Invalid version {version}: {reason}")]
    InvalidVersion {
        version: SchemaVersion,
        reason: String,
    },

    /// Upgrade to a lower version, or downgrade to a higher one (V004)
    #[error(
        "[V004] Cannot {direction} a database of version {current} to version {target}. Try '{}' instead",
        .direction.opposite()
    )]
    WrongDirection {
        direction: Direction,
        current: SchemaVersion,
        target: SchemaVersion,
    },

    /// Malformed migration repository (V005)
    #[error("[V005] Invalid migration repository '{path}': {message}")]
    Repository { path: String, message: String },

    /// A step needs a script the repository does not have (V006)
    #[error("[V006] Version {version} has no {direction} script")]
    MissingScript {
        version: SchemaVersion,
        direction: Direction,
    },

    /// A migration script failed and its step was rolled back (V007)
    #[error("[V007] {direction} script for version {version} failed: {message}")]
    ScriptFailed {
        version: SchemaVersion,
        direction: Direction,
        message: String,
    },

    /// Connection string could not be opened (V008)
    #[error("[V008] Database connection failed: {0}")]
    ConnectionError(String),

    /// DuckDB driver error with preserved source chain (V009)
    #[error("[V009] DuckDB error")]
    DuckDb(#[source] duckdb::Error),

    /// IO error with file path context (V010)
    #[error("[V010] Failed to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The version table holds a value that is not a schema version (V011)
    #[error("[V011] Version table '{table}' records out-of-range version {recorded}")]
    CorruptVersion { table: String, recorded: i64 },
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;

impl From<duckdb::Error> for EngineError {
    fn from(err: duckdb::Error) -> Self {
        EngineError::DuckDb(err)
    }
}
