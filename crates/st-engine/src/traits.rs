//! Versioning engine trait definition

use crate::error::EngineResult;
use std::path::Path;

/// Schema version number recorded in the target database.
pub type SchemaVersion = u32;

/// Capabilities of a schema versioning engine.
///
/// Every call is a blocking, self-contained round-trip: the engine opens the
/// database named by `connection`, does its work, and closes it again.
/// Nothing here serializes concurrent calls against the same database.
pub trait VersioningEngine: Send + Sync {
    /// Current recorded version.
    ///
    /// Fails with [`EngineError::NotControlled`](crate::EngineError::NotControlled)
    /// when the database was never placed under version control.
    fn db_version(&self, connection: &str, repository: &Path) -> EngineResult<SchemaVersion>;

    /// Start tracking `version` without applying any scripts.
    ///
    /// Fails with [`EngineError::AlreadyControlled`](crate::EngineError::AlreadyControlled)
    /// when a version is already recorded.
    fn version_control(
        &self,
        connection: &str,
        repository: &Path,
        version: SchemaVersion,
    ) -> EngineResult<()>;

    /// Apply upgrade scripts up to `version` (latest when `None`)
    fn upgrade(
        &self,
        connection: &str,
        repository: &Path,
        version: Option<SchemaVersion>,
    ) -> EngineResult<SchemaVersion>;

    /// Apply downgrade scripts down to `version`
    fn downgrade(
        &self,
        connection: &str,
        repository: &Path,
        version: SchemaVersion,
    ) -> EngineResult<SchemaVersion>;

    /// Highest version known to the repository (0 when it has no scripts)
    fn latest_version(&self, repository: &Path) -> EngineResult<SchemaVersion>;

    /// Engine identifier for logging
    fn engine_name(&self) -> &'static str;
}
