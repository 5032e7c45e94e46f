//! Migration controller.
//!
//! Every operation is a blocking round-trip to the versioning engine. The
//! controller holds no state of its own beyond its configuration, and it does
//! not serialize concurrent migrations: running two upgrades against the same
//! database at once is unsafe. Run migrations from exactly one process at
//! deploy time.

use crate::error::{MigrationError, MigrationResult, ALREADY_UNDER_CONTROL, NOT_UNDER_CONTROL};
use crate::repository::repository_path;
use st_core::DatabaseConfig;
use st_engine::{DuckDbEngine, EngineError, EngineResult, SchemaVersion, VersioningEngine};
use std::path::{Path, PathBuf};

/// Facade over a [`VersioningEngine`] bound to one database connection and
/// one migration repository.
pub struct MigrationController<E = DuckDbEngine> {
    database: DatabaseConfig,
    engine: E,
    repository: PathBuf,
}

impl<E: VersioningEngine> MigrationController<E> {
    /// Create a controller for the repository shipped with this crate.
    ///
    /// # Panics
    ///
    /// Panics if the shipped repository is missing (see [`repository_path`]).
    pub fn new(database: DatabaseConfig, engine: E) -> Self {
        Self::with_repository(database, engine, repository_path())
    }

    /// Create a controller for a repository at an explicit path.
    pub fn with_repository(database: DatabaseConfig, engine: E, repository: PathBuf) -> Self {
        Self {
            database,
            engine,
            repository,
        }
    }

    /// Connection string handed to the engine
    pub fn connection(&self) -> &str {
        &self.database.connection
    }

    /// Migration repository handed to the engine
    pub fn repository(&self) -> &Path {
        &self.repository
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Current schema version recorded in the database.
    ///
    /// Fails with [`MigrationError::DatabaseMigration`] if the database is
    /// not under migration control.
    pub fn current_version(&self) -> MigrationResult<SchemaVersion> {
        match self.engine.db_version(self.connection(), &self.repository) {
            Ok(version) => Ok(version),
            Err(EngineError::NotControlled { .. }) => Err(MigrationError::DatabaseMigration(
                NOT_UNDER_CONTROL.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Upgrade to `version`, or to the latest script when `None`.
    pub fn upgrade(&self, version: Option<SchemaVersion>) -> MigrationResult<SchemaVersion> {
        // Fails early for an uncontrolled database
        self.current_version()?;

        log::info!(
            "Upgrading database to version {}",
            version.map_or_else(|| "latest".to_string(), |v| v.to_string())
        );
        Ok(self
            .engine
            .upgrade(self.connection(), &self.repository, version)?)
    }

    /// Downgrade to `version`.
    pub fn downgrade(&self, version: SchemaVersion) -> MigrationResult<SchemaVersion> {
        self.current_version()?;

        log::info!("Downgrading database to version {}", version);
        Ok(self
            .engine
            .downgrade(self.connection(), &self.repository, version)?)
    }

    /// Place the database under migration control without running scripts.
    ///
    /// With no `version`, the database is assumed to be fully migrated and is
    /// recorded at the repository's latest version. Fails with
    /// [`MigrationError::DatabaseMigration`] if it is already controlled.
    pub fn version_control(&self, version: Option<SchemaVersion>) -> MigrationResult<()> {
        match self.place_under_control(version) {
            Ok(()) => Ok(()),
            Err(EngineError::AlreadyControlled { .. }) => Err(MigrationError::DatabaseMigration(
                ALREADY_UNDER_CONTROL.to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Bring the database under control and to `version` (latest when `None`).
    ///
    /// The database is first placed under control at `current_version`
    /// (0 when `None`); if it is already controlled that step is skipped.
    /// Without a `current_version` hint the recorded version is read back.
    /// Then it is upgraded or downgraded towards `version`, or left alone
    /// when it is already there.
    pub fn sync(
        &self,
        version: Option<SchemaVersion>,
        current_version: Option<SchemaVersion>,
    ) -> MigrationResult<()> {
        match self.place_under_control(Some(current_version.unwrap_or(0))) {
            Ok(()) => {}
            Err(EngineError::AlreadyControlled { .. }) => {
                log::debug!("Database already under migration control");
            }
            Err(e) => return Err(e.into()),
        }

        let current = match current_version {
            Some(v) => v,
            None => self.current_version()?,
        };

        match version {
            Some(target) if target < current => {
                self.downgrade(target)?;
            }
            Some(target) if target == current => {
                log::info!("Database already at version {}", current);
            }
            _ => {
                self.upgrade(version)?;
            }
        }
        Ok(())
    }

    fn place_under_control(&self, version: Option<SchemaVersion>) -> EngineResult<()> {
        let version = match version {
            Some(v) => v,
            None => self.engine.latest_version(&self.repository)?,
        };
        log::info!(
            "Placing database under migration control at version {} ({})",
            version,
            self.engine.engine_name()
        );
        self.engine
            .version_control(self.connection(), &self.repository, version)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
