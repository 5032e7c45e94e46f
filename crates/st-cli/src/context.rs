//! Runtime context for CLI commands

use anyhow::{Context, Result};
use st_core::{Config, DatabaseConfig};
use st_engine::DuckDbEngine;
use st_migrate::MigrationController;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Runtime context containing the migration controller for the resolved
/// database
pub struct MigrationContext {
    /// Controller bound to the resolved connection and the shipped repository
    pub controller: MigrationController<DuckDbEngine>,
}

impl MigrationContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let database = resolve_database(args)?;
        let controller = MigrationController::new(database, DuckDbEngine::new());
        log::debug!(
            "Using connection '{}' with repository {}",
            controller.connection(),
            controller.repository().display()
        );
        Ok(Self { controller })
    }
}

/// Resolve the database connection for this invocation.
///
/// Priority: `--connection` / STRATA_SQL_CONNECTION > config file (with
/// optional target override).
pub(crate) fn resolve_database(args: &GlobalArgs) -> Result<DatabaseConfig> {
    if let Some(connection) = &args.connection {
        return Ok(DatabaseConfig::new(connection.clone()));
    }

    // Load config from custom path or project directory
    let config = if let Some(config_path) = &args.config {
        Config::load(Path::new(config_path)).context("Failed to load configuration file")?
    } else {
        Config::load_from_dir(Path::new(&args.project_dir))
            .context("Failed to load project configuration")?
    };

    let target = Config::resolve_target(args.target.as_deref());
    config
        .get_database_config(target.as_deref())
        .context("Failed to resolve database target")
}

#[cfg(test)]
#[path = "context_test.rs"]
mod tests;
