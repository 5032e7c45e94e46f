//! Configuration types and parsing for strata.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Environment variable consulted by [`Config::resolve_target`].
pub const TARGET_ENV_VAR: &str = "STRATA_TARGET";

/// Main project configuration from strata.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Database connection configuration
    pub database: DatabaseConfig,

    /// Named target configurations (e.g., dev, staging, prod)
    /// Each target can override the database connection
    #[serde(default)]
    pub targets: HashMap<String, TargetConfig>,
}

/// Target-specific configuration overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Database configuration override
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Connection string handed to the versioning engine
    /// (e.g. `duckdb:///var/lib/registry.duckdb`)
    pub connection: String,
}

impl DatabaseConfig {
    /// Build a database config from a bare connection string.
    pub fn new(connection: impl Into<String>) -> Self {
        Self {
            connection: connection.into(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        log::debug!("Loaded config '{}' from {}", config.name, path.display());
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// Looks for `strata.yml` first, then `strata.yaml`.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("strata.yml");
        let yaml_path = dir.join("strata.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.database.connection.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.connection cannot be empty".to_string(),
            });
        }

        for (name, target) in &self.targets {
            if let Some(db) = &target.database {
                if db.connection.trim().is_empty() {
                    return Err(CoreError::ConfigInvalid {
                        message: format!(
                            "targets.{}.database.connection cannot be empty",
                            name
                        ),
                    });
                }
            }
        }

        Ok(())
    }

    /// Get database config, optionally overridden by a named target
    pub fn get_database_config(&self, target: Option<&str>) -> CoreResult<DatabaseConfig> {
        match target {
            Some(name) => {
                let target_config =
                    self.targets
                        .get(name)
                        .ok_or_else(|| CoreError::ConfigInvalid {
                            message: format!(
                                "Target '{}' not found. Available targets: {}",
                                name,
                                self.available_targets().join(", ")
                            ),
                        })?;

                // Use target's database config if specified, otherwise fall back to base
                Ok(target_config
                    .database
                    .clone()
                    .unwrap_or_else(|| self.database.clone()))
            }
            None => Ok(self.database.clone()),
        }
    }

    /// Sorted names of all configured targets
    pub fn available_targets(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Resolve target from CLI flag or STRATA_TARGET environment variable
    ///
    /// Priority: CLI flag > STRATA_TARGET env var > None
    pub fn resolve_target(cli_target: Option<&str>) -> Option<String> {
        cli_target
            .map(String::from)
            .or_else(|| std::env::var(TARGET_ENV_VAR).ok())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
