//! Migration repository reader.
//!
//! A repository is a directory with a `migrate.yml` settings file and a
//! `versions/` directory of numbered SQL scripts:
//!
//! ```text
//! migrate_repo/
//!   migrate.yml
//!   versions/
//!     001_add_images_table_upgrade.sql
//!     001_add_images_table_downgrade.sql
//! ```
//!
//! Versions start at 1 and must be contiguous. Running the upgrade script of
//! version `v` moves a database from `v - 1` to `v`; its downgrade script
//! moves it back.

use crate::error::{EngineError, EngineResult};
use crate::traits::SchemaVersion;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Settings file name inside the repository root
pub const SETTINGS_FILE: &str = "migrate.yml";

/// Script directory name inside the repository root
pub const VERSIONS_DIR: &str = "versions";

static SCRIPT_NAME_RE: OnceLock<Regex> = OnceLock::new();
static IDENTIFIER_RE: OnceLock<Regex> = OnceLock::new();

fn script_name_re() -> &'static Regex {
    SCRIPT_NAME_RE.get_or_init(|| {
        Regex::new(r"^(\d+)_(\w+?)_(upgrade|downgrade)\.sql$").expect("valid regex literal")
    })
}

fn identifier_re() -> &'static Regex {
    IDENTIFIER_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex literal"))
}

/// Which way a script moves the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Upgrade,
    Downgrade,
}

impl Direction {
    /// The other direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Upgrade => Direction::Downgrade,
            Direction::Downgrade => Direction::Upgrade,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upgrade => write!(f, "upgrade"),
            Direction::Downgrade => write!(f, "downgrade"),
        }
    }
}

/// Contents of `migrate.yml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySettings {
    /// Identifier stored alongside the version in the target database
    pub repository_id: String,

    /// Table that records the applied version
    #[serde(default = "default_version_table")]
    pub version_table: String,
}

fn default_version_table() -> String {
    "migrate_version".to_string()
}

/// Scripts registered for one version
#[derive(Debug, Clone)]
pub struct VersionScripts {
    /// Version number taken from the file name prefix
    pub version: SchemaVersion,
    /// Description part of the file name (`add_images_table`)
    pub name: String,
    /// Script that moves `version - 1` to `version`
    pub upgrade: PathBuf,
    /// Script that moves `version` back to `version - 1`
    pub downgrade: Option<PathBuf>,
}

/// One script to run while moving between two versions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Version the script belongs to
    pub version: SchemaVersion,
    /// Direction the script runs in
    pub direction: Direction,
    /// Version recorded once the script has run
    pub resulting: SchemaVersion,
    /// Script file
    pub script: PathBuf,
}

/// A loaded migration repository
#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,
    settings: RepositorySettings,
    versions: BTreeMap<SchemaVersion, VersionScripts>,
}

impl Repository {
    /// Read the settings and scan the script directory at `path`.
    pub fn open(path: &Path) -> EngineResult<Self> {
        let settings = load_settings(path)?;
        let versions = scan_versions(path)?;
        log::debug!(
            "Loaded migration repository '{}' from {} ({} versions)",
            settings.repository_id,
            path.display(),
            versions.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            settings,
            versions,
        })
    }

    /// Repository root directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Identifier recorded in the version table
    pub fn id(&self) -> &str {
        &self.settings.repository_id
    }

    /// Name of the version table
    pub fn version_table(&self) -> &str {
        &self.settings.version_table
    }

    /// Highest known version, 0 for an empty repository
    pub fn latest(&self) -> SchemaVersion {
        self.versions.keys().next_back().copied().unwrap_or(0)
    }

    /// Scripts for a single version
    pub fn version(&self, version: SchemaVersion) -> Option<&VersionScripts> {
        self.versions.get(&version)
    }

    /// All versions in ascending order
    pub fn versions(&self) -> impl Iterator<Item = &VersionScripts> {
        self.versions.values()
    }

    /// Fail with [`EngineError::InvalidVersion`] if `version` is beyond
    /// [`latest`](Self::latest).
    pub fn check_version(&self, version: SchemaVersion) -> EngineResult<()> {
        let latest = self.latest();
        if version > latest {
            return Err(EngineError::InvalidVersion {
                version,
                reason: format!(
                    "repository '{}' only goes up to version {}",
                    self.id(),
                    latest
                ),
            });
        }
        Ok(())
    }

    /// Ordered scripts that move a database from `from` to `to`.
    ///
    /// Ascending upgrade scripts when `to > from`, descending downgrade
    /// scripts when `to < from`, empty when they are equal.
    pub fn steps(&self, from: SchemaVersion, to: SchemaVersion) -> EngineResult<Vec<Step>> {
        self.check_version(from)?;
        self.check_version(to)?;

        if to >= from {
            return Ok((from + 1..=to)
                .filter_map(|v| self.versions.get(&v))
                .map(|scripts| Step {
                    version: scripts.version,
                    direction: Direction::Upgrade,
                    resulting: scripts.version,
                    script: scripts.upgrade.clone(),
                })
                .collect());
        }

        let mut steps = Vec::with_capacity((from - to) as usize);
        for v in (to + 1..=from).rev() {
            let script = self
                .versions
                .get(&v)
                .and_then(|scripts| scripts.downgrade.clone())
                .ok_or(EngineError::MissingScript {
                    version: v,
                    direction: Direction::Downgrade,
                })?;
            steps.push(Step {
                version: v,
                direction: Direction::Downgrade,
                resulting: v - 1,
                script,
            });
        }
        Ok(steps)
    }

    /// Read the SQL of a step's script
    pub fn read_script(&self, step: &Step) -> EngineResult<String> {
        std::fs::read_to_string(&step.script).map_err(|e| EngineError::Io {
            path: step.script.display().to_string(),
            source: e,
        })
    }

    fn invalid(path: &Path, message: impl Into<String>) -> EngineError {
        EngineError::Repository {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}

fn load_settings(root: &Path) -> EngineResult<RepositorySettings> {
    let settings_path = root.join(SETTINGS_FILE);
    if !settings_path.is_file() {
        return Err(Repository::invalid(
            root,
            format!("missing {}", SETTINGS_FILE),
        ));
    }

    let content = std::fs::read_to_string(&settings_path).map_err(|e| EngineError::Io {
        path: settings_path.display().to_string(),
        source: e,
    })?;
    let settings: RepositorySettings = serde_yaml::from_str(&content)
        .map_err(|e| Repository::invalid(root, format!("{}: {}", SETTINGS_FILE, e)))?;

    if settings.repository_id.trim().is_empty() {
        return Err(Repository::invalid(root, "repository_id cannot be empty"));
    }
    if !identifier_re().is_match(&settings.version_table) {
        return Err(Repository::invalid(
            root,
            format!(
                "version_table '{}' is not a valid SQL identifier",
                settings.version_table
            ),
        ));
    }
    Ok(settings)
}

fn scan_versions(root: &Path) -> EngineResult<BTreeMap<SchemaVersion, VersionScripts>> {
    let versions_dir = root.join(VERSIONS_DIR);
    if !versions_dir.is_dir() {
        return Err(Repository::invalid(
            root,
            format!("missing {}/ directory", VERSIONS_DIR),
        ));
    }

    let entries = std::fs::read_dir(&versions_dir).map_err(|e| EngineError::Io {
        path: versions_dir.display().to_string(),
        source: e,
    })?;

    let mut upgrades: BTreeMap<SchemaVersion, (String, PathBuf)> = BTreeMap::new();
    let mut downgrades: BTreeMap<SchemaVersion, PathBuf> = BTreeMap::new();

    for entry in entries {
        let entry = entry.map_err(|e| EngineError::Io {
            path: versions_dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(caps) = script_name_re().captures(file_name) else {
            log::debug!("Skipping non-script file {}", path.display());
            continue;
        };

        let version: SchemaVersion = caps[1]
            .parse()
            .map_err(|_| Repository::invalid(root, format!("bad version in '{}'", file_name)))?;
        if version == 0 {
            return Err(Repository::invalid(
                root,
                format!("'{}': versions start at 1", file_name),
            ));
        }

        let duplicate = match &caps[3] {
            "upgrade" => upgrades
                .insert(version, (caps[2].to_string(), path.clone()))
                .is_some(),
            _ => downgrades.insert(version, path.clone()).is_some(),
        };
        if duplicate {
            return Err(Repository::invalid(
                root,
                format!("more than one {} script for version {}", &caps[3], version),
            ));
        }
    }

    if let Some(orphan) = downgrades.keys().find(|v| !upgrades.contains_key(v)) {
        return Err(Repository::invalid(
            root,
            format!("version {} has a downgrade script but no upgrade script", orphan),
        ));
    }

    let mut versions = BTreeMap::new();
    for (expected, (version, (name, upgrade))) in (1..).zip(upgrades) {
        if version != expected {
            return Err(Repository::invalid(
                root,
                format!("version {} is missing (found {})", expected, version),
            ));
        }
        let downgrade = downgrades.remove(&version);
        versions.insert(
            version,
            VersionScripts {
                version,
                name,
                upgrade,
                downgrade,
            },
        );
    }
    Ok(versions)
}

#[cfg(test)]
#[path = "repository_test.rs"]
mod tests;
