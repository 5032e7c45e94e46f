//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Strata - schema version control for DuckDB databases
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Named target from the config file (falls back to STRATA_TARGET)
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Database connection string; skips the config file entirely
    #[arg(long, global = true, env = "STRATA_SQL_CONNECTION")]
    pub connection: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the database's current schema version
    Version(VersionArgs),

    /// Upgrade the schema (default: latest version)
    Upgrade(UpgradeArgs),

    /// Downgrade the schema to a version
    Downgrade(DowngradeArgs),

    /// Place an existing database under version control without migrating
    VersionControl(VersionControlArgs),

    /// Place the database under control if needed, then migrate to a version
    Sync(SyncArgs),
}

/// Arguments for the version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Target version (default: latest)
    pub version: Option<u32>,
}

/// Arguments for the downgrade command
#[derive(Args, Debug)]
pub struct DowngradeArgs {
    /// Target version
    pub version: u32,
}

/// Arguments for the version-control command
#[derive(Args, Debug)]
pub struct VersionControlArgs {
    /// Version to record (default: latest, i.e. assume fully migrated)
    pub version: Option<u32>,
}

/// Arguments for the sync command
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Target version (default: latest)
    pub version: Option<u32>,

    /// Version the database is known to be at; used when bootstrapping
    /// version control and instead of reading the recorded version
    #[arg(long)]
    pub current_version: Option<u32>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
