//! Upgrade command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::context::MigrationContext;

/// Execute the upgrade command
pub(crate) fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = MigrationContext::new(global)?;
    let version = ctx
        .controller
        .upgrade(args.version)
        .context("Upgrade failed")?;
    println!("Database is at version {}", version);
    Ok(())
}
