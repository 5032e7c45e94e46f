//! Downgrade command implementation

use anyhow::{Context, Result};

use crate::cli::{DowngradeArgs, GlobalArgs};
use crate::context::MigrationContext;

/// Execute the downgrade command
pub(crate) fn execute(args: &DowngradeArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = MigrationContext::new(global)?;
    let version = ctx
        .controller
        .downgrade(args.version)
        .context("Downgrade failed")?;
    println!("Database is at version {}", version);
    Ok(())
}
