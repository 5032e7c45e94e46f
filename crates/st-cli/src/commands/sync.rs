//! Sync command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, SyncArgs};
use crate::context::MigrationContext;

/// Execute the sync command
pub(crate) fn execute(args: &SyncArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = MigrationContext::new(global)?;
    let controller = &ctx.controller;

    controller
        .sync(args.version, args.current_version)
        .context("Sync failed")?;

    let version = controller.current_version()?;
    println!("Database is at version {}", version);
    Ok(())
}
