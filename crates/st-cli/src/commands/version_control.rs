//! Version-control command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, VersionControlArgs};
use crate::context::MigrationContext;

/// Execute the version-control command
pub(crate) fn execute(args: &VersionControlArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = MigrationContext::new(global)?;
    let controller = &ctx.controller;

    controller
        .version_control(args.version)
        .context("Failed to place database under version control")?;

    // Read back what was recorded; with no version this is the latest
    let version = controller.current_version()?;
    println!("Database placed under version control at version {}", version);
    Ok(())
}
