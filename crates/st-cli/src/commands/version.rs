//! Version command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use st_engine::VersioningEngine;

use crate::cli::{GlobalArgs, VersionArgs};
use crate::context::MigrationContext;

/// JSON output of `strata version --json`
#[derive(Debug, Serialize)]
struct VersionReport {
    version: u32,
    latest: u32,
    repository: String,
}

/// Execute the version command
pub(crate) fn execute(args: &VersionArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = MigrationContext::new(global)?;
    let controller = &ctx.controller;

    let version = controller
        .current_version()
        .context("Failed to read database version")?;

    if args.json {
        let latest = controller
            .engine()
            .latest_version(controller.repository())
            .context("Failed to read migration repository")?;
        let report = VersionReport {
            version,
            latest,
            repository: controller.repository().display().to_string(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", version);
    }
    Ok(())
}
