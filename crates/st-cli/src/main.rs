//! Strata CLI - schema version control for DuckDB databases

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::{downgrade, sync, upgrade, version, version_control};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match &cli.command {
        cli::Commands::Version(args) => version::execute(args, &cli.global),
        cli::Commands::Upgrade(args) => upgrade::execute(args, &cli.global),
        cli::Commands::Downgrade(args) => downgrade::execute(args, &cli.global),
        cli::Commands::VersionControl(args) => version_control::execute(args, &cli.global),
        cli::Commands::Sync(args) => sync::execute(args, &cli.global),
    }
}

/// Install the logger; `RUST_LOG` overrides the default level.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
