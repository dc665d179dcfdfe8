//! Garden CLI

use anyhow::Context;
use clap::Parser;
use garden_cli::{execute, resolve_config, Cli, Commands};
use garden_core::{init_logging, load_snapshot, JsonDirSource};
use tracing::{debug, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli).context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    let ctx = config.context()?;

    debug!(
        snapshot_dir = %config.snapshot_dir.display(),
        now = %ctx.now,
        offset = %ctx.offset,
        "Loading snapshot"
    );
    let source = JsonDirSource::new(&config.snapshot_dir);
    let loaded = load_snapshot(&source).await;
    if !loaded.report.is_clean() {
        warn!(
            failed = loaded.report.failures.len(),
            dropped = loaded.report.dropped_total(),
            "Snapshot loaded with problems"
        );
    }

    let mut stdout = std::io::stdout().lock();
    execute(
        &cli.command,
        cli.json,
        &loaded,
        &ctx,
        &config.insights,
        &mut stdout,
    )?;

    if cli.command == Commands::Check && loaded.report.all_failed() {
        anyhow::bail!(
            "No snapshot source could be loaded from {}",
            config.snapshot_dir.display()
        );
    }

    Ok(())
}
