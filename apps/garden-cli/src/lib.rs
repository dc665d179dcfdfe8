//! Garden CLI library
//!
//! Argument parsing and the text/JSON renderers behind the `garden` binary.
//! Every renderer writes to a caller-supplied writer.

use std::io::Write;
use std::path::PathBuf;

use chrono::FixedOffset;
use clap::{Parser, Subcommand};
use garden_common::{format_date, pluralize, truncate_string};
use garden_core::{
    build_timeline, evaluate, summarize, CategoryFilter, DerivationContext, EventCategory,
    GardenConfig, GrowthSummary, InsightConfig, InsightReport, InsightView, LoadReport,
    LoadedSnapshot, Result, SeedLot, SourceKind, Timeline,
};
use serde::Serialize;

/// Width of the name column in the stage table
const NAME_WIDTH: usize = 28;

#[derive(Parser, Debug)]
#[command(name = "garden")]
#[command(about = "Garden activity timeline and dashboard insights")]
#[command(version)]
pub struct Cli {
    /// Directory containing the snapshot JSON files
    #[arg(long, short)]
    pub snapshot_dir: Option<PathBuf>,

    /// Configuration file (JSON or YAML)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show the activity timeline, newest first
    Timeline {
        /// Category to show (all, planting-created, stage-change, task-completed,
        /// harvest-logged, photo-added, watering-adjusted)
        #[arg(long, short = 'C', default_value = "all")]
        category: CategoryFilter,
    },
    /// Show prioritized alerts
    Alerts {
        /// View whose thresholds apply (dashboard, command-center)
        #[arg(long, default_value = "dashboard")]
        view: InsightView,
    },
    /// Show each planting's growth stage
    Stages,
    /// Check that the snapshot loads
    Check,
}

/// Resolve configuration from the file, environment and flags, in that order
///
/// # Errors
/// Returns an error if the file cannot be loaded or a value is invalid
pub fn resolve_config(cli: &Cli) -> Result<GardenConfig> {
    let base = match &cli.config {
        Some(path) => GardenConfig::from_file(path)?,
        None => GardenConfig::default(),
    };
    let mut config = base.with_env_overrides()?;

    if let Some(dir) = &cli.snapshot_dir {
        config.snapshot_dir.clone_from(dir);
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    config.validate()?;
    Ok(config)
}

fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Print a timeline to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_timeline<W: Write>(
    timeline: &Timeline,
    offset: FixedOffset,
    json: bool,
    writer: &mut W,
) -> Result<()> {
    if json {
        return write_json(writer, timeline);
    }

    if timeline.is_empty() {
        writeln!(writer, "No activity found")?;
    }

    for group in &timeline.groups {
        writeln!(writer, "{}", group.label)?;
        for event in &group.events {
            let time = event.timestamp.with_timezone(&offset).format("%H:%M");
            writeln!(writer, "  {} {time}  {}", event.icon, event.title)?;
            if let Some(description) = &event.description {
                writeln!(writer, "          {}", truncate_string(description, 72))?;
            }
            if let Some(link) = &event.link {
                writeln!(writer, "          → {}", link.path())?;
            }
        }
        writeln!(writer)?;
    }

    writeln!(
        writer,
        "Summary: {} (filter: {})",
        pluralize(timeline.stats.total, "event", "events"),
        timeline.filter
    )?;
    for category in EventCategory::ALL {
        writeln!(
            writer,
            "  {:<10} {}",
            category.label(),
            timeline.stats.count(category)
        )?;
    }
    Ok(())
}

fn seed_list(lots: &[SeedLot]) -> String {
    if lots.is_empty() {
        return "none".to_string();
    }
    lots.iter()
        .map(|lot| match lot.expiration_date {
            Some(expires) => format!(
                "{} ({} {}, expires {})",
                lot.display_name(),
                lot.quantity,
                lot.unit,
                format_date(&expires)
            ),
            None => format!("{} ({} {})", lot.display_name(), lot.quantity, lot.unit),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Print an insight report to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_alerts<W: Write>(report: &InsightReport, json: bool, writer: &mut W) -> Result<()> {
    if json {
        return write_json(writer, report);
    }

    writeln!(writer, "Alerts ({}):", report.view)?;
    if report.alerts.is_empty() {
        writeln!(writer, "  No alerts")?;
    }
    for alert in &report.alerts {
        writeln!(
            writer,
            "  [{}] {}",
            alert.severity.as_str().to_uppercase(),
            alert.message
        )?;
        if let Some(detail) = &alert.detail {
            writeln!(writer, "      {detail}")?;
        }
        if let Some(metric) = &alert.metric {
            writeln!(writer, "      {}: {}", metric.label, metric.value)?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Seed stock:")?;
    writeln!(writer, "  Low stock:     {}", seed_list(&report.seed_stock.low_stock))?;
    writeln!(writer, "  Expiring soon: {}", seed_list(&report.seed_stock.expiring_soon))?;
    writeln!(writer, "  Expired:       {}", seed_list(&report.seed_stock.expired))?;
    Ok(())
}

fn harvest_phrase(days_until: i64) -> String {
    match days_until {
        d if d < 0 => format!(
            "harvest window opened {} ago",
            pluralize(d.unsigned_abs() as usize, "day", "days")
        ),
        0 => "harvest window opens today".to_string(),
        d => format!("{} to harvest", pluralize(d as usize, "day", "days")),
    }
}

/// Print growth summaries to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_stages<W: Write>(summaries: &[GrowthSummary], json: bool, writer: &mut W) -> Result<()> {
    if json {
        return write_json(writer, summaries);
    }

    if summaries.is_empty() {
        writeln!(writer, "No plantings found")?;
        return Ok(());
    }

    writeln!(writer, "Found {}:", pluralize(summaries.len(), "planting", "plantings"))?;
    for summary in summaries {
        writeln!(
            writer,
            "  {:<width$} {:<10} {:>5.1}%  {}",
            truncate_string(&summary.display_name, NAME_WIDTH),
            summary.stage.label(),
            summary.progress_percent,
            harvest_phrase(summary.days_until_harvest),
            width = NAME_WIDTH
        )?;
    }
    Ok(())
}

/// Print a snapshot load report to the given writer
///
/// # Errors
/// Returns an error if writing fails
pub fn print_load_report<W: Write>(report: &LoadReport, json: bool, writer: &mut W) -> Result<()> {
    if json {
        return write_json(writer, report);
    }

    for kind in SourceKind::ALL {
        if let Some(failure) = report.failures.iter().find(|f| f.source == kind) {
            writeln!(writer, "  ✗ {kind:<10} {}", failure.message)?;
            continue;
        }
        let loaded = report.loaded.get(&kind).copied().unwrap_or_default();
        match report.dropped.get(&kind) {
            Some(dropped) => writeln!(
                writer,
                "  ! {kind:<10} {loaded} loaded, {} dropped",
                dropped
            )?,
            None => writeln!(writer, "  ✓ {kind:<10} {loaded} loaded")?,
        }
    }

    if report.all_failed() {
        writeln!(writer, "No sources could be loaded")?;
    } else if report.is_clean() {
        writeln!(writer, "Snapshot OK")?;
    } else {
        writeln!(
            writer,
            "Snapshot loaded with {} and {}",
            pluralize(report.failures.len(), "failed source", "failed sources"),
            pluralize(report.dropped_total(), "dropped record", "dropped records")
        )?;
    }
    Ok(())
}

/// Run `command` against a loaded snapshot
///
/// # Errors
/// Returns an error if writing fails
pub fn execute<W: Write>(
    command: &Commands,
    json: bool,
    loaded: &LoadedSnapshot,
    ctx: &DerivationContext,
    insights: &InsightConfig,
    writer: &mut W,
) -> Result<()> {
    let snapshot = &loaded.snapshot;
    match command {
        Commands::Timeline { category } => {
            let timeline = build_timeline(snapshot, ctx, *category);
            print_timeline(&timeline, ctx.offset, json, writer)
        }
        Commands::Alerts { view } => {
            let report = evaluate(snapshot, ctx, *view, insights);
            print_alerts(&report, json, writer)
        }
        Commands::Stages => {
            let summaries: Vec<GrowthSummary> = snapshot
                .plantings
                .iter()
                .map(|planting| summarize(planting, ctx.now))
                .collect();
            print_stages(&summaries, json, writer)
        }
        Commands::Check => print_load_report(&loaded.report, json, writer),
    }
}
