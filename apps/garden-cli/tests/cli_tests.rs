//! End-to-end tests for the garden CLI
//!
//! Parsing is checked through `Cli::try_parse_from`; the remaining tests run
//! the built binary against snapshot directories written to a temp dir.

use std::path::Path;
use std::process::{Command, Output};

use clap::Parser;
use garden_cli::{Cli, Commands};
use garden_core::test_utils::MemorySource;
use garden_core::{CategoryFilter, EventCategory, InsightView, SourceKind};
use serde_json::{json, Value};

fn garden(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_garden"))
        .arg("--snapshot-dir")
        .arg(dir)
        .args(args)
        .env("GARDEN_UTC_OFFSET_MINUTES", "0")
        .env("GARDEN_LOG_LEVEL", "error")
        .env_remove("GARDEN_SNAPSHOT_DIR")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn sample_source() -> MemorySource {
    MemorySource::new()
        .with(
            SourceKind::Plantings,
            json!([{
                "id": "7a0c0f8e-4f7e-4d1c-9a55-0f3f3b2f6a11",
                "cropName": "Tomato",
                "variety": "Brandywine",
                "plantingDate": "2024-03-01",
                "expectedHarvestDate": "2024-05-30",
                "healthStatus": "struggling",
                "createdAt": "2024-03-01T09:15:00Z",
                "harvestLogs": [
                    { "date": "2024-06-02", "amount": 1.5, "unit": "kg", "surplus": true }
                ]
            }]),
        )
        .with(
            SourceKind::Tasks,
            json!([
                {
                    "id": "3e5b6a2d-1111-4c3b-8f0e-2a9c1d7e5b40",
                    "title": "Stake tomatoes",
                    "completed": true,
                    "completedAt": "2024-04-02T16:45:00Z"
                },
                { "title": "missing id" }
            ]),
        )
        .with(SourceKind::Seeds, json!([{ "cropName": "Basil", "quantity": 1 }]))
        .with(SourceKind::Photos, json!([]))
}

#[test]
fn test_command_parsing() {
    let test_cases = vec![
        vec!["garden", "timeline"],
        vec!["garden", "timeline", "--category", "harvest-logged"],
        vec!["garden", "timeline", "-C", "all"],
        vec!["garden", "alerts"],
        vec!["garden", "alerts", "--view", "command-center"],
        vec!["garden", "stages"],
        vec!["garden", "check"],
        vec!["garden", "--json", "--snapshot-dir", "/tmp/garden", "check"],
    ];

    for args in test_cases {
        let cli = Cli::try_parse_from(args.clone());
        assert!(cli.is_ok(), "Failed to parse: {:?}", args);
    }
}

#[test]
fn test_command_defaults() {
    let cli = Cli::try_parse_from(["garden", "timeline"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Timeline {
            category: CategoryFilter::All
        }
    );

    let cli = Cli::try_parse_from(["garden", "alerts"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Alerts {
            view: InsightView::Dashboard
        }
    );

    let cli = Cli::try_parse_from(["garden", "timeline", "-C", "task-completed"]).unwrap();
    assert_eq!(
        cli.command,
        Commands::Timeline {
            category: CategoryFilter::Only(EventCategory::TaskCompleted)
        }
    );
}

#[test]
fn test_invalid_arguments() {
    let test_cases = vec![
        vec!["garden"],
        vec!["garden", "prune"],
        vec!["garden", "alerts", "--view", "sidebar"],
        vec!["garden", "timeline", "--category", "weeding"],
    ];

    for args in test_cases {
        assert!(Cli::try_parse_from(args.clone()).is_err(), "Parsed: {:?}", args);
    }
}

#[test]
fn test_timeline_output() {
    let dir = tempfile::tempdir().unwrap();
    sample_source().write_to_dir(dir.path()).unwrap();

    let output = garden(dir.path(), &["timeline"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("June 2, 2024"));
    assert!(text.contains("Harvested Tomato (Brandywine)"));
    assert!(text.contains("16:45  Completed: Stake tomatoes"));
    assert!(text.contains("09:15  Planted Tomato (Brandywine)"));

    let harvested = text.find("Harvested").unwrap();
    let planted = text.find("Planted Tomato").unwrap();
    assert!(harvested < planted, "newest events come first");
}

#[test]
fn test_timeline_category_filter_json() {
    let dir = tempfile::tempdir().unwrap();
    sample_source().write_to_dir(dir.path()).unwrap();

    let output = garden(dir.path(), &["--json", "timeline", "--category", "stage-change"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["filter"], "stage-change");
    assert_eq!(value["stats"]["total"], 4);
    for group in value["groups"].as_array().unwrap() {
        for event in group["events"].as_array().unwrap() {
            assert_eq!(event["category"], "stage-change");
        }
    }
}

#[test]
fn test_alerts_output() {
    let dir = tempfile::tempdir().unwrap();
    sample_source().write_to_dir(dir.path()).unwrap();

    let output = garden(dir.path(), &["alerts"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Alerts (dashboard):"));
    assert!(text.contains("[WARNING] 1 planting needs attention"));
    assert!(text.contains("[WARNING] 1 seed lot running low"));
    assert!(!text.contains("All plantings are healthy"));
}

#[test]
fn test_stages_output() {
    let dir = tempfile::tempdir().unwrap();
    sample_source().write_to_dir(dir.path()).unwrap();

    let output = garden(dir.path(), &["--json", "stages"]);
    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value[0]["stage"], "ready");
    assert_eq!(value[0]["progress_percent"], 100.0);
}

#[test]
fn test_check_reports_dropped_records() {
    let dir = tempfile::tempdir().unwrap();
    sample_source().write_to_dir(dir.path()).unwrap();

    let output = garden(dir.path(), &["check"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("! tasks      1 loaded, 1 dropped"));
    assert!(text.contains("✓ plantings  1 loaded"));
}

#[test]
fn test_check_fails_without_snapshot() {
    let dir = tempfile::tempdir().unwrap();

    let output = garden(&dir.path().join("missing"), &["check"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("No sources could be loaded"));
}

#[test]
fn test_partial_snapshot_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    MemorySource::new()
        .with(SourceKind::Seeds, json!([{ "cropName": "Dill", "quantity": 0 }]))
        .write_to_dir(dir.path())
        .unwrap();

    let output = garden(dir.path(), &["alerts", "--view", "command-center"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("Alerts (command-center):"));
}
