//! Garden Core - activity timeline and insight derivation for garden data
//!
//! This library takes snapshots of a garden's plantings, tasks, seed
//! inventory and photos and derives everything the history and dashboard
//! views show from them. Nothing is persisted; every pass recomputes from
//! the snapshot it is given.
//!
//! # Features
//!
//! - **Growth stages**: classify a planting by how far it is through its
//!   planting-to-harvest span
//! - **Activity timeline**: normalized events from every record kind,
//!   sorted newest first and grouped by local day
//! - **Insights**: prioritized alerts for plant health, upcoming harvests,
//!   seed stock, weather skips and frost dates
//! - **Lenient ingestion**: malformed records are dropped one at a time and
//!   reported, never failing the whole snapshot
//!
//! # Quick Start
//!
//! ```no_run
//! use garden_core::{
//!     build_timeline, evaluate, load_snapshot, CategoryFilter, DerivationContext,
//!     InsightConfig, InsightView, JsonDirSource,
//! };
//!
//! # async fn example() {
//! let loaded = load_snapshot(&JsonDirSource::new("./snapshot")).await;
//! let ctx = DerivationContext::local();
//!
//! let timeline = build_timeline(&loaded.snapshot, &ctx, CategoryFilter::All);
//! println!("{} events over {} days", timeline.len(), timeline.groups.len());
//!
//! let insights = evaluate(
//!     &loaded.snapshot,
//!     &ctx,
//!     InsightView::Dashboard,
//!     &InsightConfig::default(),
//! );
//! for alert in &insights.alerts {
//!     println!("[{}] {}", alert.severity, alert.message);
//! }
//! # }
//! ```
//!
//! # Crate Features
//!
//! - `test-utils`: Enable fixture builders and an in-memory snapshot source

pub mod config;
pub mod context;
pub mod date_utils;
pub mod error;
pub mod growth;
pub mod insights;
pub mod logging;
pub mod models;
pub mod records;
pub mod snapshot;
pub mod timeline;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{GardenConfig, LoggingConfig};
pub use context::DerivationContext;
pub use date_utils::{days_between, interpolate, DayRounding};
pub use error::{GardenError, Result};
pub use growth::{
    classify_stage, stage_transition_dates, summarize, GrowthStage, GrowthSummary, StageBoundary,
    StageTransition,
};
pub use insights::{
    evaluate, harvest_soon, seed_stock, Alert, AlertKind, HarvestSoon, InsightConfig,
    InsightReport, InsightView, Metric, SeedStockReport, Severity,
};
pub use logging::init_logging;
pub use models::*;
pub use records::{RecordError, SourceKind};
pub use snapshot::{
    load_snapshot, JsonDirSource, LoadReport, LoadedSnapshot, SnapshotSource, SourceFailure,
};
pub use timeline::{
    aggregate, build_timeline, CategoryFilter, DayGroup, EventCategory, EventMetadata,
    NavigationTarget, Timeline, TimelineEvent, TimelineStats,
};

// Re-export commonly used types
pub use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
pub use uuid::Uuid;
