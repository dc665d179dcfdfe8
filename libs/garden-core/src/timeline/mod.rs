//! Activity timeline
//!
//! Extractors turn snapshot records into [`TimelineEvent`]s, the aggregator
//! orders and groups them by day.

pub mod aggregate;
pub mod event;
pub mod extractors;

use serde::Serialize;
use tracing::{debug, instrument};

pub use aggregate::{aggregate, flatten, DayGroup, TimelineStats};
pub use event::{CategoryFilter, EventCategory, EventMetadata, NavigationTarget, TimelineEvent};
pub use extractors::{
    default_extractors, extract_all, EventExtractor, ExtractError, HarvestLoggedExtractor,
    PhotoAddedExtractor, PlantingCreatedExtractor, StageChangeExtractor, TaskCompletedExtractor,
    WateringAdjustedExtractor,
};

use crate::context::DerivationContext;
use crate::models::Snapshot;

/// A rendered history view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timeline {
    pub filter: String,
    pub groups: Vec<DayGroup>,
    /// Counts over the unfiltered events
    pub stats: TimelineStats,
}

impl Timeline {
    /// Number of events after filtering
    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.events.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Extract every event from `snapshot` and aggregate them under `filter`
#[instrument(skip(snapshot, ctx), fields(filter = %filter))]
pub fn build_timeline(
    snapshot: &Snapshot,
    ctx: &DerivationContext,
    filter: CategoryFilter,
) -> Timeline {
    let events = extract_all(snapshot, ctx, &default_extractors());
    let stats = TimelineStats::from_events(&events);
    let groups = aggregate(events, filter, ctx.offset);
    debug!(total = stats.total, days = groups.len(), "Timeline built");

    Timeline {
        filter: filter.to_string(),
        groups,
        stats,
    }
}
