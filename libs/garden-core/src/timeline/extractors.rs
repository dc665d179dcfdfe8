//! Per-source event extractors
//!
//! Every extractor is a pure function of the snapshot and the derivation
//! context. A record that cannot produce an event is logged and skipped;
//! it never prevents the rest of the snapshot from being extracted.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, Utc};
use garden_common::format_short_date;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::context::DerivationContext;
use crate::date_utils::date_to_local_instant;
use crate::growth::stage_transition_dates;
use crate::models::{Planting, Snapshot, Task};
use crate::timeline::event::{EventCategory, EventMetadata, NavigationTarget, TimelineEvent};

/// Why a single record produced no event
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("{kind} {id} has no usable {field}")]
    MissingTimestamp {
        kind: &'static str,
        id: Uuid,
        field: &'static str,
    },

    #[error("{kind} {id} has an invalid {field}")]
    InvalidValue {
        kind: &'static str,
        id: Uuid,
        field: &'static str,
    },
}

/// Turns one kind of snapshot record into timeline events
pub trait EventExtractor: Send + Sync {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    fn extract(&self, snapshot: &Snapshot, ctx: &DerivationContext) -> Vec<TimelineEvent>;
}

/// Run `convert` over `records`, dropping the ones that fail
fn isolate<T>(
    extractor: &'static str,
    records: impl IntoIterator<Item = T>,
    mut convert: impl FnMut(T) -> Result<Option<TimelineEvent>, ExtractError>,
) -> Vec<TimelineEvent> {
    records
        .into_iter()
        .filter_map(|record| match convert(record) {
            Ok(event) => event,
            Err(e) => {
                warn!(extractor, error = %e, "Skipping record");
                None
            }
        })
        .collect()
}

fn planting_index(snapshot: &Snapshot) -> HashMap<Uuid, &Planting> {
    snapshot.plantings.iter().map(|p| (p.id, p)).collect()
}

fn planting_link(planting: &Planting) -> NavigationTarget {
    NavigationTarget {
        planting_id: planting.id,
        garden_id: planting.garden_id,
    }
}

/// Link for a record that may reference a planting
///
/// The link is present whenever the reference is, even if the planting is
/// not in the snapshot; the garden segment needs the planting itself.
fn reference_link(
    plantings: &HashMap<Uuid, &Planting>,
    planting_id: Option<Uuid>,
) -> Option<NavigationTarget> {
    planting_id.map(|id| NavigationTarget {
        planting_id: id,
        garden_id: plantings.get(&id).and_then(|p| p.garden_id),
    })
}

fn format_amount(amount: f64, unit: &str) -> String {
    format!("{amount} {unit}").trim_end().to_string()
}

/// One event per planting, at its creation time
#[derive(Debug, Clone, Copy, Default)]
pub struct PlantingCreatedExtractor;

impl EventExtractor for PlantingCreatedExtractor {
    fn name(&self) -> &'static str {
        "planting-created"
    }

    fn extract(&self, snapshot: &Snapshot, ctx: &DerivationContext) -> Vec<TimelineEvent> {
        isolate(self.name(), &snapshot.plantings, |planting| {
            let event = TimelineEvent::new(
                format!("planting-{}", planting.id),
                EventCategory::PlantingCreated,
                planting.created_or_planted_at(ctx.offset),
                format!("Planted {}", planting.display_name()),
                EventMetadata::PlantingCreated {
                    planting_id: planting.id,
                    crop_name: planting.crop_name.clone(),
                    variety: planting.variety.clone(),
                },
            )
            .with_description(format!(
                "Expected harvest {}",
                format_short_date(&planting.expected_harvest_date)
            ))
            .with_link(Some(planting_link(planting)));
            Ok(Some(event))
        })
    }
}

/// One event per stage boundary a planting has already passed
#[derive(Debug, Clone, Copy, Default)]
pub struct StageChangeExtractor;

impl EventExtractor for StageChangeExtractor {
    fn name(&self) -> &'static str {
        "stage-change"
    }

    fn extract(&self, snapshot: &Snapshot, ctx: &DerivationContext) -> Vec<TimelineEvent> {
        let transitions = snapshot.plantings.iter().flat_map(|planting| {
            stage_transition_dates(planting, ctx.now)
                .into_iter()
                .map(move |transition| (planting, transition))
        });

        isolate(self.name(), transitions, |(planting, transition)| {
            let stage = transition.boundary.stage_reached();
            let percent = transition.boundary.percent();
            let event = TimelineEvent::new(
                format!("stage-{}-{percent}", planting.id),
                EventCategory::StageChange,
                transition.at,
                format!("{} → {}", planting.display_name(), stage.label()),
                EventMetadata::StageChange {
                    planting_id: planting.id,
                    stage,
                    percent,
                },
            )
            .with_description(format!("Reached {percent}% of the growing period"))
            .with_link(Some(planting_link(planting)));
            Ok(Some(event))
        })
    }
}

/// One event per harvest log entry
#[derive(Debug, Clone, Copy, Default)]
pub struct HarvestLoggedExtractor;

impl EventExtractor for HarvestLoggedExtractor {
    fn name(&self) -> &'static str {
        "harvest-logged"
    }

    fn extract(&self, snapshot: &Snapshot, ctx: &DerivationContext) -> Vec<TimelineEvent> {
        let entries = snapshot.plantings.iter().flat_map(|planting| {
            planting
                .harvest_logs
                .iter()
                .enumerate()
                .map(move |(index, entry)| (planting, index, entry))
        });

        isolate(self.name(), entries, |(planting, index, entry)| {
            if !entry.amount.is_finite() {
                return Err(ExtractError::InvalidValue {
                    kind: "harvest log of planting",
                    id: planting.id,
                    field: "amount",
                });
            }

            let mut description = format_amount(entry.amount, &entry.unit);
            if entry.surplus {
                description.push_str(" · surplus");
            }

            let event = TimelineEvent::new(
                format!("harvest-{}-{index}", planting.id),
                EventCategory::HarvestLogged,
                date_to_local_instant(entry.date, ctx.offset),
                format!("Harvested {}", planting.display_name()),
                EventMetadata::HarvestLogged {
                    planting_id: planting.id,
                    amount: entry.amount,
                    unit: entry.unit.clone(),
                    surplus: entry.surplus,
                },
            )
            .with_description(description)
            .with_link(Some(planting_link(planting)));
            Ok(Some(event))
        })
    }
}

/// One event per completed task with a known completion time
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskCompletedExtractor;

impl EventExtractor for TaskCompletedExtractor {
    fn name(&self) -> &'static str {
        "task-completed"
    }

    fn extract(&self, snapshot: &Snapshot, _ctx: &DerivationContext) -> Vec<TimelineEvent> {
        let plantings = planting_index(snapshot);

        isolate(self.name(), &snapshot.tasks, |task| {
            if !task.is_completed() {
                return Ok(None);
            }
            let Some(completed_at) = task.completed_at() else {
                debug!(task = %task.id, "Completed task has no completion time");
                return Ok(None);
            };

            let mut event = TimelineEvent::new(
                format!("task-{}", task.id),
                EventCategory::TaskCompleted,
                completed_at,
                format!("Completed: {}", task.title),
                EventMetadata::TaskCompleted {
                    task_id: task.id,
                    task_type: task.task_type.clone(),
                    planting_id: task.planting_id,
                },
            )
            .with_link(reference_link(&plantings, task.planting_id));

            if let Some(planting) = task.planting_id.and_then(|id| plantings.get(&id)) {
                event = event.with_description(planting.display_name());
            }
            Ok(Some(event))
        })
    }
}

/// Instant a weather adjustment is placed at
fn watering_timestamp(task: &Task, offset: FixedOffset) -> Result<DateTime<Utc>, ExtractError> {
    task.updated_at
        .or_else(|| task.due_date.map(|due| date_to_local_instant(due, offset)))
        .ok_or(ExtractError::MissingTimestamp {
            kind: "task",
            id: task.id,
            field: "updated or due date",
        })
}

/// One event per weather-skipped task, completed or not
#[derive(Debug, Clone, Copy, Default)]
pub struct WateringAdjustedExtractor;

impl EventExtractor for WateringAdjustedExtractor {
    fn name(&self) -> &'static str {
        "watering-adjusted"
    }

    fn extract(&self, snapshot: &Snapshot, ctx: &DerivationContext) -> Vec<TimelineEvent> {
        let plantings = planting_index(snapshot);

        isolate(self.name(), &snapshot.tasks, |task| {
            if !task.is_weather_skipped() {
                return Ok(None);
            }
            let timestamp = watering_timestamp(task, ctx.offset)?;
            let reason = task.skip_reason().map(str::to_string);

            let event = TimelineEvent::new(
                format!("watering-{}", task.id),
                EventCategory::WateringAdjusted,
                timestamp,
                format!("Watering adjusted: {}", task.title),
                EventMetadata::WateringAdjusted {
                    task_id: task.id,
                    reason: reason.clone(),
                    completed: task.is_completed(),
                },
            )
            .with_description(reason.unwrap_or_else(|| "Skipped due to weather".to_string()))
            .with_link(reference_link(&plantings, task.planting_id));
            Ok(Some(event))
        })
    }
}

/// One event per photo
#[derive(Debug, Clone, Copy, Default)]
pub struct PhotoAddedExtractor;

impl EventExtractor for PhotoAddedExtractor {
    fn name(&self) -> &'static str {
        "photo-added"
    }

    fn extract(&self, snapshot: &Snapshot, _ctx: &DerivationContext) -> Vec<TimelineEvent> {
        let plantings = planting_index(snapshot);

        isolate(self.name(), &snapshot.photos, |photo| {
            let created_at = photo.created_at.ok_or(ExtractError::MissingTimestamp {
                kind: "photo",
                id: photo.id,
                field: "creation time",
            })?;

            let title = photo
                .caption
                .clone()
                .unwrap_or_else(|| "Photo added".to_string());

            let mut event = TimelineEvent::new(
                format!("photo-{}", photo.id),
                EventCategory::PhotoAdded,
                created_at,
                title,
                EventMetadata::PhotoAdded {
                    photo_id: photo.id,
                    url: photo.url.clone(),
                    photo_type: photo.photo_type.clone(),
                    planting_id: photo.planting_id,
                },
            )
            .with_link(reference_link(&plantings, photo.planting_id));

            if let Some(planting) = photo.planting_id.and_then(|id| plantings.get(&id)) {
                event = event.with_description(planting.display_name());
            }
            Ok(Some(event))
        })
    }
}

/// All extractors, in emission order
#[must_use]
pub fn default_extractors() -> Vec<Box<dyn EventExtractor>> {
    vec![
        Box::new(PlantingCreatedExtractor),
        Box::new(StageChangeExtractor),
        Box::new(HarvestLoggedExtractor),
        Box::new(TaskCompletedExtractor),
        Box::new(WateringAdjustedExtractor),
        Box::new(PhotoAddedExtractor),
    ]
}

/// Concatenate the output of `extractors`, in order
#[must_use]
pub fn extract_all(
    snapshot: &Snapshot,
    ctx: &DerivationContext,
    extractors: &[Box<dyn EventExtractor>],
) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    for extractor in extractors {
        let extracted = extractor.extract(snapshot, ctx);
        debug!(extractor = extractor.name(), count = extracted.len(), "Extracted events");
        events.extend(extracted);
    }
    events
}
