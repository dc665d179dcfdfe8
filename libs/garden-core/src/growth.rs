//! Growth stage classification from a planting's date range
//!
//! A planting's lifecycle is split by percentage of the span between its
//! planting date and expected harvest date. `Ready` is only reached by
//! crossing the harvest date itself; the stage markers used for timeline
//! events stop at 90% and never announce it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_utils::{days_elapsed, days_until, interpolate};
use crate::models::Planting;

/// Discrete lifecycle phase of a planting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seedling,
    Vegetative,
    Flowering,
    Fruiting,
    Ready,
}

impl GrowthStage {
    pub const ALL: [Self; 5] = [
        Self::Seedling,
        Self::Vegetative,
        Self::Flowering,
        Self::Fruiting,
        Self::Ready,
    ];

    /// Capitalised display label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Seedling => "Seedling",
            Self::Vegetative => "Vegetative",
            Self::Flowering => "Flowering",
            Self::Fruiting => "Fruiting",
            Self::Ready => "Ready",
        }
    }

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Seedling => "seedling",
            Self::Vegetative => "vegetative",
            Self::Flowering => "flowering",
            Self::Fruiting => "fruiting",
            Self::Ready => "ready",
        }
    }
}

impl fmt::Display for GrowthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a planting's stage at `now`
///
/// Total over all inputs: a harvest date that is not after the planting
/// date yields `Ready` once `now` reaches it and `Seedling` before.
#[must_use]
pub fn classify_stage(
    planting_date: DateTime<Utc>,
    harvest_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> GrowthStage {
    if now >= harvest_date {
        return GrowthStage::Ready;
    }

    let Some(percent) = span_percent(planting_date, harvest_date, now) else {
        return GrowthStage::Seedling;
    };

    if percent < 25.0 {
        GrowthStage::Seedling
    } else if percent < 50.0 {
        GrowthStage::Vegetative
    } else if percent < 75.0 {
        GrowthStage::Flowering
    } else {
        GrowthStage::Fruiting
    }
}

/// Percentage of the planting span elapsed at `now`, or `None` for a
/// non-positive span
fn span_percent(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Option<f64> {
    let total = end.signed_duration_since(start).num_milliseconds();
    if total <= 0 {
        return None;
    }
    let elapsed = now.signed_duration_since(start).num_milliseconds();
    let percent = elapsed as f64 / total as f64 * 100.0;
    percent.is_finite().then_some(percent)
}

/// Interpolated points along a planting's span that mark a stage change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageBoundary {
    SeedlingToVegetative,
    VegetativeToFlowering,
    FloweringToFruiting,
    FruitingMarker,
}

impl StageBoundary {
    pub const ALL: [Self; 4] = [
        Self::SeedlingToVegetative,
        Self::VegetativeToFlowering,
        Self::FloweringToFruiting,
        Self::FruitingMarker,
    ];

    /// Fraction of the span at which the boundary sits
    #[must_use]
    pub const fn fraction(self) -> f64 {
        match self {
            Self::SeedlingToVegetative => 0.25,
            Self::VegetativeToFlowering => 0.50,
            Self::FloweringToFruiting => 0.75,
            Self::FruitingMarker => 0.90,
        }
    }

    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::SeedlingToVegetative => 25,
            Self::VegetativeToFlowering => 50,
            Self::FloweringToFruiting => 75,
            Self::FruitingMarker => 90,
        }
    }

    /// Stage a planting has reached once it passes this boundary
    #[must_use]
    pub const fn stage_reached(self) -> GrowthStage {
        match self {
            Self::SeedlingToVegetative => GrowthStage::Vegetative,
            Self::VegetativeToFlowering => GrowthStage::Flowering,
            Self::FloweringToFruiting | Self::FruitingMarker => GrowthStage::Fruiting,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SeedlingToVegetative => "seedling→vegetative",
            Self::VegetativeToFlowering => "vegetative→flowering",
            Self::FloweringToFruiting => "flowering→fruiting",
            Self::FruitingMarker => "fruiting-marker",
        }
    }
}

/// A boundary together with the instant it falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub boundary: StageBoundary,
    pub at: DateTime<Utc>,
}

/// Stage boundaries a planting has already passed at `now`
///
/// Only boundaries between the planting date and `now` (inclusive) are
/// returned, in span order. A degenerate span yields no boundaries.
#[must_use]
pub fn stage_transition_dates(planting: &Planting, now: DateTime<Utc>) -> Vec<StageTransition> {
    let start = planting.planted_at();
    let end = planting.harvest_at();
    if end <= start {
        return Vec::new();
    }

    StageBoundary::ALL
        .into_iter()
        .filter_map(|boundary| {
            interpolate(start, end, boundary.fraction()).map(|at| StageTransition { boundary, at })
        })
        .filter(|t| t.at >= start && t.at <= now)
        .collect()
}

/// Per-planting growth overview
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub planting_id: Uuid,
    pub display_name: String,
    pub stage: GrowthStage,
    /// Share of the span elapsed, clamped to 0..=100
    pub progress_percent: f64,
    /// Whole days since planting (floor)
    pub days_elapsed: i64,
    /// Whole days until the expected harvest (ceiling, negative once past)
    pub days_until_harvest: i64,
}

impl Planting {
    /// Growth stage at `now`
    #[must_use]
    pub fn stage(&self, now: DateTime<Utc>) -> GrowthStage {
        classify_stage(self.planted_at(), self.harvest_at(), now)
    }
}

/// Summarise a planting's growth at `now`
#[must_use]
pub fn summarize(planting: &Planting, now: DateTime<Utc>) -> GrowthSummary {
    let start = planting.planted_at();
    let end = planting.harvest_at();
    let stage = classify_stage(start, end, now);

    let progress_percent = match span_percent(start, end, now) {
        Some(percent) => percent.clamp(0.0, 100.0),
        None if stage == GrowthStage::Ready => 100.0,
        None => 0.0,
    };

    GrowthSummary {
        planting_id: planting.id,
        display_name: planting.display_name(),
        stage,
        progress_percent,
        days_elapsed: days_elapsed(start, now),
        days_until_harvest: days_until(now, end),
    }
}
