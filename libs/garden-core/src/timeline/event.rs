//! Normalized timeline event types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GardenError;
use crate::growth::GrowthStage;

/// Kind of activity a timeline event describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventCategory {
    PlantingCreated,
    StageChange,
    TaskCompleted,
    HarvestLogged,
    PhotoAdded,
    WateringAdjusted,
}

impl EventCategory {
    pub const ALL: [Self; 6] = [
        Self::PlantingCreated,
        Self::StageChange,
        Self::TaskCompleted,
        Self::HarvestLogged,
        Self::PhotoAdded,
        Self::WateringAdjusted,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlantingCreated => "planting-created",
            Self::StageChange => "stage-change",
            Self::TaskCompleted => "task-completed",
            Self::HarvestLogged => "harvest-logged",
            Self::PhotoAdded => "photo-added",
            Self::WateringAdjusted => "watering-adjusted",
        }
    }

    /// Human label used for filter tabs
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::PlantingCreated => "Plantings",
            Self::StageChange => "Growth",
            Self::TaskCompleted => "Tasks",
            Self::HarvestLogged => "Harvests",
            Self::PhotoAdded => "Photos",
            Self::WateringAdjusted => "Watering",
        }
    }

    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::PlantingCreated => "🌱",
            Self::StageChange => "📈",
            Self::TaskCompleted => "✅",
            Self::HarvestLogged => "🧺",
            Self::PhotoAdded => "📷",
            Self::WateringAdjusted => "💧",
        }
    }

    #[must_use]
    pub const fn color(self) -> &'static str {
        match self {
            Self::PlantingCreated => "green",
            Self::StageChange => "purple",
            Self::TaskCompleted => "blue",
            Self::HarvestLogged => "orange",
            Self::PhotoAdded => "pink",
            Self::WateringAdjusted => "cyan",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EventCategory {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == wanted)
            .ok_or_else(|| GardenError::configuration(format!("Unknown event category: {s}")))
    }
}

/// Category filter applied by the aggregator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(EventCategory),
}

impl CategoryFilter {
    #[must_use]
    pub fn matches(self, category: EventCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.pad("all"),
            Self::Only(category) => f.pad(category.as_str()),
        }
    }
}

/// Where a timeline event links to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavigationTarget {
    pub planting_id: Uuid,
    pub garden_id: Option<Uuid>,
}

impl NavigationTarget {
    /// Route to the planting's detail view
    #[must_use]
    pub fn path(&self) -> String {
        match self.garden_id {
            Some(garden) => format!("/gardens/{garden}/plantings/{}", self.planting_id),
            None => format!("/plantings/{}", self.planting_id),
        }
    }
}

/// Category-specific payload carried by an event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventMetadata {
    PlantingCreated {
        planting_id: Uuid,
        crop_name: String,
        variety: Option<String>,
    },
    StageChange {
        planting_id: Uuid,
        stage: GrowthStage,
        percent: u8,
    },
    HarvestLogged {
        planting_id: Uuid,
        amount: f64,
        unit: String,
        surplus: bool,
    },
    TaskCompleted {
        task_id: Uuid,
        task_type: String,
        planting_id: Option<Uuid>,
    },
    WateringAdjusted {
        task_id: Uuid,
        reason: Option<String>,
        completed: bool,
    },
    PhotoAdded {
        photo_id: Uuid,
        url: String,
        photo_type: String,
        planting_id: Option<Uuid>,
    },
}

/// A single derived entry in the activity timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEvent {
    /// Deterministic identifier built from the source kind and id
    pub id: String,
    pub category: EventCategory,
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub icon: &'static str,
    pub color: &'static str,
    pub link: Option<NavigationTarget>,
    pub metadata: EventMetadata,
}

impl TimelineEvent {
    /// New event with the category's icon and color
    pub fn new(
        id: impl Into<String>,
        category: EventCategory,
        timestamp: DateTime<Utc>,
        title: impl Into<String>,
        metadata: EventMetadata,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            timestamp,
            title: title.into(),
            description: None,
            icon: category.icon(),
            color: category.color(),
            link: None,
            metadata,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: Option<NavigationTarget>) -> Self {
        self.link = link;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in EventCategory::ALL {
            assert_eq!(category.as_str().parse::<EventCategory>().unwrap(), category);
            assert_eq!(
                serde_json::to_value(category).unwrap(),
                serde_json::Value::String(category.as_str().to_string())
            );
        }
        assert!("weeding".parse::<EventCategory>().is_err());
    }

    #[test]
    fn test_filter_parsing() {
        assert_eq!("all".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!("ALL".parse::<CategoryFilter>().unwrap(), CategoryFilter::All);
        assert_eq!(
            "photo-added".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(EventCategory::PhotoAdded)
        );
        assert!("everything".parse::<CategoryFilter>().is_err());
        assert_eq!(CategoryFilter::All.to_string(), "all");
    }

    #[test]
    fn test_filter_matches() {
        assert!(CategoryFilter::All.matches(EventCategory::StageChange));
        let only = CategoryFilter::Only(EventCategory::TaskCompleted);
        assert!(only.matches(EventCategory::TaskCompleted));
        assert!(!only.matches(EventCategory::WateringAdjusted));
    }

    #[test]
    fn test_navigation_path() {
        let planting_id = Uuid::nil();
        let garden_id = Uuid::from_u128(1);
        let target = NavigationTarget {
            planting_id,
            garden_id: None,
        };
        assert_eq!(target.path(), format!("/plantings/{planting_id}"));
        let target = NavigationTarget {
            planting_id,
            garden_id: Some(garden_id),
        };
        assert_eq!(
            target.path(),
            format!("/gardens/{garden_id}/plantings/{planting_id}")
        );
    }

    #[test]
    fn test_metadata_is_tagged() {
        let metadata = EventMetadata::StageChange {
            planting_id: Uuid::nil(),
            stage: GrowthStage::Flowering,
            percent: 50,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "stage_change");
        assert_eq!(json["stage"], "flowering");
    }

    #[test]
    fn test_event_builder_uses_category_style() {
        let event = TimelineEvent::new(
            "photo-1",
            EventCategory::PhotoAdded,
            Utc::now(),
            "Photo added",
            EventMetadata::PhotoAdded {
                photo_id: Uuid::nil(),
                url: "u".to_string(),
                photo_type: "progress".to_string(),
                planting_id: None,
            },
        )
        .with_description("Leaves");
        assert_eq!(event.icon, EventCategory::PhotoAdded.icon());
        assert_eq!(event.color, "pink");
        assert_eq!(event.description.as_deref(), Some("Leaves"));
        assert!(event.link.is_none());
    }
}
