//! Data models for garden entities
//!
//! These are the typed snapshots the engine derives from. They are produced
//! by [`crate::records`] from the loosely-typed API payloads and never
//! mutated afterwards.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::date_utils::{date_to_instant, date_to_local_instant};

/// Planting health enumeration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    #[serde(alias = "stressed")]
    Struggling,
    #[serde(alias = "diseased")]
    Critical,
    #[default]
    #[serde(other)]
    Unspecified,
}

impl HealthStatus {
    /// Parse a wire value; unknown or absent values map to `Unspecified`
    #[must_use]
    pub fn from_wire(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("healthy") => Self::Healthy,
            Some("struggling" | "stressed") => Self::Struggling,
            Some("critical" | "diseased") => Self::Critical,
            _ => Self::Unspecified,
        }
    }

    /// Whether this status should raise a health warning
    #[must_use]
    pub const fn needs_attention(self) -> bool {
        matches!(self, Self::Struggling | Self::Critical)
    }
}

/// A single harvest recorded against a planting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestLogEntry {
    /// Day the harvest happened
    pub date: NaiveDate,
    /// Harvested amount
    pub amount: f64,
    /// Unit of `amount` (may be empty)
    pub unit: String,
    /// Whether the harvest was marked as surplus
    pub surplus: bool,
}

/// A tracked crop instance in a bed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planting {
    /// Unique identifier
    pub id: Uuid,
    /// Crop name
    pub crop_name: String,
    /// Optional variety
    pub variety: Option<String>,
    /// Day the crop was planted
    pub planting_date: NaiveDate,
    /// Day the harvest window is expected to open
    pub expected_harvest_date: NaiveDate,
    /// Health status
    pub health: HealthStatus,
    /// Owning garden
    pub garden_id: Option<Uuid>,
    /// Owning bed
    pub bed_id: Option<Uuid>,
    /// Harvests logged against this planting
    pub harvest_logs: Vec<HarvestLogEntry>,
    /// Creation timestamp
    pub created_at: Option<DateTime<Utc>>,
}

impl Planting {
    /// Crop name with the variety in parentheses when present
    #[must_use]
    pub fn display_name(&self) -> String {
        garden_common::display_name(&self.crop_name, self.variety.as_deref())
    }

    /// Planting date as an instant (midnight UTC)
    #[must_use]
    pub fn planted_at(&self) -> DateTime<Utc> {
        date_to_instant(self.planting_date)
    }

    /// Expected harvest date as an instant (midnight UTC)
    #[must_use]
    pub fn harvest_at(&self) -> DateTime<Utc> {
        date_to_instant(self.expected_harvest_date)
    }

    /// When the planting entered the system, falling back to local midnight
    /// of the planting date
    #[must_use]
    pub fn created_or_planted_at(&self, offset: FixedOffset) -> DateTime<Utc> {
        self.created_at
            .unwrap_or_else(|| date_to_local_instant(self.planting_date, offset))
    }
}

/// Task completion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Completion {
    Pending,
    Done { at: Option<DateTime<Utc>> },
}

/// Weather adjustment applied to a task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WeatherSkip {
    NotSkipped,
    Skipped { reason: Option<String> },
}

/// An actionable reminder tied to a planting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Free-form task type ("watering", "fertilizing", ...)
    pub task_type: String,
    /// Planting the task belongs to
    pub planting_id: Option<Uuid>,
    /// Due date
    pub due_date: Option<NaiveDate>,
    /// Completion state
    pub completion: Completion,
    /// Weather adjustment
    pub weather_skip: WeatherSkip,
    /// Last modification timestamp
    pub updated_at: Option<DateTime<Utc>>,
}

impl Task {
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.completion, Completion::Done { .. })
    }

    /// Completion timestamp, if the task is done and the timestamp is known
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        match self.completion {
            Completion::Done { at } => at,
            Completion::Pending => None,
        }
    }

    #[must_use]
    pub const fn is_weather_skipped(&self) -> bool {
        matches!(self.weather_skip, WeatherSkip::Skipped { .. })
    }

    /// Reason recorded for the weather skip
    #[must_use]
    pub fn skip_reason(&self) -> Option<&str> {
        match &self.weather_skip {
            WeatherSkip::Skipped { reason } => reason.as_deref(),
            WeatherSkip::NotSkipped => None,
        }
    }
}

/// Seed inventory record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedLot {
    /// Crop name
    pub crop_name: String,
    /// Optional variety
    pub variety: Option<String>,
    /// Quantity on hand
    pub quantity: u32,
    /// Unit of `quantity` ("packets", "seeds", ...)
    pub unit: String,
    /// Expiration date
    pub expiration_date: Option<NaiveDate>,
}

impl SeedLot {
    #[must_use]
    pub fn display_name(&self) -> String {
        garden_common::display_name(&self.crop_name, self.variety.as_deref())
    }
}

/// A photo attached to the garden
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Unique identifier
    pub id: Uuid,
    /// Image location
    pub url: String,
    /// Category tag ("progress", "pest", "harvest", ...)
    pub photo_type: String,
    /// Optional caption
    pub caption: Option<String>,
    /// Upload timestamp
    pub created_at: Option<DateTime<Utc>>,
    /// Planting the photo documents
    pub planting_id: Option<Uuid>,
}

/// Gardener profile
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Expected last spring frost
    pub last_frost_date: Option<NaiveDate>,
    /// Expected first fall frost
    pub first_frost_date: Option<NaiveDate>,
}

/// Full set of records for one derivation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub plantings: Vec<Planting>,
    pub tasks: Vec<Task>,
    pub seeds: Vec<SeedLot>,
    pub photos: Vec<Photo>,
    pub profile: Option<Profile>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plantings.is_empty()
            && self.tasks.is_empty()
            && self.seeds.is_empty()
            && self.photos.is_empty()
            && self.profile.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planting() -> Planting {
        Planting {
            id: Uuid::new_v4(),
            crop_name: "Tomato".to_string(),
            variety: Some("Cherry".to_string()),
            planting_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expected_harvest_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            health: HealthStatus::Healthy,
            garden_id: None,
            bed_id: None,
            harvest_logs: vec![],
            created_at: None,
        }
    }

    #[test]
    fn test_health_status_serialization() {
        assert_eq!(
            serde_json::to_string(&HealthStatus::Struggling).unwrap(),
            "\"struggling\""
        );
        assert_eq!(
            serde_json::to_string(&HealthStatus::Unspecified).unwrap(),
            "\"unspecified\""
        );
    }

    #[test]
    fn test_health_status_aliases() {
        let status: HealthStatus = serde_json::from_str("\"stressed\"").unwrap();
        assert_eq!(status, HealthStatus::Struggling);

        let status: HealthStatus = serde_json::from_str("\"diseased\"").unwrap();
        assert_eq!(status, HealthStatus::Critical);

        let status: HealthStatus = serde_json::from_str("\"thriving\"").unwrap();
        assert_eq!(status, HealthStatus::Unspecified);
    }

    #[test]
    fn test_health_status_from_wire() {
        assert_eq!(HealthStatus::from_wire(Some("Healthy")), HealthStatus::Healthy);
        assert_eq!(HealthStatus::from_wire(Some(" STRESSED ")), HealthStatus::Struggling);
        assert_eq!(HealthStatus::from_wire(Some("diseased")), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_wire(Some("")), HealthStatus::Unspecified);
        assert_eq!(HealthStatus::from_wire(None), HealthStatus::Unspecified);
    }

    #[test]
    fn test_needs_attention() {
        assert!(!HealthStatus::Healthy.needs_attention());
        assert!(HealthStatus::Struggling.needs_attention());
        assert!(HealthStatus::Critical.needs_attention());
        assert!(!HealthStatus::Unspecified.needs_attention());
    }

    #[test]
    fn test_planting_display_name() {
        let mut p = planting();
        assert_eq!(p.display_name(), "Tomato (Cherry)");
        p.variety = None;
        assert_eq!(p.display_name(), "Tomato");
    }

    #[test]
    fn test_created_or_planted_at_falls_back() {
        let mut p = planting();
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(p.created_or_planted_at(utc), p.planted_at());

        let us_eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        let fallback = p.created_or_planted_at(us_eastern);
        assert_eq!(fallback.with_timezone(&us_eastern).date_naive(), p.planting_date);

        let created = DateTime::parse_from_rfc3339("2023-12-30T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        p.created_at = Some(created);
        assert_eq!(p.created_or_planted_at(us_eastern), created);
    }

    #[test]
    fn test_task_completion_accessors() {
        let done_at = Utc::now();
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "Water beds".to_string(),
            task_type: "watering".to_string(),
            planting_id: None,
            due_date: None,
            completion: Completion::Pending,
            weather_skip: WeatherSkip::NotSkipped,
            updated_at: None,
        };
        assert!(!task.is_completed());
        assert_eq!(task.completed_at(), None);

        task.completion = Completion::Done { at: Some(done_at) };
        assert!(task.is_completed());
        assert_eq!(task.completed_at(), Some(done_at));

        task.completion = Completion::Done { at: None };
        assert!(task.is_completed());
        assert_eq!(task.completed_at(), None);
    }

    #[test]
    fn test_task_weather_skip_accessors() {
        let mut task = Task {
            id: Uuid::new_v4(),
            title: "Water beds".to_string(),
            task_type: "watering".to_string(),
            planting_id: None,
            due_date: None,
            completion: Completion::Pending,
            weather_skip: WeatherSkip::NotSkipped,
            updated_at: None,
        };
        assert!(!task.is_weather_skipped());
        assert_eq!(task.skip_reason(), None);

        task.weather_skip = WeatherSkip::Skipped {
            reason: Some("Rain expected".to_string()),
        };
        assert!(task.is_weather_skipped());
        assert_eq!(task.skip_reason(), Some("Rain expected"));
    }

    #[test]
    fn test_completion_serialization() {
        let json = serde_json::to_value(Completion::Pending).unwrap();
        assert_eq!(json["state"], "pending");

        let json = serde_json::to_value(WeatherSkip::Skipped { reason: None }).unwrap();
        assert_eq!(json["state"], "skipped");
    }

    #[test]
    fn test_snapshot_is_empty() {
        let snapshot = Snapshot {
            plantings: vec![planting()],
            ..Snapshot::default()
        };
        assert!(!snapshot.is_empty());
        assert!(Snapshot::default().is_empty());
    }
}
