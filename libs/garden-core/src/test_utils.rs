//! Fixture builders and an in-memory snapshot source for tests

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{GardenError, Result};
use crate::models::{
    Completion, HarvestLogEntry, HealthStatus, Photo, Planting, SeedLot, Task, WeatherSkip,
};
use crate::records::SourceKind;
use crate::snapshot::SnapshotSource;

/// Calendar date shorthand
///
/// # Panics
/// Panics if the date does not exist
#[must_use]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// UTC instant shorthand
///
/// # Panics
/// Panics if the instant does not exist
#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test instant")
}

/// Builder for [`Planting`] fixtures
#[derive(Debug, Clone)]
pub struct PlantingBuilder {
    planting: Planting,
}

impl PlantingBuilder {
    #[must_use]
    pub fn new(crop_name: &str) -> Self {
        Self {
            planting: Planting {
                id: Uuid::new_v4(),
                crop_name: crop_name.to_string(),
                variety: None,
                planting_date: date(2024, 3, 1),
                expected_harvest_date: date(2024, 5, 30),
                health: HealthStatus::Healthy,
                garden_id: None,
                bed_id: None,
                harvest_logs: Vec::new(),
                created_at: None,
            },
        }
    }

    #[must_use]
    pub fn id(mut self, id: Uuid) -> Self {
        self.planting.id = id;
        self
    }

    #[must_use]
    pub fn variety(mut self, variety: &str) -> Self {
        self.planting.variety = Some(variety.to_string());
        self
    }

    #[must_use]
    pub fn planted(mut self, planted: NaiveDate) -> Self {
        self.planting.planting_date = planted;
        self
    }

    #[must_use]
    pub fn harvest(mut self, harvest: NaiveDate) -> Self {
        self.planting.expected_harvest_date = harvest;
        self
    }

    #[must_use]
    pub fn health(mut self, health: HealthStatus) -> Self {
        self.planting.health = health;
        self
    }

    #[must_use]
    pub fn garden(mut self, garden_id: Uuid) -> Self {
        self.planting.garden_id = Some(garden_id);
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.planting.created_at = Some(created_at);
        self
    }

    #[must_use]
    pub fn harvest_log(mut self, date: NaiveDate, amount: f64, unit: &str, surplus: bool) -> Self {
        self.planting.harvest_logs.push(HarvestLogEntry {
            date,
            amount,
            unit: unit.to_string(),
            surplus,
        });
        self
    }

    #[must_use]
    pub fn build(self) -> Planting {
        self.planting
    }
}

/// Builder for [`Task`] fixtures
#[derive(Debug, Clone)]
pub struct TaskBuilder {
    task: Task,
}

impl TaskBuilder {
    #[must_use]
    pub fn new(title: &str) -> Self {
        Self {
            task: Task {
                id: Uuid::new_v4(),
                title: title.to_string(),
                task_type: "general".to_string(),
                planting_id: None,
                due_date: None,
                completion: Completion::Pending,
                weather_skip: WeatherSkip::NotSkipped,
                updated_at: None,
            },
        }
    }

    #[must_use]
    pub fn task_type(mut self, task_type: &str) -> Self {
        self.task.task_type = task_type.to_string();
        self
    }

    #[must_use]
    pub fn planting(mut self, planting_id: Uuid) -> Self {
        self.task.planting_id = Some(planting_id);
        self
    }

    #[must_use]
    pub fn due(mut self, due: NaiveDate) -> Self {
        self.task.due_date = Some(due);
        self
    }

    #[must_use]
    pub fn completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.completion = Completion::Done { at: Some(at) };
        self
    }

    /// Mark completed without recording when
    #[must_use]
    pub fn completed_untimed(mut self) -> Self {
        self.task.completion = Completion::Done { at: None };
        self
    }

    #[must_use]
    pub fn weather_skipped(mut self, reason: Option<&str>) -> Self {
        self.task.weather_skip = WeatherSkip::Skipped {
            reason: reason.map(str::to_string),
        };
        self
    }

    #[must_use]
    pub fn updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.task.updated_at = Some(at);
        self
    }

    #[must_use]
    pub fn build(self) -> Task {
        self.task
    }
}

#[must_use]
pub fn seed_lot(crop_name: &str, quantity: u32, expires: Option<NaiveDate>) -> SeedLot {
    SeedLot {
        crop_name: crop_name.to_string(),
        variety: None,
        quantity,
        unit: "packets".to_string(),
        expiration_date: expires,
    }
}

#[must_use]
pub fn photo(created_at: Option<DateTime<Utc>>, planting_id: Option<Uuid>) -> Photo {
    let id = Uuid::new_v4();
    Photo {
        id,
        url: format!("https://photos.example.invalid/{id}.jpg"),
        photo_type: "progress".to_string(),
        caption: None,
        created_at,
        planting_id,
    }
}

/// Snapshot source backed by in-memory payloads
///
/// Kinds with no payload fetch as `Ok(None)`.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    payloads: HashMap<SourceKind, std::result::Result<Value, String>>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, kind: SourceKind, payload: Value) -> Self {
        self.payloads.insert(kind, Ok(payload));
        self
    }

    /// Make `kind` fail with `message`
    #[must_use]
    pub fn failing(mut self, kind: SourceKind, message: &str) -> Self {
        self.payloads.insert(kind, Err(message.to_string()));
        self
    }

    /// Write every successful payload into `dir` as a snapshot file
    ///
    /// # Errors
    /// Returns an error if a file cannot be written
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        for (kind, payload) in &self.payloads {
            if let Ok(value) = payload {
                std::fs::write(dir.join(kind.file_name()), serde_json::to_vec_pretty(value)?)?;
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl SnapshotSource for MemorySource {
    async fn fetch(&self, kind: SourceKind) -> Result<Option<Value>> {
        match self.payloads.get(&kind) {
            Some(Ok(value)) => Ok(Some(value.clone())),
            Some(Err(message)) => Err(GardenError::source_failure(kind.as_str(), message.clone())),
            None => Ok(None),
        }
    }
}
