//! API record shapes and their conversion into typed models
//!
//! The remote API hands back loosely-typed JSON: optional fields, mixed
//! camelCase/snake_case keys, dates as strings in several formats. Each
//! record is converted on its own so that one malformed record is dropped
//! without affecting its neighbours.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use garden_common::{
    parse_date, parse_datetime, PHOTOS_FILE, PLANTINGS_FILE, PROFILE_FILE, SEEDS_FILE, TASKS_FILE,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::GardenError;
use crate::models::{
    Completion, HarvestLogEntry, HealthStatus, Photo, Planting, Profile, SeedLot, Task,
    WeatherSkip,
};

/// Kind of upstream source a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Plantings,
    Tasks,
    Seeds,
    Photos,
    Profile,
}

impl SourceKind {
    pub const ALL: [Self; 5] = [
        Self::Plantings,
        Self::Tasks,
        Self::Seeds,
        Self::Photos,
        Self::Profile,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plantings => "plantings",
            Self::Tasks => "tasks",
            Self::Seeds => "seeds",
            Self::Photos => "photos",
            Self::Profile => "profile",
        }
    }

    /// File holding this source inside a snapshot directory
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Plantings => PLANTINGS_FILE,
            Self::Tasks => TASKS_FILE,
            Self::Seeds => SEEDS_FILE,
            Self::Photos => PHOTOS_FILE,
            Self::Profile => PROFILE_FILE,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Why a single record could not be converted
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is not a valid object: {0}")]
    Shape(String),

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("invalid value for '{field}': {value}")]
    InvalidField { field: &'static str, value: String },
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RecordError::MissingField(field))
}

fn required_uuid(value: Option<String>, field: &'static str) -> Result<Uuid, RecordError> {
    let raw = required(value, field)?;
    Uuid::parse_str(raw.trim()).map_err(|_| RecordError::InvalidField { field, value: raw })
}

fn required_date(value: Option<String>, field: &'static str) -> Result<NaiveDate, RecordError> {
    let raw = required(value, field)?;
    parse_date(&raw).ok_or(RecordError::InvalidField { field, value: raw })
}

/// Optional references that fail to parse are treated as absent
fn optional_uuid(value: Option<String>) -> Option<Uuid> {
    value.and_then(|v| Uuid::parse_str(v.trim()).ok())
}

fn optional_date(value: Option<String>) -> Option<NaiveDate> {
    value.and_then(|v| parse_date(&v))
}

fn optional_datetime(value: Option<String>) -> Option<DateTime<Utc>> {
    value.and_then(|v| parse_datetime(&v))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Harvest log entry as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HarvestLogRecord {
    #[serde(alias = "harvestDate")]
    pub date: Option<String>,
    #[serde(alias = "quantity")]
    pub amount: Option<f64>,
    pub unit: Option<String>,
    #[serde(alias = "isSurplus")]
    pub surplus: Option<bool>,
}

impl TryFrom<HarvestLogRecord> for HarvestLogEntry {
    type Error = RecordError;

    fn try_from(record: HarvestLogRecord) -> Result<Self, Self::Error> {
        let amount = required(record.amount, "amount")?;
        if !amount.is_finite() {
            return Err(RecordError::InvalidField {
                field: "amount",
                value: amount.to_string(),
            });
        }
        Ok(Self {
            date: required_date(record.date, "date")?,
            amount,
            unit: record.unit.unwrap_or_default(),
            surplus: record.surplus.unwrap_or(false),
        })
    }
}

/// Planting as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlantingRecord {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "cropName", alias = "crop")]
    pub crop_name: Option<String>,
    pub variety: Option<String>,
    #[serde(alias = "plantingDate", alias = "plantedDate")]
    pub planting_date: Option<String>,
    #[serde(alias = "expectedHarvestDate", alias = "harvestDate")]
    pub expected_harvest_date: Option<String>,
    #[serde(alias = "healthStatus", alias = "health")]
    pub health_status: Option<String>,
    #[serde(alias = "gardenId", alias = "garden")]
    pub garden_id: Option<String>,
    #[serde(alias = "bedId", alias = "bed")]
    pub bed_id: Option<String>,
    #[serde(alias = "harvestLogs", alias = "harvests")]
    pub harvest_logs: Option<Vec<Value>>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<String>,
}

impl TryFrom<PlantingRecord> for Planting {
    type Error = RecordError;

    fn try_from(record: PlantingRecord) -> Result<Self, Self::Error> {
        let id = required_uuid(record.id, "id")?;
        let harvest_logs = record
            .harvest_logs
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| {
                match convert_one::<HarvestLogRecord, HarvestLogEntry>(value) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        warn!(planting = %id, index, error = %e, "Dropping malformed harvest log entry");
                        None
                    }
                }
            })
            .collect();

        Ok(Self {
            id,
            crop_name: required_text(record.crop_name, "crop_name")?,
            variety: optional_text(record.variety),
            planting_date: required_date(record.planting_date, "planting_date")?,
            expected_harvest_date: required_date(
                record.expected_harvest_date,
                "expected_harvest_date",
            )?,
            health: HealthStatus::from_wire(record.health_status.as_deref()),
            garden_id: optional_uuid(record.garden_id),
            bed_id: optional_uuid(record.bed_id),
            harvest_logs,
            created_at: optional_datetime(record.created_at),
        })
    }
}

/// Task as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskRecord {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    pub title: Option<String>,
    #[serde(alias = "taskType", alias = "type")]
    pub task_type: Option<String>,
    #[serde(alias = "plantingId", alias = "planting")]
    pub planting_id: Option<String>,
    #[serde(alias = "dueDate")]
    pub due_date: Option<String>,
    pub completed: Option<bool>,
    #[serde(alias = "completedAt")]
    pub completed_at: Option<String>,
    #[serde(alias = "weatherSkipped", alias = "skippedDueToWeather")]
    pub weather_skipped: Option<bool>,
    #[serde(alias = "weatherSkipReason", alias = "skipReason")]
    pub weather_skip_reason: Option<String>,
    #[serde(alias = "updatedAt")]
    pub updated_at: Option<String>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = RecordError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let completion = if record.completed.unwrap_or(false) {
            Completion::Done {
                at: optional_datetime(record.completed_at),
            }
        } else {
            Completion::Pending
        };
        let weather_skip = if record.weather_skipped.unwrap_or(false) {
            WeatherSkip::Skipped {
                reason: optional_text(record.weather_skip_reason),
            }
        } else {
            WeatherSkip::NotSkipped
        };

        Ok(Self {
            id: required_uuid(record.id, "id")?,
            title: required_text(record.title, "title")?,
            task_type: optional_text(record.task_type).unwrap_or_else(|| "general".to_string()),
            planting_id: optional_uuid(record.planting_id),
            due_date: optional_date(record.due_date),
            completion,
            weather_skip,
            updated_at: optional_datetime(record.updated_at),
        })
    }
}

/// Seed lot as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SeedLotRecord {
    #[serde(alias = "cropName", alias = "crop")]
    pub crop_name: Option<String>,
    pub variety: Option<String>,
    pub quantity: Option<i64>,
    pub unit: Option<String>,
    #[serde(alias = "expirationDate", alias = "expiresAt")]
    pub expiration_date: Option<String>,
}

impl TryFrom<SeedLotRecord> for SeedLot {
    type Error = RecordError;

    fn try_from(record: SeedLotRecord) -> Result<Self, Self::Error> {
        let quantity = record.quantity.unwrap_or(0).max(0);
        Ok(Self {
            crop_name: required_text(record.crop_name, "crop_name")?,
            variety: optional_text(record.variety),
            quantity: u32::try_from(quantity).unwrap_or(u32::MAX),
            unit: record.unit.unwrap_or_else(|| "packets".to_string()),
            expiration_date: optional_date(record.expiration_date),
        })
    }
}

/// Photo as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PhotoRecord {
    #[serde(alias = "_id")]
    pub id: Option<String>,
    #[serde(alias = "imageUrl")]
    pub url: Option<String>,
    #[serde(alias = "photoType", alias = "type", alias = "category")]
    pub photo_type: Option<String>,
    pub caption: Option<String>,
    #[serde(alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(alias = "plantingId", alias = "planting")]
    pub planting_id: Option<String>,
}

impl TryFrom<PhotoRecord> for Photo {
    type Error = RecordError;

    fn try_from(record: PhotoRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: required_uuid(record.id, "id")?,
            url: required_text(record.url, "url")?,
            photo_type: optional_text(record.photo_type).unwrap_or_else(|| "general".to_string()),
            caption: optional_text(record.caption),
            created_at: optional_datetime(record.created_at),
            planting_id: optional_uuid(record.planting_id),
        })
    }
}

/// Profile as sent by the API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileRecord {
    #[serde(alias = "lastFrostDate")]
    pub last_frost_date: Option<String>,
    #[serde(alias = "firstFrostDate")]
    pub first_frost_date: Option<String>,
}

impl From<ProfileRecord> for Profile {
    fn from(record: ProfileRecord) -> Self {
        Self {
            last_frost_date: optional_date(record.last_frost_date),
            first_frost_date: optional_date(record.first_frost_date),
        }
    }
}

/// Convert one raw JSON value into a typed model
///
/// # Errors
/// Returns `RecordError` if the value is not an object of the expected
/// shape or a required field is missing or unparseable
pub fn convert_one<R, T>(value: Value) -> Result<T, RecordError>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError>,
{
    let record: R = serde_json::from_value(value).map_err(|e| RecordError::Shape(e.to_string()))?;
    T::try_from(record)
}

/// Records that survived ingestion plus the number dropped
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

/// Convert a list of raw values, dropping malformed records
pub fn ingest<R, T>(kind: SourceKind, values: Vec<Value>) -> Ingested<T>
where
    R: DeserializeOwned,
    T: TryFrom<R, Error = RecordError>,
{
    let total = values.len();
    let mut records = Vec::with_capacity(total);
    let mut dropped = 0;

    for (index, value) in values.into_iter().enumerate() {
        match convert_one::<R, T>(value) {
            Ok(record) => records.push(record),
            Err(e) => {
                dropped += 1;
                let error = GardenError::malformed(kind.as_str(), index, e.to_string());
                warn!(%error, "Dropping malformed record");
            }
        }
    }

    debug!(source = %kind, total, kept = records.len(), dropped, "Ingested records");
    Ingested { records, dropped }
}

/// Typed ingestion for each record kind
pub fn ingest_plantings(values: Vec<Value>) -> Ingested<Planting> {
    ingest::<PlantingRecord, Planting>(SourceKind::Plantings, values)
}

pub fn ingest_tasks(values: Vec<Value>) -> Ingested<Task> {
    ingest::<TaskRecord, Task>(SourceKind::Tasks, values)
}

pub fn ingest_seeds(values: Vec<Value>) -> Ingested<SeedLot> {
    ingest::<SeedLotRecord, SeedLot>(SourceKind::Seeds, values)
}

pub fn ingest_photos(values: Vec<Value>) -> Ingested<Photo> {
    ingest::<PhotoRecord, Photo>(SourceKind::Photos, values)
}
