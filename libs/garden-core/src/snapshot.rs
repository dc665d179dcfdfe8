//! Snapshot loading
//!
//! All five sources are fetched concurrently and joined before any record
//! is ingested. A source that fails is treated as empty and recorded in the
//! [`LoadReport`]; derivation then runs on whatever was loaded.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::{GardenError, Result};
use crate::models::{Profile, Snapshot};
use crate::records::{
    ingest_photos, ingest_plantings, ingest_seeds, ingest_tasks, Ingested, ProfileRecord,
    SourceKind,
};

/// A provider of raw snapshot payloads
///
/// `Ok(None)` means the source has nothing to offer (no profile, or an
/// empty collection). `Err` means the fetch itself failed.
#[async_trait::async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Fetch the raw JSON payload for one source
    async fn fetch(&self, kind: SourceKind) -> Result<Option<Value>>;
}

/// A source that could not be loaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub message: String,
}

/// What happened while loading a snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Sources whose fetch or decode failed
    pub failures: Vec<SourceFailure>,
    /// Malformed records dropped per source
    pub dropped: BTreeMap<SourceKind, usize>,
    /// Records kept per source
    pub loaded: BTreeMap<SourceKind, usize>,
}

impl LoadReport {
    /// No failures and no dropped records
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.dropped.is_empty()
    }

    /// Every record source failed
    ///
    /// The profile is optional and does not count.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        SourceKind::ALL
            .iter()
            .filter(|kind| **kind != SourceKind::Profile)
            .all(|kind| self.has_failed(*kind))
    }

    #[must_use]
    pub fn has_failed(&self, kind: SourceKind) -> bool {
        self.failures.iter().any(|f| f.source == kind)
    }

    /// Total malformed records dropped across all sources
    #[must_use]
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }

    fn fail(&mut self, kind: SourceKind, error: &GardenError) {
        let message = match error {
            GardenError::SourceFailure { message, .. } => message.clone(),
            other => other.to_string(),
        };
        warn!(source = %kind, error = %message, "Source unavailable, treating as empty");
        self.failures.push(SourceFailure {
            source: kind,
            message,
        });
    }

    fn collect<T>(
        &mut self,
        kind: SourceKind,
        fetched: Result<Option<Value>>,
        ingest: fn(Vec<Value>) -> Ingested<T>,
    ) -> Vec<T> {
        match fetched.and_then(|payload| records_array(kind, payload)) {
            Ok(values) => {
                let Ingested { records, dropped } = ingest(values);
                if dropped > 0 {
                    self.dropped.insert(kind, dropped);
                }
                self.loaded.insert(kind, records.len());
                records
            }
            Err(e) => {
                self.fail(kind, &e);
                Vec::new()
            }
        }
    }

    fn collect_profile(&mut self, fetched: Result<Option<Value>>) -> Option<Profile> {
        match fetched.and_then(profile_record) {
            Ok(profile) => {
                self.loaded
                    .insert(SourceKind::Profile, usize::from(profile.is_some()));
                profile
            }
            Err(e) => {
                self.fail(SourceKind::Profile, &e);
                None
            }
        }
    }
}

/// A loaded snapshot and its report
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedSnapshot {
    pub snapshot: Snapshot,
    pub report: LoadReport,
}

/// Unwrap a collection payload into its elements
///
/// Accepts a bare array or an object wrapping it under `data`.
fn records_array(kind: SourceKind, payload: Option<Value>) -> Result<Vec<Value>> {
    match payload {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(Value::Object(mut map)) => match map.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(GardenError::source_failure(
                kind.as_str(),
                "expected an array of records",
            )),
        },
        Some(_) => Err(GardenError::source_failure(
            kind.as_str(),
            "expected an array of records",
        )),
    }
}

fn profile_record(payload: Option<Value>) -> Result<Option<Profile>> {
    let value = match payload {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(mut map)) if map.get("data").is_some_and(Value::is_object) => {
            map.remove("data").unwrap_or(Value::Null)
        }
        Some(value) => value,
    };
    let record: ProfileRecord = serde_json::from_value(value).map_err(|e| {
        GardenError::source_failure(SourceKind::Profile.as_str(), e.to_string())
    })?;
    Ok(Some(Profile::from(record)))
}

/// Fetch every source concurrently and ingest the results
///
/// Never fails: unavailable sources are reported and treated as empty.
#[instrument(skip(source))]
pub async fn load_snapshot<S>(source: &S) -> LoadedSnapshot
where
    S: SnapshotSource + ?Sized,
{
    let (plantings, tasks, seeds, photos, profile) = tokio::join!(
        source.fetch(SourceKind::Plantings),
        source.fetch(SourceKind::Tasks),
        source.fetch(SourceKind::Seeds),
        source.fetch(SourceKind::Photos),
        source.fetch(SourceKind::Profile),
    );

    let mut report = LoadReport::default();
    let snapshot = Snapshot {
        plantings: report.collect(SourceKind::Plantings, plantings, ingest_plantings),
        tasks: report.collect(SourceKind::Tasks, tasks, ingest_tasks),
        seeds: report.collect(SourceKind::Seeds, seeds, ingest_seeds),
        photos: report.collect(SourceKind::Photos, photos, ingest_photos),
        profile: report.collect_profile(profile),
    };

    info!(
        plantings = snapshot.plantings.len(),
        tasks = snapshot.tasks.len(),
        seeds = snapshot.seeds.len(),
        photos = snapshot.photos.len(),
        failures = report.failures.len(),
        dropped = report.dropped_total(),
        "Snapshot loaded"
    );

    LoadedSnapshot { snapshot, report }
}

/// Reads a snapshot from JSON files in a directory
///
/// A missing `profile.json` means "no profile"; any other missing file is a
/// source failure.
#[derive(Debug, Clone)]
pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait::async_trait]
impl SnapshotSource for JsonDirSource {
    async fn fetch(&self, kind: SourceKind) -> Result<Option<Value>> {
        let path = self.dir.join(kind.file_name());
        debug!(source = %kind, path = %path.display(), "Reading snapshot file");

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound && kind == SourceKind::Profile => {
                return Ok(None);
            }
            Err(e) => {
                return Err(GardenError::source_failure(
                    kind.as_str(),
                    format!("{}: {e}", path.display()),
                ));
            }
        };

        if contents.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&contents).map(Some).map_err(|e| {
            GardenError::source_failure(kind.as_str(), format!("{}: {e}", path.display()))
        })
    }
}
