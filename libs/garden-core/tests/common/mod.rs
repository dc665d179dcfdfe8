//! Shared fixtures for garden-core integration tests
//!
//! Records are built from JSON and pushed through the same ingestion path the
//! snapshot loader uses.

#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use garden_core::records::{ingest_photos, ingest_plantings, ingest_seeds, ingest_tasks};
use garden_core::{Photo, Planting, SeedLot, Task};
use serde_json::Value;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

fn array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(values) => values,
        other => vec![other],
    }
}

pub fn plantings(value: Value) -> Vec<Planting> {
    let ingested = ingest_plantings(array(value));
    assert_eq!(ingested.dropped, 0, "fixture planting was dropped");
    ingested.records
}

pub fn tasks(value: Value) -> Vec<Task> {
    let ingested = ingest_tasks(array(value));
    assert_eq!(ingested.dropped, 0, "fixture task was dropped");
    ingested.records
}

pub fn seeds(value: Value) -> Vec<SeedLot> {
    let ingested = ingest_seeds(array(value));
    assert_eq!(ingested.dropped, 0, "fixture seed lot was dropped");
    ingested.records
}

pub fn photos(value: Value) -> Vec<Photo> {
    let ingested = ingest_photos(array(value));
    assert_eq!(ingested.dropped, 0, "fixture photo was dropped");
    ingested.records
}
