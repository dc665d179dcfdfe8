//! Merging, filtering and day-grouping of timeline events

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};
use garden_common::format_day_heading;
use serde::Serialize;

use crate::date_utils::local_date;
use crate::timeline::event::{CategoryFilter, EventCategory, TimelineEvent};

/// Events that happened on one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayGroup {
    pub date: NaiveDate,
    /// Heading such as "January 6, 2024"
    pub label: String,
    pub events: Vec<TimelineEvent>,
}

/// Sort, filter and group events, newest first
///
/// The sort is stable, so events with equal timestamps keep the order they
/// were given in. Groups are keyed by the local day under `offset`.
#[must_use]
pub fn aggregate(
    mut events: Vec<TimelineEvent>,
    filter: CategoryFilter,
    offset: FixedOffset,
) -> Vec<DayGroup> {
    events.retain(|event| filter.matches(event.category));
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut groups: Vec<DayGroup> = Vec::new();
    for event in events {
        let day = local_date(event.timestamp, offset);
        match groups.last_mut() {
            Some(group) if group.date == day => group.events.push(event),
            _ => groups.push(DayGroup {
                date: day,
                label: format_day_heading(&day),
                events: vec![event],
            }),
        }
    }
    groups
}

/// Flatten groups back into one ordered list
#[must_use]
pub fn flatten(groups: Vec<DayGroup>) -> Vec<TimelineEvent> {
    groups.into_iter().flat_map(|group| group.events).collect()
}

/// Event counts per category over the unfiltered timeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TimelineStats {
    pub total: usize,
    pub by_category: BTreeMap<EventCategory, usize>,
}

impl TimelineStats {
    #[must_use]
    pub fn from_events(events: &[TimelineEvent]) -> Self {
        let mut by_category: BTreeMap<EventCategory, usize> =
            EventCategory::ALL.iter().map(|c| (*c, 0)).collect();
        for event in events {
            *by_category.entry(event.category).or_default() += 1;
        }
        Self {
            total: events.len(),
            by_category,
        }
    }

    #[must_use]
    pub fn count(&self, category: EventCategory) -> usize {
        self.by_category.get(&category).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::event::EventMetadata;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn event(id: &str, category: EventCategory, timestamp: DateTime<Utc>) -> TimelineEvent {
        TimelineEvent::new(
            id,
            category,
            timestamp,
            id,
            EventMetadata::PhotoAdded {
                photo_id: Uuid::nil(),
                url: String::new(),
                photo_type: "general".to_string(),
                planting_id: None,
            },
        )
    }

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_groups_newest_first() {
        let events = vec![
            event("a", EventCategory::PlantingCreated, at(5, 8)),
            event("b", EventCategory::TaskCompleted, at(6, 9)),
            event("c", EventCategory::PhotoAdded, at(6, 15)),
        ];
        let groups = aggregate(events, CategoryFilter::All, utc());
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "January 6, 2024");
        let ids: Vec<_> = groups[0].events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(groups[1].label, "January 5, 2024");
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let events = vec![
            event("photo", EventCategory::PhotoAdded, at(6, 12)),
            event("task", EventCategory::TaskCompleted, at(6, 12)),
        ];
        let flat = flatten(aggregate(events, CategoryFilter::All, utc()));
        let ids: Vec<_> = flat.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["photo", "task"]);
    }

    #[test]
    fn test_filter_retains_only_category() {
        let events = vec![
            event("a", EventCategory::PlantingCreated, at(5, 8)),
            event("b", EventCategory::TaskCompleted, at(6, 9)),
        ];
        let groups = aggregate(
            events,
            CategoryFilter::Only(EventCategory::TaskCompleted),
            utc(),
        );
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].events[0].id, "b");
    }

    #[test]
    fn test_grouping_uses_local_day() {
        // 03:00 UTC on the 6th is still the 5th eight hours west
        let events = vec![
            event("late", EventCategory::PhotoAdded, at(6, 3)),
            event("early", EventCategory::PhotoAdded, at(5, 20)),
        ];
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let groups = aggregate(events.clone(), CategoryFilter::All, pacific);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());

        assert_eq!(aggregate(events, CategoryFilter::All, utc()).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(Vec::new(), CategoryFilter::All, utc()).is_empty());
    }

    #[test]
    fn test_stats_cover_every_category() {
        let events = vec![
            event("a", EventCategory::PhotoAdded, at(5, 8)),
            event("b", EventCategory::PhotoAdded, at(6, 9)),
            event("c", EventCategory::StageChange, at(6, 9)),
        ];
        let stats = TimelineStats::from_events(&events);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(EventCategory::PhotoAdded), 2);
        assert_eq!(stats.count(EventCategory::HarvestLogged), 0);
        assert_eq!(stats.by_category.len(), EventCategory::ALL.len());
    }
}
