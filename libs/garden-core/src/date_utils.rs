//! Date interpolation and day-count primitives
//!
//! Every derivation (growth stages, timeline markers, alert windows) goes
//! through these helpers so that rounding is applied the same way
//! everywhere: elapsed days round toward the past (floor), remaining days
//! round toward the future (ceiling).

use chrono::{DateTime, FixedOffset, NaiveDate, TimeDelta, Utc};
use garden_common::MILLIS_PER_DAY;

/// Rounding applied when converting a span to whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayRounding {
    /// Round toward negative infinity ("days elapsed")
    Floor,
    /// Round toward positive infinity ("days until")
    Ceil,
}

/// Signed number of whole days from `a` to `b`
///
/// Returns `None` when either instant is missing, so callers can treat the
/// value as "not applicable" instead of failing.
#[must_use]
pub fn days_between(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    rounding: DayRounding,
) -> Option<i64> {
    let millis = b?.signed_duration_since(a?).num_milliseconds();
    Some(match rounding {
        DayRounding::Floor => millis.div_euclid(MILLIS_PER_DAY),
        DayRounding::Ceil => -(-millis).div_euclid(MILLIS_PER_DAY),
    })
}

/// Whole days elapsed from `from` to `to`, rounded down
#[must_use]
pub fn days_elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    days_between(Some(from), Some(to), DayRounding::Floor).unwrap_or_default()
}

/// Whole days remaining from `from` until `to`, rounded up
#[must_use]
pub fn days_until(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    days_between(Some(from), Some(to), DayRounding::Ceil).unwrap_or_default()
}

/// Calendar days from `today` to `target` (negative when `target` is past)
#[must_use]
pub fn calendar_days_until(today: NaiveDate, target: NaiveDate) -> i64 {
    target.signed_duration_since(today).num_days()
}

/// The instant `start + fraction * (end - start)`
///
/// `fraction` is not clamped. Returns `None` only when the result falls
/// outside the representable range.
#[must_use]
pub fn interpolate(start: DateTime<Utc>, end: DateTime<Utc>, fraction: f64) -> Option<DateTime<Utc>> {
    let span_ms = end.signed_duration_since(start).num_milliseconds() as f64;
    let offset_ms = (span_ms * fraction).round();
    if !offset_ms.is_finite() || offset_ms.abs() >= i64::MAX as f64 {
        return None;
    }
    let offset = TimeDelta::try_milliseconds(offset_ms as i64)?;
    start.checked_add_signed(offset)
}

/// Midnight UTC on `date`
#[must_use]
pub fn date_to_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Local midnight on `date` under `offset`
///
/// Date-only records are placed here so they group under their own day.
#[must_use]
pub fn date_to_local_instant(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .map_or_else(|| date_to_instant(date), |local| local.with_timezone(&Utc))
}

/// Calendar day of `instant` as seen from `offset`
#[must_use]
pub fn local_date(instant: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    instant.with_timezone(&offset).date_naive()
}
