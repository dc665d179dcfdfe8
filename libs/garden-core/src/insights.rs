//! Dashboard insights and alerts
//!
//! A fixed rule set evaluated over the current snapshot. Rules are
//! independent of each other and of the timeline; the resulting alerts are
//! ordered by severity, keeping rule order within a severity.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use garden_common::{
    format_short_date, pluralize, COMMAND_CENTER_HARVEST_WINDOW_DAYS,
    DASHBOARD_HARVEST_WINDOW_DAYS, DEFAULT_EXPIRY_WINDOW_DAYS, DEFAULT_LOW_STOCK_THRESHOLD,
    FALL_FROST_MONTHS, SPRING_FROST_MONTHS,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::context::DerivationContext;
use crate::date_utils::calendar_days_until;
use crate::error::GardenError;
use crate::models::{Planting, Profile, SeedLot, Snapshot};

/// Alert severity, highest priority first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Danger,
    Warning,
    Info,
    Success,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Which rule produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertKind {
    Health,
    AllHealthy,
    HarvestSoon,
    LowStock,
    ExpiringSeeds,
    ExpiredSeeds,
    WeatherSkip,
    FrostDate,
}

/// Numeric call-out attached to an alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub value: i64,
    pub label: String,
}

impl Metric {
    fn count(value: usize, label: &str) -> Self {
        Self {
            value: i64::try_from(value).unwrap_or(i64::MAX),
            label: label.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub detail: Option<String>,
    pub metric: Option<Metric>,
}

impl Alert {
    fn new(kind: AlertKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            detail: None,
            metric: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = Some(metric);
        self
    }
}

/// Screen the alerts are evaluated for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightView {
    #[default]
    Dashboard,
    CommandCenter,
}

impl InsightView {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::CommandCenter => "command-center",
        }
    }
}

impl fmt::Display for InsightView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for InsightView {
    type Err = GardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dashboard" => Ok(Self::Dashboard),
            "command-center" | "command_center" => Ok(Self::CommandCenter),
            other => Err(GardenError::configuration(format!("Unknown view: {other}"))),
        }
    }
}

/// Thresholds used by the alert rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub dashboard_harvest_window_days: i64,
    pub command_center_harvest_window_days: i64,
    pub low_stock_threshold: u32,
    pub expiry_window_days: i64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            dashboard_harvest_window_days: DASHBOARD_HARVEST_WINDOW_DAYS,
            command_center_harvest_window_days: COMMAND_CENTER_HARVEST_WINDOW_DAYS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
        }
    }
}

impl InsightConfig {
    /// Harvest-soon window for a view, in days
    #[must_use]
    pub const fn harvest_window(&self, view: InsightView) -> i64 {
        match view {
            InsightView::Dashboard => self.dashboard_harvest_window_days,
            InsightView::CommandCenter => self.command_center_harvest_window_days,
        }
    }
}

/// Seed lots grouped by stock condition
///
/// A lot may sit in more than one bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedStockReport {
    pub low_stock: Vec<SeedLot>,
    pub expiring_soon: Vec<SeedLot>,
    pub expired: Vec<SeedLot>,
}

/// Bucket seed lots relative to `today`
#[must_use]
pub fn seed_stock(seeds: &[SeedLot], today: NaiveDate, config: &InsightConfig) -> SeedStockReport {
    let mut report = SeedStockReport::default();
    for seed in seeds {
        if seed.quantity <= config.low_stock_threshold {
            report.low_stock.push(seed.clone());
        }
        if let Some(expires) = seed.expiration_date {
            let days_left = calendar_days_until(today, expires);
            if days_left < 0 {
                report.expired.push(seed.clone());
            } else if days_left <= config.expiry_window_days {
                report.expiring_soon.push(seed.clone());
            }
        }
    }
    report
}

/// A planting whose harvest date falls inside the window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HarvestSoon {
    pub planting_id: Uuid,
    pub display_name: String,
    pub harvest_date: NaiveDate,
    pub days_until: i64,
}

/// Plantings due for harvest within `window_days` of `today`, soonest first
#[must_use]
pub fn harvest_soon(plantings: &[Planting], today: NaiveDate, window_days: i64) -> Vec<HarvestSoon> {
    let mut upcoming: Vec<HarvestSoon> = plantings
        .iter()
        .filter_map(|planting| {
            let days_until = calendar_days_until(today, planting.expected_harvest_date);
            (0..=window_days)
                .contains(&days_until)
                .then(|| HarvestSoon {
                    planting_id: planting.id,
                    display_name: planting.display_name(),
                    harvest_date: planting.expected_harvest_date,
                    days_until,
                })
        })
        .collect();
    upcoming.sort_by_key(|h| h.days_until);
    upcoming
}

/// Everything a dashboard view needs to render its call-outs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightReport {
    pub view: InsightView,
    pub alerts: Vec<Alert>,
    pub seed_stock: SeedStockReport,
    pub harvest_soon: Vec<HarvestSoon>,
}

fn seed_names(seeds: &[SeedLot]) -> String {
    seeds
        .iter()
        .map(SeedLot::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn health_alerts(plantings: &[Planting]) -> Vec<Alert> {
    let struggling: Vec<&Planting> = plantings
        .iter()
        .filter(|p| p.health.needs_attention())
        .collect();

    if !struggling.is_empty() {
        let names = struggling
            .iter()
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        return vec![Alert::new(
            AlertKind::Health,
            Severity::Warning,
            format!(
                "{} {} attention",
                pluralize(struggling.len(), "planting", "plantings"),
                if struggling.len() == 1 { "needs" } else { "need" }
            ),
        )
        .with_detail(names)
        .with_metric(Metric::count(struggling.len(), "Needs attention"))];
    }

    if plantings.is_empty() {
        return Vec::new();
    }

    vec![
        Alert::new(AlertKind::AllHealthy, Severity::Success, "All plantings are healthy")
            .with_metric(Metric::count(plantings.len(), "Plantings")),
    ]
}

fn harvest_alert(upcoming: &[HarvestSoon], window_days: i64) -> Option<Alert> {
    if upcoming.is_empty() {
        return None;
    }
    let detail = upcoming
        .iter()
        .map(|h| format!("{} ({})", h.display_name, format_short_date(&h.harvest_date)))
        .collect::<Vec<_>>()
        .join(", ");
    Some(
        Alert::new(
            AlertKind::HarvestSoon,
            Severity::Info,
            format!(
                "{} ready to harvest within {window_days} days",
                pluralize(upcoming.len(), "planting", "plantings")
            ),
        )
        .with_detail(detail)
        .with_metric(Metric::count(upcoming.len(), "Harvest soon")),
    )
}

fn seed_alerts(report: &SeedStockReport, config: &InsightConfig) -> Vec<Alert> {
    let buckets = [
        (
            &report.low_stock,
            AlertKind::LowStock,
            Severity::Warning,
            "running low",
            "Low stock",
        ),
        (
            &report.expiring_soon,
            AlertKind::ExpiringSeeds,
            Severity::Warning,
            "expiring soon",
            "Expiring",
        ),
        (
            &report.expired,
            AlertKind::ExpiredSeeds,
            Severity::Danger,
            "expired",
            "Expired",
        ),
    ];

    buckets
        .into_iter()
        .filter(|(seeds, ..)| !seeds.is_empty())
        .map(|(seeds, kind, severity, state, label)| {
            let mut message = format!(
                "{} {state}",
                pluralize(seeds.len(), "seed lot", "seed lots")
            );
            if kind == AlertKind::ExpiringSeeds {
                message.push_str(&format!(" (within {} days)", config.expiry_window_days));
            }
            Alert::new(kind, severity, message)
                .with_detail(seed_names(seeds))
                .with_metric(Metric::count(seeds.len(), label))
        })
        .collect()
}

fn weather_alert(snapshot: &Snapshot, today: NaiveDate) -> Option<Alert> {
    let skipped = snapshot
        .tasks
        .iter()
        .filter(|t| t.is_weather_skipped() && t.due_date == Some(today))
        .count();
    (skipped > 0).then(|| {
        Alert::new(
            AlertKind::WeatherSkip,
            Severity::Info,
            format!(
                "{} skipped for weather today",
                pluralize(skipped, "task", "tasks")
            ),
        )
        .with_metric(Metric::count(skipped, "Weather skips"))
    })
}

fn frost_alert(profile: Option<&Profile>, today: NaiveDate) -> Option<Alert> {
    let profile = profile?;
    let month = today.month();

    if SPRING_FROST_MONTHS.contains(&month) {
        if let Some(last) = profile.last_frost_date {
            return Some(
                Alert::new(
                    AlertKind::FrostDate,
                    Severity::Info,
                    format!("Last frost expected {}", format_short_date(&last)),
                )
                .with_detail("Hold tender transplants until the danger of frost has passed"),
            );
        }
    }

    if FALL_FROST_MONTHS.contains(&month) {
        if let Some(first) = profile.first_frost_date {
            return Some(
                Alert::new(
                    AlertKind::FrostDate,
                    Severity::Info,
                    format!("First frost expected {}", format_short_date(&first)),
                )
                .with_detail("Plan to protect or harvest frost-sensitive crops"),
            );
        }
    }

    None
}

/// Evaluate every rule for `view` and order the alerts by severity
#[instrument(skip(snapshot, ctx, config), fields(view = %view))]
pub fn evaluate(
    snapshot: &Snapshot,
    ctx: &DerivationContext,
    view: InsightView,
    config: &InsightConfig,
) -> InsightReport {
    let today = ctx.today();
    let window = config.harvest_window(view);

    let upcoming = harvest_soon(&snapshot.plantings, today, window);
    let stock = seed_stock(&snapshot.seeds, today, config);

    let mut alerts = health_alerts(&snapshot.plantings);
    alerts.extend(harvest_alert(&upcoming, window));
    alerts.extend(seed_alerts(&stock, config));
    alerts.extend(weather_alert(snapshot, today));
    alerts.extend(frost_alert(snapshot.profile.as_ref(), today));

    alerts.sort_by_key(|alert| alert.severity);
    debug!(alerts = alerts.len(), %today, "Insights evaluated");

    InsightReport {
        view,
        alerts,
        seed_stock: stock,
        harvest_soon: upcoming,
    }
}
