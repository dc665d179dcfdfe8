//! Engine configuration
//!
//! Values are layered: built-in defaults, then an optional JSON or YAML
//! file, then `GARDEN_*` environment variables.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{FixedOffset, Utc};
use garden_common::MAX_UTC_OFFSET_MINUTES;
use serde::{Deserialize, Serialize};

use crate::context::DerivationContext;
use crate::error::{GardenError, Result};
use crate::insights::InsightConfig;

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is not set
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GardenConfig {
    /// Directory holding the snapshot JSON files
    pub snapshot_dir: PathBuf,
    pub logging: LoggingConfig,
    pub insights: InsightConfig,
    /// Fixed offset for local days; the system offset is used when unset
    pub utc_offset_minutes: Option<i32>,
}

impl Default for GardenConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("snapshot"),
            logging: LoggingConfig::default(),
            insights: InsightConfig::default(),
            utc_offset_minutes: None,
        }
    }
}

impl GardenConfig {
    /// Load configuration from a JSON or YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            GardenError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file {}: {e}", path.display()),
            ))
        })?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml" | "yml")
        );
        if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| {
                GardenError::configuration(format!("Failed to parse YAML config: {e}"))
            })
        } else {
            serde_json::from_str(&content).map_err(|e| {
                GardenError::configuration(format!("Failed to parse JSON config: {e}"))
            })
        }
    }

    /// Apply any `GARDEN_*` environment variables on top of `self`
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparseable value
    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(dir) = std::env::var("GARDEN_SNAPSHOT_DIR") {
            self.snapshot_dir = PathBuf::from(dir);
        }
        if let Ok(level) = std::env::var("GARDEN_LOG_LEVEL") {
            self.logging.level = level.trim().to_ascii_lowercase();
        }
        if let Ok(json_logs) = std::env::var("GARDEN_JSON_LOGS") {
            self.logging.json_logs = parse_bool(&json_logs).ok_or_else(|| {
                GardenError::configuration("Invalid GARDEN_JSON_LOGS value")
            })?;
        }
        if let Some(days) = env_parse("GARDEN_HARVEST_WINDOW_DASHBOARD")? {
            self.insights.dashboard_harvest_window_days = days;
        }
        if let Some(days) = env_parse("GARDEN_HARVEST_WINDOW_COMMAND_CENTER")? {
            self.insights.command_center_harvest_window_days = days;
        }
        if let Some(threshold) = env_parse("GARDEN_LOW_STOCK_THRESHOLD")? {
            self.insights.low_stock_threshold = threshold;
        }
        if let Some(days) = env_parse("GARDEN_EXPIRY_WINDOW_DAYS")? {
            self.insights.expiry_window_days = days;
        }
        if let Some(minutes) = env_parse("GARDEN_UTC_OFFSET_MINUTES")? {
            self.utc_offset_minutes = Some(minutes);
        }
        Ok(self)
    }

    /// Validate the configuration
    ///
    /// # Errors
    /// Returns an error describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(GardenError::configuration(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.logging.level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        let insights = &self.insights;
        if insights.dashboard_harvest_window_days < 0
            || insights.command_center_harvest_window_days < 0
        {
            return Err(GardenError::configuration(
                "Harvest windows cannot be negative",
            ));
        }
        if insights.expiry_window_days <= 0 {
            return Err(GardenError::configuration(
                "Expiry window must be greater than 0",
            ));
        }

        if let Some(minutes) = self.utc_offset_minutes {
            if minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES.unsigned_abs() {
                return Err(GardenError::configuration(format!(
                    "UTC offset of {minutes} minutes is out of range (±{MAX_UTC_OFFSET_MINUTES})"
                )));
            }
        }

        Ok(())
    }

    /// Configured fixed offset, if any
    ///
    /// # Errors
    /// Returns an error if the offset cannot be represented
    pub fn offset(&self) -> Result<Option<FixedOffset>> {
        self.utc_offset_minutes
            .map(|minutes| {
                minutes.checked_mul(60).and_then(FixedOffset::east_opt).ok_or_else(|| {
                    GardenError::configuration(format!("Invalid UTC offset: {minutes} minutes"))
                })
            })
            .transpose()
    }

    /// Derivation context for the current instant
    ///
    /// # Errors
    /// Returns an error if the configured offset is invalid
    pub fn context(&self) -> Result<DerivationContext> {
        Ok(match self.offset()? {
            Some(offset) => DerivationContext::new(Utc::now(), offset),
            None => DerivationContext::local(),
        })
    }
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| GardenError::configuration(format!("Invalid {name} value: {value}"))),
        Err(_) => Ok(None),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::Builder;

    const ENV_VARS: [&str; 8] = [
        "GARDEN_SNAPSHOT_DIR",
        "GARDEN_LOG_LEVEL",
        "GARDEN_JSON_LOGS",
        "GARDEN_HARVEST_WINDOW_DASHBOARD",
        "GARDEN_HARVEST_WINDOW_COMMAND_CENTER",
        "GARDEN_LOW_STOCK_THRESHOLD",
        "GARDEN_EXPIRY_WINDOW_DAYS",
        "GARDEN_UTC_OFFSET_MINUTES",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = GardenConfig::default();
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.json_logs);
        assert_eq!(config.insights.low_stock_threshold, 2);
        assert_eq!(config.insights.expiry_window_days, 90);
        assert!(config.utc_offset_minutes.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{ "snapshot_dir": "/data/garden", "insights": {{ "low_stock_threshold": 5 }} }}"#
        )
        .unwrap();

        let config = GardenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.snapshot_dir, PathBuf::from("/data/garden"));
        assert_eq!(config.insights.low_stock_threshold, 5);
        assert_eq!(config.insights.dashboard_harvest_window_days, 7);
    }

    #[test]
    fn test_from_yaml_file() {
        let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "logging:\n  level: debug\n  json_logs: true\nutc_offset_minutes: -300").unwrap();

        let config = GardenConfig::from_file(file.path()).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_logs);
        assert_eq!(config.utc_offset_minutes, Some(-300));
    }

    #[test]
    fn test_from_file_errors() {
        let mut file = Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            GardenConfig::from_file(file.path()),
            Err(GardenError::Configuration { .. })
        ));
        assert!(matches!(
            GardenConfig::from_file("/nonexistent/garden.json"),
            Err(GardenError::Io(_))
        ));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var("GARDEN_SNAPSHOT_DIR", "/tmp/snap");
        std::env::set_var("GARDEN_LOG_LEVEL", "DEBUG");
        std::env::set_var("GARDEN_JSON_LOGS", "yes");
        std::env::set_var("GARDEN_HARVEST_WINDOW_COMMAND_CENTER", "21");
        std::env::set_var("GARDEN_UTC_OFFSET_MINUTES", "120");

        let config = GardenConfig::default().with_env_overrides();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.snapshot_dir, PathBuf::from("/tmp/snap"));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_logs);
        assert_eq!(config.insights.command_center_harvest_window_days, 21);
        assert_eq!(config.insights.dashboard_harvest_window_days, 7);
        assert_eq!(config.utc_offset_minutes, Some(120));
    }

    #[test]
    #[serial]
    fn test_env_rejects_invalid_values() {
        clear_env();
        std::env::set_var("GARDEN_LOW_STOCK_THRESHOLD", "lots");
        let result = GardenConfig::default().with_env_overrides();
        clear_env();
        assert!(matches!(result, Err(GardenError::Configuration { .. })));

        std::env::set_var("GARDEN_JSON_LOGS", "maybe");
        let result = GardenConfig::default().with_env_overrides();
        clear_env();
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_env_layers_over_file_values() {
        clear_env();
        let mut file_config = GardenConfig::default();
        file_config.insights.expiry_window_days = 30;
        file_config.logging.level = "warn".to_string();

        std::env::set_var("GARDEN_LOG_LEVEL", "error");
        let config = file_config.with_env_overrides();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.logging.level, "error");
        assert_eq!(config.insights.expiry_window_days, 30);
    }

    #[test]
    #[serial]
    fn test_env_value_equal_to_default_still_overrides_file() {
        clear_env();
        let mut file_config = GardenConfig::default();
        file_config.logging.level = "debug".to_string();
        file_config.insights.low_stock_threshold = 5;

        std::env::set_var("GARDEN_LOG_LEVEL", "info");
        std::env::set_var("GARDEN_LOW_STOCK_THRESHOLD", "2");
        let config = file_config.with_env_overrides();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.insights.low_stock_threshold, 2);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = GardenConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = GardenConfig::default();
        config.insights.expiry_window_days = 0;
        assert!(config.validate().is_err());

        let mut config = GardenConfig::default();
        config.utc_offset_minutes = Some(15 * 60);
        assert!(config.validate().is_err());

        config.utc_offset_minutes = Some(-14 * 60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_extreme_offsets() {
        let mut config = GardenConfig::default();
        for minutes in [i32::MIN, i32::MAX, -841, 841] {
            config.utc_offset_minutes = Some(minutes);
            assert!(
                matches!(config.validate(), Err(GardenError::Configuration { .. })),
                "{minutes} accepted"
            );
        }
        config.utc_offset_minutes = Some(-840);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_offset_and_context() {
        let mut config = GardenConfig::default();
        assert!(config.offset().unwrap().is_none());

        config.utc_offset_minutes = Some(-480);
        let offset = config.offset().unwrap().unwrap();
        assert_eq!(offset.local_minus_utc(), -480 * 60);
        assert_eq!(config.context().unwrap().offset, offset);
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("sure"), None);
    }
}
