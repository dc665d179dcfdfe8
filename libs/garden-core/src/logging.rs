//! Structured logging setup

use tracing::{info, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{GardenError, Result};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Output goes to
/// stderr so it never mixes with command output.
///
/// # Errors
/// Returns an error if the level is invalid or a subscriber is already set
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    config
        .level
        .parse::<Level>()
        .map_err(|e| GardenError::configuration(format!("Invalid log level: {e}")))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json_logs {
        let json_layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr);
        registry.with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr);
        registry.with(fmt_layer).try_init()
    };

    installed.map_err(|e| GardenError::configuration(format!("Failed to initialize logging: {e}")))?;
    info!(level = %config.level, json = config.json_logs, "Logging initialized");
    Ok(())
}
