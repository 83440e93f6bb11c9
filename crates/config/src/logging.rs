//! Tracing subscriber setup driven by [`LoggingConfig`].

use crate::config::LoggingConfig;
use crate::error::{ConfigError, ConfigResult};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise the configured level and extra filter
/// directives are used. Returns [`ConfigError::LoggingInit`] if a subscriber
/// is already installed, so callers (and tests) may invoke it repeatedly.
pub fn init_tracing(config: &LoggingConfig) -> ConfigResult<()> {
    config.validate()?;

    let directives = match &config.filter {
        Some(extra) => format!("{},{}", config.level.to_lowercase(), extra),
        None => config.level.to_lowercase(),
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let result = match config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .try_init(),
        "compact" => tracing_subscriber::registry()
            .with(fmt::layer().compact())
            .with(env_filter)
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(env_filter)
            .try_init(),
    };

    result.map_err(|e| ConfigError::LoggingInit(e.to_string()))
}
