//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("Failed to read config file at {path}: {source}")]
    FileRead {
        /// Path that could not be read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Step duration must be at least one second
    #[error("Invalid period: must be at least 1 second")]
    InvalidPeriod,

    /// Epoch length must be at least one step
    #[error("Invalid epoch length: must be at least 1 step")]
    InvalidEpochLength,

    /// No authorities configured
    #[error("No authorities configured: at least one authority required")]
    NoAuthorities,

    /// The same address appears twice in one authority list
    #[error("Duplicate authority: {0}")]
    DuplicateAuthority(String),

    /// A scheduled authority transition is malformed
    #[error("Invalid authority transition at step {step}: {reason}")]
    InvalidTransition {
        /// Activation step of the offending transition
        step: u64,
        /// What is wrong with it
        reason: String,
    },

    /// Signature cache must hold at least one entry
    #[error("Invalid signature cache size: must be non-zero")]
    InvalidCacheSize,

    /// Invalid log level
    #[error("Invalid log level: {0}. Valid values: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Invalid log format
    #[error("Invalid log format: {0}. Valid values: pretty, compact, json")]
    InvalidLogFormat(String),

    /// The global tracing subscriber could not be installed
    #[error("Failed to initialise logging: {0}")]
    LoggingInit(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
