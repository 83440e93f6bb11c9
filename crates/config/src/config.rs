//! Main configuration module for the Aura engine
//!
//! All engine settings live in one TOML file with an `[aura]` section for
//! chain parameters and a `[logging]` section for the subscriber.

use crate::error::{ConfigError, ConfigResult};
use alloy_primitives::U256;
use aura_types::Address;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Default difficulty of the genesis block.
pub const DEFAULT_DIFFICULTY: u64 = 131_072;

/// Default number of recovered signers kept in memory.
pub const DEFAULT_SIGNATURE_CACHE_SIZE: usize = 4096;

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Consensus parameters
    pub aura: AuraConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use aura_config::Config;
    /// use std::path::Path;
    ///
    /// let config = Config::load(Path::new("aura.toml"))?;
    /// ```
    pub fn load(path: &Path) -> ConfigResult<Self> {
        info!("Loading configuration from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config = Self::from_str(&content)?;

        info!(
            period = config.aura.period,
            epoch_length = config.aura.epoch_length,
            authorities = config.aura.authorities.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Load configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> ConfigResult<Self> {
        let config: Config = toml::from_str(content)?;
        debug!("Configuration parsed successfully, validating...");
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    pub fn validate(&self) -> ConfigResult<()> {
        self.aura.validate()?;
        self.logging.validate()?;
        debug!("Configuration validation passed");
        Ok(())
    }
}

/// Immutable per-chain Aura parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuraConfig {
    /// Seconds per step
    pub period: u64,

    /// Steps per authority-set epoch
    pub epoch_length: u64,

    /// Ordered authority list active from step 0
    pub authorities: Vec<Address>,

    /// Genesis difficulty
    #[serde(
        default = "default_difficulty",
        deserialize_with = "deserialize_u256",
        serialize_with = "serialize_u256"
    )]
    pub difficulty: U256,

    /// Capacity of the recovered-signer cache
    #[serde(default = "default_signature_cache_size")]
    pub signature_cache_size: usize,

    /// Authority sets scheduled to take over at later epoch boundaries
    #[serde(default)]
    pub transitions: Vec<AuthorityTransition>,
}

/// A new authority list that becomes active at `step`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorityTransition {
    /// First step governed by this list; must start an epoch
    pub step: u64,
    /// Ordered authority list
    pub authorities: Vec<Address>,
}

fn default_difficulty() -> U256 {
    U256::from(DEFAULT_DIFFICULTY)
}

fn default_signature_cache_size() -> usize {
    DEFAULT_SIGNATURE_CACHE_SIZE
}

impl AuraConfig {
    /// Creates a configuration with default difficulty and cache size and
    /// no scheduled transitions.
    pub fn new(period: u64, epoch_length: u64, authorities: Vec<Address>) -> Self {
        Self {
            period,
            epoch_length,
            authorities,
            difficulty: default_difficulty(),
            signature_cache_size: DEFAULT_SIGNATURE_CACHE_SIZE,
            transitions: Vec::new(),
        }
    }

    /// Sets the genesis difficulty.
    pub fn with_difficulty(mut self, difficulty: U256) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Sets the signature cache capacity.
    pub fn with_signature_cache_size(mut self, size: usize) -> Self {
        self.signature_cache_size = size;
        self
    }

    /// Schedules an authority list to take over at `step`.
    pub fn with_transition(mut self, step: u64, authorities: Vec<Address>) -> Self {
        self.transitions.push(AuthorityTransition { step, authorities });
        self
    }

    /// Returns true if `step` is the first step of an epoch.
    pub fn is_epoch_boundary(&self, step: u64) -> bool {
        self.epoch_length != 0 && step % self.epoch_length == 0
    }

    /// Checks parameter ranges, authority lists and the transition schedule.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.period == 0 {
            return Err(ConfigError::InvalidPeriod);
        }
        if self.epoch_length == 0 {
            return Err(ConfigError::InvalidEpochLength);
        }
        if self.signature_cache_size == 0 {
            return Err(ConfigError::InvalidCacheSize);
        }
        validate_authorities(&self.authorities)?;

        let mut previous = 0u64;
        for transition in &self.transitions {
            if transition.step <= previous {
                return Err(ConfigError::InvalidTransition {
                    step: transition.step,
                    reason: format!("must come after step {}", previous),
                });
            }
            if !self.is_epoch_boundary(transition.step) {
                return Err(ConfigError::InvalidTransition {
                    step: transition.step,
                    reason: format!("not a multiple of epoch length {}", self.epoch_length),
                });
            }
            validate_authorities(&transition.authorities).map_err(|e| {
                ConfigError::InvalidTransition {
                    step: transition.step,
                    reason: e.to_string(),
                }
            })?;
            previous = transition.step;
        }

        Ok(())
    }
}

fn validate_authorities(authorities: &[Address]) -> ConfigResult<()> {
    if authorities.is_empty() {
        return Err(ConfigError::NoAuthorities);
    }
    let mut seen = HashSet::with_capacity(authorities.len());
    for authority in authorities {
        if !seen.insert(authority) {
            return Err(ConfigError::DuplicateAuthority(authority.to_string()));
        }
    }
    Ok(())
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, compact, json)
    pub format: String,

    /// Extra `EnvFilter` directives, e.g. `aura_consensus=trace`
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Checks level and format names.
    pub fn validate(&self) -> ConfigResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.level.clone()));
        }

        let valid_formats = ["pretty", "compact", "json"];
        if !valid_formats.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(self.format.clone()));
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            filter: None,
        }
    }
}

/// Custom deserializer for U256 from a decimal string or integer
fn deserialize_u256<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(u64),
        Str(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Int(value) => Ok(U256::from(value)),
        Repr::Str(s) => U256::from_str_radix(&s, 10).map_err(serde::de::Error::custom),
    }
}

/// Custom serializer for U256 to string
fn serialize_u256<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&value.to_string())
}
