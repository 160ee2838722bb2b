//! Configuration for threshold and p-value queries.

use std::env;

use crate::error::{Result, StatsError};
use crate::types::{Adjustment, AxisSet};

/// Environment variable holding the default correction axes.
pub const ENV_CORRECT: &str = "TFSTATS_CORRECT";
/// Environment variable holding the default pooling axes.
pub const ENV_POOL: &str = "TFSTATS_POOL";
/// Environment variable toggling the distribution cache.
pub const ENV_CACHE: &str = "TFSTATS_CACHE";

/// Configuration options for `TimeFreqSnpmResults`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Axes corrected by `threshold()` (default: time and frequency).
    pub correct: AxisSet,

    /// Axes pooled by `threshold()` (default: none).
    pub pool: AxisSet,

    /// Keep transformed distributions for repeated queries (default: true).
    pub cache_distributions: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            correct: AxisSet::ALL,
            pool: AxisSet::EMPTY,
            cache_distributions: true,
        }
    }
}

impl Config {
    /// The default pooling/correction request.
    pub fn adjustment(&self) -> Adjustment {
        Adjustment {
            correct: self.correct,
            pool: self.pool,
        }
    }

    /// Defaults merged with environment overrides.
    ///
    /// Unparseable or conflicting values are logged and skipped.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        match Self::try_from_env() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "ignoring tfstats environment overrides");
                defaults
            }
        }
    }

    /// Defaults merged with environment overrides, reporting bad values.
    ///
    /// `TFSTATS_CORRECT` and `TFSTATS_POOL` take comma-separated axis names
    /// (`time`, `freq`); an empty string means no axes. When only
    /// `TFSTATS_POOL` is set, the pooled axes leave the default correction
    /// set. `TFSTATS_CACHE` takes `0`/`1`/`true`/`false`.
    ///
    /// # Errors
    ///
    /// [`StatsError::InvalidAxisRequest`] for unknown axes, unknown cache
    /// flags, or overlapping pooling and correction sets.
    pub fn try_from_env() -> Result<Self> {
        let mut config = Self::default();
        let correct = read_env(ENV_CORRECT);
        if let Some(raw) = &correct {
            config.correct = raw.parse()?;
        }
        if let Some(raw) = read_env(ENV_POOL) {
            config.pool = raw.parse()?;
            if correct.is_none() {
                config.correct = config.correct.difference(config.pool);
            }
        }
        if let Some(raw) = read_env(ENV_CACHE) {
            config.cache_distributions = parse_flag(&raw).ok_or_else(|| {
                StatsError::InvalidAxisRequest(format!("{ENV_CACHE} must be a boolean, got '{raw}'"))
            })?;
        }
        config.adjustment().validate()?;
        Ok(config)
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
