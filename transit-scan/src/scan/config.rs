//! Scan configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error loading a [`ScanConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not read the config file
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config is not valid JSON for this struct
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config parsed but holds an unusable value
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Configuration parameters shared by all scans.
///
/// Missing fields take their default when deserialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Radius (metres) within which footpaths are looked up after reaching
    /// a stop.
    pub search_radius_m: f64,

    /// Cooperative deadline for one scan (milliseconds).
    /// `None` lets a scan run to completion.
    pub timeout_ms: Option<u64>,

    /// Largest accepted distance between the start and end of a request
    /// window (seconds).
    pub max_window_secs: u64,

    /// Whether profile scans first run an earliest-arrival scan and skip the
    /// profile when no target is reachable.
    pub prune_profiles_with_earliest_arrival: bool,
}

impl ScanConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        search_radius_m: f64,
        timeout_ms: Option<u64>,
        max_window_secs: u64,
        prune_profiles_with_earliest_arrival: bool,
    ) -> Self {
        Self {
            search_radius_m,
            timeout_ms,
            max_window_secs,
            prune_profiles_with_earliest_arrival,
        }
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the values are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a negative or NaN radius and for a
    /// zero window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_radius_m.is_nan() || self.search_radius_m < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "search radius must be non-negative, got {}",
                self.search_radius_m
            )));
        }
        if self.max_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "max window must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Returns the maximum window as a Duration.
    pub fn max_window(&self) -> Duration {
        Duration::from_secs(self.max_window_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            search_radius_m: 500.0,
            timeout_ms: None,
            max_window_secs: 24 * 3600,
            prune_profiles_with_earliest_arrival: true,
        }
    }
}
