//! Configuration model for slotline.
//!
//! This module defines the Config struct that represents `.slotline/config.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

use crate::error::{Result, SlotlineError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a slotline workspace.
///
/// This struct represents the contents of `.slotline/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Working hours that make up one schedule day. Used to convert a
    /// task's remaining effort hours into countdown days. Can be
    /// overridden per task and per slot.
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,

    /// Minutes after which a lock is considered stale.
    #[serde(default = "default_lock_stale_minutes")]
    pub lock_stale_minutes: u32,

    /// Whether mutations append to the event log.
    #[serde(default = "default_true")]
    pub record_events: bool,
}

// Default value functions for serde
fn default_hours_per_day() -> f64 {
    7.0
}
fn default_lock_stale_minutes() -> u32 {
    120
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hours_per_day: default_hours_per_day(),
            lock_stale_minutes: default_lock_stale_minutes(),
            record_events: default_true(),
        }
    }
}

impl Config {
    /// Load config from a YAML file.
    ///
    /// A missing file yields the defaults; unknown fields in the YAML are
    /// silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| SlotlineError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            SlotlineError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `hours_per_day` must be positive and finite
    /// - `lock_stale_minutes` must be positive
    pub fn validate(&self) -> Result<()> {
        if !self.hours_per_day.is_finite() || self.hours_per_day <= 0.0 {
            return Err(SlotlineError::UserError(
                "config validation failed: hours_per_day must be greater than 0".to_string(),
            ));
        }

        if self.lock_stale_minutes == 0 {
            return Err(SlotlineError::UserError(
                "config validation failed: lock_stale_minutes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hours_per_day, 7.0);
        assert_eq!(config.lock_stale_minutes, 120);
        assert!(config.record_events);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config.hours_per_day, Config::default().hours_per_day);
    }

    #[test]
    fn partial_yaml_fills_in_defaults() {
        let config = Config::from_yaml("hours_per_day: 8.0\n").unwrap();
        assert_eq!(config.hours_per_day, 8.0);
        assert_eq!(config.lock_stale_minutes, 120);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let config = Config::from_yaml("hours_per_day: 6.5\nfuture_field: 42\n").unwrap();
        assert_eq!(config.hours_per_day, 6.5);
    }

    #[test]
    fn rejects_nonpositive_hours_per_day() {
        assert!(Config::from_yaml("hours_per_day: 0.0\n").is_err());
        assert!(Config::from_yaml("hours_per_day: -1.0\n").is_err());
    }

    #[test]
    fn rejects_zero_lock_stale_minutes() {
        assert!(Config::from_yaml("lock_stale_minutes: 0\n").is_err());
    }

    #[test]
    fn yaml_round_trip_preserves_values() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.yaml");
        let mut config = Config::default();
        config.hours_per_day = 7.5;
        fs::write(&path, config.to_yaml().unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.hours_per_day, 7.5);
    }
}
