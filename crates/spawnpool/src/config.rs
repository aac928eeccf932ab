//! # Pool Configuration
//!
//! Registry-wide settings, loaded once at startup from TOML.
//!
//! ```toml
//! error_policy = "fail_fast"
//! fill_mode = "amortized"
//! default_threshold = 1
//! display_warnings = true
//!
//! [thresholds]
//! "game::Bullet" = 8
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, PoolResult};

/// Low-water threshold used when neither the config nor the caller set one.
pub const DEFAULT_THRESHOLD: usize = 1;

/// How caller-visible failures are reported.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Log through `tracing` and return a sentinel (`None`) instead of failing.
    #[default]
    LogAndDegrade,
    /// Return the error to the caller.
    FailFast,
}

/// How a scheduled growth batch is constructed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    /// One instance per scheduler tick, driven by [`crate::PoolRegistry::tick`].
    #[default]
    Amortized,
    /// The whole batch is built inside the `acquire` that triggered it.
    Immediate,
}

/// Registry configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Failure reporting mode.
    pub error_policy: ErrorPolicy,
    /// Growth construction mode.
    pub fill_mode: FillMode,
    /// Threshold given to new entries without an override.
    pub default_threshold: usize,
    /// Warn when `acquire` has to build an instance in the foreground.
    pub display_warnings: bool,
    /// Per-type threshold overrides, keyed by pool name.
    pub thresholds: BTreeMap<String, usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::default(),
            fill_mode: FillMode::default(),
            default_threshold: DEFAULT_THRESHOLD,
            display_warnings: true,
            thresholds: BTreeMap::new(),
        }
    }
}

impl PoolConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] on malformed TOML or a threshold below 1.
    pub fn from_toml_str(source: &str) -> PoolResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| PoolError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if the file cannot be read or is invalid.
    pub fn from_toml_file(path: impl AsRef<Path>) -> PoolResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| PoolError::InvalidConfig(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Checks every threshold is at least 1.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] naming the offending entry.
    pub fn validate(&self) -> PoolResult<()> {
        if self.default_threshold < 1 {
            return Err(PoolError::InvalidConfig(
                "default_threshold must be >= 1".to_string(),
            ));
        }
        if let Some((name, _)) = self.thresholds.iter().find(|(_, threshold)| **threshold < 1) {
            return Err(PoolError::InvalidConfig(format!(
                "threshold for {name} must be >= 1"
            )));
        }
        Ok(())
    }

    /// Threshold a new entry named `pool_name` starts with.
    #[must_use]
    pub fn threshold_for(&self, pool_name: &str) -> usize {
        self.thresholds
            .get(pool_name)
            .copied()
            .unwrap_or(self.default_threshold)
    }

    /// Sets the error policy.
    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Sets the fill mode.
    #[must_use]
    pub fn with_fill_mode(mut self, mode: FillMode) -> Self {
        self.fill_mode = mode;
        self
    }

    /// Adds a per-type threshold override.
    #[must_use]
    pub fn with_threshold(mut self, pool_name: impl Into<String>, threshold: usize) -> Self {
        self.thresholds.insert(pool_name.into(), threshold);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_empty_document() {
        let config = PoolConfig::from_toml_str("").unwrap();
        assert_eq!(config, PoolConfig::default());
        assert_eq!(config.error_policy, ErrorPolicy::LogAndDegrade);
        assert_eq!(config.fill_mode, FillMode::Amortized);
        assert_eq!(config.default_threshold, 1);
        assert!(config.display_warnings);
    }

    #[test]
    fn test_parse_full_document() {
        let config = PoolConfig::from_toml_str(
            r#"
            error_policy = "fail_fast"
            fill_mode = "immediate"
            default_threshold = 3
            display_warnings = false

            [thresholds]
            "game::Bullet" = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.error_policy, ErrorPolicy::FailFast);
        assert_eq!(config.fill_mode, FillMode::Immediate);
        assert!(!config.display_warnings);
        assert_eq!(config.threshold_for("game::Bullet"), 8);
        assert_eq!(config.threshold_for("game::Spark"), 3);
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let err = PoolConfig::from_toml_str("default_threshold = 0").unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));

        let err = PoolConfig::from_toml_str("[thresholds]\nBullet = 0").unwrap_err();
        assert_eq!(
            err,
            PoolError::InvalidConfig("threshold for Bullet must be >= 1".to_string())
        );
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let err = PoolConfig::from_toml_str("error_policy = \"shrug\"").unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = PoolConfig::from_toml_file("/nonexistent/spawnpool.toml").unwrap_err();
        assert!(matches!(err, PoolError::InvalidConfig(_)));
    }
}
