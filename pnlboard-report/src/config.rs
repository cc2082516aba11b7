//! Dashboard configuration loaded from TOML.

use std::path::Path;

use pnlboard_core::metrics::{MetricsOptions, DEFAULT_INITIAL_CAPITAL, TRADING_DAYS_PER_YEAR};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings that change how the dashboard numbers are computed.
///
/// Every field is optional in the file:
///
/// ```toml
/// initial_capital = 1000000.0
/// annualization_periods = 252.0   # 0 disables annualization
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Capital the cumulative PNL is measured against.
    pub initial_capital: f64,
    /// Periods per year for the Sharpe ratio; 0 reports the raw ratio.
    pub annualization_periods: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            annualization_periods: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital.is_finite() && self.initial_capital > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "initial_capital must be positive, got {}",
                self.initial_capital
            )));
        }
        if !(self.annualization_periods.is_finite() && self.annualization_periods >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "annualization_periods must be >= 0, got {}",
                self.annualization_periods
            )));
        }
        Ok(())
    }

    pub fn metrics_options(&self) -> MetricsOptions {
        MetricsOptions {
            initial_capital: self.initial_capital,
            annualization_periods: (self.annualization_periods > 0.0)
                .then_some(self.annualization_periods),
        }
    }
}
