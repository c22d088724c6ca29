//! Indicator and predictor configuration.
//!
//! Defaults reproduce the feature layout the classifier was trained on.
//! Changing them yields a vector of the same shape but different meaning,
//! so a config must travel with the model it was trained for.

use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default number of observations retained per stream.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Configuration for the window scanners and the history bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Maximum number of observations kept in the history
    pub max_history: usize,

    /// Lookback horizons (ms) for `r5`, `r15`, `r30`, `r60`
    pub return_horizons_ms: [i64; 4],

    /// Windows (ms) for `vol30` and `vol60`
    pub volatility_windows_ms: [i64; 2],

    /// RSI lookback in one-step changes
    pub rsi_period: usize,

    /// Bollinger moving-average window in observations
    pub bollinger_window: usize,

    /// Band width in standard deviations
    pub bollinger_num_std: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            return_horizons_ms: [5_000, 15_000, 30_000, 60_000],
            volatility_windows_ms: [30_000, 60_000],
            rsi_period: 14,
            bollinger_window: 20,
            bollinger_num_std: 2.0,
        }
    }
}

/// Configuration for the per-stream tick predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub indicators: IndicatorConfig,

    /// Probability above which the label is 1
    pub decision_threshold: f64,

    /// Reject ticks older than the newest buffered one
    pub reject_out_of_order: bool,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            decision_threshold: 0.5,
            reject_out_of_order: true,
        }
    }
}

impl PredictorConfig {
    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid predictor config")
    }

    /// Load a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&content)
    }
}
