//! Streaming indicator engine for tick-level price direction prediction.
//!
//! Each incoming tick updates a bounded per-stream history and carried EMA
//! state, window scanners derive returns, volatility, RSI and Bollinger
//! position, and the result is mapped to the fixed 11-element vector a
//! binary classifier consumes. The core never blocks and never fails; it is
//! meant to run once per tick well under a millisecond.

pub mod buffer;
pub mod config;
pub mod error;
pub mod features;
pub mod indicators;
pub mod predictor;
pub mod vector;

pub use buffer::{PriceHistory, RollingBuffer};
pub use config::{IndicatorConfig, PredictorConfig};
pub use error::{ModelError, TickError};
pub use indicators::{
    compute_indicators, compute_indicators_with, init_indicator_state, update_state,
    IndicatorRecord, IndicatorState,
};
#[cfg(feature = "onnx")]
pub use predictor::OnnxClassifier;
pub use predictor::{
    Classification, Classifier, LogisticModel, Prediction, PredictionLog, StandardScaler,
    TickPredictor,
};
pub use vector::{build_feature_vector, FeatureVector, IndicatorFields, FEATURE_COUNT};

/// Library-wide error type.
pub type Result<T> = anyhow::Result<T>;
