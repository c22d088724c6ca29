//! Classifier boundary and the per-stream tick predictor.
//!
//! The indicator core hands a [`FeatureVector`] to a [`Classifier`] and gets
//! back the probability that price moves up over the model's horizon. Two
//! classifiers are provided: a standardized logistic regression loaded from
//! exported weights, and an ONNX Runtime session (feature `onnx`).

use crate::config::PredictorConfig;
use crate::error::{ModelError, TickError};
use crate::indicators::{compute_indicators_with, update_state, IndicatorRecord, IndicatorState};
use crate::vector::{FeatureVector, FEATURE_COUNT};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Probability above which a classification is labelled "up".
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Output of a classifier for one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    /// Probability that price moves up, in `[0, 1]`
    pub probability: f64,

    /// 1 if `probability` exceeds the decision threshold, else 0
    pub label: u8,
}

impl Classification {
    /// Label with the default 0.5 threshold.
    pub fn from_probability(probability: f64) -> Self {
        Self::with_threshold(probability, DEFAULT_DECISION_THRESHOLD)
    }

    pub fn with_threshold(probability: f64, threshold: f64) -> Self {
        Self {
            probability,
            label: u8::from(probability > threshold),
        }
    }
}

/// A binary up/down classifier over the 11-element feature vector.
pub trait Classifier {
    fn classify(&mut self, features: &FeatureVector) -> Result<Classification>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&mut self, features: &FeatureVector) -> Result<Classification> {
        (**self).classify(features)
    }
}

fn check_len(what: &'static str, actual: usize) -> std::result::Result<(), ModelError> {
    if actual != FEATURE_COUNT {
        return Err(ModelError::DimensionMismatch {
            what,
            expected: FEATURE_COUNT,
            actual,
        });
    }
    Ok(())
}

/// Per-feature z-score standardization fitted at training time.
///
/// Only constructible through [`StandardScaler::new`] and the loaders, so
/// both vectors always hold `FEATURE_COUNT` finite values.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: Vec<f64>,
    std: Vec<f64>,
}

#[derive(Deserialize)]
struct ScalerParams {
    mean: Vec<f64>,
    std: Vec<f64>,
    feature_count: Option<usize>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, std: Vec<f64>) -> std::result::Result<Self, ModelError> {
        check_len("scaler mean", mean.len())?;
        check_len("scaler std", std.len())?;
        if mean.iter().chain(&std).any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidParameter("scaler parameters must be finite".into()));
        }
        Ok(Self { mean, std })
    }

    /// Parse scaler parameters exported as `{"mean": [..], "std": [..], "feature_count": n}`.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let params: ScalerParams =
            serde_json::from_str(content).context("invalid scaler parameters")?;
        if let Some(count) = params.feature_count {
            check_len("scaler feature_count", count)?;
        }
        Ok(Self::new(params.mean, params.std)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scaler {}", path.display()))?;
        Self::from_json_str(&content)
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// `(x - mean) / std`; a zero std leaves the centred value unscaled.
    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut out = features.0;
        for ((value, mean), std) in out.iter_mut().zip(&self.mean).zip(&self.std) {
            let centred = *value - mean;
            *value = if *std != 0.0 { centred / std } else { centred };
        }
        FeatureVector(out)
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Logistic regression over standardized features.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    scaler: StandardScaler,
    coeffs: Vec<f64>,
    bias: f64,
}

#[derive(Deserialize)]
struct LogisticWeights {
    mean: Vec<f64>,
    std: Vec<f64>,
    coeffs: Vec<f64>,
    bias: f64,
}

impl LogisticModel {
    pub fn new(
        scaler: StandardScaler,
        coeffs: Vec<f64>,
        bias: f64,
    ) -> std::result::Result<Self, ModelError> {
        check_len("coefficients", coeffs.len())?;
        if !bias.is_finite() || coeffs.iter().any(|c| !c.is_finite()) {
            return Err(ModelError::InvalidParameter("weights must be finite".into()));
        }
        Ok(Self {
            scaler,
            coeffs,
            bias,
        })
    }

    /// Parse weights exported as `{"mean", "std", "coeffs", "bias"}`.
    ///
    /// Every array must hold one entry per feature-vector element; exports
    /// fitted on a different feature set are rejected.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let weights: LogisticWeights =
            serde_json::from_str(content).context("invalid logistic weights")?;
        let scaler = StandardScaler::new(weights.mean, weights.std)?;
        Ok(Self::new(scaler, weights.coeffs, weights.bias)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read weights {}", path.display()))?;
        let model = Self::from_json_str(&content)?;
        info!(path = %path.display(), "loaded logistic weights");
        Ok(model)
    }

    /// Probability that price moves up.
    pub fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let scaled = self.scaler.transform(features);
        let z = self.bias
            + scaled
                .0
                .iter()
                .zip(&self.coeffs)
                .map(|(x, c)| x * c)
                .sum::<f64>();
        sigmoid(z)
    }
}

impl Classifier for LogisticModel {
    fn classify(&mut self, features: &FeatureVector) -> Result<Classification> {
        Ok(Classification::from_probability(self.predict_proba(features)))
    }
}

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;

#[cfg(feature = "onnx")]
mod onnx {
    use super::{Classification, Classifier, StandardScaler};
    use crate::error::ModelError;
    use crate::vector::FeatureVector;
    use crate::Result;
    use ort::session::{builder::GraphOptimizationLevel, Session};
    use ort::value::Value;
    use std::path::Path;
    use tracing::info;

    /// ONNX model producing an up-probability for a `(1, 11)` `f32` input.
    ///
    /// The output named `output_name` may hold a single sigmoid probability
    /// or a two-class softmax, in which case the second entry is used.
    pub struct OnnxClassifier {
        session: Session,
        scaler: Option<StandardScaler>,
        output_name: String,
    }

    impl OnnxClassifier {
        /// Load an ONNX model.
        ///
        /// # Example
        /// ```no_run
        /// use tick_inference::OnnxClassifier;
        /// use std::path::Path;
        ///
        /// let classifier = OnnxClassifier::new(Path::new("model.onnx"), None, "output").unwrap();
        /// ```
        pub fn new(
            model_path: &Path,
            scaler: Option<StandardScaler>,
            output_name: impl Into<String>,
        ) -> Result<Self> {
            let session = Session::builder()?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .with_intra_threads(1)? // Single-threaded for determinism
                .commit_from_file(model_path)?;

            info!(path = %model_path.display(), "loaded onnx classifier");
            Ok(Self {
                session,
                scaler,
                output_name: output_name.into(),
            })
        }
    }

    impl Classifier for OnnxClassifier {
        fn classify(&mut self, features: &FeatureVector) -> Result<Classification> {
            let features = match &self.scaler {
                Some(scaler) => scaler.transform(features),
                None => *features,
            };
            let input_tensor = Value::from_array(features.to_input_array())?;
            let outputs = self.session.run(ort::inputs![input_tensor])?;

            let output = outputs
                .get(&self.output_name)
                .ok_or_else(|| ModelError::MissingOutput(self.output_name.clone()))?;
            let (_, data) = output.try_extract_tensor::<f32>()?;

            let probability = match data {
                [p] => *p,
                [_, up] => *up,
                other => anyhow::bail!(
                    "expected 1 or 2 probabilities from '{}', got {}",
                    self.output_name,
                    other.len()
                ),
            };

            Ok(Classification::from_probability(
                (probability as f64).clamp(0.0, 1.0),
            ))
        }
    }
}

/// Result of running one tick through the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Tick timestamp (Unix ms)
    pub timestamp: i64,
    pub price: f64,
    pub indicators: IndicatorRecord,
    pub features: FeatureVector,
    pub probability: f64,
    pub label: u8,
    /// Wall time spent inside the pipeline
    pub latency_ms: f64,
}

impl Prediction {
    pub fn to_log(&self) -> PredictionLog {
        PredictionLog {
            timestamp: self.timestamp,
            probability: self.probability,
            label: self.label,
            actual_outcome: None,
            latency_ms: self.latency_ms,
        }
    }

    /// Log entry with the outcome filled in from a later price: 1 if price
    /// rose above the prediction price, else 0.
    pub fn resolve(&self, later_price: f64) -> PredictionLog {
        PredictionLog {
            actual_outcome: Some(u8::from(later_price > self.price)),
            ..self.to_log()
        }
    }
}

/// Telemetry record for one prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionLog {
    pub timestamp: i64,
    pub probability: f64,
    pub label: u8,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub actual_outcome: Option<u8>,
    pub latency_ms: f64,
}

/// Drives one stream: validates ticks, updates state, builds features and
/// classifies them.
pub struct TickPredictor<C> {
    state: IndicatorState,
    classifier: C,
    config: PredictorConfig,
}

impl<C: Classifier> TickPredictor<C> {
    pub fn new(classifier: C, config: PredictorConfig) -> Self {
        Self {
            state: IndicatorState::default(),
            classifier,
            config,
        }
    }

    /// Validate a tick against the current state.
    pub fn check_tick(&self, price: f64, timestamp: i64) -> std::result::Result<(), TickError> {
        match self.state.check_tick(price, timestamp) {
            Err(TickError::OutOfOrder { .. }) if !self.config.reject_out_of_order => Ok(()),
            other => other,
        }
    }

    /// Process one tick end to end.
    ///
    /// A rejected tick returns an error and leaves the state untouched. A
    /// classifier error is returned after the state has absorbed the tick.
    pub fn on_tick(&mut self, price: f64, timestamp: i64) -> Result<Prediction> {
        let start = Instant::now();

        if let Err(err) = self.check_tick(price, timestamp) {
            warn!(price, timestamp, %err, "rejected tick");
            return Err(err.into());
        }

        let indicators = &self.config.indicators;
        let state = std::mem::take(&mut self.state);
        self.state = update_state(state, price, timestamp, indicators.max_history);

        let record = compute_indicators_with(&self.state, price, timestamp, indicators);
        let features = record.to_feature_vector(price);
        let classification = self.classifier.classify(&features)?;
        let classification = Classification::with_threshold(
            classification.probability,
            self.config.decision_threshold,
        );

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            timestamp,
            price,
            probability = classification.probability,
            label = classification.label,
            latency_ms,
            "classified tick"
        );

        Ok(Prediction {
            timestamp,
            price,
            indicators: record,
            features,
            probability: classification.probability,
            label: classification.label,
            latency_ms,
        })
    }

    pub fn state(&self) -> &IndicatorState {
        &self.state
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn classifier_mut(&mut self) -> &mut C {
        &mut self.classifier
    }

    /// Drop all history (e.g. after a feed gap).
    pub fn reset(&mut self) {
        self.state = IndicatorState::default();
    }
}
