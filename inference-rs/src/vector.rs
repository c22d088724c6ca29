//! Mapping from indicator records to the classifier's input vector.
//!
//! The element order is a contract with the trained model:
//!
//! `[r5, r15, r30, r60, vol30, vol60, rsi14/100, macd/price, bbPosition,
//!   priceMomentum, volumeTrend]`

use crate::features::{BOLLINGER_NEUTRAL, RSI_NEUTRAL};
use crate::indicators::IndicatorRecord;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Number of elements in a feature vector.
pub const FEATURE_COUNT: usize = 11;

/// Element names in vector order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "r5",
    "r15",
    "r30",
    "r60",
    "vol30",
    "vol60",
    "rsi14",
    "macd",
    "bb_position",
    "price_momentum",
    "volume_trend",
];

/// Indicator values as supplied by a collaborator, any of which may be
/// missing.
///
/// Missing fields take their neutral value when the vector is built: `0`
/// for most, `50` for RSI and `0.5` for the Bollinger position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndicatorFields {
    pub r5: Option<f64>,
    pub r15: Option<f64>,
    pub r30: Option<f64>,
    pub r60: Option<f64>,
    pub vol30: Option<f64>,
    pub vol60: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<f64>,
    pub bb_position: Option<f64>,
    pub price_momentum: Option<f64>,
    pub volume_trend: Option<f64>,
}

impl From<&IndicatorRecord> for IndicatorFields {
    fn from(record: &IndicatorRecord) -> Self {
        Self {
            r5: Some(record.r5),
            r15: Some(record.r15),
            r30: Some(record.r30),
            r60: Some(record.r60),
            vol30: Some(record.vol30),
            vol60: Some(record.vol60),
            rsi14: Some(record.rsi14),
            macd: Some(record.macd),
            bb_position: Some(record.bb_position),
            price_momentum: Some(record.price_momentum),
            volume_trend: Some(record.volume_trend),
        }
    }
}

impl From<IndicatorRecord> for IndicatorFields {
    fn from(record: IndicatorRecord) -> Self {
        Self::from(&record)
    }
}

/// Ordered, normalized model input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Value of the named element, if the name is known.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|&n| n == name)
            .map(|i| self.0[i])
    }

    /// Single-row `f32` batch of shape `(1, FEATURE_COUNT)`.
    pub fn to_input_array(&self) -> Array2<f32> {
        Array2::from_shape_fn((1, FEATURE_COUNT), |(_, j)| self.0[j] as f32)
    }

    /// Pairs of element name and value, in vector order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

/// Build the classifier input from possibly incomplete indicator values.
///
/// RSI is divided by 100 and MACD by `price`; a zero or non-finite price
/// makes the MACD element 0.
pub fn build_feature_vector(fields: &IndicatorFields, price: f64) -> FeatureVector {
    let or_zero = |v: Option<f64>| v.unwrap_or(0.0);

    let macd = or_zero(fields.macd);
    let macd_norm = if price != 0.0 && price.is_finite() {
        macd / price
    } else {
        0.0
    };

    FeatureVector([
        or_zero(fields.r5),
        or_zero(fields.r15),
        or_zero(fields.r30),
        or_zero(fields.r60),
        or_zero(fields.vol30),
        or_zero(fields.vol60),
        fields.rsi14.unwrap_or(RSI_NEUTRAL) / 100.0,
        macd_norm,
        fields.bb_position.unwrap_or(BOLLINGER_NEUTRAL),
        or_zero(fields.price_momentum),
        or_zero(fields.volume_trend),
    ])
}

impl IndicatorRecord {
    /// Shortcut for [`build_feature_vector`] on a complete record.
    pub fn to_feature_vector(&self, price: f64) -> FeatureVector {
        build_feature_vector(&IndicatorFields::from(self), price)
    }
}
