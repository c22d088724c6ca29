use thiserror::Error;

/// Reasons a tick is refused before it reaches the indicator state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TickError {
    #[error("non-finite price {0}")]
    NonFinitePrice(f64),
    #[error("non-positive price {0}")]
    NonPositivePrice(f64),
    #[error("tick at {timestamp} ms is older than last tick at {last} ms")]
    OutOfOrder { timestamp: i64, last: i64 },
}

/// Invalid or inconsistent classifier parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{what}: expected {expected} values, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("model output '{0}' not found")]
    MissingOutput(String),
}
