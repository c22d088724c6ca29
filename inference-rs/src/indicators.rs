//! Per-stream indicator state and the per-tick assembler.
//!
//! [`update_state`] is the only mutator: it appends the tick to the history
//! and carries the EMA/MACD recurrences forward in O(1). Everything else is
//! a pure reader. Call `update_state` before [`compute_indicators`] for the
//! same tick so the scanners see the current price in their windows.

use crate::buffer::PriceHistory;
use crate::config::{IndicatorConfig, DEFAULT_MAX_HISTORY};
use crate::error::TickError;
use crate::features::{
    calculate_bollinger_position, calculate_returns, calculate_rsi, calculate_volatility,
};
use serde::{Deserialize, Serialize};

/// Span of the fast price EMA.
pub const EMA_FAST_SPAN: u32 = 12;

/// Span of the slow price EMA.
pub const EMA_SLOW_SPAN: u32 = 26;

/// Span of the EMA applied to the MACD line.
pub const SIGNAL_SPAN: u32 = 9;

/// One step of an exponential moving average with `alpha = 2 / (span + 1)`.
#[inline]
pub fn ema(prev: f64, price: f64, span: u32) -> f64 {
    let alpha = 2.0 / (span as f64 + 1.0);
    alpha * price + (1.0 - alpha) * prev
}

/// State carried across ticks for one logical stream (e.g. one symbol).
///
/// Owned by exactly one stream; independent states share nothing and can
/// be driven from different threads.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorState {
    history: PriceHistory,
    pub ema12: f64,
    pub ema26: f64,
    pub prev_signal: f64,
}

impl Default for IndicatorState {
    fn default() -> Self {
        Self {
            history: PriceHistory::new(DEFAULT_MAX_HISTORY),
            ema12: 0.0,
            ema26: 0.0,
            prev_signal: 0.0,
        }
    }
}

impl IndicatorState {
    /// Buffered prices, oldest to newest.
    pub fn prices(&self) -> &[f64] {
        self.history.prices()
    }

    /// Buffered timestamps in Unix milliseconds.
    pub fn timestamps(&self) -> &[i64] {
        self.history.timestamps()
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Current MACD line, `ema12 - ema26`.
    pub fn macd(&self) -> f64 {
        self.ema12 - self.ema26
    }

    /// Check a tick before it is fed to [`update_state`].
    ///
    /// Rejects non-finite and non-positive prices, and timestamps earlier
    /// than the newest buffered one. Equal timestamps are accepted.
    pub fn check_tick(&self, price: f64, timestamp: i64) -> Result<(), TickError> {
        if !price.is_finite() {
            return Err(TickError::NonFinitePrice(price));
        }
        if price <= 0.0 {
            return Err(TickError::NonPositivePrice(price));
        }
        if let Some((_, last)) = self.history.latest() {
            if timestamp < last {
                return Err(TickError::OutOfOrder { timestamp, last });
            }
        }
        Ok(())
    }

    /// Consume the state and return it advanced by one tick.
    ///
    /// See [`update_state`].
    #[must_use]
    pub fn update(mut self, price: f64, timestamp: i64, max_history: usize) -> Self {
        let first = self.history.is_empty();
        self.history.append(price, timestamp, max_history.max(1));

        if first {
            self.ema12 = price;
            self.ema26 = price;
        } else {
            self.ema12 = ema(self.ema12, price, EMA_FAST_SPAN);
            self.ema26 = ema(self.ema26, price, EMA_SLOW_SPAN);
        }

        self.prev_signal = ema(self.prev_signal, self.macd(), SIGNAL_SPAN);
        self
    }
}

/// Per-tick indicator output. Derived, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorRecord {
    pub r5: f64,
    pub r15: f64,
    pub r30: f64,
    pub r60: f64,
    pub vol30: f64,
    pub vol60: f64,
    pub rsi14: f64,
    pub macd: f64,
    pub signal: f64,
    pub bb_position: f64,
    pub price_momentum: f64,
    /// Always zero: the feed carries no volume.
    pub volume_trend: f64,
}

/// Fresh state for a new stream: empty history, zeroed EMAs and signal.
pub fn init_indicator_state() -> IndicatorState {
    IndicatorState::default()
}

/// Append a tick and advance the EMA/MACD/signal recurrences.
///
/// On the first observation of a state both EMAs are seeded with the price
/// itself. The MACD line is `ema12 - ema26` after the update, and the new
/// signal value replaces `prev_signal`. `max_history` is raised to at least
/// one.
#[must_use]
pub fn update_state(
    state: IndicatorState,
    price: f64,
    timestamp: i64,
    max_history: usize,
) -> IndicatorState {
    state.update(price, timestamp, max_history)
}

/// Compute the full indicator record with the default configuration.
pub fn compute_indicators(
    state: &IndicatorState,
    current_price: f64,
    current_time: i64,
) -> IndicatorRecord {
    compute_indicators_with(state, current_price, current_time, &IndicatorConfig::default())
}

/// Compute the full indicator record for the tick just applied to `state`.
///
/// `current_price` and `current_time` must be the values passed to the
/// preceding [`update_state`] call.
pub fn compute_indicators_with(
    state: &IndicatorState,
    current_price: f64,
    current_time: i64,
    config: &IndicatorConfig,
) -> IndicatorRecord {
    let prices = state.prices();
    let timestamps = state.timestamps();

    let returns = calculate_returns(
        prices,
        timestamps,
        current_price,
        current_time,
        &config.return_horizons_ms,
    );
    let [vol_short, vol_long] = config.volatility_windows_ms;

    IndicatorRecord {
        r5: returns.r5,
        r15: returns.r15,
        r30: returns.r30,
        r60: returns.r60,
        vol30: calculate_volatility(prices, timestamps, vol_short, current_time),
        vol60: calculate_volatility(prices, timestamps, vol_long, current_time),
        rsi14: calculate_rsi(prices, config.rsi_period),
        macd: state.macd(),
        signal: state.prev_signal,
        bb_position: calculate_bollinger_position(
            prices,
            current_price,
            config.bollinger_window,
            config.bollinger_num_std,
        ),
        price_momentum: returns.r15,
        volume_trend: 0.0,
    }
}
