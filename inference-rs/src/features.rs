//! Window scanners over the buffered price history.
//!
//! Every function here is a pure reader of `(prices, timestamps)` slices
//! ordered oldest to newest. None of them fail: cold-start and degenerate
//! inputs map to documented neutral values so a missing indicator never
//! stops the tick pipeline.
//!
//! **Critical for correctness**: these definitions must match the ones the
//! classifier was trained against, including the sample vs. population
//! standard deviation choices and the fixed RSI divisor.

/// Neutral RSI reported during warm-up.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Neutral Bollinger position reported during warm-up or on flat prices.
pub const BOLLINGER_NEUTRAL: f64 = 0.5;

/// Returns at the four configured horizons.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HorizonReturns {
    pub r5: f64,
    pub r15: f64,
    pub r30: f64,
    pub r60: f64,
}

/// Index of the observation whose timestamp is closest to `target_time`.
///
/// Ties go to the earliest index.
fn closest_index(timestamps: &[i64], target_time: i64) -> Option<usize> {
    let mut best: Option<(usize, u64)> = None;
    for (i, &ts) in timestamps.iter().enumerate() {
        let distance = ts.abs_diff(target_time);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

/// Simple return of `current_price` against the observation closest in time
/// to `target_time`.
///
/// # Arguments
/// * `prices` - Buffered prices, oldest to newest
/// * `timestamps` - Parallel timestamps in Unix milliseconds
/// * `current_price` - Price of the tick being evaluated
/// * `target_time` - Point in time (ms) to compare against
///
/// # Returns
/// `(current - past) / past`, or `0.0` if the buffer is empty or the
/// reference price is exactly zero.
pub fn get_return_at_time(
    prices: &[f64],
    timestamps: &[i64],
    current_price: f64,
    target_time: i64,
) -> f64 {
    let Some(idx) = closest_index(timestamps, target_time) else {
        return 0.0;
    };
    match prices.get(idx) {
        Some(&past) if past != 0.0 => (current_price - past) / past,
        _ => 0.0,
    }
}

/// Returns at each horizon in `horizons_ms`, measured back from `now`.
pub fn calculate_returns(
    prices: &[f64],
    timestamps: &[i64],
    current_price: f64,
    now: i64,
    horizons_ms: &[i64; 4],
) -> HorizonReturns {
    let at = |horizon: i64| {
        get_return_at_time(prices, timestamps, current_price, now.saturating_sub(horizon))
    };
    HorizonReturns {
        r5: at(horizons_ms[0]),
        r15: at(horizons_ms[1]),
        r30: at(horizons_ms[2]),
        r60: at(horizons_ms[3]),
    }
}

/// Rolling volatility of one-step simple returns inside a time window.
///
/// A return at index `i` qualifies when `timestamps[i] >= now - window_ms`.
/// Returns whose prior price is zero are skipped.
///
/// # Returns
/// Sample standard deviation (divisor `n - 1`) of the qualifying returns,
/// or `0.0` when fewer than two qualify.
pub fn calculate_volatility(prices: &[f64], timestamps: &[i64], window_ms: i64, now: i64) -> f64 {
    let cutoff = now.saturating_sub(window_ms);
    let n = prices.len().min(timestamps.len());

    let returns: Vec<f64> = (1..n)
        .filter(|&i| timestamps[i] >= cutoff && prices[i - 1] != 0.0)
        .map(|i| (prices[i] - prices[i - 1]) / prices[i - 1])
        .collect();

    if returns.len() < 2 {
        return 0.0;
    }

    let count = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / count;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (count - 1.0);
    variance.sqrt()
}

/// Relative Strength Index over the last `period` one-step changes.
///
/// Both averages divide by `period` regardless of how many changes were
/// gains or losses; unchanged prices count toward neither list.
///
/// # Returns
/// [`RSI_NEUTRAL`] with fewer than `period + 1` prices, `100.0` when there
/// were no losses, otherwise `100 - 100 / (1 + avg_gain / avg_loss)`.
pub fn calculate_rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return RSI_NEUTRAL;
    }

    let recent = &prices[prices.len() - period - 1..];
    let (gains, losses) = recent
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(gains, losses), change| {
            if change > 0.0 {
                (gains + change, losses)
            } else if change < 0.0 {
                (gains, losses - change)
            } else {
                (gains, losses)
            }
        });

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;
    if avg_loss == 0.0 {
        return 100.0;
    }

    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// Position of `current_price` within Bollinger bands over the last
/// `window` prices.
///
/// Uses the population standard deviation (divisor `n`). The result is not
/// clamped: values outside `[0, 1]` measure how far price broke out of the
/// bands.
///
/// # Returns
/// [`BOLLINGER_NEUTRAL`] with fewer than `window` prices or a zero band
/// width, otherwise `(current - lower) / (upper - lower)`.
pub fn calculate_bollinger_position(
    prices: &[f64],
    current_price: f64,
    window: usize,
    num_std: f64,
) -> f64 {
    if window == 0 || prices.len() < window {
        return BOLLINGER_NEUTRAL;
    }

    let recent = &prices[prices.len() - window..];
    let n = window as f64;
    let sma = recent.iter().sum::<f64>() / n;
    let std = (recent.iter().map(|p| (p - sma).powi(2)).sum::<f64>() / n).sqrt();
    if std == 0.0 {
        return BOLLINGER_NEUTRAL;
    }

    let upper = sma + num_std * std;
    let lower = sma - num_std * std;
    (current_price - lower) / (upper - lower)
}
