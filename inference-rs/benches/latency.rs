//! Per-tick latency benchmarks.
//!
//! # Benchmarks
//!
//! ## Buffer Operations
//! - `rolling_buffer_push`: Push into a full buffer
//! - `price_history_append`: Lockstep price/timestamp append
//!
//! ## Window Scanners
//! - `scan_returns`, `scan_volatility`, `scan_rsi`, `scan_bollinger`
//!
//! ## Per-Tick Pipeline
//! - `update_state`: Append + EMA/MACD/signal update
//! - `tick_to_vector`: Update, compute indicators, build the feature vector
//! - `tick_predictor`: Full tick through a logistic classifier
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench -p tick-inference
//! cargo bench -p tick-inference -- scan_
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tick_inference::features::{
    calculate_bollinger_position, calculate_returns, calculate_rsi, calculate_volatility,
};
use tick_inference::{
    compute_indicators, init_indicator_state, update_state, IndicatorState, LogisticModel,
    PredictorConfig, PriceHistory, RollingBuffer, StandardScaler, TickPredictor, FEATURE_COUNT,
};

const TICK_MS: i64 = 3000;

fn price_at(i: usize) -> f64 {
    30_000.0 + (i as f64 * 0.01).sin() * 200.0
}

fn warm_state(ticks: usize, max_history: usize) -> IndicatorState {
    (0..ticks).fold(init_indicator_state(), |state, i| {
        update_state(state, price_at(i), i as i64 * TICK_MS, max_history)
    })
}

fn benchmark_buffers(c: &mut Criterion) {
    c.bench_function("rolling_buffer_push", |b| {
        let mut buffer = RollingBuffer::new(100);
        for i in 0..100 {
            buffer.push(i as f64);
        }
        b.iter(|| buffer.push(black_box(100.5)));
    });

    c.bench_function("price_history_append", |b| {
        let mut history = PriceHistory::new(100);
        let mut i = 0i64;
        b.iter(|| {
            history.append(black_box(100.5), black_box(i), 100);
            i += TICK_MS;
        });
    });
}

fn benchmark_scanners(c: &mut Criterion) {
    let state = warm_state(100, 100);
    let prices = state.prices();
    let timestamps = state.timestamps();
    let now = *timestamps.last().unwrap();
    let price = *prices.last().unwrap();

    c.bench_function("scan_returns", |b| {
        b.iter(|| {
            calculate_returns(
                black_box(prices),
                black_box(timestamps),
                price,
                now,
                &[5_000, 15_000, 30_000, 60_000],
            )
        });
    });

    c.bench_function("scan_volatility", |b| {
        b.iter(|| calculate_volatility(black_box(prices), black_box(timestamps), 60_000, now));
    });

    c.bench_function("scan_rsi", |b| {
        b.iter(|| calculate_rsi(black_box(prices), 14));
    });

    c.bench_function("scan_bollinger", |b| {
        b.iter(|| calculate_bollinger_position(black_box(prices), price, 20, 2.0));
    });
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_to_vector");

    for max_history in [100usize, 500, 2000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(max_history),
            max_history,
            |b, &max_history| {
                let mut state = Some(warm_state(max_history, max_history));
                let mut i = max_history;
                b.iter(|| {
                    let price = price_at(i);
                    let ts = i as i64 * TICK_MS;
                    let next = update_state(state.take().unwrap(), price, ts, max_history);
                    let vector = compute_indicators(&next, price, ts).to_feature_vector(price);
                    state = Some(next);
                    i += 1;
                    black_box(vector)
                });
            },
        );
    }

    group.finish();

    c.bench_function("update_state", |b| {
        let mut state = Some(warm_state(100, 100));
        let mut i = 100;
        b.iter(|| {
            let next = update_state(state.take().unwrap(), price_at(i), i as i64 * TICK_MS, 100);
            state = Some(next);
            i += 1;
        });
    });
}

fn benchmark_predictor(c: &mut Criterion) {
    let scaler =
        StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap();
    let model = LogisticModel::new(scaler, vec![0.1; FEATURE_COUNT], 0.0).unwrap();
    let mut predictor = TickPredictor::new(model, PredictorConfig::default());

    for i in 0..100 {
        predictor.on_tick(price_at(i), i as i64 * TICK_MS).unwrap();
    }

    c.bench_function("tick_predictor", |b| {
        let mut i = 100;
        b.iter(|| {
            let prediction = predictor.on_tick(price_at(i), i as i64 * TICK_MS);
            i += 1;
            black_box(prediction)
        });
    });
}

criterion_group!(
    benches,
    benchmark_buffers,
    benchmark_scanners,
    benchmark_pipeline,
    benchmark_predictor,
);
criterion_main!(benches);
