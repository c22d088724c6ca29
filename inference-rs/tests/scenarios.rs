//! End-to-end tick scenarios through the indicator core.

use tick_inference::features::calculate_rsi;
use tick_inference::indicators::ema;
use tick_inference::{
    build_feature_vector, compute_indicators, init_indicator_state, update_state, IndicatorFields,
    IndicatorState,
};

fn feed(ticks: &[(f64, i64)]) -> IndicatorState {
    ticks
        .iter()
        .fold(init_indicator_state(), |state, &(price, ts)| {
            update_state(state, price, ts, 100)
        })
}

#[test]
fn five_ticks_from_empty_state() {
    let ticks = [
        (100.0, 0),
        (101.0, 1000),
        (102.0, 2000),
        (101.0, 3000),
        (99.0, 4000),
    ];
    let state = feed(&ticks);
    assert_eq!(state.prices().len(), 5);
    assert_eq!(state.timestamps().len(), 5);

    let (mut e12, mut e26) = (100.0, 100.0);
    for &(p, _) in &ticks[1..] {
        e12 = ema(e12, p, 12);
        e26 = ema(e26, p, 26);
    }
    assert_eq!(state.ema12, e12);
    assert_eq!(state.ema26, e26);

    let record = compute_indicators(&state, 99.0, 4000);
    // now - 5000 = -1000 is closest to t=0 (price 100)
    assert!((record.r5 - (-0.01)).abs() < 1e-12);
    assert!((record.r60 - (-0.01)).abs() < 1e-12);
    assert_eq!(record.rsi14, 50.0);
    assert_eq!(record.bb_position, 0.5);
    assert!(record.vol30 > 0.0);
    assert_eq!(record.price_momentum, record.r15);
}

#[test]
fn rsi_leaves_neutral_at_fifteen_prices() {
    let prices: Vec<f64> = (0..15)
        .map(|i| 100.0 + if i % 3 == 0 { -1.0 } else { 1.5 } * i as f64)
        .collect();

    let state = feed(
        &prices[..14]
            .iter()
            .enumerate()
            .map(|(i, &p)| (p, i as i64 * 1000))
            .collect::<Vec<_>>(),
    );
    assert_eq!(compute_indicators(&state, prices[13], 13_000).rsi14, 50.0);

    let state = update_state(state, prices[14], 14_000, 100);
    let rsi = compute_indicators(&state, prices[14], 14_000).rsi14;
    assert_ne!(rsi, 50.0);
    assert_eq!(rsi, calculate_rsi(&prices, 14));
}

#[test]
fn unset_rsi_maps_to_half() {
    let state = feed(&[(100.0, 0), (101.0, 3000)]);
    let record = compute_indicators(&state, 101.0, 3000);

    let fields = IndicatorFields {
        rsi14: None,
        ..IndicatorFields::from(record)
    };
    let vector = build_feature_vector(&fields, 101.0);
    assert_eq!(vector.0[6], 0.5);
}

#[test]
fn full_window_produces_finite_vector() {
    let ticks: Vec<(f64, i64)> = (0..150)
        .map(|i| (30_000.0 + (i as f64 * 0.2).sin() * 50.0, i * 3000))
        .collect();
    let state = feed(&ticks);
    assert_eq!(state.len(), 100);

    let &(price, ts) = ticks.last().unwrap();
    let vector = compute_indicators(&state, price, ts).to_feature_vector(price);
    assert!(vector.0.iter().all(|v| v.is_finite()));
    assert!((0.0..=1.0).contains(&vector.0[6]));
    assert_eq!(vector.0[10], 0.0);
}

#[test]
fn independent_streams_do_not_interact() {
    let a = feed(&[(100.0, 0), (110.0, 1000)]);
    let b = feed(&[(5.0, 0)]);
    let b_alone = feed(&[(5.0, 0)]);

    let a_next = update_state(a, 120.0, 2000, 100);
    assert_eq!(b, b_alone);
    assert_eq!(a_next.len(), 3);
}
