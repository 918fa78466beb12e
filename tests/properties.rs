//! Property-based tests for the smoothers and the two state machines.
//!
//! Inputs are random walks, so trends, reversals and flat stretches all
//! show up across cases.

use std::num::NonZero;

use proptest::prelude::*;

use recursive_ta::{
    Ema, EmaConfig, Hlc, IndicatorConfig, IndicatorConfigBuilder, Kama, KamaConfig, MovingAverage,
    Psar, PsarConfig, PsarTrend, Supertrend, SupertrendConfig, SupertrendTrend, Wilders,
    WildersConfig,
};

// ==================== Generators ====================

#[derive(Debug)]
struct Bars {
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
}

impl Bars {
    fn hlc(&self) -> Hlc<'_> {
        Hlc::new(&self.high, &self.low, &self.close).unwrap()
    }
}

fn nz(n: usize) -> NonZero<usize> {
    NonZero::new(n).unwrap()
}

fn arb_price_series(min_len: usize, max_len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-2.0..2.0_f64, min_len..=max_len).prop_map(|moves| {
        moves
            .into_iter()
            .scan(100.0, |price, delta| {
                *price += delta;
                Some(*price)
            })
            .collect()
    })
}

/// Random-walk bars with `low <= close <= high`.
fn arb_bars(min_len: usize, max_len: usize) -> impl Strategy<Value = Bars> {
    prop::collection::vec(
        (-2.0..2.0_f64, 0.0..1.5_f64, 0.0..1.5_f64, 0.0..=1.0_f64),
        min_len..=max_len,
    )
    .prop_map(|rows| {
        let mut mid = 100.0;
        let mut bars = Bars {
            high: Vec::with_capacity(rows.len()),
            low: Vec::with_capacity(rows.len()),
            close: Vec::with_capacity(rows.len()),
        };

        for (delta, up, down, position) in rows {
            mid += delta;
            let (high, low) = (mid + up, mid - down);
            bars.high.push(high);
            bars.low.push(low);
            bars.close.push(low + (high - low) * position);
        }

        bars
    })
}

fn arb_method() -> impl Strategy<Value = MovingAverage> {
    prop_oneof![
        Just(MovingAverage::Sma),
        Just(MovingAverage::Wma),
        Just(MovingAverage::Hma),
        Just(MovingAverage::EMA),
        Just(MovingAverage::WILDERS),
        Just(MovingAverage::KAMA),
    ]
}

// ==================== Smoothers ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every smoother returns one value per input bar.
    #[test]
    fn prop_smoother_output_length(
        data in arb_price_series(0, 80),
        method in arb_method(),
        window in 1usize..=20,
    ) {
        prop_assert_eq!(method.apply(&data, window).unwrap().len(), data.len());
    }

    /// EMA over one bar reproduces its input.
    #[test]
    fn prop_ema_length_one_is_identity(data in arb_price_series(1, 80)) {
        let out = Ema::new(EmaConfig::new(nz(1))).apply(&data).unwrap();
        prop_assert_eq!(out, data);
    }

    /// Wilder's average over `n` is the EMA with `α = 1 / n`, which is the
    /// EMA over `2n − 1`.
    #[test]
    fn prop_wilders_is_ema_with_reciprocal_alpha(
        data in arb_price_series(1, 80),
        length in 1usize..=15,
    ) {
        let wilders = Wilders::new(WildersConfig::new(nz(length))).apply(&data).unwrap();
        let ema = Ema::new(EmaConfig::new(nz(2 * length - 1))).apply(&data).unwrap();

        for (i, (w, e)) in wilders.iter().zip(&ema).enumerate() {
            prop_assert!((w - e).abs() < 1e-9, "bar {}: wilders {} ema {}", i, w, e);
        }
    }

    /// EMA stays between the running minimum and maximum of its input.
    #[test]
    fn prop_ema_bounded_by_input(data in arb_price_series(1, 80), length in 1usize..=20) {
        let out = Ema::new(EmaConfig::new(nz(length))).apply(&data).unwrap();
        let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);

        for (x, v) in data.iter().zip(&out) {
            lo = lo.min(*x);
            hi = hi.max(*x);
            prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
        }
    }

    /// Constant input is a fixed point of every recursive smoother.
    #[test]
    fn prop_constant_is_fixed_point(
        constant in 1.0..1000.0_f64,
        len in 1usize..60,
        length in 1usize..=15,
    ) {
        let data = vec![constant; len];
        let outputs = [
            Ema::new(EmaConfig::new(nz(length))).apply(&data).unwrap(),
            Wilders::new(WildersConfig::new(nz(length))).apply(&data).unwrap(),
            Kama::new(KamaConfig::new(nz(length))).apply(&data).unwrap(),
        ];

        for out in &outputs {
            for v in out.iter().filter(|v| !v.is_nan()) {
                prop_assert!((v - constant).abs() < 1e-9, "{} != {}", v, constant);
            }
        }
    }
}

// ==================== PSAR ====================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_psar_output_length(bars in arb_bars(0, 120)) {
        let sar = Psar::new(PsarConfig::default()).apply(bars.hlc()).unwrap();
        prop_assert_eq!(sar.len(), bars.close.len());
        prop_assert!(sar.iter().all(|v| v.is_finite()));
    }

    /// Outside a reversal bar, the SAR never crosses the two prior bars'
    /// extremes nor the current bar's.
    #[test]
    fn prop_psar_respects_clamp(bars in arb_bars(3, 120)) {
        let states: Vec<_> = Psar::new(PsarConfig::default()).states(bars.hlc()).collect();

        for i in 1..states.len() {
            let (prev, state) = (states[i - 1], states[i]);
            if prev.trend() != state.trend() {
                continue;
            }

            let lookback = i.saturating_sub(2)..=i;
            match state.trend() {
                PsarTrend::Rising => {
                    for j in lookback {
                        prop_assert!(state.sar() <= bars.low[j], "bar {}: sar above low[{}]", i, j);
                    }
                }
                PsarTrend::Falling => {
                    for j in lookback {
                        prop_assert!(state.sar() >= bars.high[j], "bar {}: sar below high[{}]", i, j);
                    }
                }
            }
        }
    }

    /// The acceleration factor climbs by `step` up to `max` within a trend
    /// and resets to `step` on every reversal.
    #[test]
    fn prop_psar_acceleration(
        bars in arb_bars(2, 120),
        step in 0.01..0.05_f64,
        extra in 0.05..0.3_f64,
    ) {
        let max = step + extra;
        let config = PsarConfig::builder().step(step).max(max).build().unwrap();
        let states: Vec<_> = Psar::new(config).states(bars.hlc()).collect();

        prop_assert_eq!(states[0].acceleration(), step);
        for pair in states.windows(2) {
            let (prev, state) = (pair[0], pair[1]);
            prop_assert!(state.acceleration() <= max + 1e-12);

            if prev.trend() == state.trend() {
                prop_assert!(state.acceleration() >= prev.acceleration());
                prop_assert!(state.acceleration() - prev.acceleration() <= step + 1e-12);
            } else {
                prop_assert_eq!(state.acceleration(), step);
                prop_assert_eq!(state.sar(), prev.extreme_point());
            }
        }
    }

    /// Flat bars keep the SAR at the constant price.
    #[test]
    fn prop_psar_constant_is_fixed_point(constant in 1.0..1000.0_f64, len in 1usize..60) {
        let column = vec![constant; len];
        let hlc = Hlc::new(&column, &column, &column).unwrap();
        let sar = Psar::new(PsarConfig::default()).apply(hlc).unwrap();
        prop_assert!(sar.iter().all(|&v| v == constant));
    }
}

// ==================== Supertrend ====================

fn supertrend(length: usize, factor: f64) -> Supertrend {
    Supertrend::new(
        SupertrendConfig::builder()
            .length(nz(length))
            .factor(factor)
            .build()
            .unwrap(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_supertrend_output_length(bars in arb_bars(0, 120), length in 1usize..=15) {
        let line = supertrend(length, 2.0).apply(bars.hlc()).unwrap();
        prop_assert_eq!(line.len(), bars.close.len());
        prop_assert!(line.iter().take(length).all(|v| v.is_nan()));
    }

    /// Final bands only loosen when the basic band moves outward after the
    /// previous close broke through.
    #[test]
    fn prop_supertrend_bands_ratchet(
        bars in arb_bars(2, 120),
        length in 1usize..=10,
        factor in 0.5..4.0_f64,
    ) {
        let atr = vec![1.0; bars.close.len()];
        let states: Vec<_> = supertrend(length, factor)
            .states(bars.hlc(), &atr)
            .unwrap()
            .collect();

        for i in 1..states.len() {
            let (Some(prev), Some(state)) = (states[i - 1], states[i]) else {
                continue;
            };
            let prev_close = bars.close[i - 1];

            if prev_close <= prev.upper() {
                prop_assert!(state.upper() <= prev.upper(), "bar {}: upper band rose", i);
            }
            if prev_close >= prev.lower() {
                prop_assert!(state.lower() >= prev.lower(), "bar {}: lower band fell", i);
            }
        }
    }

    /// The active line sits below the close in an up trend and above it in
    /// a down trend. Holds while each close lies inside its basic bands.
    #[test]
    fn prop_supertrend_line_side(bars in arb_bars(2, 120), length in 1usize..=10) {
        let st = supertrend(length, 2.0);
        // ±1.6 around the midpoint, wider than any generated bar.
        let atr = vec![0.8; bars.close.len()];

        for (i, state) in st.states(bars.hlc(), &atr).unwrap().enumerate() {
            let Some(state) = state else { continue };
            match state.trend() {
                SupertrendTrend::Up => prop_assert!(bars.close[i] >= state.value()),
                SupertrendTrend::Down => prop_assert!(bars.close[i] <= state.value()),
            }
        }
    }

    /// Flat bars hold the line at the constant price once active.
    #[test]
    fn prop_supertrend_constant_is_fixed_point(
        constant in 1.0..1000.0_f64,
        len in 1usize..60,
        length in 1usize..=10,
    ) {
        let column = vec![constant; len];
        let hlc = Hlc::new(&column, &column, &column).unwrap();
        let line = supertrend(length, 2.0).apply(hlc).unwrap();

        for (i, v) in line.iter().enumerate() {
            if i < length {
                prop_assert!(v.is_nan());
            } else {
                prop_assert_eq!(*v, constant);
            }
        }
    }
}
