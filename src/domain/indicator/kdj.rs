//! KDJ stochastic oscillator.
//!
//! RSV = (C - LL(n)) / (HH(n) - LL(n)) × 100, undefined when HH == LL.
//! K = exponential smoothing of RSV with centre of mass `k_smooth`
//!     (α = 1 / (1 + com)), seeded with the first defined RSV.
//! D = the same smoothing of K with `d_smooth`.
//! J = 3K − 2D.
//!
//! An undefined RSV after the seed leaves K and D at their previous values.
//! Warmup: first (n-1) bars, plus any leading bars with a flat range.

use crate::domain::error::SigscanError;
use crate::domain::indicator::extrema::{rolling_max, rolling_min};
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_N: usize = 9;
pub const DEFAULT_K_SMOOTH: usize = 2;
pub const DEFAULT_D_SMOOTH: usize = 2;

pub fn validate_kdj(n: usize, k_smooth: usize, d_smooth: usize) -> Result<(), SigscanError> {
    require_positive("KDJ n", n)?;
    require_positive("KDJ k_smooth", k_smooth)?;
    require_positive("KDJ d_smooth", d_smooth)?;
    Ok(())
}

/// Raw stochastic value per bar.
pub fn rsv(bars: &[OhlcvBar], n: usize) -> Vec<Option<f64>> {
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let highest = rolling_max(&highs, n);
    let lowest = rolling_min(&lows, n);

    bars.iter()
        .zip(highest.into_iter().zip(lowest))
        .map(|(bar, (hh, ll))| match (hh, ll) {
            (Some(hh), Some(ll)) if hh > ll => Some((bar.close - ll) / (hh - ll) * 100.0),
            _ => None,
        })
        .collect()
}

/// Centre-of-mass exponential smoothing over a partially defined input.
pub fn smooth_com(values: &[Option<f64>], com: usize) -> Vec<Option<f64>> {
    let alpha = 1.0 / (1.0 + com as f64);
    let mut state: Option<f64> = None;
    values
        .iter()
        .map(|v| {
            state = match (state, *v) {
                (None, x) => x,
                (Some(prev), Some(x)) => Some(alpha * x + (1.0 - alpha) * prev),
                (Some(prev), None) => Some(prev),
            };
            state
        })
        .collect()
}

pub fn calculate_kdj(
    bars: &[OhlcvBar],
    n: usize,
    k_smooth: usize,
    d_smooth: usize,
) -> Result<IndicatorSeries, SigscanError> {
    validate_kdj(n, k_smooth, d_smooth)?;

    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let k = smooth_com(&rsv(bars, n), k_smooth);
    let d = smooth_com(&k, d_smooth);

    let values = k
        .into_iter()
        .zip(d)
        .map(|(k, d)| match (k, d) {
            (Some(k), Some(d)) => Some(IndicatorValue::Kdj {
                k,
                d,
                j: 3.0 * k - 2.0 * d,
            }),
            _ => None,
        })
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Kdj {
            n,
            k_smooth,
            d_smooth,
        },
        &dates,
        values,
    ))
}
