//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = sum(C[i-n+1..=i]) / n
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::SigscanError;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Rolling arithmetic mean. Each window is summed directly so that a window
/// of 1 reproduces its input bit-for-bit.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let sum: f64 = values[i + 1 - window..=i].iter().sum();
                Some(sum / window as f64)
            }
        })
        .collect()
}

pub fn calculate_sma(bars: &[OhlcvBar], window: usize) -> Result<IndicatorSeries, SigscanError> {
    require_positive("SMA window", window)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let values = rolling_mean(&closes, window)
        .into_iter()
        .map(|v| v.map(IndicatorValue::Simple))
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Sma(window),
        &dates,
        values,
    ))
}
