//! Standard Deviation indicator.
//!
//! Population standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n-1) / n)
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::SigscanError;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Rolling population standard deviation (divides by N, not N-1).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let mean = slice.iter().sum::<f64>() / window as f64;
            let variance = slice
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / window as f64;
            Some(variance.sqrt())
        })
        .collect()
}

pub fn calculate_stddev(
    bars: &[OhlcvBar],
    period: usize,
) -> Result<IndicatorSeries, SigscanError> {
    require_positive("STDDEV period", period)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let values = rolling_std(&closes, period)
        .into_iter()
        .map(|v| v.map(IndicatorValue::Simple))
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Stddev(period),
        &dates,
        values,
    ))
}
