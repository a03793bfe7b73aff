//! Exponential Moving Average indicator.
//!
//! α = 2/(span+1), EMA[0] = C[0], EMA[i] = α·C[i] + (1-α)·EMA[i-1].
//! The seed is not reweighted, so every bar has a value.

use crate::domain::error::SigscanError;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

/// Recursive EMA over a fully defined input.
pub fn ema_values(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let ema = match prev {
            None => v,
            Some(p) => alpha * v + (1.0 - alpha) * p,
        };
        out.push(ema);
        prev = Some(ema);
    }
    out
}

pub fn calculate_ema(bars: &[OhlcvBar], span: usize) -> Result<IndicatorSeries, SigscanError> {
    require_positive("EMA span", span)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let values = ema_values(&closes, span)
        .into_iter()
        .map(|v| Some(IndicatorValue::Simple(v)))
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Ema(span),
        &dates,
        values,
    ))
}
