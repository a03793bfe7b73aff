//! RSI (Relative Strength Index), rolling-mean variant.
//!
//! gain/loss are the positive/negative parts of C[i] - C[i-1]; the first bar,
//! which has no previous close, contributes a zero change.
//! avg_gain/avg_loss are simple means over the last `period` changes.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100.
//! If both are 0 the ratio is degenerate and the point is undefined.
//!
//! Warmup: first (period-1) bars are undefined.

use crate::domain::error::SigscanError;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 14;

pub fn rsi_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());
    for i in 0..closes.len() {
        let change = if i == 0 { 0.0 } else { closes[i] - closes[i - 1] };
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    rolling_mean(&gains, period)
        .into_iter()
        .zip(rolling_mean(&losses, period))
        .map(|(gain, loss)| match (gain, loss) {
            (Some(gain), Some(loss)) if loss > 0.0 => {
                Some(100.0 - 100.0 / (1.0 + gain / loss))
            }
            (Some(gain), Some(_)) if gain > 0.0 => Some(100.0),
            _ => None,
        })
        .collect()
}

pub fn calculate_rsi(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, SigscanError> {
    require_positive("RSI period", period)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let values = rsi_values(&closes, period)
        .into_iter()
        .map(|v| v.map(IndicatorValue::Simple))
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Rsi(period),
        &dates,
        values,
    ))
}
