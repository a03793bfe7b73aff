//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Both EMAs are seeded with the first close, so there is no warm-up.

use crate::domain::error::SigscanError;
use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

pub fn validate_macd(fast: usize, slow: usize, signal: usize) -> Result<(), SigscanError> {
    require_positive("MACD fast span", fast)?;
    require_positive("MACD slow span", slow)?;
    require_positive("MACD signal span", signal)?;
    if fast >= slow {
        return Err(SigscanError::configuration(format!(
            "MACD fast span ({fast}) must be less than slow span ({slow})"
        )));
    }
    Ok(())
}

pub fn calculate_macd(
    bars: &[OhlcvBar],
    fast: usize,
    slow: usize,
    signal_span: usize,
) -> Result<IndicatorSeries, SigscanError> {
    validate_macd(fast, slow, signal_span)?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();

    let ema_fast = ema_values(&closes, fast);
    let ema_slow = ema_values(&closes, slow);
    let macd_line: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema_values(&macd_line, signal_span);

    let values = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(&line, &signal)| {
            Some(IndicatorValue::Macd {
                line,
                signal,
                histogram: line - signal,
            })
        })
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Macd {
            fast,
            slow,
            signal: signal_span,
        },
        &dates,
        values,
    ))
}

pub fn calculate_macd_default(bars: &[OhlcvBar]) -> Result<IndicatorSeries, SigscanError> {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
