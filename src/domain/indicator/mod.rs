//! Technical indicator implementations.
//!
//! This module provides types for representing indicator values and series:
//! - `IndicatorPoint`: A single point in an indicator time series
//! - `IndicatorValue`: Enum for different indicator output shapes
//! - `IndicatorType`: Enum for indicator identity + parameters
//! - `IndicatorSeries`: A time series of indicator values, one point per bar
//!
//! Every calculation returns exactly one point per input bar. Warm-up and
//! degenerate points carry `value: None`. Invalid parameters are rejected with
//! a configuration error; short input is never an error.

pub mod extrema;
pub mod sma;
pub mod ema;
pub mod stddev;
pub mod bollinger;
pub mod macd;
pub mod kdj;
pub mod rsi;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use kdj::calculate_kdj;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use crate::domain::error::SigscanError;
use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<IndicatorValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorValue {
    Simple(f64),
    Macd {
        line: f64,
        signal: f64,
        histogram: f64,
    },
    Kdj {
        k: f64,
        d: f64,
        j: f64,
    },
    Bollinger {
        upper: f64,
        middle: f64,
        lower: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Stddev(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Kdj {
        n: usize,
        k_smooth: usize,
        d_smooth: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

/// Which component of a (possibly multi-valued) indicator to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorField {
    Value,
    MacdLine,
    MacdSignal,
    MacdHistogram,
    KdjK,
    KdjD,
    KdjJ,
    BollingerUpper,
    BollingerMiddle,
    BollingerLower,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn from_values(
        indicator_type: IndicatorType,
        dates: &[NaiveDate],
        values: Vec<Option<IndicatorValue>>,
    ) -> Self {
        debug_assert_eq!(dates.len(), values.len());
        let values = dates
            .iter()
            .zip(values)
            .map(|(&date, value)| IndicatorPoint { date, value })
            .collect();
        Self {
            indicator_type,
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of leading points without a value.
    pub fn warmup(&self) -> usize {
        self.values
            .iter()
            .take_while(|p| p.value.is_none())
            .count()
    }

    /// Extract one component per bar. Points without a value, or whose shape
    /// does not carry `field`, yield `None`.
    pub fn field(&self, field: IndicatorField) -> Vec<Option<f64>> {
        self.values
            .iter()
            .map(|p| p.value.and_then(|v| extract_field(&v, field)))
            .collect()
    }
}

fn extract_field(value: &IndicatorValue, field: IndicatorField) -> Option<f64> {
    match (value, field) {
        (IndicatorValue::Simple(v), IndicatorField::Value) => Some(*v),
        (IndicatorValue::Macd { line, .. }, IndicatorField::MacdLine) => Some(*line),
        (IndicatorValue::Macd { signal, .. }, IndicatorField::MacdSignal) => Some(*signal),
        (IndicatorValue::Macd { histogram, .. }, IndicatorField::MacdHistogram) => {
            Some(*histogram)
        }
        (IndicatorValue::Kdj { k, .. }, IndicatorField::KdjK) => Some(*k),
        (IndicatorValue::Kdj { d, .. }, IndicatorField::KdjD) => Some(*d),
        (IndicatorValue::Kdj { j, .. }, IndicatorField::KdjJ) => Some(*j),
        (IndicatorValue::Bollinger { upper, .. }, IndicatorField::BollingerUpper) => Some(*upper),
        (IndicatorValue::Bollinger { middle, .. }, IndicatorField::BollingerMiddle) => {
            Some(*middle)
        }
        (IndicatorValue::Bollinger { lower, .. }, IndicatorField::BollingerLower) => Some(*lower),
        _ => None,
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Stddev(period) => write!(f, "STDDEV({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Kdj {
                n,
                k_smooth,
                d_smooth,
            } => write!(f, "KDJ({},{},{})", n, k_smooth, d_smooth),
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// Reject zero-length windows, spans and periods.
pub(crate) fn require_positive(name: &str, value: usize) -> Result<(), SigscanError> {
    if value == 0 {
        return Err(SigscanError::configuration(format!(
            "{name} must be positive"
        )));
    }
    Ok(())
}
