//! The closed set of signal detectors and their typed parameters.
//!
//! Every detector turns a [`PriceSeries`] into a [`Signal`] of the same
//! length. Parameters are validated before any computation.

use crate::domain::crossover::{breach_above, breach_below, cross, defined, CrossDirection};
use crate::domain::double_top::{detect_double_bottom, detect_double_top, DoubleTopParams};
use crate::domain::error::SigscanError;
use crate::domain::indicator::{
    bollinger, calculate_bollinger, calculate_kdj, calculate_macd, kdj, macd, require_positive,
    sma::rolling_mean, IndicatorField, IndicatorType,
};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::optimizer::{rebound_flags, rebound_label};
use crate::domain::pin_bar::{bearish_pins, bullish_pins};
use crate::domain::signal::Signal;
use crate::domain::zigzag::{self, detect_m_head, detect_w_bottom};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SmaParams {
    pub short: usize,
    pub long: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { short: 5, long: 20 }
    }
}

impl SmaParams {
    pub fn validate(&self) -> Result<(), SigscanError> {
        require_positive("SMA short window", self.short)?;
        require_positive("SMA long window", self.long)?;
        if self.short >= self.long {
            return Err(SigscanError::configuration(format!(
                "SMA short window ({}) must be less than long window ({})",
                self.short, self.long
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KdjParams {
    pub n: usize,
    pub k_smooth: usize,
    pub d_smooth: usize,
}

impl Default for KdjParams {
    fn default() -> Self {
        Self {
            n: kdj::DEFAULT_N,
            k_smooth: kdj::DEFAULT_K_SMOOTH,
            d_smooth: kdj::DEFAULT_D_SMOOTH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BollingerParams {
    pub period: usize,
    pub k: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            period: bollinger::DEFAULT_PERIOD,
            k: bollinger::DEFAULT_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZigzagParams {
    pub window: usize,
}

impl Default for ZigzagParams {
    fn default() -> Self {
        Self {
            window: zigzag::DEFAULT_WINDOW,
        }
    }
}

/// Which Bollinger band the close must leave for the signal to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BandSide {
    Lower,
    Upper,
}

impl BandSide {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "lower" | "below" => Some(BandSide::Lower),
            "upper" | "above" => Some(BandSide::Upper),
            _ => None,
        }
    }
}

impl fmt::Display for BandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BandSide::Lower => write!(f, "lower"),
            BandSide::Upper => write!(f, "upper"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DetectorKind {
    /// Short SMA crossing the long SMA.
    SmaCross {
        params: SmaParams,
        direction: CrossDirection,
    },
    /// MACD line crossing its signal line.
    MacdCross {
        params: MacdParams,
        direction: CrossDirection,
    },
    /// K crossing D.
    KdjCross {
        params: KdjParams,
        direction: CrossDirection,
    },
    /// Close outside one of the bands on the current bar.
    BollingerBreach {
        params: BollingerParams,
        side: BandSide,
    },
    MHead(ZigzagParams),
    WBottom(ZigzagParams),
    DoubleTop(DoubleTopParams),
    DoubleBottom(DoubleTopParams),
    BullishPin,
    BearishPin,
    /// Close dipping to or below its own moving average.
    Rebound { window: usize },
}

/// Configuration names of every detector, in report order.
pub const DETECTOR_NAMES: [&str; 11] = [
    "sma",
    "macd",
    "kdj",
    "bollinger",
    "m_head",
    "w_bottom",
    "double_top",
    "double_bottom",
    "bullish_pin",
    "bearish_pin",
    "rebound",
];

impl DetectorKind {
    /// Name used to enable the detector and to pick composite members.
    pub fn name(&self) -> &'static str {
        match self {
            DetectorKind::SmaCross { .. } => "sma",
            DetectorKind::MacdCross { .. } => "macd",
            DetectorKind::KdjCross { .. } => "kdj",
            DetectorKind::BollingerBreach { .. } => "bollinger",
            DetectorKind::MHead(_) => "m_head",
            DetectorKind::WBottom(_) => "w_bottom",
            DetectorKind::DoubleTop(_) => "double_top",
            DetectorKind::DoubleBottom(_) => "double_bottom",
            DetectorKind::BullishPin => "bullish_pin",
            DetectorKind::BearishPin => "bearish_pin",
            DetectorKind::Rebound { .. } => "rebound",
        }
    }

    /// Human-readable label carrying the parameters, e.g. `SMA(5,20) golden`.
    pub fn label(&self) -> String {
        match self {
            DetectorKind::SmaCross { params, direction } => {
                format!("SMA({},{}) {}", params.short, params.long, direction)
            }
            DetectorKind::MacdCross { params, direction } => {
                let ty = IndicatorType::Macd {
                    fast: params.fast,
                    slow: params.slow,
                    signal: params.signal,
                };
                format!("{ty} {direction}")
            }
            DetectorKind::KdjCross { params, direction } => {
                let ty = IndicatorType::Kdj {
                    n: params.n,
                    k_smooth: params.k_smooth,
                    d_smooth: params.d_smooth,
                };
                format!("{ty} {direction}")
            }
            DetectorKind::BollingerBreach { params, side } => {
                let ty = IndicatorType::Bollinger {
                    period: params.period,
                    stddev_mult_x100: (params.k * 100.0).round() as u32,
                };
                format!("{ty} {side}")
            }
            DetectorKind::MHead(p) => format!("M_HEAD({})", p.window),
            DetectorKind::WBottom(p) => format!("W_BOTTOM({})", p.window),
            DetectorKind::DoubleTop(p) => format!("DOUBLE_TOP({},{})", p.window, p.tolerance),
            DetectorKind::DoubleBottom(p) => {
                format!("DOUBLE_BOTTOM({},{})", p.window, p.tolerance)
            }
            DetectorKind::BullishPin => "BULLISH_PIN".to_string(),
            DetectorKind::BearishPin => "BEARISH_PIN".to_string(),
            DetectorKind::Rebound { window } => rebound_label(*window),
        }
    }

    pub fn validate(&self) -> Result<(), SigscanError> {
        match self {
            DetectorKind::SmaCross { params, .. } => params.validate(),
            DetectorKind::MacdCross { params, .. } => {
                macd::validate_macd(params.fast, params.slow, params.signal)
            }
            DetectorKind::KdjCross { params, .. } => {
                kdj::validate_kdj(params.n, params.k_smooth, params.d_smooth)
            }
            DetectorKind::BollingerBreach { params, .. } => {
                require_positive("Bollinger period", params.period)?;
                if !params.k.is_finite() || params.k < 0.0 {
                    return Err(SigscanError::configuration(format!(
                        "Bollinger k must be a non-negative number, got {}",
                        params.k
                    )));
                }
                Ok(())
            }
            DetectorKind::MHead(p) | DetectorKind::WBottom(p) => zigzag::validate_window(p.window),
            DetectorKind::DoubleTop(p) | DetectorKind::DoubleBottom(p) => p.validate(),
            DetectorKind::BullishPin | DetectorKind::BearishPin => Ok(()),
            DetectorKind::Rebound { window } => require_positive("rebound window", *window),
        }
    }

    /// Fewest bars for which the detector can produce an evaluable `true`.
    pub fn min_bars(&self) -> usize {
        match self {
            DetectorKind::SmaCross { params, .. } => params.long + 1,
            DetectorKind::MacdCross { .. } => 2,
            DetectorKind::KdjCross { params, .. } => params.n + 1,
            DetectorKind::BollingerBreach { params, .. } => params.period,
            DetectorKind::MHead(p) | DetectorKind::WBottom(p) => p.window,
            DetectorKind::DoubleTop(p) | DetectorKind::DoubleBottom(p) => 2 * p.window + 1,
            DetectorKind::BullishPin | DetectorKind::BearishPin => 1,
            DetectorKind::Rebound { window } => window + 1,
        }
    }

    pub fn run(&self, series: &PriceSeries) -> Result<Signal, SigscanError> {
        self.validate()?;
        let bars = series.bars();
        let closes = series.closes();
        let label = self.label();

        let signal = match self {
            DetectorKind::SmaCross { params, direction } => {
                let short = rolling_mean(&closes, params.short);
                let long = rolling_mean(&closes, params.long);
                Signal::from_flags(label, cross(&short, &long, *direction))
            }
            DetectorKind::MacdCross { params, direction } => {
                let series = calculate_macd(bars, params.fast, params.slow, params.signal)?;
                let line = series.field(IndicatorField::MacdLine);
                let signal = series.field(IndicatorField::MacdSignal);
                Signal::from_flags(label, cross(&line, &signal, *direction))
            }
            DetectorKind::KdjCross { params, direction } => {
                let series = calculate_kdj(bars, params.n, params.k_smooth, params.d_smooth)?;
                let k = series.field(IndicatorField::KdjK);
                let d = series.field(IndicatorField::KdjD);
                Signal::from_flags(label, cross(&k, &d, *direction))
            }
            DetectorKind::BollingerBreach { params, side } => {
                let bands = calculate_bollinger(bars, params.period, params.k)?;
                let close = defined(&closes);
                let flags = match side {
                    BandSide::Lower => {
                        breach_below(&close, &bands.field(IndicatorField::BollingerLower))
                    }
                    BandSide::Upper => {
                        breach_above(&close, &bands.field(IndicatorField::BollingerUpper))
                    }
                };
                Signal::from_flags(label, flags)
            }
            DetectorKind::MHead(p) => Signal::new(label, detect_m_head(&closes, p.window)?),
            DetectorKind::WBottom(p) => Signal::new(label, detect_w_bottom(&closes, p.window)?),
            DetectorKind::DoubleTop(p) => Signal::new(label, detect_double_top(bars, p)?),
            DetectorKind::DoubleBottom(p) => Signal::new(label, detect_double_bottom(bars, p)?),
            DetectorKind::BullishPin => Signal::from_flags(label, bullish_pins(bars)),
            DetectorKind::BearishPin => Signal::from_flags(label, bearish_pins(bars)),
            DetectorKind::Rebound { window } => {
                Signal::from_flags(label, rebound_flags(&closes, *window)?)
            }
        };
        Ok(signal)
    }
}
