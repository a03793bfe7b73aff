//! Pin-bar (hammer / shooting star) candle classification.
//!
//! A pin bar has a body under `BODY_RATIO` of the bar's range and one shadow
//! longer than `SHADOW_RATIO` of it. A bar with zero range is never a pin bar.
//! Momentum gating (RSI thresholds) is left to the caller.

use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

pub const BODY_RATIO: f64 = 0.2;
pub const SHADOW_RATIO: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinBar {
    Bullish,
    Bearish,
}

/// Classify one bar. With the default ratios a bar cannot qualify on both
/// sides, but if it ever did the bullish reading wins.
pub fn classify(bar: &OhlcvBar) -> Option<PinBar> {
    let range = bar.range();
    if range <= 0.0 || !range.is_finite() {
        return None;
    }
    if bar.body() / range >= BODY_RATIO {
        return None;
    }
    if bar.lower_shadow() / range > SHADOW_RATIO {
        Some(PinBar::Bullish)
    } else if bar.upper_shadow() / range > SHADOW_RATIO {
        Some(PinBar::Bearish)
    } else {
        None
    }
}

fn flags(bars: &[OhlcvBar], wanted: PinBar) -> Vec<bool> {
    bars.iter().map(|b| classify(b) == Some(wanted)).collect()
}

pub fn bullish_pins(bars: &[OhlcvBar]) -> Vec<bool> {
    flags(bars, PinBar::Bullish)
}

pub fn bearish_pins(bars: &[OhlcvBar]) -> Vec<bool> {
    flags(bars, PinBar::Bearish)
}
