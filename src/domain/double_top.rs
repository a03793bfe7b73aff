//! Double-top / double-bottom detection.
//!
//! An index i anchors a double top when:
//! 1. `High[i]` is within `tolerance` (fractional, relative to `High[i]`) of
//!    the centred rolling maximum of highs over `window` bars,
//! 2. some `j` in `[i + min_separation, i + window)` has `High[j]` within the
//!    same tolerance of `High[i]`,
//! 3. and the lowest low in `[i, j)` sits more than `pullback_pct` below the
//!    lowest low of the `pullback_lookback` bars before i.
//!
//! The first qualifying `j` is accepted. A `j` that matches the tolerance but
//! fails the pullback test does not stop the scan. Double bottoms mirror the
//! rule on lows, with the pullback measured on highs.
//!
//! Indices closer than `window` bars to either end are undefined. The forward
//! scan keeps a running extremum of the pullback range, so each anchor costs
//! at most `window` steps.

use crate::domain::error::SigscanError;
use crate::domain::indicator::extrema::{centered_rolling_max, centered_rolling_min};
use crate::domain::ohlcv::OhlcvBar;
use serde::Serialize;

pub const DEFAULT_WINDOW: usize = 20;
pub const DEFAULT_TOLERANCE: f64 = 0.02;
pub const DEFAULT_MIN_SEPARATION: usize = 5;
pub const DEFAULT_PULLBACK_LOOKBACK: usize = 5;
pub const DEFAULT_PULLBACK_PCT: f64 = 0.02;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DoubleTopParams {
    pub window: usize,
    pub tolerance: f64,
    pub min_separation: usize,
    pub pullback_lookback: usize,
    pub pullback_pct: f64,
}

impl Default for DoubleTopParams {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            tolerance: DEFAULT_TOLERANCE,
            min_separation: DEFAULT_MIN_SEPARATION,
            pullback_lookback: DEFAULT_PULLBACK_LOOKBACK,
            pullback_pct: DEFAULT_PULLBACK_PCT,
        }
    }
}

impl DoubleTopParams {
    pub fn new(window: usize, tolerance: f64) -> Self {
        Self {
            window,
            tolerance,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), SigscanError> {
        if self.window < 2 {
            return Err(SigscanError::configuration(format!(
                "double top window must be at least 2, got {}",
                self.window
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SigscanError::configuration(format!(
                "double top tolerance must be a non-negative number, got {}",
                self.tolerance
            )));
        }
        if self.min_separation == 0 || self.min_separation >= self.window {
            return Err(SigscanError::configuration(format!(
                "double top separation must be between 1 and {} (window - 1), got {}",
                self.window - 1,
                self.min_separation
            )));
        }
        if self.pullback_lookback == 0 || self.pullback_lookback > self.window {
            return Err(SigscanError::configuration(format!(
                "double top pullback lookback must be between 1 and {}, got {}",
                self.window, self.pullback_lookback
            )));
        }
        if !(0.0..1.0).contains(&self.pullback_pct) {
            return Err(SigscanError::configuration(format!(
                "double top pullback must be in [0, 1), got {}",
                self.pullback_pct
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Peak {
    Top,
    Bottom,
}

impl Peak {
    /// Whether `candidate` improves on `current` as the pullback extremum.
    fn deeper(self, candidate: f64, current: f64) -> bool {
        match self {
            Peak::Top => candidate < current,
            Peak::Bottom => candidate > current,
        }
    }

    fn pullback_confirmed(self, extreme: f64, reference: f64, pct: f64) -> bool {
        match self {
            Peak::Top => extreme < reference * (1.0 - pct),
            Peak::Bottom => extreme > reference * (1.0 + pct),
        }
    }
}

/// `peaks` is the series the pattern is matched on (highs for a top), `pulls`
/// the opposite side used to confirm the pullback (lows for a top).
fn detect(peaks: &[f64], pulls: &[f64], params: &DoubleTopParams, kind: Peak) -> Vec<Option<bool>> {
    let n = peaks.len();
    let w = params.window;
    let local = match kind {
        Peak::Top => centered_rolling_max(peaks, w),
        Peak::Bottom => centered_rolling_min(peaks, w),
    };

    let extreme_of = |slice: &[f64]| -> Option<f64> {
        slice
            .iter()
            .copied()
            .reduce(|acc, v| if kind.deeper(v, acc) { v } else { acc })
    };

    (0..n)
        .map(|i| {
            if i < w || i + w >= n {
                return None;
            }
            let anchor = peaks[i];
            let band = params.tolerance * anchor;
            let Some(local_extreme) = local[i] else {
                return Some(false);
            };
            if (anchor - local_extreme).abs() >= band {
                return Some(false);
            }

            let (Some(reference), Some(mut running)) = (
                extreme_of(&pulls[i - params.pullback_lookback..i]),
                extreme_of(&pulls[i..i + params.min_separation]),
            ) else {
                return Some(false);
            };

            for j in i + params.min_separation..i + w {
                if (peaks[j] - anchor).abs() < band
                    && kind.pullback_confirmed(running, reference, params.pullback_pct)
                {
                    return Some(true);
                }
                if kind.deeper(pulls[j], running) {
                    running = pulls[j];
                }
            }
            Some(false)
        })
        .collect()
}

pub fn detect_double_top(
    bars: &[OhlcvBar],
    params: &DoubleTopParams,
) -> Result<Vec<Option<bool>>, SigscanError> {
    params.validate()?;
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    Ok(detect(&highs, &lows, params, Peak::Top))
}

pub fn detect_double_bottom(
    bars: &[OhlcvBar],
    params: &DoubleTopParams,
) -> Result<Vec<Option<bool>>, SigscanError> {
    params.validate()?;
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    Ok(detect(&lows, &highs, params, Peak::Bottom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_hlc_bars;

    fn small_params() -> DoubleTopParams {
        DoubleTopParams {
            window: 4,
            tolerance: 0.02,
            min_separation: 2,
            pullback_lookback: 2,
            pullback_pct: 0.02,
        }
    }

    #[test]
    fn twin_peaks_with_pullback() {
        // peak 12 at index 4, second peak 12.05 two bars later, the dip to 9
        // is more than 2% below the pre-peak low of 10
        let highs = [10.0, 10.0, 10.0, 10.5, 12.0, 9.0, 12.05, 9.0, 8.0, 8.0];
        let bars = make_hlc_bars(&highs, &highs, &highs);
        let out = detect_double_top(&bars, &small_params()).unwrap();
        assert_eq!(out.len(), highs.len());
        assert_eq!(out[4], Some(true));
        assert_eq!(out[5], Some(false));
        assert!(out[..4].iter().all(Option::is_none));
        assert!(out[6..].iter().all(Option::is_none));
    }

    #[test]
    fn shallow_pullback_rejected() {
        let highs = [10.0, 10.0, 10.0, 10.5, 12.0, 9.0, 12.05, 9.0, 8.0, 8.0];
        let lows = [10.0, 10.0, 10.0, 10.5, 12.0, 9.9, 12.05, 9.0, 8.0, 8.0];
        let bars = make_hlc_bars(&highs, &lows, &highs);
        let out = detect_double_top(&bars, &small_params()).unwrap();
        assert_eq!(out[4], Some(false));
    }

    #[test]
    fn pullback_can_deepen_before_match() {
        // the first tolerance match at j=7 fails the pullback, the one at j=8
        // passes once the dip at index 7 enters the range
        let highs = [10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 11.0, 12.1, 12.0, 9.0, 9.0, 9.0, 9.0];
        let lows = [10.0, 10.0, 10.0, 10.0, 10.0, 12.0, 9.9, 9.0, 12.0, 9.0, 9.0, 9.0, 9.0];
        let bars = make_hlc_bars(&highs, &lows, &highs);
        let params = DoubleTopParams {
            window: 5,
            ..small_params()
        };
        let out = detect_double_top(&bars, &params).unwrap();
        assert_eq!(out[5], Some(true));
        assert_eq!(out[6], Some(false));
        assert_eq!(out[7], Some(false));
    }

    #[test]
    fn twin_troughs_with_rally() {
        let lows = [10.0, 10.0, 10.0, 9.5, 8.0, 11.0, 7.95, 11.0, 12.0, 12.0];
        let bars = make_hlc_bars(&lows, &lows, &lows);
        let out = detect_double_bottom(&bars, &small_params()).unwrap();
        assert_eq!(out[4], Some(true));
        assert_eq!(detect_double_top(&bars, &small_params()).unwrap()[4], Some(false));
    }

    #[test]
    fn short_series_is_undefined() {
        let highs = [10.0, 11.0, 10.0];
        let bars = make_hlc_bars(&highs, &highs, &highs);
        let out = detect_double_top(&bars, &DoubleTopParams::default()).unwrap();
        assert_eq!(out, vec![None; 3]);
    }

    #[test]
    fn invalid_params_rejected() {
        let bars = make_hlc_bars(&[1.0], &[1.0], &[1.0]);
        let cases = [
            DoubleTopParams::new(1, 0.02),
            DoubleTopParams::new(20, -0.1),
            DoubleTopParams::new(20, f64::NAN),
            DoubleTopParams::new(5, 0.02),
            DoubleTopParams {
                pullback_pct: 1.5,
                ..DoubleTopParams::default()
            },
        ];
        for params in cases {
            assert!(detect_double_top(&bars, &params).is_err(), "{params:?}");
        }
    }

    #[test]
    fn defaults_match_scanner_settings() {
        let params = DoubleTopParams::default();
        assert_eq!(params.window, 20);
        assert_eq!(params.tolerance, 0.02);
        assert!(params.validate().is_ok());
    }
}
