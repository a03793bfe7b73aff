//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is population standard deviation (divides by N, not N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) bars are undefined.

use crate::domain::error::SigscanError;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::indicator::stddev::rolling_std;
use crate::domain::indicator::{require_positive, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub const DEFAULT_PERIOD: usize = 20;
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

pub fn calculate_bollinger(
    bars: &[OhlcvBar],
    period: usize,
    multiplier: f64,
) -> Result<IndicatorSeries, SigscanError> {
    require_positive("Bollinger period", period)?;
    if !multiplier.is_finite() || multiplier < 0.0 {
        return Err(SigscanError::configuration(
            "Bollinger multiplier must be a non-negative number",
        ));
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let dates: Vec<_> = bars.iter().map(|b| b.date).collect();
    let middle = rolling_mean(&closes, period);
    let stddev = rolling_std(&closes, period);

    let values = middle
        .into_iter()
        .zip(stddev)
        .map(|(mid, sd)| match (mid, sd) {
            (Some(middle), Some(sd)) => Some(IndicatorValue::Bollinger {
                upper: middle + multiplier * sd,
                middle,
                lower: middle - multiplier * sd,
            }),
            _ => None,
        })
        .collect();

    Ok(IndicatorSeries::from_values(
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (multiplier * 100.0).round() as u32,
        },
        &dates,
        values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::make_bars;
    use crate::domain::indicator::IndicatorField;

    #[test]
    fn bollinger_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let series = calculate_bollinger(&bars, 3, 2.0).unwrap();
        assert_eq!(series.warmup(), 2);
        assert_eq!(series.len(), 5);
    }

    #[test]
    fn bollinger_constant_values() {
        let bars = make_bars(&[100.0; 5]);
        let series = calculate_bollinger(&bars, 3, 2.0).unwrap();
        assert_eq!(series.field(IndicatorField::BollingerUpper)[2], Some(100.0));
        assert_eq!(series.field(IndicatorField::BollingerMiddle)[2], Some(100.0));
        assert_eq!(series.field(IndicatorField::BollingerLower)[2], Some(100.0));
    }

    #[test]
    fn bollinger_basic_calculation() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 3, 2.0).unwrap();

        let expected_middle = 20.0;
        let stddev = (200.0_f64 / 3.0).sqrt();
        let upper = series.field(IndicatorField::BollingerUpper)[2].unwrap();
        let middle = series.field(IndicatorField::BollingerMiddle)[2].unwrap();
        let lower = series.field(IndicatorField::BollingerLower)[2].unwrap();

        assert!((middle - expected_middle).abs() < 1e-10);
        assert!((upper - (expected_middle + 2.0 * stddev)).abs() < 1e-10);
        assert!((lower - (expected_middle - 2.0 * stddev)).abs() < 1e-10);
        assert!(((upper - middle) - (middle - lower)).abs() < 1e-10);
    }

    #[test]
    fn bollinger_indicator_type() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_bollinger(&bars, 20, 2.0).unwrap();
        assert_eq!(
            series.indicator_type,
            IndicatorType::Bollinger {
                period: 20,
                stddev_mult_x100: 200
            }
        );
        assert_eq!(series.warmup(), 3);
    }

    #[test]
    fn bollinger_rejects_bad_parameters() {
        let bars = make_bars(&[10.0]);
        assert!(calculate_bollinger(&bars, 0, 2.0).is_err());
        assert!(calculate_bollinger(&bars, 20, -1.0).is_err());
        assert!(calculate_bollinger(&bars, 20, f64::NAN).is_err());
    }
}
