//! Single-symbol analysis: run the enabled detectors, score each one, and
//! score the composite of the chosen subset.

use crate::domain::composite::combine;
use crate::domain::detector::DetectorKind;
use crate::domain::error::SigscanError;
use crate::domain::evaluator::{
    forward_hit_rate, occupancy_rate, EvaluationParams, OccupancyStat, WinRateStat,
};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::signal::Signal;
use chrono::NaiveDate;
use serde::Serialize;

/// Everything one analysis run needs. Built once from configuration and
/// passed by reference; never mutated during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisConfig {
    pub detectors: Vec<DetectorKind>,
    /// Detector names (see [`DetectorKind::name`]) AND-ed into the composite.
    pub composite: Vec<String>,
    pub evaluation: EvaluationParams,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), SigscanError> {
        if self.detectors.is_empty() {
            return Err(SigscanError::configuration("no detectors enabled"));
        }
        for (i, kind) in self.detectors.iter().enumerate() {
            kind.validate()?;
            if self.detectors[..i].iter().any(|k| k.name() == kind.name()) {
                return Err(SigscanError::configuration(format!(
                    "detector {} enabled more than once",
                    kind.name()
                )));
            }
        }
        for member in &self.composite {
            if !self.detectors.iter().any(|k| k.name() == member) {
                return Err(SigscanError::configuration(format!(
                    "composite member {member} is not an enabled detector"
                )));
            }
        }
        self.evaluation.validate()
    }

    /// Bars needed before at least one enabled detector can produce a value.
    pub fn min_bars(&self) -> usize {
        self.detectors
            .iter()
            .map(DetectorKind::min_bars)
            .min()
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectorReport {
    pub name: String,
    pub label: String,
    pub occupancy: OccupancyStat,
    pub forward_hit: WinRateStat,
    pub trigger_dates: Vec<NaiveDate>,
    /// The series is shorter than this detector's `min_bars`, so its output
    /// is entirely undefined or unset.
    pub insufficient_data: bool,
    #[serde(skip)]
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub code: String,
    pub bars: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub detectors: Vec<DetectorReport>,
    pub composite: Option<DetectorReport>,
}

fn score(
    name: &str,
    signal: Signal,
    series: &PriceSeries,
    closes: &[f64],
    evaluation: &EvaluationParams,
    insufficient_data: bool,
) -> Result<DetectorReport, SigscanError> {
    let occupancy = occupancy_rate(&signal);
    let forward_hit = forward_hit_rate(&signal, closes, evaluation)?;
    let trigger_dates = signal
        .triggers()
        .into_iter()
        .map(|i| series.bars()[i].date)
        .collect();
    Ok(DetectorReport {
        name: name.to_string(),
        label: signal.label.clone(),
        occupancy,
        forward_hit,
        trigger_dates,
        insufficient_data,
        signal,
    })
}

pub fn analyze(series: &PriceSeries, config: &AnalysisConfig) -> Result<AnalysisReport, SigscanError> {
    config.validate()?;

    let minimum = config.min_bars();
    if series.len() < minimum {
        return Err(SigscanError::InsufficientData {
            code: series.code().to_string(),
            bars: series.len(),
            minimum,
        });
    }

    let closes = series.closes();
    let mut detectors = Vec::with_capacity(config.detectors.len());
    for kind in &config.detectors {
        let short = series.len() < kind.min_bars();
        if short {
            log::warn!(
                "{}: {} needs {} bars, have {}",
                series.code(),
                kind.label(),
                kind.min_bars(),
                series.len()
            );
        }
        let signal = kind.run(series)?;
        log::debug!(
            "{}: {} fired on {} of {} bars",
            series.code(),
            signal.label,
            signal.trigger_count(),
            signal.len()
        );
        detectors.push(score(
            kind.name(),
            signal,
            series,
            &closes,
            &config.evaluation,
            short,
        )?);
    }

    let members: Vec<&DetectorReport> = config
        .composite
        .iter()
        .filter_map(|name| detectors.iter().find(|d| &d.name == name))
        .collect();
    let signals: Vec<&Signal> = members.iter().map(|d| &d.signal).collect();
    let composite = match combine(&signals)? {
        Some(signal) => Some(score(
            "composite",
            signal,
            series,
            &closes,
            &config.evaluation,
            members.iter().any(|d| d.insufficient_data),
        )?),
        None => None,
    };

    let bars = series.bars();
    Ok(AnalysisReport {
        code: series.code().to_string(),
        bars: bars.len(),
        first_date: bars[0].date,
        last_date: bars[bars.len() - 1].date,
        detectors,
        composite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::crossover::CrossDirection;
    use crate::domain::detector::{SmaParams, ZigzagParams};
    use crate::domain::indicator::test_support::make_bars;

    fn sma_cross() -> DetectorKind {
        DetectorKind::SmaCross {
            params: SmaParams { short: 1, long: 2 },
            direction: CrossDirection::Golden,
        }
    }

    fn config(detectors: Vec<DetectorKind>, composite: &[&str]) -> AnalysisConfig {
        AnalysisConfig {
            detectors,
            composite: composite.iter().map(|s| s.to_string()).collect(),
            evaluation: EvaluationParams {
                horizon: 1,
                gain_threshold: 0.03,
            },
        }
    }

    fn series(prices: &[f64]) -> PriceSeries {
        PriceSeries::new("TEST", make_bars(prices)).unwrap()
    }

    #[test]
    fn scenario_scores_both_statistics() {
        let s = series(&[10.0, 9.0, 11.0, 8.0, 12.0, 7.0]);
        let report = analyze(&s, &config(vec![sma_cross()], &[])).unwrap();
        let sma = &report.detectors[0];
        assert_eq!(sma.name, "sma");
        assert_eq!(sma.signal.triggers(), vec![2, 4]);
        assert_eq!(sma.occupancy.flagged_bars, 2);
        assert_eq!(sma.occupancy.evaluable_bars, 6);
        // t=2: next close 8 is below 11 -> loss; t=4: next close 7 -> loss
        assert_eq!(sma.forward_hit.trigger_count, 2);
        assert_eq!(sma.forward_hit.win_rate, Some(0.0));
        assert_eq!(sma.trigger_dates.len(), 2);
        assert!(report.composite.is_none());
    }

    #[test]
    fn composite_over_subset() {
        let s = series(&[10.0, 9.0, 11.0, 8.0, 12.0, 7.0, 13.0]);
        let detectors = vec![
            sma_cross(),
            DetectorKind::WBottom(ZigzagParams::default()),
            DetectorKind::BullishPin,
        ];
        let report = analyze(&s, &config(detectors, &["sma", "w_bottom"])).unwrap();
        let composite = report.composite.unwrap();
        assert_eq!(composite.label, "SMA(1,2) golden & W_BOTTOM(5)");
        // W-bottom is undefined on the first and last two bars
        assert_eq!(composite.signal.values[0], None);
        assert_eq!(composite.signal.values[6], None);
        // both fire at 2 and 4
        assert_eq!(composite.signal.triggers(), vec![2, 4]);
    }

    #[test]
    fn single_member_composite_passes_through() {
        let s = series(&[10.0, 9.0, 11.0, 8.0, 12.0, 7.0]);
        let report = analyze(&s, &config(vec![sma_cross()], &["sma"])).unwrap();
        let composite = report.composite.unwrap();
        assert_eq!(composite.signal, report.detectors[0].signal);
        assert_eq!(composite.name, "composite");
    }

    #[test]
    fn unknown_composite_member_rejected() {
        let s = series(&[1.0, 2.0, 3.0]);
        let err = analyze(&s, &config(vec![sma_cross()], &["kdj"])).unwrap_err();
        assert!(matches!(err, SigscanError::Configuration { ref reason } if reason.contains("kdj")));
    }

    #[test]
    fn duplicate_detector_rejected() {
        let s = series(&[1.0, 2.0, 3.0]);
        let err = analyze(&s, &config(vec![sma_cross(), sma_cross()], &[])).unwrap_err();
        assert!(matches!(err, SigscanError::Configuration { .. }));
    }

    #[test]
    fn too_few_bars_for_every_detector() {
        let s = series(&[1.0, 2.0]);
        let detectors = vec![sma_cross(), DetectorKind::WBottom(ZigzagParams::default())];
        let err = analyze(&s, &config(detectors, &[])).unwrap_err();
        assert!(matches!(
            err,
            SigscanError::InsufficientData {
                bars: 2,
                minimum: 3,
                ..
            }
        ));
    }

    #[test]
    fn short_detector_reported_alongside_computable_ones() {
        let s = series(&[10.0, 9.0, 11.0, 8.0]);
        let detectors = vec![sma_cross(), DetectorKind::WBottom(ZigzagParams::default())];
        let report = analyze(&s, &config(detectors, &["sma", "w_bottom"])).unwrap();

        let sma = &report.detectors[0];
        assert!(!sma.insufficient_data);
        assert_eq!(sma.signal.triggers(), vec![2]);

        let w = &report.detectors[1];
        assert!(w.insufficient_data);
        assert_eq!(w.signal.evaluable_count(), 0);
        assert_eq!(w.forward_hit.win_rate, None);

        assert!(report.composite.unwrap().insufficient_data);
    }

    #[test]
    fn partial_warmup_is_not_an_error() {
        let s = series(&[1.0, 2.0, 3.0]);
        assert!(analyze(&s, &config(vec![sma_cross()], &[])).is_ok());
    }

    #[test]
    fn no_detectors_rejected() {
        let s = series(&[1.0]);
        assert!(analyze(&s, &config(vec![], &[])).is_err());
    }
}
