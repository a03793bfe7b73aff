//! Rebound parameter sweep.
//!
//! A rebound fires at t when the close was above its moving average on the
//! previous bar and is at or below it now (`close[t-1] > SMA[t-1]` and
//! `close[t] <= SMA[t]`). Each candidate window is scored with the
//! forward-hit rate; the best is the strictly highest win rate among
//! candidates with at least one evaluable trigger, so ties keep the earlier
//! candidate.
//!
//! Candidates are independent and evaluated in parallel. Results are joined
//! in candidate order before selection, so the outcome does not depend on
//! scheduling.

use crate::domain::error::SigscanError;
use crate::domain::evaluator::{forward_hit_rate, EvaluationParams, WinRateStat};
use crate::domain::indicator::require_positive;
use crate::domain::indicator::sma::rolling_mean;
use crate::domain::ohlcv::{Granularity, PriceSeries};
use crate::domain::signal::Signal;
use rayon::prelude::*;
use serde::Serialize;

pub const DEFAULT_CANDIDATE_WINDOWS: [usize; 5] = [5, 10, 20, 30, 60];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReboundParams {
    pub candidate_windows: Vec<usize>,
    pub evaluation: EvaluationParams,
    pub granularities: Vec<Granularity>,
}

impl Default for ReboundParams {
    fn default() -> Self {
        Self {
            candidate_windows: DEFAULT_CANDIDATE_WINDOWS.to_vec(),
            evaluation: EvaluationParams::default(),
            granularities: vec![Granularity::Daily, Granularity::Weekly, Granularity::Monthly],
        }
    }
}

impl ReboundParams {
    pub fn validate(&self) -> Result<(), SigscanError> {
        if self.candidate_windows.is_empty() {
            return Err(SigscanError::configuration(
                "rebound sweep needs at least one candidate window",
            ));
        }
        for &window in &self.candidate_windows {
            require_positive("rebound window", window)?;
        }
        self.evaluation.validate()
    }
}

/// Rebound flags for one moving-average window. Bars where either SMA value
/// is still warming up are never flagged.
pub fn rebound_flags(closes: &[f64], window: usize) -> Result<Vec<bool>, SigscanError> {
    require_positive("rebound window", window)?;
    let sma = rolling_mean(closes, window);
    Ok((0..closes.len())
        .map(|t| {
            if t == 0 {
                return false;
            }
            match (sma[t - 1], sma[t]) {
                (Some(prev), Some(curr)) => closes[t - 1] > prev && closes[t] <= curr,
                _ => false,
            }
        })
        .collect())
}

pub fn rebound_label(window: usize) -> String {
    format!("REBOUND({window})")
}

/// Score of one candidate window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    pub window: usize,
    pub stat: WinRateStat,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum SweepOutcome {
    Best {
        window: usize,
        win_rate: f64,
        trigger_count: usize,
        win_count: usize,
    },
    NoViableCandidate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepReport {
    pub outcome: SweepOutcome,
    pub candidates: Vec<CandidateResult>,
}

fn evaluate_candidate(
    closes: &[f64],
    window: usize,
    evaluation: &EvaluationParams,
) -> Result<CandidateResult, SigscanError> {
    let signal = Signal::from_flags(rebound_label(window), rebound_flags(closes, window)?);
    let stat = forward_hit_rate(&signal, closes, evaluation)?;
    Ok(CandidateResult { window, stat })
}

/// First candidate (in input order) with the strictly highest win rate.
fn select_best(candidates: &[CandidateResult]) -> SweepOutcome {
    let mut best: Option<(&CandidateResult, f64)> = None;
    for candidate in candidates {
        let Some(rate) = candidate.stat.win_rate else {
            continue;
        };
        if best.is_none_or(|(_, best_rate)| rate > best_rate) {
            best = Some((candidate, rate));
        }
    }

    match best {
        Some((c, win_rate)) => SweepOutcome::Best {
            window: c.window,
            win_rate,
            trigger_count: c.stat.trigger_count,
            win_count: c.stat.win_count,
        },
        None => SweepOutcome::NoViableCandidate,
    }
}

pub fn sweep(closes: &[f64], params: &ReboundParams) -> Result<SweepReport, SigscanError> {
    params.validate()?;

    let candidates = params
        .candidate_windows
        .par_iter()
        .map(|&window| evaluate_candidate(closes, window, &params.evaluation))
        .collect::<Result<Vec<_>, _>>()?;

    for c in &candidates {
        log::debug!(
            "rebound window {}: {} triggers, {} wins",
            c.window,
            c.stat.trigger_count,
            c.stat.win_count
        );
    }

    Ok(SweepReport {
        outcome: select_best(&candidates),
        candidates,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GranularityReport {
    pub granularity: Granularity,
    pub bars: usize,
    #[serde(flatten)]
    pub sweep: SweepReport,
}

/// Run the sweep once per configured bar resolution.
pub fn optimize_granularities(
    series: &PriceSeries,
    params: &ReboundParams,
) -> Result<Vec<GranularityReport>, SigscanError> {
    params.validate()?;
    if params.granularities.is_empty() {
        return Err(SigscanError::configuration(
            "rebound sweep needs at least one granularity",
        ));
    }

    params
        .granularities
        .iter()
        .map(|&granularity| {
            let resampled = series.resample(granularity);
            log::info!(
                "sweeping {} rebound windows for {} on {} {} bars",
                params.candidate_windows.len(),
                series.code(),
                resampled.len(),
                granularity
            );
            let sweep = sweep(&resampled.closes(), params)?;
            Ok(GranularityReport {
                granularity,
                bars: resampled.len(),
                sweep,
            })
        })
        .collect()
}
