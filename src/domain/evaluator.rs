//! Signal statistics.
//!
//! Two separate measures are reported for every signal:
//! - **occupancy rate**: the share of evaluable bars on which the signal is
//!   set. Descriptive only, it says nothing about what happened next.
//! - **forward-hit rate**: for each trigger at t with `t + horizon < n`, a win
//!   when the highest close over `t+1 ..= t+horizon` exceeds
//!   `close[t] * (1 + gain_threshold)`, a loss otherwise. Triggers too close
//!   to the end are not evaluable and count as neither.
//!
//! A rate with nothing to divide by is `None`, never zero.

use crate::domain::error::SigscanError;
use crate::domain::indicator::extrema::rolling_max;
use crate::domain::signal::Signal;
use serde::Serialize;

pub const DEFAULT_HORIZON: usize = 5;
pub const DEFAULT_GAIN_THRESHOLD: f64 = 0.03;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationParams {
    pub horizon: usize,
    pub gain_threshold: f64,
}

impl Default for EvaluationParams {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            gain_threshold: DEFAULT_GAIN_THRESHOLD,
        }
    }
}

impl EvaluationParams {
    pub fn validate(&self) -> Result<(), SigscanError> {
        if self.horizon == 0 {
            return Err(SigscanError::configuration("evaluation horizon must be positive"));
        }
        if !self.gain_threshold.is_finite() || self.gain_threshold <= -1.0 {
            return Err(SigscanError::configuration(format!(
                "gain threshold must be a number above -1, got {}",
                self.gain_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    NotEvaluable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyStat {
    pub label: String,
    pub evaluable_bars: usize,
    pub flagged_bars: usize,
    pub rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinRateStat {
    pub label: String,
    /// Triggers whose horizon fits inside the series.
    pub trigger_count: usize,
    pub win_count: usize,
    /// Triggers inside the last `horizon` bars.
    pub not_evaluable: usize,
    pub win_rate: Option<f64>,
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

pub fn occupancy_rate(signal: &Signal) -> OccupancyStat {
    let evaluable_bars = signal.evaluable_count();
    let flagged_bars = signal.trigger_count();
    OccupancyStat {
        label: signal.label.clone(),
        evaluable_bars,
        flagged_bars,
        rate: ratio(flagged_bars, evaluable_bars),
    }
}

/// Outcome of every trigger, as `(bar index, outcome)` in bar order.
pub fn classify_outcomes(
    signal: &Signal,
    closes: &[f64],
    params: &EvaluationParams,
) -> Result<Vec<(usize, Outcome)>, SigscanError> {
    params.validate()?;
    if signal.len() != closes.len() {
        return Err(SigscanError::configuration(format!(
            "signal {} has {} bars but the price series has {}",
            signal.label,
            signal.len(),
            closes.len()
        )));
    }

    let h = params.horizon;
    // ahead[t + h] is the highest close over t+1 ..= t+h
    let ahead = rolling_max(closes, h);
    let outcomes = signal
        .triggers()
        .into_iter()
        .map(|t| {
            let outcome = match ahead.get(t + h).copied().flatten() {
                Some(best) if best > closes[t] * (1.0 + params.gain_threshold) => Outcome::Win,
                Some(_) => Outcome::Loss,
                None => Outcome::NotEvaluable,
            };
            (t, outcome)
        })
        .collect();
    Ok(outcomes)
}

pub fn forward_hit_rate(
    signal: &Signal,
    closes: &[f64],
    params: &EvaluationParams,
) -> Result<WinRateStat, SigscanError> {
    let outcomes = classify_outcomes(signal, closes, params)?;
    let count = |wanted: Outcome| outcomes.iter().filter(|(_, o)| *o == wanted).count();
    let win_count = count(Outcome::Win);
    let not_evaluable = count(Outcome::NotEvaluable);
    let trigger_count = outcomes.len() - not_evaluable;

    Ok(WinRateStat {
        label: signal.label.clone(),
        trigger_count,
        win_count,
        not_evaluable,
        win_rate: ratio(win_count, trigger_count),
    })
}
