//! Crossover and threshold detection between two aligned series.
//!
//! # Semantics
//!
//! - golden cross at t: `A[t-1] <= B[t-1] && A[t] > B[t]`
//! - death cross at t: `A[t-1] >= B[t-1] && A[t] < B[t]`
//! - index 0, or an undefined input at t-1 or t, yields `false`
//!
//! Threshold breaches compare only the current bar and are used for band
//! signals, where the price leaving the band is the event.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossDirection {
    Golden,
    Death,
}

impl CrossDirection {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "golden" | "above" | "up" => Some(CrossDirection::Golden),
            "death" | "below" | "down" => Some(CrossDirection::Death),
            _ => None,
        }
    }
}

impl fmt::Display for CrossDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossDirection::Golden => write!(f, "golden"),
            CrossDirection::Death => write!(f, "death"),
        }
    }
}

fn pair_at(a: &[Option<f64>], b: &[Option<f64>], t: usize) -> Option<(f64, f64)> {
    match (a.get(t).copied().flatten(), b.get(t).copied().flatten()) {
        (Some(x), Some(y)) => Some((x, y)),
        _ => None,
    }
}

/// Crossover flags for every index of `a` (which must be aligned with `b`).
pub fn cross(a: &[Option<f64>], b: &[Option<f64>], direction: CrossDirection) -> Vec<bool> {
    debug_assert_eq!(a.len(), b.len());
    (0..a.len())
        .map(|t| {
            if t == 0 {
                return false;
            }
            let (Some((a_prev, b_prev)), Some((a_curr, b_curr))) =
                (pair_at(a, b, t - 1), pair_at(a, b, t))
            else {
                return false;
            };
            match direction {
                CrossDirection::Golden => a_prev <= b_prev && a_curr > b_curr,
                CrossDirection::Death => a_prev >= b_prev && a_curr < b_curr,
            }
        })
        .collect()
}

pub fn golden_cross(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    cross(a, b, CrossDirection::Golden)
}

pub fn death_cross(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    cross(a, b, CrossDirection::Death)
}

/// `a[t] < b[t]`, false where either side is undefined.
pub fn breach_below(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    (0..a.len())
        .map(|t| matches!(pair_at(a, b, t), Some((x, y)) if x < y))
        .collect()
}

/// `a[t] > b[t]`, false where either side is undefined.
pub fn breach_above(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<bool> {
    (0..a.len())
        .map(|t| matches!(pair_at(a, b, t), Some((x, y)) if x > y))
        .collect()
}

pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(Some).collect()
}
