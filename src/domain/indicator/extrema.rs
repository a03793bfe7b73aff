//! Rolling maximum/minimum using a monotonic deque.
//!
//! The deque holds indices whose values are monotonically ordered (decreasing
//! for max, increasing for min), so the front is always the extremum of the
//! current window. Each index is pushed and popped at most once, giving O(n)
//! total work regardless of window size.

use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
enum Extremum {
    Max,
    Min,
}

impl Extremum {
    /// True when `incoming` makes `existing` useless for every future window.
    fn dominates(self, incoming: f64, existing: f64) -> bool {
        match self {
            Extremum::Max => incoming >= existing,
            Extremum::Min => incoming <= existing,
        }
    }
}

fn rolling(values: &[f64], window: usize, kind: Extremum) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut deque: VecDeque<usize> = VecDeque::with_capacity(window);
    for (i, &value) in values.iter().enumerate() {
        while let Some(&back) = deque.back() {
            if kind.dominates(value, values[back]) {
                deque.pop_back();
            } else {
                break;
            }
        }
        deque.push_back(i);

        if let Some(&front) = deque.front() {
            if front + window <= i {
                deque.pop_front();
            }
        }

        if i + 1 >= window {
            out[i] = deque.front().map(|&idx| values[idx]);
        }
    }
    out
}

/// Trailing maximum over `values[i + 1 - window ..= i]`.
pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, Extremum::Max)
}

/// Trailing minimum over `values[i + 1 - window ..= i]`.
pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, Extremum::Min)
}

/// Re-label a trailing window result so it is centred on each index: the
/// value at `i` covers `[i + (window-1)/2 + 1 - window, i + (window-1)/2]`.
/// Even windows therefore reach one bar further backward than forward.
/// Windows that would run past either end are undefined.
fn centre(trailing: Vec<Option<f64>>, window: usize) -> Vec<Option<f64>> {
    let shift = window.saturating_sub(1) / 2;
    (0..trailing.len())
        .map(|i| trailing.get(i + shift).copied().flatten())
        .collect()
}

pub fn centered_rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    centre(rolling_max(values, window), window)
}

pub fn centered_rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    centre(rolling_min(values, window), window)
}
