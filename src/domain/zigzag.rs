//! M-head / W-bottom detection with a fixed-width zigzag test on closes.
//!
//! With the default window of 5, index i is a W-bottom when
//! `C[i-2] > C[i-1] < C[i] > C[i+1] < C[i+2]` and an M-head when
//! `C[i-2] < C[i-1] > C[i] < C[i+1] > C[i+2]`. Wider odd windows extend the
//! same alternation outward; the centre bar is always the middle peak of a W
//! and the middle trough of an M. Overlapping matches are all reported and a single
//! noisy bar can make or break a match; callers that want pivots should not
//! use this detector.
//!
//! The first and last `window / 2` indices cannot hold a full window and are
//! undefined.

use crate::domain::error::SigscanError;

pub const DEFAULT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZigzagShape {
    MHead,
    WBottom,
}

pub fn validate_window(window: usize) -> Result<(), SigscanError> {
    if window < 5 || window % 2 == 0 {
        return Err(SigscanError::configuration(format!(
            "zigzag window must be an odd number of at least 5, got {window}"
        )));
    }
    Ok(())
}

/// Whether the strict alternation holds across `closes[start..start + window]`.
/// For a W-bottom the step into the centre rises; for an M-head it falls.
fn alternates(closes: &[f64], start: usize, window: usize, shape: ZigzagShape) -> bool {
    let half = window / 2;
    (0..window - 1).all(|step| {
        let (left, right) = (closes[start + step], closes[start + step + 1]);
        let even_phase = (step + half) % 2 == 0;
        let falling = match shape {
            ZigzagShape::WBottom => even_phase,
            ZigzagShape::MHead => !even_phase,
        };
        if falling { left > right } else { left < right }
    })
}

pub fn detect(
    closes: &[f64],
    window: usize,
    shape: ZigzagShape,
) -> Result<Vec<Option<bool>>, SigscanError> {
    validate_window(window)?;

    let half = window / 2;
    let n = closes.len();
    Ok((0..n)
        .map(|i| {
            if i < half || i + half >= n {
                None
            } else {
                Some(alternates(closes, i - half, window, shape))
            }
        })
        .collect())
}

pub fn detect_w_bottom(closes: &[f64], window: usize) -> Result<Vec<Option<bool>>, SigscanError> {
    detect(closes, window, ZigzagShape::WBottom)
}

pub fn detect_m_head(closes: &[f64], window: usize) -> Result<Vec<Option<bool>>, SigscanError> {
    detect(closes, window, ZigzagShape::MHead)
}
