//! Logical AND across a chosen set of signals.
//!
//! The result is undefined at any bar where an input is undefined, even when
//! another input is already false there.

use crate::domain::error::SigscanError;
use crate::domain::signal::Signal;

/// Label given to a composite of several members, e.g. `SMA(5,20) & KDJ(9,2,2)`.
pub fn composite_label(signals: &[&Signal]) -> String {
    signals
        .iter()
        .map(|s| s.label.as_str())
        .collect::<Vec<_>>()
        .join(" & ")
}

/// AND the inputs bar by bar.
///
/// Returns `Ok(None)` for an empty input and the single input unchanged when
/// there is exactly one. Inputs of different lengths are a configuration
/// error.
pub fn combine(signals: &[&Signal]) -> Result<Option<Signal>, SigscanError> {
    let Some((first, rest)) = signals.split_first() else {
        return Ok(None);
    };
    if rest.is_empty() {
        return Ok(Some((*first).clone()));
    }

    let n = first.len();
    if let Some(bad) = rest.iter().find(|s| s.len() != n) {
        return Err(SigscanError::configuration(format!(
            "cannot combine signals of different lengths: {} has {} bars, {} has {}",
            first.label,
            n,
            bad.label,
            bad.len()
        )));
    }

    let values = (0..n)
        .map(|t| {
            signals
                .iter()
                .try_fold(true, |acc, s| s.values[t].map(|v| acc && v))
        })
        .collect();
    Ok(Some(Signal::new(composite_label(signals), values)))
}
