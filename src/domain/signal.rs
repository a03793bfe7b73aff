//! Boolean signals aligned to a bar sequence.

use serde::Serialize;

/// One `Option<bool>` per bar: `Some(true)` where the detector fired,
/// `Some(false)` where it was checked and did not, `None` where it could not
/// be evaluated (warm-up, boundary, or an undefined input to a composite).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub label: String,
    pub values: Vec<Option<bool>>,
}

impl Signal {
    pub fn new(label: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self {
            label: label.into(),
            values,
        }
    }

    /// Build from per-bar flags where every bar is evaluable.
    pub fn from_flags(label: impl Into<String>, flags: Vec<bool>) -> Self {
        Self::new(label, flags.into_iter().map(Some).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_set(&self, index: usize) -> bool {
        matches!(self.values.get(index), Some(Some(true)))
    }

    /// Indices where the signal fired.
    pub fn triggers(&self) -> Vec<usize> {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| (*v == Some(true)).then_some(i))
            .collect()
    }

    pub fn trigger_count(&self) -> usize {
        self.values.iter().filter(|v| **v == Some(true)).count()
    }

    /// Number of bars with a defined value.
    pub fn evaluable_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ignore_undefined() {
        let signal = Signal::new("X", vec![None, Some(true), Some(false), Some(true), None]);
        assert_eq!(signal.trigger_count(), 2);
        assert_eq!(signal.evaluable_count(), 3);
        assert_eq!(signal.triggers(), vec![1, 3]);
        assert!(signal.is_set(1));
        assert!(!signal.is_set(0));
        assert!(!signal.is_set(99));
    }

    #[test]
    fn from_flags_all_defined() {
        let signal = Signal::from_flags("Y", vec![true, false]);
        assert_eq!(signal.values, vec![Some(true), Some(false)]);
        assert_eq!(signal.label, "Y");
    }
}
