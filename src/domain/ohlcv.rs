//! OHLCV bars and validated price series.

use crate::domain::error::SigscanError;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// high - max(open, close)
    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    /// min(open, close) - low
    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    fn first_non_finite_field(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
        .into_iter()
        .find(|(_, v)| !v.is_finite())
        .map(|(name, _)| name)
    }
}

/// Bar resolution used when sweeping parameters across time frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "daily" | "d" | "1d" => Some(Granularity::Daily),
            "weekly" | "w" | "1wk" => Some(Granularity::Weekly),
            "monthly" | "m" | "1mo" => Some(Granularity::Monthly),
            _ => None,
        }
    }

    fn bucket(&self, date: NaiveDate) -> (i32, u32) {
        match self {
            Granularity::Daily => (date.year(), date.ordinal()),
            Granularity::Weekly => {
                let week = date.iso_week();
                (week.year(), week.week())
            }
            Granularity::Monthly => (date.year(), date.month()),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::Weekly => write!(f, "weekly"),
            Granularity::Monthly => write!(f, "monthly"),
        }
    }
}

/// An ordered, validated bar sequence for one symbol.
///
/// Only constructible through [`PriceSeries::new`], which rejects empty input,
/// non-finite prices and dates that are not strictly increasing. Bars are never
/// reordered.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    code: String,
    bars: Vec<OhlcvBar>,
}

impl PriceSeries {
    pub fn new(code: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self, SigscanError> {
        let code = code.into();
        if bars.is_empty() {
            return Err(SigscanError::NoData { code });
        }

        for (index, bar) in bars.iter().enumerate() {
            if let Some(field) = bar.first_non_finite_field() {
                return Err(SigscanError::InvalidBar {
                    code,
                    index,
                    reason: format!("{field} is missing or not a finite number"),
                });
            }
            if index > 0 && bar.date <= bars[index - 1].date {
                return Err(SigscanError::NonMonotonic { code, index });
            }
        }

        Ok(Self { code, bars })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false for a constructed series; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// Aggregate into coarser bars. Each bucket takes the first open, the
    /// highest high, the lowest low, the last close, the summed volume and the
    /// date of its last bar.
    pub fn resample(&self, granularity: Granularity) -> PriceSeries {
        if granularity == Granularity::Daily {
            return self.clone();
        }

        let mut out: Vec<OhlcvBar> = Vec::new();
        let mut current_bucket: Option<(i32, u32)> = None;

        for bar in &self.bars {
            let bucket = granularity.bucket(bar.date);
            match out.last_mut() {
                Some(agg) if current_bucket == Some(bucket) => {
                    agg.date = bar.date;
                    agg.high = agg.high.max(bar.high);
                    agg.low = agg.low.min(bar.low);
                    agg.close = bar.close;
                    agg.volume = agg.volume.saturating_add(bar.volume);
                }
                _ => {
                    out.push(bar.clone());
                    current_bucket = Some(bucket);
                }
            }
        }

        PriceSeries {
            code: self.code.clone(),
            bars: out,
        }
    }
}
