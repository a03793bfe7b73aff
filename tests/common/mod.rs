#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use sigscan::domain::error::SigscanError;
pub use sigscan::domain::ohlcv::OhlcvBar;
use sigscan::ports::config_port::ConfigPort;
use sigscan::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        code: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, SigscanError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(SigscanError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(code)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, SigscanError> {
        let mut codes: Vec<String> = self.data.keys().cloned().collect();
        codes.sort();
        Ok(codes)
    }
}

/// In-memory config keyed by lower-case `(section, key)`, kept in insertion
/// order like an INI file.
pub struct MockConfig {
    pub values: Vec<(String, String, String)>,
}

impl MockConfig {
    pub fn new(entries: &[(&str, &str, &str)]) -> Self {
        Self {
            values: entries
                .iter()
                .map(|(s, k, v)| (s.to_string(), k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl ConfigPort for MockConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.values
            .iter()
            .find(|(s, k, _)| s == section && k == key)
            .map(|(_, _, v)| v.clone())
    }

    fn section_keys(&self, section: &str) -> Vec<String> {
        self.values
            .iter()
            .filter(|(s, _, _)| s == section)
            .map(|(_, k, _)| k.clone())
            .collect()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Flat candle (open = high = low = close) on consecutive days from 2024-01-01.
pub fn flat_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| ohlc_bar(i as i64, c, c, c, c))
        .collect()
}

pub fn ohlc_bar(day: i64, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: date(2024, 1, 1) + Duration::days(day),
        open,
        high,
        low,
        close,
        volume: 1_000,
    }
}

/// Bars whose close oscillates around a slow uptrend, long enough for every
/// default detector.
pub fn wavy_bars(n: usize) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + 0.1 * t + 5.0 * (t / 4.0).sin();
            ohlc_bar(i as i64, close - 0.5, close + 1.0, close - 1.0, close)
        })
        .collect()
}

/// CSV body in the `date,open,high,low,close,volume` layout.
pub fn to_csv(bars: &[OhlcvBar]) -> String {
    let mut out = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        ));
    }
    out
}
