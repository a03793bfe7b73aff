//! Multi-symbol alert scan.
//!
//! For every symbol in the universe the scanner computes RSI, pin bars and
//! double tops/bottoms, then emits alerts:
//! - a bullish pin only while RSI is below `oversold`; failing that, a
//!   bearish pin only while RSI is above `overbought`,
//! - a double top at its anchor bar; failing that, a double bottom.
//!
//! Symbols are independent and scanned in parallel. A symbol whose data
//! cannot be fetched or fails validation is logged and left out of the
//! result.

use crate::domain::double_top::{detect_double_bottom, detect_double_top, DoubleTopParams};
use crate::domain::error::SigscanError;
use crate::domain::indicator::{require_positive, rsi};
use crate::domain::ohlcv::PriceSeries;
use crate::domain::pin_bar::{classify, PinBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// Group assigned to symbols that belong to no configured market.
pub const DEFAULT_MARKET: &str = "OTHER";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanConfig {
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
    pub double_top: DoubleTopParams,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rsi_period: rsi::DEFAULT_PERIOD,
            oversold: 30.0,
            overbought: 70.0,
            double_top: DoubleTopParams::default(),
            start_date: None,
            end_date: None,
        }
    }
}

impl ScanConfig {
    pub fn validate(&self) -> Result<(), SigscanError> {
        require_positive("RSI period", self.rsi_period)?;
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.oversold) || !in_range(self.overbought) || self.oversold >= self.overbought
        {
            return Err(SigscanError::configuration(format!(
                "RSI thresholds must satisfy 0 <= oversold ({}) < overbought ({}) <= 100",
                self.oversold, self.overbought
            )));
        }
        self.double_top.validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    BullishPin,
    BearishPin,
    DoubleTop,
    DoubleBottom,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::BullishPin => write!(f, "Bullish Pin Bar"),
            AlertKind::BearishPin => write!(f, "Bearish Pin Bar"),
            AlertKind::DoubleTop => write!(f, "Double Top"),
            AlertKind::DoubleBottom => write!(f, "Double Bottom"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub date: NaiveDate,
    pub kind: AlertKind,
    /// Close of the alerting bar.
    pub price: f64,
    pub rsi: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolAlerts {
    pub code: String,
    pub market: String,
    pub alerts: Vec<Alert>,
}

/// Named symbol groups. Group order is preserved and decides which market a
/// symbol listed in several groups is reported under.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Universe {
    groups: Vec<(String, Vec<String>)>,
}

impl Universe {
    pub fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[(String, Vec<String>)] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|(_, codes)| codes.is_empty())
    }

    pub fn market_of(&self, code: &str) -> &str {
        self.groups
            .iter()
            .find(|(_, codes)| codes.iter().any(|c| c == code))
            .map(|(market, _)| market.as_str())
            .unwrap_or(DEFAULT_MARKET)
    }

    /// `(market, code)` pairs to scan, each code once, optionally limited to
    /// one market.
    fn targets(&self, market: Option<&str>) -> Result<Vec<(String, String)>, SigscanError> {
        if let Some(wanted) = market {
            if !self.groups.iter().any(|(m, _)| m.eq_ignore_ascii_case(wanted)) {
                return Err(SigscanError::configuration(format!(
                    "unknown market {wanted}"
                )));
            }
        }

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for (group, codes) in &self.groups {
            for code in codes {
                if !seen.insert(code.as_str()) {
                    continue;
                }
                let tagged = self.market_of(code);
                if market.is_none_or(|m| tagged.eq_ignore_ascii_case(m)) {
                    out.push((tagged.to_string(), code.clone()));
                }
            }
            log::debug!("market {group}: {} symbols", codes.len());
        }
        Ok(out)
    }
}

/// Alerts for one symbol, in bar order. At most one pin alert and one
/// pattern alert per bar.
pub fn scan_symbol(series: &PriceSeries, config: &ScanConfig) -> Result<Vec<Alert>, SigscanError> {
    config.validate()?;
    let bars = series.bars();
    let rsi = rsi::rsi_values(&series.closes(), config.rsi_period);
    let tops = detect_double_top(bars, &config.double_top)?;
    let bottoms = detect_double_bottom(bars, &config.double_top)?;

    let mut alerts = Vec::new();
    for (i, bar) in bars.iter().enumerate() {
        let alert = |kind| Alert {
            date: bar.date,
            kind,
            price: bar.close,
            rsi: rsi[i],
        };

        match (classify(bar), rsi[i]) {
            (Some(PinBar::Bullish), Some(r)) if r < config.oversold => {
                alerts.push(alert(AlertKind::BullishPin))
            }
            (Some(PinBar::Bearish), Some(r)) if r > config.overbought => {
                alerts.push(alert(AlertKind::BearishPin))
            }
            _ => {}
        }

        if tops[i] == Some(true) {
            alerts.push(alert(AlertKind::DoubleTop));
        } else if bottoms[i] == Some(true) {
            alerts.push(alert(AlertKind::DoubleBottom));
        }
    }
    Ok(alerts)
}

fn scan_one(
    port: &dyn DataPort,
    code: &str,
    market: String,
    config: &ScanConfig,
) -> Result<SymbolAlerts, SigscanError> {
    let bars = port.fetch_ohlcv(code, config.start_date, config.end_date)?;
    let series = PriceSeries::new(code, bars)?;
    let alerts = scan_symbol(&series, config)?;
    Ok(SymbolAlerts {
        code: code.to_string(),
        market,
        alerts,
    })
}

/// Scan every symbol of the universe (or of one market). With an empty
/// universe every symbol the data source lists is scanned under
/// [`DEFAULT_MARKET`].
pub fn scan_universe(
    port: &dyn DataPort,
    universe: &Universe,
    market: Option<&str>,
    config: &ScanConfig,
) -> Result<Vec<SymbolAlerts>, SigscanError> {
    config.validate()?;

    let targets = if universe.is_empty() {
        port.list_symbols()?
            .into_iter()
            .map(|code| (DEFAULT_MARKET.to_string(), code))
            .filter(|(m, _)| market.is_none_or(|wanted| m.eq_ignore_ascii_case(wanted)))
            .collect()
    } else {
        universe.targets(market)?
    };
    log::info!("scanning {} symbols", targets.len());

    let results: Vec<SymbolAlerts> = targets
        .into_par_iter()
        .filter_map(|(market, code)| match scan_one(port, &code, market, config) {
            Ok(found) => Some(found),
            Err(e) => {
                log::warn!("skipping {code}: {e}");
                None
            }
        })
        .collect();

    let total: usize = results.iter().map(|r| r.alerts.len()).sum();
    log::info!("{} symbols scanned, {} alerts", results.len(), total);
    Ok(results)
}
