//! Configuration validation.
//!
//! Reads every section the engine understands, rejects malformed or
//! out-of-range values, and produces the immutable settings structs the
//! pipeline runs on. Missing optional keys fall back to their defaults.

use crate::domain::analysis::AnalysisConfig;
use crate::domain::crossover::CrossDirection;
use crate::domain::detector::{
    BandSide, BollingerParams, DetectorKind, KdjParams, MacdParams, SmaParams, ZigzagParams,
    DETECTOR_NAMES,
};
use crate::domain::double_top::DoubleTopParams;
use crate::domain::error::SigscanError;
use crate::domain::evaluator::EvaluationParams;
use crate::domain::ohlcv::Granularity;
use crate::domain::optimizer::ReboundParams;
use crate::domain::scan::{ScanConfig, Universe};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;
use std::str::FromStr;

/// Detectors enabled when `[signals] enabled` is absent.
pub const DEFAULT_ENABLED: [&str; 6] = ["sma", "macd", "kdj", "m_head", "w_bottom", "bollinger"];

const DEFAULT_REBOUND_WINDOW: usize = 20;

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SigscanError {
    SigscanError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn read_trimmed(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_parsed<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
    expected: &str,
) -> Result<T, SigscanError> {
    match read_trimmed(config, section, key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| invalid(section, key, format!("expected {expected}, got '{raw}'"))),
    }
}

fn read_usize(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SigscanError> {
    read_parsed(config, section, key, default, "a non-negative integer")
}

fn read_f64(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, SigscanError> {
    let value: f64 = read_parsed(config, section, key, default, "a number")?;
    if !value.is_finite() {
        return Err(invalid(section, key, "must be a finite number"));
    }
    Ok(value)
}

/// Comma-separated list, blanks dropped. `None` when the key is absent.
fn read_list(config: &dyn ConfigPort, section: &str, key: &str) -> Option<Vec<String>> {
    config.get_string(section, key).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    })
}

fn read_date(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<NaiveDate>, SigscanError> {
    read_trimmed(config, section, key)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| invalid(section, key, "invalid date format, expected YYYY-MM-DD"))
        })
        .transpose()
}

fn read_direction(config: &dyn ConfigPort, section: &str) -> Result<CrossDirection, SigscanError> {
    match read_trimmed(config, section, "direction") {
        None => Ok(CrossDirection::Golden),
        Some(raw) => CrossDirection::parse(&raw)
            .ok_or_else(|| invalid(section, "direction", "must be golden or death")),
    }
}

/// `[data] dir`, the directory holding one CSV file per symbol.
pub fn data_dir(config: &dyn ConfigPort) -> Result<String, SigscanError> {
    read_trimmed(config, "data", "dir").ok_or_else(|| SigscanError::ConfigMissing {
        section: "data".to_string(),
        key: "dir".to_string(),
    })
}

/// Optional `[data] start_date` / `end_date`; start must precede end.
pub fn date_range(
    config: &dyn ConfigPort,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), SigscanError> {
    let start = read_date(config, "data", "start_date")?;
    let end = read_date(config, "data", "end_date")?;
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(invalid("data", "start_date", "start_date must be before end_date"));
        }
    }
    Ok((start, end))
}

pub fn build_double_top_params(config: &dyn ConfigPort) -> Result<DoubleTopParams, SigscanError> {
    let defaults = DoubleTopParams::default();
    let params = DoubleTopParams {
        window: read_usize(config, "double_top", "window", defaults.window)?,
        tolerance: read_f64(config, "double_top", "tolerance", defaults.tolerance)?,
        min_separation: read_usize(config, "double_top", "min_separation", defaults.min_separation)?,
        pullback_lookback: read_usize(
            config,
            "double_top",
            "pullback_lookback",
            defaults.pullback_lookback,
        )?,
        pullback_pct: read_f64(config, "double_top", "pullback_pct", defaults.pullback_pct)?,
    };
    params.validate()?;
    Ok(params)
}

pub fn build_evaluation_params(
    config: &dyn ConfigPort,
    section: &str,
) -> Result<EvaluationParams, SigscanError> {
    let defaults = EvaluationParams::default();
    let params = EvaluationParams {
        horizon: read_usize(config, section, "horizon", defaults.horizon)?,
        gain_threshold: read_f64(config, section, "gain_threshold", defaults.gain_threshold)?,
    };
    if params.horizon == 0 {
        return Err(invalid(section, "horizon", "horizon must be positive"));
    }
    params.validate()?;
    Ok(params)
}

/// Build one detector from its configuration section.
pub fn build_detector(config: &dyn ConfigPort, name: &str) -> Result<DetectorKind, SigscanError> {
    let kind = match name {
        "sma" => {
            let d = SmaParams::default();
            DetectorKind::SmaCross {
                params: SmaParams {
                    short: read_usize(config, "sma", "short", d.short)?,
                    long: read_usize(config, "sma", "long", d.long)?,
                },
                direction: read_direction(config, "sma")?,
            }
        }
        "macd" => {
            let d = MacdParams::default();
            DetectorKind::MacdCross {
                params: MacdParams {
                    fast: read_usize(config, "macd", "fast", d.fast)?,
                    slow: read_usize(config, "macd", "slow", d.slow)?,
                    signal: read_usize(config, "macd", "signal", d.signal)?,
                },
                direction: read_direction(config, "macd")?,
            }
        }
        "kdj" => {
            let d = KdjParams::default();
            DetectorKind::KdjCross {
                params: KdjParams {
                    n: read_usize(config, "kdj", "n", d.n)?,
                    k_smooth: read_usize(config, "kdj", "k_smooth", d.k_smooth)?,
                    d_smooth: read_usize(config, "kdj", "d_smooth", d.d_smooth)?,
                },
                direction: read_direction(config, "kdj")?,
            }
        }
        "bollinger" => {
            let d = BollingerParams::default();
            let side = match read_trimmed(config, "bollinger", "side") {
                None => BandSide::Lower,
                Some(raw) => BandSide::parse(&raw)
                    .ok_or_else(|| invalid("bollinger", "side", "must be lower or upper"))?,
            };
            DetectorKind::BollingerBreach {
                params: BollingerParams {
                    period: read_usize(config, "bollinger", "period", d.period)?,
                    k: read_f64(config, "bollinger", "k", d.k)?,
                },
                side,
            }
        }
        "m_head" | "w_bottom" => {
            let params = ZigzagParams {
                window: read_usize(config, "zigzag", "window", ZigzagParams::default().window)?,
            };
            if name == "m_head" {
                DetectorKind::MHead(params)
            } else {
                DetectorKind::WBottom(params)
            }
        }
        "double_top" => DetectorKind::DoubleTop(build_double_top_params(config)?),
        "double_bottom" => DetectorKind::DoubleBottom(build_double_top_params(config)?),
        "bullish_pin" => DetectorKind::BullishPin,
        "bearish_pin" => DetectorKind::BearishPin,
        "rebound" => DetectorKind::Rebound {
            window: read_usize(config, "rebound", "window", DEFAULT_REBOUND_WINDOW)?,
        },
        other => {
            return Err(invalid(
                "signals",
                "enabled",
                format!(
                    "unknown detector '{other}', expected one of {}",
                    DETECTOR_NAMES.join(", ")
                ),
            ))
        }
    };
    kind.validate()?;
    Ok(kind)
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, SigscanError> {
    let enabled = read_list(config, "signals", "enabled")
        .unwrap_or_else(|| DEFAULT_ENABLED.iter().map(|s| s.to_string()).collect());
    if enabled.is_empty() {
        return Err(invalid("signals", "enabled", "at least one detector must be enabled"));
    }

    let detectors = enabled
        .iter()
        .map(|name| build_detector(config, &name.to_lowercase()))
        .collect::<Result<Vec<_>, _>>()?;

    let composite: Vec<String> = read_list(config, "signals", "composite")
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.to_lowercase())
        .collect();
    if let Some(missing) = composite
        .iter()
        .find(|m| !detectors.iter().any(|d| d.name() == m.as_str()))
    {
        return Err(invalid(
            "signals",
            "composite",
            format!("'{missing}' is not an enabled detector"),
        ));
    }

    let analysis = AnalysisConfig {
        detectors,
        composite,
        evaluation: build_evaluation_params(config, "evaluation")?,
    };
    analysis.validate()?;
    Ok(analysis)
}

pub fn build_rebound_params(config: &dyn ConfigPort) -> Result<ReboundParams, SigscanError> {
    let defaults = ReboundParams::default();

    let candidate_windows = match read_list(config, "rebound", "candidate_windows") {
        None => defaults.candidate_windows,
        Some(items) => items
            .iter()
            .map(|item| match item.parse::<usize>() {
                Ok(w) if w > 0 => Ok(w),
                _ => Err(invalid(
                    "rebound",
                    "candidate_windows",
                    format!("'{item}' is not a positive integer"),
                )),
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let granularities = match read_list(config, "rebound", "granularities") {
        None => defaults.granularities,
        Some(items) => items
            .iter()
            .map(|item| {
                Granularity::parse(item).ok_or_else(|| {
                    invalid(
                        "rebound",
                        "granularities",
                        format!("'{item}' is not one of daily, weekly, monthly"),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
    };
    if granularities.is_empty() {
        return Err(invalid("rebound", "granularities", "at least one granularity is required"));
    }

    let params = ReboundParams {
        candidate_windows,
        evaluation: build_evaluation_params(config, "rebound")?,
        granularities,
    };
    params.validate()?;
    Ok(params)
}

pub fn build_scan_config(config: &dyn ConfigPort) -> Result<ScanConfig, SigscanError> {
    let defaults = ScanConfig::default();
    let (start_date, end_date) = date_range(config)?;
    let rsi_period = read_usize(config, "rsi", "period", defaults.rsi_period)?;
    let scan = ScanConfig {
        rsi_period: read_usize(config, "scan", "rsi_period", rsi_period)?,
        oversold: read_f64(config, "scan", "oversold", defaults.oversold)?,
        overbought: read_f64(config, "scan", "overbought", defaults.overbought)?,
        double_top: build_double_top_params(config)?,
        start_date,
        end_date,
    };
    scan.validate()?;
    Ok(scan)
}

/// `[universe]` groups, one key per market. Market names are upper-cased.
pub fn build_universe(config: &dyn ConfigPort) -> Result<Universe, SigscanError> {
    let mut groups = Vec::new();
    for market in config.section_keys("universe") {
        let codes = read_list(config, "universe", &market).unwrap_or_default();
        if codes.is_empty() {
            return Err(invalid("universe", &market, "market has no symbols"));
        }
        groups.push((market.to_uppercase(), codes));
    }
    Ok(Universe::new(groups))
}

/// Check every section in one pass, as `sigscan validate` does.
pub fn validate_all(config: &dyn ConfigPort) -> Result<(), SigscanError> {
    data_dir(config)?;
    build_analysis_config(config)?;
    build_rebound_params(config)?;
    build_scan_config(config)?;
    build_universe(config)?;
    Ok(())
}
