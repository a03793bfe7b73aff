//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analysis::{analyze, AnalysisReport};
use crate::domain::config_validation::{
    build_analysis_config, build_rebound_params, build_scan_config, build_universe, data_dir,
    date_range, validate_all,
};
use crate::domain::error::SigscanError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::optimizer::{optimize_granularities, GranularityReport, SweepOutcome};
use crate::domain::scan::{scan_universe, SymbolAlerts};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "sigscan",
    about = "Trading signal detection and retrospective hit-rate evaluation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score every enabled detector, and the composite, on one symbol
    Analyze {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Sweep rebound moving-average windows at each granularity
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        code: String,
        #[arg(long)]
        json: bool,
    },
    /// Scan the configured universe for pin-bar and double top/bottom alerts
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Only scan one market group
        #[arg(long)]
        market: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a configuration file without reading any data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            (&e).into()
        }
    }
}

/// Dispatch one subcommand, printing its report to stdout.
pub fn execute(cli: Cli) -> Result<(), SigscanError> {
    match cli.command {
        Command::Analyze { config, code, json } => with_csv(&config, |port, adapter| {
            let report = analyze_code(port, adapter, &code)?;
            emit(&report, json, || render_analysis(&report))
        }),
        Command::Optimize { config, code, json } => with_csv(&config, |port, adapter| {
            let reports = optimize_code(port, adapter, &code)?;
            emit(&reports, json, || render_optimize(&code, &reports))
        }),
        Command::Scan {
            config,
            market,
            json,
        } => with_csv(&config, |port, adapter| {
            let results = scan_markets(port, adapter, market.as_deref())?;
            emit(&results, json, || render_scan(&results))
        }),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SigscanError> {
    log::info!("loading config from {}", path.display());
    FileConfigAdapter::from_file(path).map_err(|e| SigscanError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load the config, open the CSV directory it names, and hand both to `f`.
fn with_csv<F>(config_path: &Path, f: F) -> Result<(), SigscanError>
where
    F: FnOnce(&dyn DataPort, &dyn ConfigPort) -> Result<(), SigscanError>,
{
    let adapter = load_config(config_path)?;
    let port = CsvAdapter::new(PathBuf::from(data_dir(&adapter)?));
    f(&port, &adapter)
}

fn emit<T, F>(value: &T, json: bool, text: F) -> Result<(), SigscanError>
where
    T: Serialize,
    F: FnOnce() -> String,
{
    if json {
        let out = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
        println!("{out}");
    } else {
        print!("{}", text());
    }
    Ok(())
}

/// Fetch and validate the bars for one symbol, honouring the `[data]` dates.
pub fn load_series(
    port: &dyn DataPort,
    config: &dyn ConfigPort,
    code: &str,
) -> Result<PriceSeries, SigscanError> {
    let (start, end) = date_range(config)?;
    let bars = port.fetch_ohlcv(code, start, end)?;
    log::info!("loaded {} bars for {}", bars.len(), code);
    PriceSeries::new(code, bars)
}

pub fn analyze_code(
    port: &dyn DataPort,
    config: &dyn ConfigPort,
    code: &str,
) -> Result<AnalysisReport, SigscanError> {
    let analysis = build_analysis_config(config)?;
    let series = load_series(port, config, code)?;
    analyze(&series, &analysis)
}

pub fn optimize_code(
    port: &dyn DataPort,
    config: &dyn ConfigPort,
    code: &str,
) -> Result<Vec<GranularityReport>, SigscanError> {
    let params = build_rebound_params(config)?;
    let series = load_series(port, config, code)?;
    optimize_granularities(&series, &params)
}

pub fn scan_markets(
    port: &dyn DataPort,
    config: &dyn ConfigPort,
    market: Option<&str>,
) -> Result<Vec<SymbolAlerts>, SigscanError> {
    let scan = build_scan_config(config)?;
    let universe = build_universe(config)?;
    scan_universe(port, &universe, market, &scan)
}

fn run_validate(config_path: &Path) -> Result<(), SigscanError> {
    let adapter = load_config(config_path)?;
    validate_all(&adapter)?;

    let analysis = build_analysis_config(&adapter)?;
    let rebound = build_rebound_params(&adapter)?;
    let universe = build_universe(&adapter)?;

    println!("Detectors:");
    for kind in &analysis.detectors {
        println!("  {:<14} {}", kind.name(), kind.label());
    }
    if !analysis.composite.is_empty() {
        println!("Composite: {}", analysis.composite.join(" & "));
    }
    println!(
        "Rebound windows: {:?} over {}",
        rebound.candidate_windows,
        rebound
            .granularities
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    for (market, codes) in universe.groups() {
        println!("Market {}: {}", market, codes.join(", "));
    }
    println!("Configuration is valid");
    Ok(())
}

fn percent(rate: Option<f64>) -> String {
    match rate {
        Some(r) => format!("{:.1}%", r * 100.0),
        None => "n/a".to_string(),
    }
}

pub fn render_analysis(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} bars ({} .. {})",
        report.code, report.bars, report.first_date, report.last_date
    );
    let _ = writeln!(
        out,
        "{:<32} {:>9} {:>9} {:>6} {:>9}",
        "DETECTOR", "OCCUPANCY", "TRIGGERS", "WINS", "WIN RATE"
    );
    for d in report.detectors.iter().chain(report.composite.as_ref()) {
        let _ = writeln!(
            out,
            "{:<32} {:>9} {:>9} {:>6} {:>9}",
            d.label,
            percent(d.occupancy.rate),
            d.forward_hit.trigger_count,
            d.forward_hit.win_count,
            percent(d.forward_hit.win_rate)
        );
    }
    out
}

pub fn render_optimize(code: &str, reports: &[GranularityReport]) -> String {
    let mut out = String::new();
    for r in reports {
        let _ = write!(out, "{} {} ({} bars): ", code, r.granularity, r.bars);
        match &r.sweep.outcome {
            SweepOutcome::Best {
                window,
                win_rate,
                trigger_count,
                win_count,
            } => {
                let _ = writeln!(
                    out,
                    "best window {} with win rate {} ({}/{})",
                    window,
                    percent(Some(*win_rate)),
                    win_count,
                    trigger_count
                );
            }
            SweepOutcome::NoViableCandidate => {
                let _ = writeln!(out, "no viable candidate");
            }
        }
        for c in &r.sweep.candidates {
            let _ = writeln!(
                out,
                "  window {:>4}: {:>4} triggers {:>4} wins {:>7}",
                c.window,
                c.stat.trigger_count,
                c.stat.win_count,
                percent(c.stat.win_rate)
            );
        }
    }
    out
}

pub fn render_scan(results: &[SymbolAlerts]) -> String {
    let mut out = String::new();
    for symbol in results.iter().filter(|s| !s.alerts.is_empty()) {
        let _ = writeln!(out, "[{}] {}", symbol.market, symbol.code);
        for a in &symbol.alerts {
            let rsi = a
                .rsi
                .map(|r| format!("{r:.2}"))
                .unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(
                out,
                "  {}  {:<16} price {:>10.2}  RSI {}",
                a.date, a.kind, a.price, rsi
            );
        }
    }
    let total: usize = results.iter().map(|s| s.alerts.len()).sum();
    let _ = writeln!(out, "{} alerts across {} symbols", total, results.len());
    out
}
