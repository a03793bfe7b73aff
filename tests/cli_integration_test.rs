//! CLI integration tests.
//!
//! Tests cover:
//! - Config loading from INI files on disk
//! - Argument parsing for every subcommand
//! - Each subcommand end to end against a CSV directory
//! - Error kinds surfaced for bad config and bad data

mod common;

use clap::Parser;
use common::*;
use sigscan::adapters::file_config_adapter::FileConfigAdapter;
use sigscan::cli::{self, Cli};
use sigscan::domain::config_validation;
use sigscan::domain::error::SigscanError;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// A data directory holding `WAVE.csv`, plus an INI pointing at it.
fn workspace(extra_ini: &str) -> (TempDir, tempfile::NamedTempFile) {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("WAVE.csv"), to_csv(&wavy_bars(150))).unwrap();
    let ini = format!("[data]\ndir = {}\n{}", dir.path().display(), extra_ini);
    (dir, write_temp_ini(&ini))
}

fn run_args(args: &[&str]) -> Result<(), SigscanError> {
    cli::execute(Cli::parse_from(args))
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

const FULL_INI: &str = r#"
[signals]
enabled = sma, macd, kdj, bollinger, rebound
composite = sma, kdj

[sma]
short = 5
long = 20

[bollinger]
period = 20
k = 2.0
side = lower

[evaluation]
horizon = 5
gain_threshold = 0.03

[rebound]
window = 10
candidate_windows = 5, 10, 20
granularities = daily, weekly

[scan]
rsi_period = 14
oversold = 30
overbought = 70

[universe]
us = WAVE
"#;

mod config_loading {
    use super::*;

    #[test]
    fn full_config_builds() {
        let (_dir, file) = workspace(FULL_INI);
        let adapter = cli::load_config(file.path()).unwrap();

        let analysis = config_validation::build_analysis_config(&adapter).unwrap();
        let names: Vec<&str> = analysis.detectors.iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["sma", "macd", "kdj", "bollinger", "rebound"]);
        assert_eq!(analysis.composite, vec!["sma", "kdj"]);

        let rebound = config_validation::build_rebound_params(&adapter).unwrap();
        assert_eq!(rebound.candidate_windows, vec![5, 10, 20]);
        assert_eq!(rebound.granularities.len(), 2);

        let universe = config_validation::build_universe(&adapter).unwrap();
        assert_eq!(universe.market_of("WAVE"), "US");
        assert!(config_validation::validate_all(&adapter).is_ok());
    }

    #[test]
    fn universe_keeps_market_order_from_file() {
        let file = write_temp_ini("[universe]\nUS_SP500 = AAPL,SPY\nETFS = SPY,QQQ\n");
        let adapter = cli::load_config(file.path()).unwrap();
        let universe = config_validation::build_universe(&adapter).unwrap();

        let markets: Vec<&str> = universe.groups().iter().map(|(m, _)| m.as_str()).collect();
        assert_eq!(markets, vec!["US_SP500", "ETFS"]);
        assert_eq!(universe.market_of("SPY"), "US_SP500");
        assert_eq!(universe.market_of("QQQ"), "ETFS");
    }

    #[test]
    fn missing_file_is_parse_error() {
        let err = cli::load_config(Path::new("/nonexistent/sigscan.ini")).unwrap_err();
        assert!(matches!(err, SigscanError::ConfigParse { .. }));
    }

    #[test]
    fn missing_data_dir_reported() {
        let file = write_temp_ini("[signals]\nenabled = sma\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let err = config_validation::validate_all(&adapter).unwrap_err();
        assert!(matches!(err, SigscanError::ConfigMissing { ref section, .. } if section == "data"));
    }
}

mod argument_parsing {
    use super::*;
    use sigscan::cli::Command;

    #[test]
    fn optimize_and_validate_parse() {
        let cli = Cli::parse_from(["sigscan", "optimize", "-c", "x.ini", "--code", "WAVE"]);
        assert!(matches!(
            cli.command,
            Command::Optimize { json: false, ref code, .. } if code == "WAVE"
        ));

        let cli = Cli::parse_from(["sigscan", "validate", "--config", "x.ini"]);
        assert!(matches!(cli.command, Command::Validate { .. }));
    }

    #[test]
    fn analyze_requires_code() {
        assert!(Cli::try_parse_from(["sigscan", "analyze", "-c", "x.ini"]).is_err());
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_full_config() {
        let (_dir, file) = workspace(FULL_INI);
        run_args(&["sigscan", "validate", "-c", path_str(file.path())]).unwrap();
    }

    #[test]
    fn validate_rejects_bad_value() {
        let (_dir, file) = workspace("[sma]\nlong = twenty\n");
        let err = run_args(&["sigscan", "validate", "-c", path_str(file.path())]).unwrap_err();
        assert!(matches!(err, SigscanError::ConfigInvalid { ref key, .. } if key == "long"));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn analyze_runs_from_csv() {
        let (_dir, file) = workspace(FULL_INI);
        let path = path_str(file.path());
        run_args(&["sigscan", "analyze", "-c", path, "--code", "WAVE"]).unwrap();
        run_args(&["sigscan", "analyze", "-c", path, "--code", "WAVE", "--json"]).unwrap();
    }

    #[test]
    fn analyze_report_from_csv() {
        let (_dir, file) = workspace(FULL_INI);
        let adapter = cli::load_config(file.path()).unwrap();
        let port = sigscan::adapters::csv_adapter::CsvAdapter::new(
            config_validation::data_dir(&adapter).unwrap().into(),
        );

        let report = cli::analyze_code(&port, &adapter, "WAVE").unwrap();
        assert_eq!(report.bars, 150);
        let composite = report.composite.as_ref().unwrap();
        assert_eq!(composite.label, "SMA(5,20) golden & KDJ(9,2,2) golden");

        let text = cli::render_analysis(&report);
        assert!(text.starts_with("WAVE: 150 bars (2024-01-01 .. "));
        assert!(text.contains("REBOUND(10)"));

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["code"], "WAVE");
        assert_eq!(json["detectors"].as_array().unwrap().len(), 5);
        assert!(json["detectors"][0].get("signal").is_none());
    }

    #[test]
    fn analyze_missing_symbol_is_data_error() {
        let (_dir, file) = workspace(FULL_INI);
        let err = run_args(&["sigscan", "analyze", "-c", path_str(file.path()), "--code", "NOPE"])
            .unwrap_err();
        assert!(matches!(err, SigscanError::Data { .. }));
        assert_eq!(err.exit_status(), 3);
    }

    #[test]
    fn optimize_runs_from_csv() {
        let (_dir, file) = workspace(FULL_INI);
        let path = path_str(file.path());
        run_args(&["sigscan", "optimize", "-c", path, "--code", "WAVE", "--json"]).unwrap();

        let adapter = cli::load_config(file.path()).unwrap();
        let port = sigscan::adapters::csv_adapter::CsvAdapter::new(
            config_validation::data_dir(&adapter).unwrap().into(),
        );
        let reports = cli::optimize_code(&port, &adapter, "WAVE").unwrap();
        let text = cli::render_optimize("WAVE", &reports);
        assert!(text.contains("WAVE daily (150 bars)"));
        assert!(text.contains("WAVE weekly"));
        assert!(!text.contains("monthly"));
    }

    #[test]
    fn scan_runs_from_csv() {
        let (_dir, file) = workspace(FULL_INI);
        let path = path_str(file.path());
        run_args(&["sigscan", "scan", "-c", path]).unwrap();
        run_args(&["sigscan", "scan", "-c", path, "--market", "us", "--json"]).unwrap();

        let err = run_args(&["sigscan", "scan", "-c", path, "--market", "jp"]).unwrap_err();
        assert!(matches!(err, SigscanError::Configuration { .. }));
    }

    #[test]
    fn malformed_csv_row_is_invalid_bar() {
        let (dir, file) = workspace(FULL_INI);
        fs::write(
            dir.path().join("BROKEN.csv"),
            "date,open,high,low,close,volume\n2024-01-01,1,1,1,abc,10\n",
        )
        .unwrap();
        let err = run_args(&["sigscan", "analyze", "-c", path_str(file.path()), "--code", "BROKEN"])
            .unwrap_err();
        assert!(matches!(err, SigscanError::InvalidBar { index: 0, .. }));
        assert_eq!(err.exit_status(), 4);
    }
}
