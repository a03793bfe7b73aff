//! Core domain types and the signal engine.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod crossover;
pub mod zigzag;
pub mod double_top;
pub mod pin_bar;
pub mod composite;
pub mod evaluator;
pub mod detector;
pub mod optimizer;
pub mod analysis;
pub mod scan;
pub mod config_validation;
pub mod error;
