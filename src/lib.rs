//! sigscan: trading-signal detection and retrospective hit-rate evaluation.
//!
//! Hexagonal architecture: the signal engine lives in [`domain`], collaborator
//! traits in [`ports`], concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
