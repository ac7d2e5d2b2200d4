//! Application-level configuration and wiring

pub mod config;

pub use config::{AttentionSpec, ExperimentConfig, StrategySpec, parse_initiator};
