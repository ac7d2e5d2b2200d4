//! SARSA(λ) with linear function approximation
//!
//! This module implements the online temporal difference learning core:
//! a linear Q-value estimate over feature vectors with accumulating
//! eligibility traces, and the agent state machine that drives it.

pub mod agent;
pub mod value_function;

pub use agent::{Hyperparameters, SarsaAgent};
pub use value_function::LinearValueFunction;
