//! Apprentice - teacher-student advice for reinforcement learning
//!
//! This crate provides:
//! - A SARSA(λ) learning core with linear function approximation and
//!   accumulating eligibility traces
//! - Budget-bounded teaching strategies that decide when a frozen teacher
//!   gives action advice, and attention strategies that decide when the
//!   student asks for it
//! - An online importance classifier for predicting advice-worthy states
//! - An experiment pipeline producing learning curves and comparing runs
//!   with a two-sample t-test over curve areas
//! - A corridor pursuit simulation and a CLI driving the experiments

pub mod app;
pub mod cli;
pub mod error;
pub mod features;
pub mod importance;
pub mod pipeline;
pub mod ports;
pub mod sarsa;
pub mod sim;
pub mod teaching;

pub use error::{Error, Result};
pub use features::FeatureVector;
pub use importance::ImportanceClassifier;
pub use pipeline::{CurveConfig, CurveRunner, LearningCurve, SarsaLearner};
pub use ports::{Action, Environment, FeatureExtractor, Learner, OpponentPolicy};
pub use sarsa::{Hyperparameters, SarsaAgent};
pub use teaching::{AdvisedLearner, AttentionMode, Initiator, TeachingStrategy};
