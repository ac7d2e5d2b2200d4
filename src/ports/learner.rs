//! Learner port - abstraction over trainable agents
//!
//! This port defines the interface the experiment driver works with,
//! allowing it to run:
//! - Plain SARSA(λ) students
//! - Advised students (student + teacher + teaching strategy)
//! - Frozen policies for evaluation baselines

use std::path::Path;

use crate::{
    Result,
    ports::environment::{Action, Environment},
};

/// Unified interface for everything the episode runner can train.
///
/// # Event sequence
///
/// For each episode the runner calls:
/// 1. `start_episode(env, test_mode)` - once, before the first decision
/// 2. For each step: `select_move(env)`, then after the environment
///    advances, `process_step(env)`
/// 3. `episode_data()` - after the episode, for telemetry
///
/// In test mode a learner must not explore, learn, or take advice.
pub trait Learner: Send {
    /// Prepare for the first move of a fresh episode.
    fn start_episode(&mut self, env: &dyn Environment, test_mode: bool) -> Result<()>;

    /// Choose the action to execute at the current decision point.
    fn select_move(&mut self, env: &dyn Environment) -> Result<Action>;

    /// Observe the environment after a step and learn if appropriate.
    fn process_step(&mut self, env: &dyn Environment) -> Result<()>;

    /// Per-episode telemetry reported after each training episode.
    ///
    /// The default is empty, suitable for learners with nothing to report.
    fn episode_data(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Persist the learned policy.
    fn save_policy(&self, path: &Path) -> Result<()>;

    /// Seed the learner's internal random number generator.
    ///
    /// Training pipelines call this when supplied with a deterministic
    /// seed to ensure reproducible curves.
    fn set_rng_seed(&mut self, _seed: u64) -> Result<()> {
        Ok(())
    }

    /// Get the learner's name, used in reports and file naming.
    fn name(&self) -> &str;
}
