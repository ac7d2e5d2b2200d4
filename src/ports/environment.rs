//! Environment port - abstraction over the game simulation
//!
//! The learning core never inspects game state directly. It sees legal
//! actions, a running score, and fixed-length feature vectors produced by
//! an external extractor.

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// An opaque action identifier.
///
/// The core only ever compares actions for equality and passes them back
/// to the environment; their meaning belongs to the simulation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Action(pub usize);

/// Environment trait - one episodic game simulation.
///
/// A step advances the simulation by one tick given the learner's action
/// and the opponent's action. Scores are cumulative; the per-step reward
/// is the score difference observed by the agent.
///
/// `Any` is a supertrait so simulation-specific adapters (opponent
/// policies, feature extractors) can downcast to their concrete world.
pub trait Environment: std::any::Any {
    /// Legal actions at the current decision point.
    ///
    /// Must be non-empty while `is_over()` is false.
    fn legal_actions(&self) -> Vec<Action>;

    /// Advance one simulated step.
    fn advance(&mut self, learner_action: Action, opponent_action: Action);

    /// Whether the episode has ended.
    fn is_over(&self) -> bool;

    /// Cumulative episode score.
    fn score(&self) -> f64;
}

/// Policy controlling the opponent side of the simulation.
pub trait OpponentPolicy: Send {
    fn select(&mut self, env: &dyn Environment) -> Action;
}

/// Extracts a fixed-length feature vector for a (state, action) pair.
///
/// Every vector returned by `extract` must have length `len()`; the value
/// function treats a mismatch as a fatal configuration error.
pub trait FeatureExtractor: Send {
    /// Feature vector length, fixed per configuration.
    fn len(&self) -> usize;

    /// Whether the extractor produces empty vectors (it never should).
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn extract(&self, env: &dyn Environment, action: Action) -> FeatureVector;
}
