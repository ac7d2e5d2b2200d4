//! SARSA(λ) agent with linear function approximation
//!
//! The agent runs a one-step-delayed TD update so an external teaching
//! layer can override the chosen action before the trace for the step is
//! laid down and before the value in the TD target is committed.

use std::collections::HashMap;
use std::path::Path;

use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    features::FeatureVector,
    ports::environment::{Action, Environment, FeatureExtractor},
    sarsa::value_function::LinearValueFunction,
};

/// Number of recent action-value spreads kept for uncertainty estimates.
const SPREAD_WINDOW: usize = 100;

/// Fixed hyperparameters of a SARSA(λ) learner.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Hyperparameters {
    /// Exploration rate ε
    pub epsilon: f64,
    /// Learning rate α
    pub learning_rate: f64,
    /// Discount factor γ
    pub discount: f64,
    /// Trace-decay factor λ
    pub trace_decay: f64,
}

impl Default for Hyperparameters {
    fn default() -> Self {
        Self {
            epsilon: 0.05,
            learning_rate: 0.001,
            discount: 0.999,
            trace_decay: 0.9,
        }
    }
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// SARSA(λ) learner over a linear value function.
///
/// Per-episode state covers the current legal action set, its feature
/// vectors and value estimates, the selected action index, and the map
/// from advised feature vectors to the competing alternatives recorded
/// for the periodic max-update.
pub struct SarsaAgent {
    extractor: Box<dyn FeatureExtractor>,
    q: LinearValueFunction,
    params: Hyperparameters,
    rng: StdRng,
    rng_seed: Option<u64>,

    actions: Vec<Action>,
    features: Vec<FeatureVector>,
    q_values: Vec<f64>,
    selected: Option<usize>,
    last_score: f64,
    test_mode: bool,
    pending_update: bool,
    first_term: f64,

    spreads: [f64; SPREAD_WINDOW],
    spread_index: usize,

    advised_states: HashMap<FeatureVector, Vec<FeatureVector>>,
}

impl SarsaAgent {
    /// Create an agent with a zero-initialized value function.
    pub fn new(extractor: Box<dyn FeatureExtractor>, params: Hyperparameters) -> Self {
        let len = extractor.len();
        Self {
            extractor,
            q: LinearValueFunction::new(len),
            params,
            rng: build_rng(None),
            rng_seed: None,
            actions: Vec::new(),
            features: Vec::new(),
            q_values: Vec::new(),
            selected: None,
            last_score: 0.0,
            test_mode: false,
            pending_update: false,
            first_term: 0.0,
            spreads: [0.0; SPREAD_WINDOW],
            spread_index: 0,
            advised_states: HashMap::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
        self
    }

    pub fn set_rng_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.rng_seed = Some(seed);
    }

    /// Replace the policy with one loaded from a weight file.
    pub fn load_policy<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.q = LinearValueFunction::load(self.extractor.len(), path)?;
        Ok(())
    }

    /// Save the current policy to a weight file.
    pub fn save_policy<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.q.save(path)
    }

    pub fn value_function(&self) -> &LinearValueFunction {
        &self.q
    }

    #[cfg(test)]
    pub(crate) fn value_function_mut(&mut self) -> &mut LinearValueFunction {
        &mut self.q
    }

    /// Prepare for the first move of an episode.
    pub fn start_episode(&mut self, env: &dyn Environment, test_mode: bool) -> Result<()> {
        self.test_mode = test_mode;
        self.last_score = 0.0;
        self.q.clear_traces();
        self.pending_update = false;
        self.first_term = 0.0;
        self.advised_states.clear();
        self.evaluate_decision(env)
    }

    /// Compute predictions for the actions available in this state.
    fn evaluate_decision(&mut self, env: &dyn Environment) -> Result<()> {
        self.actions = env.legal_actions();
        if self.actions.is_empty() {
            return Err(Error::NoLegalActions);
        }

        self.features = self
            .actions
            .iter()
            .map(|&a| self.extractor.extract(env, a))
            .collect();

        self.q_values = self
            .features
            .iter()
            .map(|f| self.q.evaluate(f))
            .collect::<Result<Vec<_>>>()?;

        let mut best = 0;
        let mut worst = 0;
        for i in 0..self.q_values.len() {
            if self.q_values[i] > self.q_values[best] {
                best = i;
            }
            if self.q_values[i] < self.q_values[worst] {
                worst = i;
            }
        }
        self.push_spread(self.q_values[best] - self.q_values[worst]);

        // Explore or exploit
        let index = if !self.test_mode && self.rng.random::<f64>() < self.params.epsilon {
            self.rng.random_range(0..self.actions.len())
        } else {
            best
        };
        self.selected = Some(index);
        Ok(())
    }

    fn push_spread(&mut self, spread: f64) {
        self.spreads[self.spread_index] = spread;
        self.spread_index = (self.spread_index + 1) % SPREAD_WINDOW;
    }

    /// The action currently chosen for this decision point.
    pub fn current_move(&self) -> Result<Action> {
        let index = self.selected.ok_or(Error::NoSelectedAction)?;
        Ok(self.actions[index])
    }

    /// Override the move choice.
    ///
    /// A teaching layer calls this before the environment consumes the
    /// action. An action outside the current legal set leaves no
    /// selection; that state is a must-not-happen condition surfaced by
    /// the next `current_move`/`process_step` call.
    pub fn set_move(&mut self, action: Action) {
        self.selected = self.actions.iter().position(|&a| a == action);
    }

    /// Learn if appropriate, and prepare for the next move.
    pub fn process_step(&mut self, env: &dyn Environment) -> Result<()> {
        let selected = self.selected.ok_or(Error::NoSelectedAction)?;

        // Complete the delayed gradient-descent update
        if self.pending_update {
            let second_term = self.params.discount * self.q_values[selected];
            self.q
                .update_weights(self.params.learning_rate * (self.first_term + second_term));
            self.pending_update = false;
        }

        // Traces follow the action actually taken, advised or not
        self.q
            .decay_traces(self.params.discount * self.params.trace_decay);
        self.q.add_traces(&self.features[selected])?;

        // Q-value correction
        let reward = env.score() - self.last_score;
        self.last_score = env.score();
        self.first_term = reward - self.q_values[selected];

        if !env.is_over() {
            self.evaluate_decision(env)?;
        }

        if !self.test_mode {
            if env.is_over() {
                // Right away if the episode is over
                self.q
                    .update_weights(self.params.learning_rate * self.first_term);
                self.max_update()?;
            } else {
                // Otherwise delayed, leaving room for advice
                self.pending_update = true;
            }
        }
        Ok(())
    }

    /// Record an advised decision point for the periodic max-update.
    ///
    /// Maps the advised action's feature vector to the features of every
    /// other currently legal action. First occurrence wins.
    pub fn record_advised_state(&mut self, advised: Action) -> Result<()> {
        let advised_index = self
            .actions
            .iter()
            .position(|&a| a == advised)
            .ok_or(Error::ActionNotLegal { action: advised.0 })?;
        let advised_features = self.features[advised_index].clone();
        if self.advised_states.contains_key(&advised_features) {
            return Ok(());
        }
        let others: Vec<FeatureVector> = self
            .features
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != advised_index)
            .map(|(_, f)| f.clone())
            .collect();
        self.advised_states.insert(advised_features, others);
        Ok(())
    }

    /// Push each pending advised action's value above its best competing
    /// alternative; drop pairs that are no longer dominated.
    ///
    /// Runs over a shuffled order of pending keys to avoid order bias.
    fn max_update(&mut self) -> Result<()> {
        let mut keys: Vec<FeatureVector> = self.advised_states.keys().cloned().collect();
        keys.shuffle(&mut self.rng);

        let mut resolved = Vec::new();
        for advised in keys {
            let Some(others) = self.advised_states.get(&advised) else {
                continue;
            };
            if others.is_empty() {
                resolved.push(advised);
                continue;
            }
            let mut best: Option<(&FeatureVector, f64)> = None;
            for alt in others {
                let value = self.q.evaluate(alt)?;
                if best.is_none_or(|(_, v)| value > v) {
                    best = Some((alt, value));
                }
            }
            let (best_alt, best_value) = best.expect("non-empty alternative set");
            let advised_value = self.q.evaluate(&advised)?;
            if advised_value < best_value {
                let best_alt = best_alt.clone();
                self.q
                    .nudge_advised(&advised, &best_alt, self.params.learning_rate)?;
            } else {
                resolved.push(advised);
            }
        }
        for key in resolved {
            self.advised_states.remove(&key);
        }
        Ok(())
    }

    /// Get the current legal action set.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Get the current value estimates, parallel to `actions()`.
    pub fn q_values(&self) -> &[f64] {
        &self.q_values
    }

    /// Get the current action-to-value mapping.
    pub fn q_value_map(&self) -> HashMap<Action, f64> {
        self.actions
            .iter()
            .copied()
            .zip(self.q_values.iter().copied())
            .collect()
    }

    /// Get the feature vector used for a currently legal action.
    pub fn features_for(&self, action: Action) -> Result<&FeatureVector> {
        self.actions
            .iter()
            .position(|&a| a == action)
            .map(|i| &self.features[i])
            .ok_or(Error::ActionNotLegal { action: action.0 })
    }

    /// Best-minus-worst value spread at the current decision point.
    pub fn current_spread(&self) -> f64 {
        if self.q_values.is_empty() {
            return 0.0;
        }
        let max = self.q_values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = self.q_values.iter().copied().fold(f64::INFINITY, f64::min);
        max - min
    }

    /// Running average of recent spreads.
    pub fn average_spread(&self) -> f64 {
        self.spreads.iter().sum::<f64>() / SPREAD_WINDOW as f64
    }

    /// The n-th smallest of the recent spreads (n indexes the 100-slot
    /// window, so it doubles as a percentile).
    pub fn nth_spread(&self, n: usize) -> f64 {
        let mut sorted = self.spreads;
        sorted.sort_by(|a, b| a.partial_cmp(b).expect("spreads are finite"));
        sorted[n.min(SPREAD_WINDOW - 1)]
    }

    pub(crate) fn pending_advised_states(&self) -> usize {
        self.advised_states.len()
    }
}
