//! Teaching strategies - budget-bounded advice predicates
//!
//! All variants share one contract: `give_advice` consumes one unit of the
//! run-long budget only when it returns true, and `in_use` reports whether
//! budget remains. They differ only in the predicate.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{ports::environment::Action, sarsa::SarsaAgent};

/// Decides whether the teacher's advice is actually given this step.
///
/// The `evaluator` argument is the agent whose certainty drives the
/// predicate; the orchestrator passes the teacher or the student depending
/// on the configured initiator.
pub trait TeachingStrategy: Send {
    /// Reset per-episode bookkeeping. The budget persists for the run.
    fn start_episode(&mut self) {}

    /// Whether budget remains.
    fn in_use(&self) -> bool;

    /// Decide, consuming one unit of budget on a positive answer.
    fn give_advice(&mut self, evaluator: &SarsaAgent, choice: Action, advice: Action) -> bool;

    /// Whether the last evaluated state crossed the strategy's importance
    /// predicate even though advice may have been withheld. Used for
    /// importance-classifier labeling.
    fn last_state_important(&self) -> bool {
        false
    }

    /// Strategy-specific telemetry appended to per-episode data.
    fn episode_data(&self) -> Vec<f64> {
        Vec::new()
    }
}

/// Advise whenever the evaluator's value spread exceeds a threshold.
pub struct AdviseImportantStates {
    remaining: u32,
    threshold: f64,
    last_important: bool,
}

impl AdviseImportantStates {
    pub fn new(budget: u32, threshold: f64) -> Self {
        Self {
            remaining: budget,
            threshold,
            last_important: false,
        }
    }
}

impl TeachingStrategy for AdviseImportantStates {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, evaluator: &SarsaAgent, _choice: Action, _advice: Action) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.last_important = evaluator.current_spread() > self.threshold;
        if self.last_important {
            self.remaining -= 1;
            return true;
        }
        false
    }

    fn last_state_important(&self) -> bool {
        self.last_important
    }
}

/// Advise when the evaluator's spread exceeds a threshold and the student's
/// choice differs from the advice.
pub struct CorrectImportantMistakes {
    remaining: u32,
    threshold: f64,
    last_important: bool,
}

impl CorrectImportantMistakes {
    pub fn new(budget: u32, threshold: f64) -> Self {
        Self {
            remaining: budget,
            threshold,
            last_important: false,
        }
    }
}

impl TeachingStrategy for CorrectImportantMistakes {
    fn start_episode(&mut self) {
        self.last_important = false;
    }

    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, evaluator: &SarsaAgent, choice: Action, advice: Action) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.last_important = evaluator.current_spread() > self.threshold;
        if self.last_important && choice != advice {
            self.remaining -= 1;
            return true;
        }
        false
    }

    fn last_state_important(&self) -> bool {
        self.last_important
    }
}

/// Advise with fixed probability, independent of state.
pub struct AdviseRandom {
    remaining: u32,
    probability: f64,
    rng: StdRng,
}

impl AdviseRandom {
    pub fn new(budget: u32, probability: f64, seed: Option<u64>) -> Self {
        Self {
            remaining: budget,
            probability,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            },
        }
    }
}

impl TeachingStrategy for AdviseRandom {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, _evaluator: &SarsaAgent, _choice: Action, _advice: Action) -> bool {
        if self.remaining > 0 && self.rng.random::<f64>() < self.probability {
            self.remaining -= 1;
            return true;
        }
        false
    }
}

/// Advise with fixed probability, but only on mistakes.
pub struct CorrectMistakesRandomly {
    remaining: u32,
    probability: f64,
    rng: StdRng,
}

impl CorrectMistakesRandomly {
    pub fn new(budget: u32, probability: f64, seed: Option<u64>) -> Self {
        Self {
            remaining: budget,
            probability,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_rng(&mut rand::rng()),
            },
        }
    }
}

impl TeachingStrategy for CorrectMistakesRandomly {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, _evaluator: &SarsaAgent, choice: Action, advice: Action) -> bool {
        if self.remaining > 0 && self.rng.random::<f64>() < self.probability && choice != advice {
            self.remaining -= 1;
            return true;
        }
        false
    }
}

/// Advise when the student's own value spread is *below* a threshold: the
/// student is uncertain, regardless of correctness.
pub struct UncertainStates {
    remaining: u32,
    threshold: f64,
}

impl UncertainStates {
    pub fn new(budget: u32, threshold: f64) -> Self {
        Self {
            remaining: budget,
            threshold,
        }
    }
}

impl TeachingStrategy for UncertainStates {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, evaluator: &SarsaAgent, _choice: Action, _advice: Action) -> bool {
        if self.remaining > 0 && evaluator.current_spread() < self.threshold {
            self.remaining -= 1;
            return true;
        }
        false
    }
}

/// Advise when the student is uncertain and the choice was a mistake.
pub struct UncertainMistakes {
    remaining: u32,
    threshold: f64,
}

impl UncertainMistakes {
    pub fn new(budget: u32, threshold: f64) -> Self {
        Self {
            remaining: budget,
            threshold,
        }
    }
}

impl TeachingStrategy for UncertainMistakes {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, evaluator: &SarsaAgent, choice: Action, advice: Action) -> bool {
        if self.remaining > 0
            && evaluator.current_spread() < self.threshold
            && choice != advice
        {
            self.remaining -= 1;
            return true;
        }
        false
    }
}

/// Like [`UncertainMistakes`], but the uncertainty threshold is the
/// student's own running n-th-percentile spread instead of a constant.
pub struct PercentileUncertainMistakes {
    remaining: u32,
    percentile: usize,
}

impl PercentileUncertainMistakes {
    pub fn new(budget: u32, percentile: usize) -> Self {
        Self {
            remaining: budget,
            percentile,
        }
    }
}

impl TeachingStrategy for PercentileUncertainMistakes {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn give_advice(&mut self, evaluator: &SarsaAgent, choice: Action, advice: Action) -> bool {
        if self.remaining > 0
            && evaluator.current_spread() < evaluator.nth_spread(self.percentile)
            && choice != advice
        {
            self.remaining -= 1;
            return true;
        }
        false
    }
}
