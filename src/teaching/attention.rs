//! Attention strategies - budgeted gates on soliciting advice
//!
//! Attention draws from its own budget, independent of the teaching
//! strategy's; both must permit advice for it to occur.

use crate::sarsa::SarsaAgent;

/// Decides whether the student requests the teacher's attention before
/// advice can occur.
pub trait AttentionStrategy: Send {
    /// Per-episode reset hook.
    fn start_episode(&mut self) {}

    /// Whether attention budget remains.
    fn in_use(&self) -> bool;

    /// Decide, consuming one unit of budget on a positive answer.
    fn ask_for_advice(&mut self, agent: &SarsaAgent) -> bool;
}

/// Asks for attention when the gating agent's own value spread is below a
/// threshold: the agent is itself uncertain about the state.
pub struct TeacherCertaintyAttention {
    remaining: u32,
    threshold: f64,
}

impl TeacherCertaintyAttention {
    pub fn new(budget: u32, threshold: f64) -> Self {
        Self {
            remaining: budget,
            threshold,
        }
    }
}

impl AttentionStrategy for TeacherCertaintyAttention {
    fn in_use(&self) -> bool {
        self.remaining > 0
    }

    fn ask_for_advice(&mut self, agent: &SarsaAgent) -> bool {
        if self.remaining > 0 && agent.current_spread() < self.threshold {
            self.remaining -= 1;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::FeatureVector,
        ports::environment::{Action, Environment, FeatureExtractor},
        sarsa::agent::Hyperparameters,
    };

    struct PairEnv;

    impl Environment for PairEnv {
        fn legal_actions(&self) -> Vec<Action> {
            vec![Action(0), Action(1)]
        }

        fn advance(&mut self, _learner: Action, _opponent: Action) {}

        fn is_over(&self) -> bool {
            false
        }

        fn score(&self) -> f64 {
            0.0
        }
    }

    struct OneHot;

    impl FeatureExtractor for OneHot {
        fn len(&self) -> usize {
            2
        }

        fn extract(&self, _env: &dyn Environment, action: Action) -> FeatureVector {
            let mut values = vec![0.0; 2];
            values[action.0] = 1.0;
            FeatureVector::new(values)
        }
    }

    fn agent_with_spread(spread: f64) -> SarsaAgent {
        let mut agent =
            SarsaAgent::new(Box::new(OneHot), Hyperparameters::default()).with_seed(0);
        agent
            .value_function_mut()
            .set_weights_for_test(vec![0.0, spread], 0.0);
        agent.start_episode(&PairEnv, true).unwrap();
        agent
    }

    #[test]
    fn asks_only_below_threshold() {
        let uncertain = agent_with_spread(2.0);
        let certain = agent_with_spread(50.0);

        let mut attention = TeacherCertaintyAttention::new(10, 10.0);
        assert!(attention.ask_for_advice(&uncertain));
        assert!(!attention.ask_for_advice(&certain));
    }

    #[test]
    fn attention_budget_is_consumable() {
        let uncertain = agent_with_spread(2.0);
        let mut attention = TeacherCertaintyAttention::new(2, 10.0);

        assert!(attention.ask_for_advice(&uncertain));
        assert!(attention.ask_for_advice(&uncertain));
        assert!(!attention.in_use());
        assert!(!attention.ask_for_advice(&uncertain));
    }
}
