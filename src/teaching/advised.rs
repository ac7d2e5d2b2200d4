//! Advised learner - composes student, teacher, and strategies
//!
//! The orchestration state machine per decision point: obtain the
//! student's intended action, decide whether to solicit the teacher's
//! attention, decide whether advice is actually given, and if so override
//! the student's move and register the state for the max-update. The
//! teacher runs frozen (test mode) for the whole run.

use std::path::Path;

use crate::{
    Result,
    importance::ImportanceClassifier,
    ports::{
        environment::{Action, Environment},
        learner::Learner,
    },
    sarsa::SarsaAgent,
    teaching::{attention::AttentionStrategy, strategies::TeachingStrategy},
};

/// Whose certainty drives the teaching predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initiator {
    Teacher,
    Student,
}

/// How the student decides whether to solicit the teacher's attention.
pub enum AttentionMode {
    /// Solicit at every decision point.
    Always,
    /// Solicit when the current spread exceeds the running average spread.
    AvgUncertainty,
    /// Solicit when the current spread exceeds a fixed threshold.
    Threshold(f64),
    /// Solicit unconditionally until `start` pieces of advice have been
    /// given, then only when the importance classifier predicts the state
    /// is advice-worthy.
    Predicted { start: u32 },
    /// Delegate to a budgeted attention strategy.
    Strategy(Box<dyn AttentionStrategy>),
    /// Never solicit.
    None,
}

/// A student agent that may receive action advice from a frozen teacher.
pub struct AdvisedLearner {
    teacher: SarsaAgent,
    student: SarsaAgent,
    strategy: Box<dyn TeachingStrategy>,
    attention: AttentionMode,
    initiator: Initiator,
    classifier: ImportanceClassifier,
    name: String,

    test_mode: bool,
    episode: u32,
    advice_count: u32,
    attention_count: u32,
    episode_length: u32,
    total_advice: u32,
}

impl AdvisedLearner {
    pub fn new(
        teacher: SarsaAgent,
        student: SarsaAgent,
        strategy: Box<dyn TeachingStrategy>,
        attention: AttentionMode,
        initiator: Initiator,
    ) -> Self {
        Self {
            teacher,
            student,
            strategy,
            attention,
            initiator,
            classifier: ImportanceClassifier::with_perceptron(None),
            name: String::from("advised"),
            test_mode: false,
            episode: 0,
            advice_count: 0,
            attention_count: 0,
            episode_length: 0,
            total_advice: 0,
        }
    }

    pub fn with_classifier(mut self, classifier: ImportanceClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Advice given during the last episode.
    pub fn advice_count(&self) -> u32 {
        self.advice_count
    }

    /// Attention requests during the last episode.
    pub fn attention_count(&self) -> u32 {
        self.attention_count
    }

    /// Advice given over the whole run.
    pub fn total_advice(&self) -> u32 {
        self.total_advice
    }

    pub fn student(&self) -> &SarsaAgent {
        &self.student
    }

    pub fn classifier(&self) -> &ImportanceClassifier {
        &self.classifier
    }

    fn solicit(&mut self, choice: Action) -> Result<bool> {
        match &mut self.attention {
            AttentionMode::Always => Ok(true),
            AttentionMode::AvgUncertainty => {
                Ok(self.student.current_spread() > self.student.average_spread())
            }
            AttentionMode::Threshold(threshold) => Ok(self.student.current_spread() > *threshold),
            AttentionMode::Predicted { start } => {
                if self.total_advice < *start {
                    Ok(true)
                } else if self.episode > 1 && self.classifier.is_trained() {
                    let features = self.student.features_for(choice)?;
                    self.classifier.predict(features)
                } else {
                    Ok(false)
                }
            }
            AttentionMode::Strategy(gate) => {
                if !gate.in_use() {
                    return Ok(false);
                }
                Ok(gate.ask_for_advice(&self.teacher))
            }
            AttentionMode::None => Ok(false),
        }
    }

    fn record_example(&mut self, action: Action, important: bool) -> Result<()> {
        let features = self.student.features_for(action)?.clone();
        self.classifier.record(features, important);
        Ok(())
    }
}

impl Learner for AdvisedLearner {
    fn start_episode(&mut self, env: &dyn Environment, test_mode: bool) -> Result<()> {
        self.test_mode = test_mode;
        if matches!(self.attention, AttentionMode::Predicted { .. }) {
            self.classifier.maybe_retrain(self.total_advice)?;
        }

        self.advice_count = 0;
        self.attention_count = 0;
        self.episode_length = 0;

        self.student.start_episode(env, test_mode)?;
        if !test_mode && self.strategy.in_use() {
            self.strategy.start_episode();
            self.teacher.start_episode(env, true)?;
        }
        if let AttentionMode::Strategy(gate) = &mut self.attention {
            gate.start_episode();
        }
        self.episode += 1;
        Ok(())
    }

    fn select_move(&mut self, env: &dyn Environment) -> Result<Action> {
        let _ = env;
        let choice = self.student.current_move()?;
        self.episode_length += 1;

        if self.test_mode || !self.strategy.in_use() {
            return Ok(choice);
        }

        if self.solicit(choice)? {
            self.attention_count += 1;
            let advice = self.teacher.current_move()?;
            let evaluator = match self.initiator {
                Initiator::Teacher => &self.teacher,
                Initiator::Student => &self.student,
            };
            if self.strategy.give_advice(evaluator, choice, advice) {
                self.student.set_move(advice);
                self.student.record_advised_state(advice)?;
                self.advice_count += 1;
                self.total_advice += 1;
                self.record_example(choice, true)?;
                return Ok(advice);
            }
        }

        self.record_example(choice, false)?;
        Ok(choice)
    }

    fn process_step(&mut self, env: &dyn Environment) -> Result<()> {
        self.student.process_step(env)?;
        if !self.test_mode && self.strategy.in_use() {
            self.teacher.process_step(env)?;
        }
        Ok(())
    }

    fn episode_data(&self) -> Vec<f64> {
        let mut data = vec![
            f64::from(self.advice_count),
            f64::from(self.attention_count),
            f64::from(self.episode_length),
        ];
        data.extend(self.strategy.episode_data());
        data
    }

    fn save_policy(&self, path: &Path) -> Result<()> {
        self.student.save_policy(path)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.student.set_rng_seed(seed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::FeatureVector,
        ports::environment::FeatureExtractor,
        sarsa::agent::Hyperparameters,
        teaching::{
            attention::TeacherCertaintyAttention,
            strategies::{AdviseRandom, CorrectImportantMistakes},
        },
    };

    /// Two-action environment that runs for a fixed number of steps.
    struct StepsEnv {
        steps: usize,
        limit: usize,
    }

    impl StepsEnv {
        fn new(limit: usize) -> Self {
            Self { steps: 0, limit }
        }
    }

    impl Environment for StepsEnv {
        fn legal_actions(&self) -> Vec<Action> {
            vec![Action(0), Action(1)]
        }

        fn advance(&mut self, _learner: Action, _opponent: Action) {
            self.steps += 1;
        }

        fn is_over(&self) -> bool {
            self.steps >= self.limit
        }

        fn score(&self) -> f64 {
            self.steps as f64
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

    /// Teacher that strongly prefers action 1, student that prefers 0.
    /// Exploration is disabled so choices are deterministic.
    fn opposed_pair() -> (SarsaAgent, SarsaAgent) {
        let params = Hyperparameters {
            epsilon: 0.0,
            ..Hyperparameters::default()
        };
        let mut teacher = SarsaAgent::new(Box::new(OneHot), params).with_seed(1);
        teacher
            .value_function_mut()
            .set_weights_for_test(vec![0.0, 10.0], 0.0);
        let mut student = SarsaAgent::new(Box::new(OneHot), params).with_seed(2);
        student
            .value_function_mut()
            .set_weights_for_test(vec![1.0, 0.0], 0.0);
        (teacher, student)
    }

    fn run_episode(learner: &mut AdvisedLearner, limit: usize, test_mode: bool) {
        let mut env = StepsEnv::new(limit);
        learner.start_episode(&env, test_mode).unwrap();
        while !env.is_over() {
            let action = learner.select_move(&env).unwrap();
            env.advance(action, Action(0));
            learner.process_step(&env).unwrap();
        }
    }

    #[test]
    fn advice_overrides_the_student_choice() {
        let (teacher, student) = opposed_pair();
        // Teacher spread 10 exceeds threshold 5 and the student's choice
        // (action 0) differs from the advice (action 1).
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(CorrectImportantMistakes::new(1000, 5.0)),
            AttentionMode::Always,
            Initiator::Teacher,
        );

        let env = StepsEnv::new(3);
        learner.start_episode(&env, false).unwrap();
        let action = learner.select_move(&env).unwrap();
        assert_eq!(action, Action(1));
        assert_eq!(learner.advice_count(), 1);
        assert_eq!(learner.attention_count(), 1);
        assert_eq!(learner.student().pending_advised_states(), 1);
    }

    #[test]
    fn no_advice_in_test_mode() {
        let (teacher, student) = opposed_pair();
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(CorrectImportantMistakes::new(1000, 5.0)),
            AttentionMode::Always,
            Initiator::Teacher,
        );

        run_episode(&mut learner, 5, true);
        assert_eq!(learner.advice_count(), 0);
        assert_eq!(learner.attention_count(), 0);
        assert_eq!(learner.total_advice(), 0);
    }

    #[test]
    fn attention_none_never_solicits() {
        let (teacher, student) = opposed_pair();
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(CorrectImportantMistakes::new(1000, 5.0)),
            AttentionMode::None,
            Initiator::Teacher,
        );

        run_episode(&mut learner, 5, false);
        assert_eq!(learner.attention_count(), 0);
        assert_eq!(learner.advice_count(), 0);
    }

    #[test]
    fn episode_data_concatenates_counters_and_strategy_extras() {
        let (teacher, student) = opposed_pair();
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(AdviseRandom::new(1000, 0.0, Some(0))),
            AttentionMode::Always,
            Initiator::Teacher,
        );

        run_episode(&mut learner, 4, false);
        let data = learner.episode_data();
        // Advice, attention, episode length.
        assert_eq!(data, vec![0.0, 4.0, 4.0]);
    }

    #[test]
    fn negative_examples_accumulate_when_advice_is_withheld() {
        let (teacher, student) = opposed_pair();
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(AdviseRandom::new(1000, 0.0, Some(0))),
            AttentionMode::Always,
            Initiator::Teacher,
        );

        run_episode(&mut learner, 6, false);
        assert_eq!(learner.classifier().example_count(), 6);
    }

    #[test]
    fn certainty_gate_budget_caps_advice_independently() {
        let (teacher, student) = opposed_pair();
        // The teacher's spread (10) is below the gate threshold, so the
        // gate asks while its own budget lasts; the teaching strategy
        // would advise on every step of the episode.
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(CorrectImportantMistakes::new(1000, 5.0)),
            AttentionMode::Strategy(Box::new(TeacherCertaintyAttention::new(2, 20.0))),
            Initiator::Teacher,
        );

        run_episode(&mut learner, 5, false);
        assert_eq!(learner.attention_count(), 2);
        assert_eq!(learner.advice_count(), 2);
        assert_eq!(learner.total_advice(), 2);
    }

    #[test]
    fn total_advice_persists_across_episodes() {
        let (teacher, student) = opposed_pair();
        let mut learner = AdvisedLearner::new(
            teacher,
            student,
            Box::new(CorrectImportantMistakes::new(1000, 5.0)),
            AttentionMode::Always,
            Initiator::Teacher,
        );

        run_episode(&mut learner, 3, false);
        let first = learner.total_advice();
        assert!(first > 0);
        run_episode(&mut learner, 3, false);
        assert!(learner.total_advice() >= first);
    }
}
