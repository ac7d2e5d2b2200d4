//! Learning-curve runner
//!
//! Alternates blocks of training episodes with blocks of frozen
//! evaluation episodes, recording one curve point per block. Episodes are
//! bounded by a hard step ceiling so a non-terminating simulation cannot
//! hang a run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    pipeline::curve::LearningCurve,
    ports::{
        environment::{Environment, OpponentPolicy},
        learner::Learner,
        observer::Observer,
    },
    sarsa::SarsaAgent,
};

/// Builds a fresh environment for each episode.
pub type EnvironmentFactory<'a> = dyn FnMut() -> Box<dyn Environment> + 'a;

/// Learning-curve configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveConfig {
    /// Curve points after the untrained baseline
    pub points: usize,

    /// Training episodes per curve point
    pub train_per_point: usize,

    /// Evaluation episodes per curve point
    pub test_per_point: usize,

    /// Independent curves to generate and average
    pub repeats: usize,

    /// Hard per-episode step ceiling
    pub step_limit: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            points: 100,
            train_per_point: 10,
            test_per_point: 30,
            repeats: 30,
            step_limit: 15_000,
            seed: None,
        }
    }
}

impl CurveConfig {
    /// Save configuration to a JSON file
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }
}

/// Plain SARSA(λ) learner without a teacher.
pub struct SarsaLearner {
    agent: SarsaAgent,
    name: String,
}

impl SarsaLearner {
    pub fn new(agent: SarsaAgent, name: impl Into<String>) -> Self {
        Self {
            agent,
            name: name.into(),
        }
    }

    pub fn agent(&self) -> &SarsaAgent {
        &self.agent
    }
}

impl Learner for SarsaLearner {
    fn start_episode(&mut self, env: &dyn Environment, test_mode: bool) -> Result<()> {
        self.agent.start_episode(env, test_mode)
    }

    fn select_move(&mut self, _env: &dyn Environment) -> Result<crate::ports::environment::Action> {
        self.agent.current_move()
    }

    fn process_step(&mut self, env: &dyn Environment) -> Result<()> {
        self.agent.process_step(env)
    }

    fn save_policy(&self, path: &Path) -> Result<()> {
        self.agent.save_policy(path)
    }

    fn set_rng_seed(&mut self, seed: u64) -> Result<()> {
        self.agent.set_rng_seed(seed);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Generates one learning curve for a learner.
pub struct CurveRunner {
    config: CurveConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl CurveRunner {
    pub fn new(config: CurveConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the runner
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &CurveConfig {
        &self.config
    }

    /// Run one episode to completion or the step ceiling.
    ///
    /// Returns the final score and the number of steps taken.
    pub fn episode(
        &self,
        learner: &mut dyn Learner,
        env: &mut dyn Environment,
        opponent: &mut dyn OpponentPolicy,
        test_mode: bool,
    ) -> Result<(f64, usize)> {
        learner.start_episode(env, test_mode)?;
        let mut steps = 0;
        while !env.is_over() && steps < self.config.step_limit {
            let action = learner.select_move(env)?;
            let opponent_action = opponent.select(env);
            env.advance(action, opponent_action);
            learner.process_step(env)?;
            steps += 1;
        }
        Ok((env.score(), steps))
    }

    /// Mean score over a block of frozen evaluation episodes.
    pub fn evaluate(
        &self,
        learner: &mut dyn Learner,
        env_factory: &mut EnvironmentFactory,
        opponent: &mut dyn OpponentPolicy,
    ) -> Result<f64> {
        if self.config.test_per_point == 0 {
            return Err(Error::InvalidConfiguration {
                message: String::from("test_per_point must be at least 1"),
            });
        }
        let mut sum = 0.0;
        for _ in 0..self.config.test_per_point {
            let mut env = env_factory();
            let (score, _) = self.episode(learner, env.as_mut(), opponent, true)?;
            sum += score;
        }
        Ok(sum / self.config.test_per_point as f64)
    }

    /// Generate a full learning curve.
    ///
    /// Point 0 is the untrained baseline; each further point follows a
    /// block of training episodes whose telemetry is summed into the
    /// point's data columns.
    pub fn run_curve(
        &mut self,
        learner: &mut dyn Learner,
        env_factory: &mut EnvironmentFactory,
        opponent: &mut dyn OpponentPolicy,
    ) -> Result<LearningCurve> {
        if let Some(seed) = self.config.seed {
            learner.set_rng_seed(seed)?;
        }

        let mut curve = LearningCurve::new(self.config.points + 1, self.config.train_per_point);
        for observer in &mut self.observers {
            observer.on_curve_start(self.config.points + 1)?;
        }

        // Untrained baseline
        let initial_data = learner.episode_data();
        let initial_score = self.evaluate(learner, env_factory, opponent)?;
        curve.set(0, initial_score, initial_data.clone())?;
        for observer in &mut self.observers {
            observer.on_point_end(0, initial_score)?;
        }

        for point in 1..=self.config.points {
            let mut data = vec![0.0; initial_data.len()];
            for episode_num in 0..self.config.train_per_point {
                let mut env = env_factory();
                let (_, steps) = self.episode(learner, env.as_mut(), opponent, false)?;
                for (total, value) in data.iter_mut().zip(learner.episode_data()) {
                    *total += value;
                }
                for observer in &mut self.observers {
                    observer.on_episode_end(point, episode_num, steps)?;
                }
            }

            let score = self.evaluate(learner, env_factory, opponent)?;
            curve.set(point, score, data)?;
            for observer in &mut self.observers {
                observer.on_point_end(point, score)?;
            }
        }

        for observer in &mut self.observers {
            observer.on_curve_end()?;
        }
        Ok(curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::FeatureVector,
        ports::environment::{Action, FeatureExtractor},
        sarsa::agent::Hyperparameters,
    };

    /// Environment scoring one point per step, over after `limit` steps.
    struct CountingEnv {
        steps: usize,
        limit: usize,
    }

    impl Environment for CountingEnv {
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

    struct StillOpponent;

    impl OpponentPolicy for StillOpponent {
        fn select(&mut self, _env: &dyn Environment) -> Action {
            Action(0)
        }
    }

    struct PairExtractor;

    impl FeatureExtractor for PairExtractor {
        fn len(&self) -> usize {
            2
        }

        fn extract(&self, _env: &dyn Environment, action: Action) -> FeatureVector {
            let mut values = vec![0.0; 2];
            values[action.0] = 1.0;
            FeatureVector::new(values)
        }
    }

    fn test_learner() -> SarsaLearner {
        let agent =
            SarsaAgent::new(Box::new(PairExtractor), Hyperparameters::default()).with_seed(0);
        SarsaLearner::new(agent, "sarsa")
    }

    #[test]
    fn step_ceiling_bounds_a_non_terminating_episode() {
        let runner = CurveRunner::new(CurveConfig {
            step_limit: 25,
            ..CurveConfig::default()
        });
        let mut learner = test_learner();
        // Never terminates on its own.
        let mut env = CountingEnv {
            steps: 0,
            limit: usize::MAX,
        };
        let (_, steps) = runner
            .episode(&mut learner, &mut env, &mut StillOpponent, false)
            .unwrap();
        assert_eq!(steps, 25);
    }

    #[test]
    fn curve_has_baseline_plus_configured_points() {
        let mut runner = CurveRunner::new(CurveConfig {
            points: 3,
            train_per_point: 2,
            test_per_point: 2,
            repeats: 1,
            step_limit: 50,
            seed: Some(9),
        });
        let mut learner = test_learner();
        let mut factory = || -> Box<dyn Environment> {
            Box::new(CountingEnv {
                steps: 0,
                limit: 10,
            })
        };

        let curve = runner
            .run_curve(&mut learner, &mut factory, &mut StillOpponent)
            .unwrap();
        assert_eq!(curve.len(), 4);
        // Every episode of CountingEnv ends at score 10.
        for i in 0..4 {
            assert!((curve.score(i) - 10.0).abs() < 1e-12);
        }
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = CurveConfig {
            points: 7,
            seed: Some(3),
            ..CurveConfig::default()
        };
        let file = tempfile::NamedTempFile::new().unwrap();
        config.save(file.path()).unwrap();
        let loaded = CurveConfig::load(file.path()).unwrap();
        assert_eq!(loaded.points, 7);
        assert_eq!(loaded.seed, Some(3));
        assert_eq!(loaded.step_limit, config.step_limit);
    }
}
