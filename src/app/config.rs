//! Experiment configuration and strategy-token parsing
//!
//! Strategies are configured by compact tokens: a name prefix plus a
//! numeric suffix, like `correct200`, `crandom25`, or `pcstuunc80`.
//! Parsing is separated from construction so a bad token fails fast with
//! a configuration error instead of surfacing mid-run.

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    sarsa::{Hyperparameters, SarsaAgent},
    teaching::{
        AdviseImportantStates, AdviseRandom, AdvisedLearner, AttentionMode,
        CorrectImportantMistakes, CorrectMistakesRandomly, Initiator,
        PercentileUncertainMistakes, TeacherCertaintyAttention, TeachingStrategy,
        UncertainMistakes, UncertainStates,
    },
};

/// A parsed teaching-strategy token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategySpec {
    /// `advise<t>`: teacher spread above `t`
    Advise { threshold: f64 },
    /// `correct<t>`: teacher spread above `t` and the choice is a mistake
    Correct { threshold: f64 },
    /// `random<p>`: probability `p` percent
    Random { probability: f64 },
    /// `crandom<p>`: probability `p` percent, mistakes only
    CorrectRandom { probability: f64 },
    /// `stuunc<t>`: student spread below `t`
    Uncertain { threshold: f64 },
    /// `cstuunc<t>`: student spread below `t` and the choice is a mistake
    UncertainMistakes { threshold: f64 },
    /// `pcstuunc<n>`: student spread below its running n-th percentile,
    /// mistakes only
    PercentileUncertainMistakes { percentile: usize },
}

fn numeric_suffix(token: &str, prefix: &str) -> Result<f64> {
    let suffix = &token[prefix.len()..];
    suffix
        .parse::<f64>()
        .map_err(|e| Error::InvalidStrategyParameter {
            token: token.to_string(),
            reason: format!("'{suffix}': {e}"),
        })
}

impl StrategySpec {
    /// Parse a strategy token.
    ///
    /// Longer prefixes are checked first so `cstuunc` is not mistaken for
    /// a malformed `stuunc`.
    pub fn parse(token: &str) -> Result<Self> {
        if let Some(suffix) = token.strip_prefix("pcstuunc") {
            let percentile =
                suffix
                    .parse::<usize>()
                    .map_err(|e| Error::InvalidStrategyParameter {
                        token: token.to_string(),
                        reason: format!("'{suffix}': {e}"),
                    })?;
            if percentile > 99 {
                return Err(Error::InvalidStrategyParameter {
                    token: token.to_string(),
                    reason: format!("percentile {percentile} is out of the 0..=99 range"),
                });
            }
            return Ok(Self::PercentileUncertainMistakes { percentile });
        }
        if token.starts_with("cstuunc") {
            return Ok(Self::UncertainMistakes {
                threshold: numeric_suffix(token, "cstuunc")?,
            });
        }
        if token.starts_with("stuunc") {
            return Ok(Self::Uncertain {
                threshold: numeric_suffix(token, "stuunc")?,
            });
        }
        if token.starts_with("crandom") {
            return Ok(Self::CorrectRandom {
                probability: numeric_suffix(token, "crandom")? / 100.0,
            });
        }
        if token.starts_with("random") {
            return Ok(Self::Random {
                probability: numeric_suffix(token, "random")? / 100.0,
            });
        }
        if token.starts_with("correct") {
            return Ok(Self::Correct {
                threshold: numeric_suffix(token, "correct")?,
            });
        }
        if token.starts_with("advise") {
            return Ok(Self::Advise {
                threshold: numeric_suffix(token, "advise")?,
            });
        }
        Err(Error::UnknownStrategy {
            token: token.to_string(),
        })
    }

    /// Construct the strategy with the given run-long budget.
    pub fn build(&self, budget: u32, seed: Option<u64>) -> Box<dyn TeachingStrategy> {
        match *self {
            Self::Advise { threshold } => Box::new(AdviseImportantStates::new(budget, threshold)),
            Self::Correct { threshold } => {
                Box::new(CorrectImportantMistakes::new(budget, threshold))
            }
            Self::Random { probability } => Box::new(AdviseRandom::new(budget, probability, seed)),
            Self::CorrectRandom { probability } => {
                Box::new(CorrectMistakesRandomly::new(budget, probability, seed))
            }
            Self::Uncertain { threshold } => Box::new(UncertainStates::new(budget, threshold)),
            Self::UncertainMistakes { threshold } => {
                Box::new(UncertainMistakes::new(budget, threshold))
            }
            Self::PercentileUncertainMistakes { percentile } => {
                Box::new(PercentileUncertainMistakes::new(budget, percentile))
            }
        }
    }
}

/// A parsed attention token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttentionSpec {
    /// `always`
    Always,
    /// `avg`: student spread above its running average
    AvgUncertainty,
    /// `threshold<t>`: student spread above `t`
    Threshold { threshold: f64 },
    /// `predict<n>`: classifier-gated after `n` pieces of advice
    Predicted { start: u32 },
    /// `certainty<t>`: budgeted gate on the teacher's spread below `t`
    Certainty { threshold: f64 },
    /// `none`
    None,
}

const ATTENTION_TOKENS: &str = "always, avg, threshold<t>, predict<n>, certainty<t>, none";

impl AttentionSpec {
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "always" => return Ok(Self::Always),
            "avg" => return Ok(Self::AvgUncertainty),
            "none" => return Ok(Self::None),
            _ => {}
        }
        let invalid = |suffix: &str, e: &dyn std::fmt::Display| Error::InvalidStrategyParameter {
            token: token.to_string(),
            reason: format!("'{suffix}': {e}"),
        };
        if let Some(suffix) = token.strip_prefix("threshold") {
            return Ok(Self::Threshold {
                threshold: suffix.parse::<f64>().map_err(|e| invalid(suffix, &e))?,
            });
        }
        if let Some(suffix) = token.strip_prefix("predict") {
            return Ok(Self::Predicted {
                start: suffix.parse::<u32>().map_err(|e| invalid(suffix, &e))?,
            });
        }
        if let Some(suffix) = token.strip_prefix("certainty") {
            return Ok(Self::Certainty {
                threshold: suffix.parse::<f64>().map_err(|e| invalid(suffix, &e))?,
            });
        }
        Err(Error::UnknownAttention {
            token: token.to_string(),
            expected: ATTENTION_TOKENS.to_string(),
        })
    }

    /// Construct the attention mode with the given attention budget.
    pub fn build(&self, budget: u32) -> AttentionMode {
        match *self {
            Self::Always => AttentionMode::Always,
            Self::AvgUncertainty => AttentionMode::AvgUncertainty,
            Self::Threshold { threshold } => AttentionMode::Threshold(threshold),
            Self::Predicted { start } => AttentionMode::Predicted { start },
            Self::Certainty { threshold } => {
                AttentionMode::Strategy(Box::new(TeacherCertaintyAttention::new(budget, threshold)))
            }
            Self::None => AttentionMode::None,
        }
    }
}

/// Parse an initiator token (`teacher` or `student`).
pub fn parse_initiator(token: &str) -> Result<Initiator> {
    match token {
        "teacher" => Ok(Initiator::Teacher),
        "student" => Ok(Initiator::Student),
        _ => Err(Error::UnknownInitiator {
            token: token.to_string(),
        }),
    }
}

/// Full configuration of an advised training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Teaching-strategy token
    pub strategy: String,

    /// Attention token
    pub attention: String,

    /// Initiator token (`teacher` or `student`)
    pub initiator: String,

    /// Run-long advice budget
    pub advice_budget: u32,

    /// Run-long attention budget
    pub attention_budget: u32,

    /// Student (and teacher) hyperparameters
    pub hyperparameters: Hyperparameters,

    /// Curve shape and seeding
    pub curve: crate::pipeline::CurveConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            strategy: String::from("correct200"),
            attention: String::from("always"),
            initiator: String::from("teacher"),
            advice_budget: 1000,
            attention_budget: 1000,
            hyperparameters: Hyperparameters::default(),
            curve: crate::pipeline::CurveConfig::default(),
        }
    }
}

impl ExperimentConfig {
    /// Validate all tokens without constructing anything.
    pub fn validate(&self) -> Result<()> {
        StrategySpec::parse(&self.strategy)?;
        AttentionSpec::parse(&self.attention)?;
        parse_initiator(&self.initiator)?;
        Ok(())
    }

    /// A compact run label used for directory and report naming.
    pub fn run_label(&self) -> String {
        format!("{}_{}_{}", self.strategy, self.attention, self.initiator)
    }

    /// Wire an advised learner from this configuration.
    ///
    /// The teacher agent is expected to carry a pre-trained policy; it is
    /// run frozen for the whole training run.
    pub fn build_learner(&self, teacher: SarsaAgent, student: SarsaAgent) -> Result<AdvisedLearner> {
        let strategy = StrategySpec::parse(&self.strategy)?;
        let attention = AttentionSpec::parse(&self.attention)?;
        let initiator = parse_initiator(&self.initiator)?;

        Ok(AdvisedLearner::new(
            teacher,
            student,
            strategy.build(self.advice_budget, self.curve.seed),
            attention.build(self.attention_budget),
            initiator,
        )
        .with_name(self.run_label()))
    }

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
