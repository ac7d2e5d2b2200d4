//! Evaluate command - measure a saved policy without learning

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output,
    pipeline::{CurveConfig, CurveRunner, SarsaLearner},
    ports::environment::Environment,
    sarsa::{Hyperparameters, SarsaAgent},
    sim::{CorridorExtractor, CorridorWorld, Pursuer},
};

#[derive(Parser, Debug)]
#[command(about = "Evaluate a saved policy over frozen episodes")]
pub struct EvaluateArgs {
    /// Weight file of the policy to evaluate
    pub policy: PathBuf,

    /// Number of evaluation episodes
    #[arg(long, short = 'e', default_value_t = 30)]
    pub episodes: usize,

    /// Hard per-episode step ceiling
    #[arg(long, default_value_t = 15_000)]
    pub step_limit: usize,

    /// Corridor length for the simulation
    #[arg(long, default_value_t = 21)]
    pub corridor_length: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: EvaluateArgs) -> Result<()> {
    let mut agent = SarsaAgent::new(Box::new(CorridorExtractor), Hyperparameters::default());
    if let Some(seed) = args.seed {
        agent = agent.with_seed(seed);
    }
    agent
        .load_policy(&args.policy)
        .with_context(|| format!("loading policy '{}'", args.policy.display()))?;
    let mut learner = SarsaLearner::new(agent, "evaluated");

    let template = CorridorWorld::new(args.corridor_length)?;
    let runner = CurveRunner::new(CurveConfig {
        test_per_point: args.episodes,
        step_limit: args.step_limit,
        seed: args.seed,
        ..CurveConfig::default()
    });

    let spinner = output::create_spinner(&format!(
        "Evaluating {} over {} episodes...",
        args.policy.display(),
        args.episodes
    ));
    let mut factory = || -> Box<dyn Environment> { Box::new(template.clone()) };
    let mean = runner.evaluate(&mut learner, &mut factory, &mut Pursuer)?;
    spinner.finish_and_clear();

    output::print_section("Evaluation");
    output::print_kv("policy", &args.policy.display().to_string());
    output::print_kv("episodes", &args.episodes.to_string());
    output::print_kv("mean score", &format!("{mean:.2}"));
    Ok(())
}
