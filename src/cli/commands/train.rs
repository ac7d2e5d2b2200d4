//! Train command - generate learning curves for a learner

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    app::ExperimentConfig,
    cli::output,
    pipeline::{CurveConfig, CurveRunner, LearningCurve, SarsaLearner},
    ports::{environment::Environment, learner::Learner},
    sarsa::{Hyperparameters, SarsaAgent},
    sim::{CorridorExtractor, CorridorWorld, Pursuer},
};

#[derive(Parser, Debug)]
#[command(about = "Train a student and record learning curves")]
pub struct TrainArgs {
    /// Teaching-strategy token (e.g. correct200, crandom25, pcstuunc80)
    #[arg(long, default_value = "correct200")]
    pub strategy: String,

    /// Attention token (always, avg, threshold<t>, predict<n>,
    /// certainty<t>, none)
    #[arg(long, default_value = "always")]
    pub attention: String,

    /// Whose certainty drives the teaching predicate (teacher or student)
    #[arg(long, default_value = "teacher")]
    pub initiator: String,

    /// Weight file of the frozen teacher policy
    #[arg(long)]
    pub teacher_policy: Option<PathBuf>,

    /// Train a lone student without a teacher
    #[arg(long, default_value_t = false)]
    pub independent: bool,

    /// Output directory for curves, policies, and the run config
    #[arg(long, short = 'o', default_value = "runs")]
    pub output: PathBuf,

    /// Resume at this repeat, loading earlier curves from the output
    /// directory
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Independent curves to generate and average
    #[arg(long, default_value_t = 30)]
    pub repeats: usize,

    /// Curve points after the untrained baseline
    #[arg(long, default_value_t = 100)]
    pub points: usize,

    /// Training episodes per curve point
    #[arg(long, default_value_t = 10)]
    pub train_per_point: usize,

    /// Evaluation episodes per curve point
    #[arg(long, default_value_t = 30)]
    pub test_per_point: usize,

    /// Hard per-episode step ceiling
    #[arg(long, default_value_t = 15_000)]
    pub step_limit: usize,

    /// Run-long advice budget
    #[arg(long, default_value_t = 1000)]
    pub advice_budget: u32,

    /// Run-long attention budget
    #[arg(long, default_value_t = 1000)]
    pub attention_budget: u32,

    /// Corridor length for the simulation
    #[arg(long, default_value_t = 21)]
    pub corridor_length: usize,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let config = ExperimentConfig {
        strategy: args.strategy.clone(),
        attention: args.attention.clone(),
        initiator: args.initiator.clone(),
        advice_budget: args.advice_budget,
        attention_budget: args.attention_budget,
        hyperparameters: Hyperparameters::default(),
        curve: CurveConfig {
            points: args.points,
            train_per_point: args.train_per_point,
            test_per_point: args.test_per_point,
            repeats: args.repeats,
            step_limit: args.step_limit,
            seed: args.seed,
        },
    };
    if !args.independent {
        config.validate()?;
        if args.teacher_policy.is_none() {
            return Err(anyhow!(
                "--teacher-policy is required unless --independent is set"
            ));
        }
    }

    let run_label = if args.independent {
        String::from("independent")
    } else {
        config.run_label()
    };
    let run_dir = args.output.join(&run_label);
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("creating run directory '{}'", run_dir.display()))?;
    config.save(run_dir.join("config.json"))?;

    // The world template is validated once and cloned per episode.
    let template = CorridorWorld::new(args.corridor_length)?;

    output::print_section(&format!("Training {run_label}"));
    output::print_kv("output", &run_dir.display().to_string());
    output::print_kv("repeats", &args.repeats.to_string());
    output::print_kv(
        "episodes per curve",
        &(args.points * args.train_per_point).to_string(),
    );

    // Load curves from an interrupted run, then generate the rest.
    let mut curves: Vec<LearningCurve> = Vec::with_capacity(args.repeats);
    for i in 0..args.start.min(args.repeats) {
        let path = run_dir.join(format!("curve{i}"));
        curves.push(
            LearningCurve::load(&path, args.train_per_point)
                .with_context(|| format!("loading earlier curve '{}'", path.display()))?,
        );
    }

    let progress = output::create_repeat_progress(args.repeats as u64);
    progress.set_position(curves.len() as u64);

    for i in curves.len()..args.repeats {
        let mut repeat_config = config.clone();
        repeat_config.curve.seed = args.seed.map(|s| s.wrapping_add(i as u64));

        let mut learner = build_learner(&args, &repeat_config)?;
        let mut runner = CurveRunner::new(repeat_config.curve.clone());
        let mut factory = || -> Box<dyn Environment> { Box::new(template.clone()) };

        let curve = runner.run_curve(learner.as_mut(), &mut factory, &mut Pursuer)?;

        learner.save_policy(&run_dir.join(format!("policy{i}")))?;
        curve.save(run_dir.join(format!("curve{i}")))?;
        curves.push(curve);

        // Keep the running average current after every repeat.
        let avg = LearningCurve::average(&curves)?;
        avg.save(run_dir.join("avg_curve"))?;

        progress.set_position((i + 1) as u64);
        progress.set_message(format!(
            "latest final score: {:.1}",
            curves[i].score(curves[i].len() - 1)
        ));
    }
    progress.finish();

    println!("Done.");
    Ok(())
}

fn build_learner(args: &TrainArgs, config: &ExperimentConfig) -> Result<Box<dyn Learner>> {
    let seed = config.curve.seed;

    let mut student = SarsaAgent::new(Box::new(CorridorExtractor), config.hyperparameters);
    if let Some(seed) = seed {
        student = student.with_seed(seed);
    }

    if args.independent {
        return Ok(Box::new(SarsaLearner::new(student, "independent")));
    }

    let policy_path = args
        .teacher_policy
        .as_ref()
        .ok_or_else(|| anyhow!("--teacher-policy is required unless --independent is set"))?;
    let mut teacher = SarsaAgent::new(Box::new(CorridorExtractor), config.hyperparameters);
    if let Some(seed) = seed {
        teacher = teacher.with_seed(seed.wrapping_add(1));
    }
    teacher
        .load_policy(policy_path)
        .with_context(|| format!("loading teacher policy '{}'", policy_path.display()))?;

    Ok(Box::new(config.build_learner(teacher, student)?))
}
