//! Compare command - t-test over the curve areas of two runs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::output,
    pipeline::{LearningCurve, compare_curve_areas},
};

#[derive(Parser, Debug)]
#[command(about = "Compare two training runs by areas under their curves")]
pub struct CompareArgs {
    /// Run directory of the first learner (holds curve0, curve1, ...)
    pub run_a: PathBuf,

    /// Run directory of the second learner
    pub run_b: PathBuf,

    /// Curves to load per run
    #[arg(long, default_value_t = 30)]
    pub repeats: usize,

    /// Training episodes per curve point (the curve x-axis spacing)
    #[arg(long, default_value_t = 10)]
    pub train_per_point: usize,

    /// Significance level
    #[arg(long, default_value_t = 0.05)]
    pub alpha: f64,

    /// Export the test result to a JSON file
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

fn load_curves(dir: &Path, repeats: usize, train_per_point: usize) -> Result<Vec<LearningCurve>> {
    (0..repeats)
        .map(|i| {
            let path = dir.join(format!("curve{i}"));
            LearningCurve::load(&path, train_per_point)
                .with_context(|| format!("loading curve '{}'", path.display()))
        })
        .collect()
}

pub fn execute(args: CompareArgs) -> Result<()> {
    let curves_a = load_curves(&args.run_a, args.repeats, args.train_per_point)?;
    let curves_b = load_curves(&args.run_b, args.repeats, args.train_per_point)?;

    let result = compare_curve_areas(&curves_a, &curves_b)?;

    output::print_section("Curve-area comparison");
    output::print_kv("run A", &args.run_a.display().to_string());
    output::print_kv("run B", &args.run_b.display().to_string());
    output::print_kv("mean area A", &format!("{:.2}", result.mean_a));
    output::print_kv("mean area B", &format!("{:.2}", result.mean_b));
    output::print_kv("t", &format!("{:.4}", result.t));
    output::print_kv("dof", &format!("{:.2}", result.dof));
    output::print_kv("p-value", &format!("{:.4}", result.p_value));

    if result.significant(args.alpha) {
        let better = if result.mean_a > result.mean_b { "A" } else { "B" };
        println!(
            "\nRun {better} is better at the {:.0}% significance level.",
            args.alpha * 100.0
        );
    } else {
        println!(
            "\nNo significant difference at the {:.0}% significance level.",
            args.alpha * 100.0
        );
    }

    if let Some(path) = &args.output {
        result.save(path)?;
        println!("Result exported to: {}", path.display());
    }
    Ok(())
}
