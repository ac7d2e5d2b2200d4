//! Apprentice CLI - teacher-student advice experiments
//!
//! This CLI provides a unified interface for:
//! - Training advised or independent students and recording curves
//! - Evaluating saved policies over frozen episodes
//! - Comparing training runs statistically

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "apprentice")]
#[command(version, about = "Teacher-student advice experiments", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a student and record learning curves
    Train(Box<apprentice::cli::commands::train::TrainArgs>),

    /// Evaluate a saved policy over frozen episodes
    Evaluate(apprentice::cli::commands::evaluate::EvaluateArgs),

    /// Compare two training runs by areas under their curves
    Compare(apprentice::cli::commands::compare::CompareArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => apprentice::cli::commands::train::execute(*args),
        Commands::Evaluate(args) => apprentice::cli::commands::evaluate::execute(args),
        Commands::Compare(args) => apprentice::cli::commands::compare::execute(args),
    }
}
