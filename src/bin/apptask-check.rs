//! apptask-check
//! Type check, quality script and source scans, with a pass/fail summary

use anyhow::Result;
use apptask::check::{CheckFlags, searcher_for};
use apptask::{CommandStepRunner, Config, Toolchain, run_checks};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "apptask-check")]
#[command(about = "Run the frontend code quality checks")]
struct Cli {
    /// Only run the TypeScript type check
    #[arg(long)]
    quick: bool,
    /// Frontend project directory
    #[arg(short = 'C', long, default_value = ".")]
    project_dir: PathBuf,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(&cli.project_dir)?;
    let toolchain = Toolchain::detect(&config);
    let searcher = searcher_for(&config);

    let summary = run_checks(
        CheckFlags { quick: cli.quick },
        &config,
        &toolchain,
        &mut CommandStepRunner,
        searcher.as_ref(),
    );
    Ok(summary.exit_code())
}
