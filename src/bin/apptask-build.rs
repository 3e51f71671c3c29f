//! apptask-build
//! Type check and build the frontend for the web or as a Tauri desktop app

use anyhow::Result;
use apptask::{BuildFlags, CommandStepRunner, Config, Toolchain, run_build};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "apptask-build")]
#[command(about = "Type check, then build the web bundle or the Tauri desktop app")]
struct Cli {
    /// Build the Tauri desktop app instead of the web bundle
    #[arg(long)]
    tauri: bool,
    /// Stop after the type check
    #[arg(long)]
    check_only: bool,
    /// Skip the type check
    #[arg(long)]
    skip_check: bool,
    /// Frontend project directory
    #[arg(short = 'C', long, default_value = ".")]
    project_dir: PathBuf,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(&cli.project_dir)?;
    let toolchain = Toolchain::detect(&config);
    let flags = BuildFlags {
        tauri: cli.tauri,
        check_only: cli.check_only,
        skip_check: cli.skip_check,
    };

    let outcome = run_build(flags, &config, &toolchain, &mut CommandStepRunner);
    Ok(outcome.exit_code())
}
