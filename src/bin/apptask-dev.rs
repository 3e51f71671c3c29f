//! apptask-dev
//! Start the frontend dev server in the browser or the Tauri desktop shell

use anyhow::Result;
use apptask::dev::CancellationToken;
use apptask::{Config, DevMode, Toolchain, run_dev};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "apptask-dev")]
#[command(about = "Start the development server")]
struct Cli {
    /// Run the Tauri desktop app instead of the browser dev server
    #[arg(long)]
    tauri: bool,
    /// Frontend project directory
    #[arg(short = 'C', long, default_value = ".")]
    project_dir: PathBuf,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load(&cli.project_dir)?;
    let toolchain = Toolchain::detect(&config);
    let cancel = CancellationToken::from_ctrl_c()?;

    let outcome = run_dev(DevMode::from_tauri_flag(cli.tauri), &config, &toolchain, &cancel)?;
    Ok(outcome.exit_code())
}
