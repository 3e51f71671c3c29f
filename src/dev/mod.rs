// Development server launcher: browser (Vite) or desktop (Tauri) mode

pub mod cancel;
pub mod readiness;
pub mod relay;

use crate::common::{describe_status, print_failure, print_success, print_warning};
use crate::config::Config;
use crate::platform::Toolchain;
use anyhow::{Context, Result};
use std::io;
use std::process::{Child, ExitCode, ExitStatus, Stdio};

pub use cancel::CancellationToken;
pub use readiness::{ReadinessProbe, WaitOutcome};
pub use relay::{RelayEnd, capture_lines, relay, stop_child};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevMode {
    /// `npm run dev` in the background plus a browser tab
    Browser,
    /// `npm run tauri:dev` in the foreground
    Desktop,
}

impl DevMode {
    pub fn from_tauri_flag(tauri: bool) -> Self {
        if tauri { Self::Desktop } else { Self::Browser }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevOutcome {
    /// Dependency marker missing; nothing was started
    MissingDependencies,
    /// The package manager executable could not be found
    MissingPackageManager,
    /// The server ran to completion with this exit code
    Finished { code: u8 },
    /// Stopped by Ctrl-C; the server was terminated and reaped
    Interrupted,
}

impl DevOutcome {
    pub fn exit_code(self) -> ExitCode {
        match self {
            Self::Finished { code } => ExitCode::from(code),
            Self::Interrupted => ExitCode::SUCCESS,
            Self::MissingDependencies | Self::MissingPackageManager => ExitCode::FAILURE,
        }
    }
}

/// Whether the dependency marker (node_modules) is present
pub fn dependencies_installed(config: &Config) -> bool {
    config.resolve(&config.dependency_marker).is_dir()
}

pub fn run_dev(
    mode: DevMode,
    config: &Config,
    toolchain: &Toolchain,
    cancel: &CancellationToken,
) -> Result<DevOutcome> {
    if !dependencies_installed(config) {
        print_failure(&format!(
            "{} not found",
            config.dependency_marker.display()
        ));
        println!("📦 Install dependencies first:");
        println!("   {} install", toolchain.package_manager);
        return Ok(DevOutcome::MissingDependencies);
    }

    if !toolchain.is_available() {
        print_failure(&format!("{} not found", toolchain.package_manager));
        println!("📦 Check that Node.js is installed");
        return Ok(DevOutcome::MissingPackageManager);
    }

    match mode {
        DevMode::Desktop => run_desktop(config, toolchain),
        DevMode::Browser => run_browser(config, toolchain, cancel),
    }
}

fn run_desktop(config: &Config, toolchain: &Toolchain) -> Result<DevOutcome> {
    println!("🚀 Starting Tauri desktop app...");
    println!();

    let status = toolchain
        .script("tauri:dev", "Tauri dev")
        .in_dir(&config.project_dir)
        .to_command()
        .status()
        .context("Failed to start tauri:dev")?;

    if !status.success() {
        print_failure(&format!("Tauri failed: {}", describe_status(status)));
        println!();
        println!("💡 Check the Tauri setup:");
        println!("   - src-tauri/tauri.conf.json");
        println!("   - icon files");
    }
    Ok(DevOutcome::Finished {
        code: status_code(status),
    })
}

fn run_browser(
    config: &Config,
    toolchain: &Toolchain,
    cancel: &CancellationToken,
) -> Result<DevOutcome> {
    let url = &config.dev.url;
    let probe = ReadinessProbe::from_config(&config.dev)?;

    println!("🚀 Starting web dev server...");
    println!("📍 URL: {}", url);
    println!();

    let mut child = toolchain
        .script("dev", "Web dev server")
        .in_dir(&config.project_dir)
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to start dev server")?;
    let lines = capture_lines(&mut child);

    println!("⏳ Starting server... ({})", probe.describe());
    match probe.wait(cancel) {
        WaitOutcome::Assumed | WaitOutcome::Ready => {}
        WaitOutcome::TimedOut => {
            print_warning("Server did not open its port in time; opening the browser anyway")
        }
        WaitOutcome::Cancelled => return shut_down(&mut child),
    }

    if config.dev.open_browser {
        println!("🌐 Opening browser: {}", url);
        if let Err(err) = opener::open(url) {
            print_warning(&format!("Could not open a browser: {}", err));
        }
    }

    println!();
    print_success("Dev server started!");
    println!();
    println!("📝 Usage:");
    println!("   - The app is shown in the browser");
    println!("   - Code changes reload automatically (HMR)");
    println!("   - Ctrl+C to stop");
    println!();

    match relay(&mut child, &lines, cancel, &mut io::stdout())? {
        RelayEnd::Interrupted => {
            println!();
            print_success("Stopped");
            Ok(DevOutcome::Interrupted)
        }
        RelayEnd::Exited(status) if status.success() => Ok(DevOutcome::Finished { code: 0 }),
        RelayEnd::Exited(status) => {
            print_failure(&format!("Dev server exited: {}", describe_status(status)));
            Ok(DevOutcome::Finished {
                code: status_code(status),
            })
        }
    }
}

fn shut_down(child: &mut Child) -> Result<DevOutcome> {
    println!();
    println!("⏹️  Stopping server...");
    stop_child(child)?;
    print_success("Stopped");
    Ok(DevOutcome::Interrupted)
}

/// A child's exit code to forward; signals and out-of-range codes become 1
pub fn status_code(status: ExitStatus) -> u8 {
    match status.code().map(u8::try_from) {
        Some(Ok(code)) => code,
        _ => 1,
    }
}
