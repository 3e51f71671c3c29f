// Production build pipeline: type check, build, artifact size report

pub mod size;

use crate::common::{StepRunner, print_failure, print_success, print_warning, rule};
use crate::config::Config;
use crate::platform::Toolchain;
use std::process::ExitCode;

pub use size::{format_megabytes, total_size};

/// Command-line switches of `apptask-build`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildFlags {
    pub tauri: bool,
    pub check_only: bool,
    pub skip_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingMode {
    /// Browser-hosted bundle
    Web,
    /// Tauri desktop application
    Desktop,
}

impl PackagingMode {
    pub fn from_tauri_flag(tauri: bool) -> Self {
        if tauri { Self::Desktop } else { Self::Web }
    }

    pub fn build_script(self) -> &'static str {
        match self {
            Self::Web => "build",
            Self::Desktop => "tauri:build",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Web => "Web build",
            Self::Desktop => "Tauri build",
        }
    }
}

/// Which steps a build run will take, decided from the flags alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildPlan {
    pub type_check: bool,
    /// `None` stops after the type check
    pub target: Option<PackagingMode>,
}

impl BuildPlan {
    pub fn from_flags(flags: BuildFlags) -> Self {
        Self {
            type_check: !flags.skip_check,
            target: if flags.check_only {
                None
            } else {
                Some(PackagingMode::from_tauri_flag(flags.tauri))
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built,
    CheckedOnly,
    TypeCheckFailed,
    BuildFailed,
}

impl BuildOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Built | Self::CheckedOnly)
    }

    pub fn exit_code(self) -> ExitCode {
        if self.is_success() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

pub fn run_build(
    flags: BuildFlags,
    config: &Config,
    toolchain: &Toolchain,
    runner: &mut impl StepRunner,
) -> BuildOutcome {
    let plan = BuildPlan::from_flags(flags);
    println!("🚀 Starting build");

    if plan.type_check {
        let step = toolchain
            .script("type-check", "TypeScript type check")
            .in_dir(&config.project_dir);
        if !runner.run(&step) {
            println!();
            print_failure("Type errors found. Fix them and try again.");
            println!("💡 Use --skip-check to build without the type check");
            return BuildOutcome::TypeCheckFailed;
        }
    }

    let Some(mode) = plan.target else {
        println!();
        if plan.type_check {
            print_success("Type check complete");
        } else {
            print_success("Nothing to do: type check skipped and --check-only given");
        }
        return BuildOutcome::CheckedOnly;
    };

    let step = toolchain
        .script(mode.build_script(), mode.description())
        .in_dir(&config.project_dir);
    let built = runner.run(&step);

    if built && mode == PackagingMode::Web {
        report_artifacts(config);
    }

    if built {
        println!();
        println!("{}", rule());
        println!("🎉 Build complete!");
        println!("{}", rule());
        BuildOutcome::Built
    } else {
        println!();
        print_failure("Build failed");
        BuildOutcome::BuildFailed
    }
}

/// Print where the web bundle landed and how big it is; silent when there is no output dir
fn report_artifacts(config: &Config) {
    let output_dir = config.resolve(&config.output_dir);

    match total_size(&output_dir) {
        Ok(Some(bytes)) => {
            let shown = std::path::absolute(&output_dir).unwrap_or(output_dir);
            println!();
            println!("📦 Build output: {}", shown.display());
            println!("📊 Total size: {}", format_megabytes(bytes));
        }
        Ok(None) => {}
        Err(err) => print_warning(&format!("Could not measure build output: {:#}", err)),
    }
}
