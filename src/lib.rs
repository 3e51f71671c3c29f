// apptask - build, check and dev-server tasks for a web/Tauri frontend
// Each task is a short sequential pipeline around the package manager

// Task pipelines
pub mod build;
pub mod check;
pub mod dev;

// Shared utilities
pub mod common;
pub mod config;
pub mod platform;

// Re-export pipeline entry points
pub use build::{BuildFlags, BuildPlan, PackagingMode, run_build};
pub use check::{CheckOutcome, Summary, run_checks};
pub use dev::{DevMode, run_dev};

// Re-export shared types
pub use common::{CommandStepRunner, Step, StepRunner};
pub use config::Config;
pub use platform::Toolchain;
