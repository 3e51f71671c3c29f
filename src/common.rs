// Common step execution and console output
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

const BANNER_WIDTH: usize = 60;

/// One external command plus the description shown in its banner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub description: String,
    pub icon: &'static str,
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: Option<PathBuf>,
}

impl Step {
    pub fn new(description: &str, program: &str, args: &[&str]) -> Self {
        Self {
            description: description.to_string(),
            icon: "🔧",
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            current_dir: None,
        }
    }

    pub fn with_icon(mut self, icon: &'static str) -> Self {
        self.icon = icon;
        self
    }

    pub fn in_dir(mut self, dir: &Path) -> Self {
        self.current_dir = Some(dir.to_path_buf());
        self
    }

    /// Program and arguments joined the way a user would type them
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Executes pipeline steps. A failed step is reported and returned as `false`, never raised.
pub trait StepRunner {
    fn run(&mut self, step: &Step) -> bool;
}

/// Runs steps as real child processes with the terminal's stdio
#[derive(Debug, Default)]
pub struct CommandStepRunner;

impl StepRunner for CommandStepRunner {
    fn run(&mut self, step: &Step) -> bool {
        run_command(step)
    }
}

/// Run a step synchronously between a banner and a result line
pub fn run_command(step: &Step) -> bool {
    print_banner(step.icon, &step.description);

    match step.to_command().status() {
        Ok(status) if status.success() => {
            println!();
            print_success(&format!("{} complete", step.description));
            true
        }
        Ok(status) => {
            println!();
            print_failure(&format!(
                "{} failed: {}",
                step.description,
                describe_status(status)
            ));
            false
        }
        Err(err) => {
            println!();
            print_failure(&format!(
                "{} failed: could not start `{}`: {}",
                step.description,
                step.command_line(),
                err
            ));
            false
        }
    }
}

pub fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit status {}", code),
        None => "terminated by a signal".to_string(),
    }
}

pub fn rule() -> String {
    "=".repeat(BANNER_WIDTH)
}

pub fn print_banner(icon: &str, title: &str) {
    println!();
    println!("{}", rule());
    println!("{} {}", icon, title);
    println!("{}", rule());
    println!();
}

pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

pub fn print_failure(message: &str) {
    println!("❌ {}", message);
}

pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}
