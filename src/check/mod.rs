// Code quality pipeline: type check, quality script, source scans, summary

pub mod scan;
pub mod search;

use crate::common::{
    Step, StepRunner, print_banner, print_failure, print_success, print_warning, rule,
};
use crate::config::Config;
use crate::platform::Toolchain;
use std::process::ExitCode;

pub use scan::{ScanMatch, ScanReport, ScanSpec, scan};
pub use search::{GrepSearcher, LineSearcher, NativeSearcher, searcher_for};

pub const TYPE_CHECK: &str = "TypeScript type check";
pub const CODE_QUALITY: &str = "Code quality";
pub const MAGIC_NUMBERS: &str = "Magic numbers";
pub const CONSOLE_LOG: &str = "console.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckFlags {
    /// Type check only
    pub quick: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: String,
    pub passed: bool,
}

/// Outcomes in the order the checks ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    outcomes: Vec<CheckOutcome>,
}

impl Summary {
    pub fn record(&mut self, name: &str, passed: bool) {
        self.outcomes.push(CheckOutcome {
            name: name.to_string(),
            passed,
        });
    }

    pub fn outcomes(&self) -> &[CheckOutcome] {
        &self.outcomes
    }

    pub fn names(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.name.as_str()).collect()
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|o| o.passed)
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.all_passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    /// One `STATUS  name` row per check
    pub fn rows(&self) -> Vec<String> {
        self.outcomes
            .iter()
            .map(|o| {
                let status = if o.passed { "✅ PASS" } else { "❌ FAIL" };
                format!("{:<12} {}", status, o.name)
            })
            .collect()
    }

    pub fn print(&self) {
        println!();
        println!("{}", rule());
        println!("📊 Check summary");
        println!("{}", rule());
        println!();
        for row in self.rows() {
            println!("{}", row);
        }
        println!();
        if self.all_passed() {
            println!("🎉 All checks passed!");
        } else {
            print_failure("Some checks failed");
        }
    }
}

pub fn run_checks(
    flags: CheckFlags,
    config: &Config,
    toolchain: &Toolchain,
    runner: &mut impl StepRunner,
    searcher: &dyn LineSearcher,
) -> Summary {
    println!("🚀 Starting code quality checks");

    let mut summary = Summary::default();

    let type_check = toolchain
        .script("type-check", TYPE_CHECK)
        .with_icon("🔍")
        .in_dir(&config.project_dir);
    summary.record(TYPE_CHECK, runner.run(&type_check));

    if !flags.quick {
        summary.record(CODE_QUALITY, run_quality_script(config, runner));

        let numeric = ScanSpec::numeric_literals();
        summary.record(MAGIC_NUMBERS, run_scan(config, searcher, &numeric));

        let debug = ScanSpec::debug_statements(&config.scan.debug_exempt_file);
        summary.record(CONSOLE_LOG, run_scan(config, searcher, &debug));
    }

    summary.print();
    summary
}

/// The project's own quality script is advisory: missing or failing, it never fails the run
fn run_quality_script(config: &Config, runner: &mut impl StepRunner) -> bool {
    let script = config.resolve(&config.quality_script);

    if !script.is_file() {
        print_banner("🔍", "Code quality check");
        print_warning(&format!(
            "{} not found (skipped)",
            config.quality_script.display()
        ));
        return true;
    }

    let script = script.to_string_lossy().to_string();
    let step = if cfg!(windows) {
        Step::new("Code quality check", "bash", &[script.as_str()])
    } else {
        Step::new("Code quality check", &script, &[])
    };

    if !runner.run(&step.with_icon("🔍").in_dir(&config.project_dir)) {
        print_warning("Code quality script reported problems (not counted as a failure)");
    }
    true
}

fn run_scan(config: &Config, searcher: &dyn LineSearcher, spec: &ScanSpec) -> bool {
    print_banner("🔍", spec.title);

    let root = config.resolve(&config.source_dir);
    let report = match scan(searcher, &root, &config.scan.extensions, spec) {
        Ok(report) => report,
        Err(err) => {
            print_failure(&format!("{} failed: {:#}", spec.title, err));
            return false;
        }
    };

    match &report {
        ScanReport::Skipped { reason } => {
            print_warning(&format!("{} (skipped)", reason));
            true
        }
        ScanReport::Completed { matches } if matches.is_empty() => {
            print_success(spec.clean_message);
            true
        }
        ScanReport::Completed { matches } => {
            let max_shown = config.scan.max_shown;
            print_warning(&format!("Found {} {}:", matches.len(), spec.subject));
            for found in report.shown(max_shown) {
                println!("   {}", found);
            }
            let remaining = report.remaining(max_shown);
            if remaining > 0 {
                println!("   ... and {} more", remaining);
            }
            !config.scan.fail_on_findings
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::testing::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    const NPM_TYPE_CHECK: &str = "npm run type-check";

    fn project(files: &[(&str, &str)]) -> (TempDir, Config) {
        let dir = TempDir::new().unwrap();
        for (path, body) in files {
            let path = dir.path().join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, body).unwrap();
        }
        let config = Config::load(dir.path()).unwrap();
        (dir, config)
    }

    fn check(flags: CheckFlags, config: &Config, runner: &mut RecordingRunner) -> Summary {
        run_checks(
            flags,
            config,
            &Toolchain::for_os("linux"),
            runner,
            &NativeSearcher,
        )
    }

    #[test]
    fn test_quick_reports_type_check_only() {
        let (_dir, config) = project(&[("src/game.ts", "console.log(state);\n")]);
        let mut runner = RecordingRunner::default();

        let summary = check(CheckFlags { quick: true }, &config, &mut runner);

        assert_eq!(summary.names(), vec![TYPE_CHECK]);
        assert_eq!(summary.rows(), vec![format!("{:<12} {}", "✅ PASS", TYPE_CHECK)]);
        assert!(summary.all_passed());
        assert_eq!(runner.calls, vec![NPM_TYPE_CHECK]);
    }

    #[test]
    fn test_full_run_order() {
        let (_dir, config) = project(&[("src/main.ts", "start();\n")]);
        let mut runner = RecordingRunner::default();

        let summary = check(CheckFlags::default(), &config, &mut runner);

        assert_eq!(
            summary.names(),
            vec![TYPE_CHECK, CODE_QUALITY, MAGIC_NUMBERS, CONSOLE_LOG]
        );
        assert!(summary.all_passed());
    }

    #[test]
    fn test_findings_are_warnings_by_default() {
        let (_dir, config) = project(&[
            ("src/game.ts", "const hp = 100;\nconsole.log(hp);\n"),
            ("src/utils/errorHandler.ts", "console.log(err);\n"),
        ]);
        let mut runner = RecordingRunner::default();

        let summary = check(CheckFlags::default(), &config, &mut runner);
        assert!(summary.all_passed());
    }

    #[test]
    fn test_fail_on_findings() {
        let (_dir, mut config) = project(&[("src/game.ts", "console.log(state);\n")]);
        config.scan.fail_on_findings = true;
        let mut runner = RecordingRunner::default();

        let summary = check(CheckFlags::default(), &config, &mut runner);

        let console = summary
            .outcomes()
            .iter()
            .find(|o| o.name == CONSOLE_LOG)
            .unwrap();
        assert!(!console.passed);
        assert!(!summary.all_passed());
    }

    #[test]
    fn test_exempt_file_only_is_clean_even_when_strict() {
        let (_dir, mut config) = project(&[("src/utils/errorHandler.ts", "console.log(err);\n")]);
        config.scan.fail_on_findings = true;
        let mut runner = RecordingRunner::default();

        assert!(check(CheckFlags::default(), &config, &mut runner).all_passed());
    }

    #[test]
    fn test_type_check_failure_fails_summary() {
        let (_dir, config) = project(&[]);
        let mut runner = RecordingRunner::default().failing(NPM_TYPE_CHECK);

        let summary = check(CheckFlags::default(), &config, &mut runner);

        assert!(!summary.outcomes()[0].passed);
        assert!(!summary.all_passed());
        assert_eq!(summary.outcomes().len(), 4);
    }

    #[test]
    fn test_missing_quality_script_is_skipped() {
        let (_dir, config) = project(&[]);
        let mut runner = RecordingRunner::default();

        let summary = check(CheckFlags::default(), &config, &mut runner);

        assert_eq!(runner.calls, vec![NPM_TYPE_CHECK]);
        assert!(summary.outcomes()[1].passed);
    }

    #[test]
    fn test_failing_quality_script_still_passes() {
        let (dir, config) = project(&[("scripts/check-code-quality.sh", "exit 1\n")]);
        let script = dir.path().join("scripts/check-code-quality.sh");
        let script = script.to_string_lossy().to_string();
        let mut runner = RecordingRunner::default().failing(&script);

        let summary = check(CheckFlags::default(), &config, &mut runner);

        assert!(runner.calls.iter().any(|call| call.contains("check-code-quality.sh")));
        assert!(summary.outcomes()[1].passed);
    }

    #[test]
    fn test_missing_search_tool_downgrades_to_pass() {
        let (_dir, mut config) = project(&[("src/game.ts", "console.log(state);\n")]);
        config.scan.fail_on_findings = true;
        let mut runner = RecordingRunner::default();

        let summary = run_checks(
            CheckFlags::default(),
            &config,
            &Toolchain::for_os("linux"),
            &mut runner,
            &GrepSearcher::new("apptask-no-such-grep"),
        );

        assert!(summary.all_passed());
    }
}
