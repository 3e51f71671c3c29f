// Package manager resolution per host platform
use crate::common::Step;
use crate::config::Config;

const NPM: &str = "npm";
const NPM_WINDOWS: &str = "npm.cmd";

/// Resolved external toolchain, computed once at startup and passed down
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub package_manager: String,
}

impl Toolchain {
    /// Resolve for the platform this binary runs on, honoring a configured override
    pub fn detect(config: &Config) -> Self {
        match &config.package_manager {
            Some(program) => Self {
                package_manager: program.clone(),
            },
            None => Self::for_os(std::env::consts::OS),
        }
    }

    /// Windows ships npm as a batch shim, everything else has a plain `npm`
    pub fn for_os(os: &str) -> Self {
        let package_manager = if os == "windows" { NPM_WINDOWS } else { NPM };
        Self {
            package_manager: package_manager.to_string(),
        }
    }

    /// `npm run <script>` as a pipeline step
    pub fn script(&self, script: &str, description: &str) -> Step {
        Step::new(description, &self.package_manager, &["run", script])
    }

    pub fn is_available(&self) -> bool {
        which::which(&self.package_manager).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_uses_cmd_shim() {
        assert_eq!(Toolchain::for_os("windows").package_manager, "npm.cmd");
    }

    #[test]
    fn test_unix_uses_plain_npm() {
        assert_eq!(Toolchain::for_os("linux").package_manager, "npm");
        assert_eq!(Toolchain::for_os("macos").package_manager, "npm");
    }

    #[test]
    fn test_config_override_wins() {
        let config = Config {
            package_manager: Some("pnpm".to_string()),
            ..Config::default()
        };
        assert_eq!(Toolchain::detect(&config).package_manager, "pnpm");
    }

    #[test]
    fn test_availability() {
        let missing = Toolchain {
            package_manager: "apptask-no-such-npm".to_string(),
        };
        assert!(!missing.is_available());

        #[cfg(unix)]
        assert!(
            Toolchain {
                package_manager: "sh".to_string()
            }
            .is_available()
        );
    }

    #[test]
    fn test_script_step() {
        let step = Toolchain::for_os("linux").script("type-check", "TypeScript type check");
        assert_eq!(step.program, "npm");
        assert_eq!(step.args, vec!["run", "type-check"]);
        assert_eq!(step.command_line(), "npm run type-check");
    }
}
