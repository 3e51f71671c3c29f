// Optional per-project configuration (apptask.toml)
use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "apptask.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory all commands run in; set from the command line, never from the file
    #[serde(skip)]
    pub project_dir: PathBuf,
    pub package_manager: Option<String>,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub dependency_marker: PathBuf,
    pub quality_script: PathBuf,
    pub dev: DevConfig,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_dir: PathBuf::from("."),
            package_manager: None,
            source_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("dist"),
            dependency_marker: PathBuf::from("node_modules"),
            quality_script: PathBuf::from("scripts/check-code-quality.sh"),
            dev: DevConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DevConfig {
    pub url: String,
    pub open_browser: bool,
    pub wait_seconds: u64,
    pub readiness: Readiness,
    pub poll_timeout_seconds: u64,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:1420".to_string(),
            open_browser: true,
            wait_seconds: 3,
            readiness: Readiness::Fixed,
            poll_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    /// Sleep for `wait_seconds` and assume the server is up
    Fixed,
    /// Poll the dev URL's port until it accepts connections
    Poll,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub backend: ScanBackend,
    pub extensions: Vec<String>,
    pub max_shown: usize,
    pub fail_on_findings: bool,
    pub debug_exempt_file: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            backend: ScanBackend::Grep,
            extensions: vec!["ts".to_string(), "tsx".to_string()],
            max_shown: 10,
            fail_on_findings: false,
            debug_exempt_file: "errorHandler.ts".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanBackend {
    Grep,
    Native,
}

impl Config {
    /// Load `apptask.toml` from the project directory, falling back to defaults
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(CONFIG_FILE_NAME);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read config file: {}", config_path.display())
            })?;
            Self::from_toml(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_path.display())
            })?
        } else {
            Self::default()
        };

        config.project_dir = project_dir.to_path_buf();
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.scan.extensions.is_empty() {
            bail!("scan.extensions must name at least one file extension");
        }
        Ok(config)
    }

    /// Resolve a configured path against the project directory
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.project_dir, dir.path());
        assert_eq!(config.source_dir, PathBuf::from("src"));
        assert_eq!(config.dev.url, "http://localhost:1420");
        assert_eq!(config.dev.wait_seconds, 3);
        assert!(config.dev.open_browser);
        assert_eq!(config.dev.readiness, Readiness::Fixed);
        assert_eq!(config.scan.backend, ScanBackend::Grep);
        assert_eq!(config.scan.max_shown, 10);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            r#"
            package_manager = "pnpm"

            [dev]
            readiness = "poll"

            [scan]
            backend = "native"
            extensions = ["js"]
            "#,
        )
        .unwrap();

        assert_eq!(config.package_manager.as_deref(), Some("pnpm"));
        assert_eq!(config.dev.readiness, Readiness::Poll);
        assert_eq!(config.dev.url, "http://localhost:1420");
        assert_eq!(config.scan.backend, ScanBackend::Native);
        assert_eq!(config.scan.extensions, vec!["js"]);
        assert_eq!(config.scan.debug_exempt_file, "errorHandler.ts");
        assert_eq!(config.output_dir, PathBuf::from("dist"));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(Config::from_toml("outptu_dir = \"build\"").is_err());
    }

    #[test]
    fn test_empty_extension_list_is_rejected() {
        let err = Config::from_toml("[scan]\nextensions = []\n").unwrap_err();
        assert!(err.to_string().contains("scan.extensions"));
    }

    #[test]
    fn test_malformed_file_names_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "[dev\n").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(format!("{:#}", err).contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn test_resolve_relative_and_absolute() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.resolve(Path::new("dist")), dir.path().join("dist"));
        assert_eq!(config.resolve(dir.path()), dir.path());
    }
}
