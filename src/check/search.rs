// Line search backends: external grep or an in-process walk
use crate::check::scan::{Pattern, ScanMatch};
use crate::config::{Config, ScanBackend};
use anyhow::{Context, Result};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

pub trait LineSearcher {
    fn name(&self) -> &str;

    /// Every line under `root` (files filtered by extension) matching `pattern`.
    /// `Ok(None)` means the backend can't run in this environment.
    fn search(
        &self,
        root: &Path,
        extensions: &[String],
        pattern: &Pattern,
    ) -> Result<Option<Vec<ScanMatch>>>;
}

pub fn searcher_for(config: &Config) -> Box<dyn LineSearcher> {
    match config.scan.backend {
        ScanBackend::Grep => Box::new(GrepSearcher::default()),
        ScanBackend::Native => Box::new(NativeSearcher),
    }
}

fn include_globs(extensions: &[String]) -> Vec<String> {
    extensions.iter().map(|ext| format!("*.{}", ext)).collect()
}

/// Shells out to `grep -rn`
#[derive(Debug, Clone)]
pub struct GrepSearcher {
    program: String,
}

impl Default for GrepSearcher {
    fn default() -> Self {
        Self::new("grep")
    }
}

impl GrepSearcher {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    fn parse_output(stdout: &[u8]) -> Vec<ScanMatch> {
        String::from_utf8_lossy(stdout)
            .lines()
            .filter_map(parse_grep_line)
            .collect()
    }
}

/// `path\0line:text`, as printed with `--null`
fn parse_grep_line(line: &str) -> Option<ScanMatch> {
    let (path, rest) = line.split_once('\0')?;
    let (line_number, text) = rest.split_once(':')?;
    Some(ScanMatch {
        path: PathBuf::from(path),
        line_number: line_number.parse().ok()?,
        text: text.trim_end_matches('\r').to_string(),
    })
}

impl LineSearcher for GrepSearcher {
    fn name(&self) -> &str {
        &self.program
    }

    fn search(
        &self,
        root: &Path,
        extensions: &[String],
        pattern: &Pattern,
    ) -> Result<Option<Vec<ScanMatch>>> {
        if which::which(&self.program).is_err() {
            return Ok(None);
        }
        if !root.exists() {
            return Ok(Some(Vec::new()));
        }

        let mut cmd = Command::new(&self.program);
        // -a: files with NUL bytes would otherwise collapse into "Binary file ... matches"
        cmd.args(["-rna", "--null"]);
        for include in include_globs(extensions) {
            cmd.arg(format!("--include={}", include));
        }
        cmd.arg(match pattern {
            Pattern::Regex(_) => "-E",
            Pattern::Literal(_) => "-F",
        });
        cmd.arg("-e").arg(pattern.as_str()).arg(root);

        let output = match cmd.output() {
            Ok(output) => output,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to execute {}", self.program));
            }
        };

        // grep: 0 = matches, 1 = no matches, anything else is trouble
        match output.status.code() {
            Some(0) => Ok(Some(Self::parse_output(&output.stdout))),
            Some(1) => Ok(Some(Vec::new())),
            _ => anyhow::bail!(
                "{} failed on {}: {}",
                self.program,
                root.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        }
    }
}

/// Walks the tree itself; always available
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSearcher;

impl LineSearcher for NativeSearcher {
    fn name(&self) -> &str {
        "native search"
    }

    fn search(
        &self,
        root: &Path,
        extensions: &[String],
        pattern: &Pattern,
    ) -> Result<Option<Vec<ScanMatch>>> {
        if !root.exists() {
            return Ok(Some(Vec::new()));
        }

        let regex = pattern.to_regex()?;
        let includes = include_globs(extensions)
            .iter()
            .map(|include| glob::Pattern::new(include))
            .collect::<Result<Vec<_>, _>>()
            .context("Invalid file extension filter")?;

        let mut matches = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if !includes.iter().any(|include| include.matches(&file_name)) {
                continue;
            }

            let bytes = fs::read(entry.path())
                .with_context(|| format!("Failed to read file: {}", entry.path().display()))?;
            let content = String::from_utf8_lossy(&bytes);
            for (index, line) in content.lines().enumerate() {
                if regex.is_match(line) {
                    matches.push(ScanMatch {
                        path: entry.path().to_path_buf(),
                        line_number: index + 1,
                        text: line.to_string(),
                    });
                }
            }
        }

        Ok(Some(matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn extensions() -> Vec<String> {
        vec!["ts".to_string(), "tsx".to_string()]
    }

    fn debug_marker() -> Pattern {
        Pattern::Literal("console.log".to_string())
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let src = dir.path();
        fs::create_dir_all(src.join("components")).unwrap();
        fs::write(
            src.join("main.ts"),
            "init();\nsetTimeout(start, 500);\nconsole.log('ready');\n",
        )
        .unwrap();
        fs::write(
            src.join("components/Board.tsx"),
            "export const Board = () => {\n  console.log(props);\n};\n",
        )
        .unwrap();
        fs::write(src.join("notes.md"), "console.log is banned\n").unwrap();
        dir
    }

    #[test]
    fn test_parse_grep_line() {
        let parsed = parse_grep_line("src/a.ts\u{0}12:  console.log(x): y\r").unwrap();
        assert_eq!(parsed.path, PathBuf::from("src/a.ts"));
        assert_eq!(parsed.line_number, 12);
        assert_eq!(parsed.text, "  console.log(x): y");

        assert!(parse_grep_line("garbage").is_none());
        assert!(parse_grep_line("src/a.ts\u{0}x:text").is_none());
    }

    #[test]
    fn test_native_filters_by_extension() {
        let dir = fixture();
        let matches = NativeSearcher
            .search(dir.path(), &extensions(), &debug_marker())
            .unwrap()
            .unwrap();

        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|m| !m.path.ends_with("notes.md")));
        let main = matches.iter().find(|m| m.path.ends_with("main.ts")).unwrap();
        assert_eq!(main.line_number, 3);
    }

    #[test]
    fn test_native_missing_root_is_empty() {
        let dir = TempDir::new().unwrap();
        let matches = NativeSearcher
            .search(&dir.path().join("src"), &extensions(), &debug_marker())
            .unwrap();
        assert_eq!(matches, Some(Vec::new()));
    }

    #[test]
    fn test_grep_unavailable_is_none() {
        let dir = fixture();
        let searcher = GrepSearcher::new("apptask-no-such-grep");
        assert_eq!(
            searcher
                .search(dir.path(), &extensions(), &debug_marker())
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_grep_agrees_with_native() {
        if which::which("grep").is_err() {
            return;
        }
        let dir = fixture();

        for pattern in [
            debug_marker(),
            Pattern::Regex(crate::check::scan::NUMERIC_LITERAL_PATTERN.to_string()),
        ] {
            let mut from_grep = GrepSearcher::default()
                .search(dir.path(), &extensions(), &pattern)
                .unwrap()
                .unwrap();
            let mut from_native = NativeSearcher
                .search(dir.path(), &extensions(), &pattern)
                .unwrap()
                .unwrap();
            from_grep.sort();
            from_native.sort();
            assert_eq!(from_grep, from_native);
        }
    }

    #[test]
    fn test_grep_reports_lines_from_files_with_nul_bytes() {
        if which::which("grep").is_err() {
            return;
        }
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bundle.ts"), "const a = '\0';\nconsole.log(a);\n").unwrap();

        let from_grep = GrepSearcher::default()
            .search(dir.path(), &extensions(), &debug_marker())
            .unwrap()
            .unwrap();
        let from_native = NativeSearcher
            .search(dir.path(), &extensions(), &debug_marker())
            .unwrap()
            .unwrap();

        assert_eq!(from_grep.len(), 1);
        assert_eq!(from_grep[0].line_number, 2);
        assert_eq!(from_grep, from_native);
    }

    #[test]
    fn test_grep_no_match_is_empty() {
        if which::which("grep").is_err() {
            return;
        }
        let dir = fixture();
        let matches = GrepSearcher::default()
            .search(dir.path(), &extensions(), &Pattern::Literal("debugger".to_string()))
            .unwrap();
        assert_eq!(matches, Some(Vec::new()));
    }
}
