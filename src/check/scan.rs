// Pattern scans over the source tree
use crate::check::search::LineSearcher;
use anyhow::{Context, Result};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};

/// Two or more digits not glued to an identifier
pub const NUMERIC_LITERAL_PATTERN: &str = r"[^a-zA-Z_][0-9]{2,}";
pub const DEBUG_STATEMENT_MARKER: &str = "console.log";
/// Utility-class attributes whose spacing/sizing tokens look like numbers
pub const STYLING_CLASS_MARKERS: [&str; 2] = ["className=", "class=\""];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Extended regular expression
    Regex(String),
    /// Fixed string, matched verbatim
    Literal(String),
}

impl Pattern {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Regex(pattern) | Self::Literal(pattern) => pattern,
        }
    }

    pub fn to_regex(&self) -> Result<Regex> {
        let source = match self {
            Self::Regex(pattern) => pattern.clone(),
            Self::Literal(literal) => regex::escape(literal),
        };
        Regex::new(&source).with_context(|| format!("Invalid scan pattern: {}", self.as_str()))
    }
}

/// Suppresses a match that the raw pattern would report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exemption {
    /// Line text contains any of these markers
    LineContains(Vec<String>),
    /// Match comes from a file with exactly this name
    FileNamed(String),
}

impl Exemption {
    pub fn exempts(&self, found: &ScanMatch) -> bool {
        match self {
            Self::LineContains(markers) => markers.iter().any(|m| found.text.contains(m.as_str())),
            Self::FileNamed(name) => found
                .path
                .file_name()
                .is_some_and(|file_name| file_name == name.as_str()),
        }
    }
}

/// What to look for, what to let through, and how to talk about it
#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub title: &'static str,
    pub subject: &'static str,
    pub clean_message: &'static str,
    pub pattern: Pattern,
    pub exemption: Exemption,
}

impl ScanSpec {
    pub fn numeric_literals() -> Self {
        Self {
            title: "Magic number search",
            subject: "magic numbers",
            clean_message: "No magic numbers (styling classes excluded)",
            pattern: Pattern::Regex(NUMERIC_LITERAL_PATTERN.to_string()),
            exemption: Exemption::LineContains(
                STYLING_CLASS_MARKERS.iter().map(|m| m.to_string()).collect(),
            ),
        }
    }

    pub fn debug_statements(exempt_file: &str) -> Self {
        Self {
            title: "console.log search (remove before release)",
            subject: "console.log calls",
            clean_message: "No console.log calls (error handler excluded)",
            pattern: Pattern::Literal(DEBUG_STATEMENT_MARKER.to_string()),
            exemption: Exemption::FileNamed(exempt_file.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanMatch {
    pub path: PathBuf,
    pub line_number: usize,
    pub text: String,
}

impl fmt::Display for ScanMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line_number, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    /// The search tool isn't available here
    Skipped { reason: String },
    Completed { matches: Vec<ScanMatch> },
}

impl ScanReport {
    pub fn matches(&self) -> &[ScanMatch] {
        match self {
            Self::Skipped { .. } => &[],
            Self::Completed { matches } => matches,
        }
    }

    pub fn count(&self) -> usize {
        self.matches().len()
    }

    /// The leading matches worth printing
    pub fn shown(&self, max_shown: usize) -> &[ScanMatch] {
        let matches = self.matches();
        &matches[..matches.len().min(max_shown)]
    }

    /// How many matches `shown` leaves out
    pub fn remaining(&self, max_shown: usize) -> usize {
        self.count().saturating_sub(max_shown)
    }
}

/// Search `root` for `spec.pattern` and drop exempt matches, ordered by file then line
pub fn scan(
    searcher: &dyn LineSearcher,
    root: &Path,
    extensions: &[String],
    spec: &ScanSpec,
) -> Result<ScanReport> {
    let Some(mut matches) = searcher.search(root, extensions, &spec.pattern)? else {
        return Ok(ScanReport::Skipped {
            reason: format!("{} is not available", searcher.name()),
        });
    };

    matches.retain(|found| !spec.exemption.exempts(found));
    matches.sort();

    Ok(ScanReport::Completed { matches })
}
