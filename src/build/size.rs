// Build artifact size report
use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// Total bytes of all regular files under `dir`, or `None` if the directory doesn't exist
pub fn total_size(dir: &Path) -> Result<Option<u64>> {
    if !dir.is_dir() {
        return Ok(None);
    }

    let mut total = 0;
    for entry in WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
        if entry.file_type().is_file() {
            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
            total += metadata.len();
        }
    }

    Ok(Some(total))
}

pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}
