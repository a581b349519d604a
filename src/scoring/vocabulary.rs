use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// The two sentiment token sets shared read-only by every score task on a
/// worker. Loaded once at startup; never mutated afterwards.
#[derive(Debug, Default)]
pub struct Vocabulary {
    pub positives: HashSet<String>,
    pub negatives: HashSet<String>,
}

impl Vocabulary {
    /// Loads both vocabulary files. Each file is a newline-delimited token
    /// list; surrounding whitespace is trimmed and blank lines are skipped.
    pub fn load(positive_path: &Path, negative_path: &Path) -> Result<Self> {
        Ok(Self {
            positives: load_token_set(positive_path)?,
            negatives: load_token_set(negative_path)?,
        })
    }
}

fn load_token_set(path: &Path) -> Result<HashSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read vocabulary file {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
