//! Intermediate Record Format
//!
//! An intermediate result is a single `"<document>, <score>"` line persisted
//! by a score task and read back by the aggregation stage. Output files use
//! the same line format, one record per line.

use anyhow::{Context, Result};

/// Formats one `(document, score)` record.
pub fn format_record(document: &str, score: f32) -> String {
    format!("{}, {:.6}", document, score)
}

/// Parses a record line back into `(document, score)`.
///
/// Splits on the last `", "` so document paths containing commas keep their
/// full identifier intact.
pub fn parse_record(line: &str) -> Result<(String, f32)> {
    let line = line.trim();
    let (document, score) = line
        .rsplit_once(", ")
        .ok_or_else(|| anyhow::anyhow!("Malformed result record: {:?}", line))?;

    let score: f32 = score
        .parse()
        .with_context(|| format!("Invalid score in result record: {:?}", line))?;

    Ok((document.to_string(), score))
}

/// Current system time in milliseconds, used to derive unique file names.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}
