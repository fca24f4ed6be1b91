//! Seed file loading
//!
//! A seed file lists one absolute URL per line. Blank lines and lines
//! starting with `#` are ignored. Lines are returned as written; the
//! coordinator decides which of them are admissible.

use crate::ConfigError;
use std::path::Path;

/// Reads the seed URLs from `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use geo_ripple::seeds::load_seeds;
///
/// let seeds = load_seeds(Path::new("initial.txt")).unwrap();
/// println!("{} seed(s)", seeds.len());
/// ```
pub fn load_seeds(path: &Path) -> Result<Vec<String>, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_seeds(&content))
}

/// Extracts seed lines from already loaded text
pub fn parse_seeds(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
