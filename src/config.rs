//! Command-line configuration.

use crate::types::Result;
use clap::Parser;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Check whether package names are already taken on PyPI and TestPyPI.
#[derive(Parser, Debug, Clone)]
#[command(name = "nscout")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Package name(s) to check
    #[arg(required_unless_present = "file")]
    pub names: Vec<String>,

    /// File containing package names to check (one per line)
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Number of names to check in parallel
    #[arg(short = 'p', long, default_value = "4")]
    pub parallel: usize,

    /// Rate limit (requests per second)
    #[arg(long, default_value = "10")]
    pub rate_limit: u32,

    /// Cache lookups for this many seconds (default: the whole run)
    #[arg(long = "cache-ttl")]
    pub cache_ttl_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            file: None,
            json: false,
            output: None,
            verbose: false,
            parallel: 4,
            rate_limit: 10,
            cache_ttl_secs: None,
        }
    }
}

impl Config {
    /// TTL for cached lookups. `None` caches for the process lifetime.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_secs.map(Duration::from_secs)
    }

    /// Collect names from arguments and, if given, the names file.
    ///
    /// Positional names come first, then file lines. Every entry is
    /// trimmed; blanks are dropped.
    pub fn load_names(&self) -> Result<Vec<String>> {
        let mut raw = self.names.clone();

        if let Some(ref path) = self.file {
            let content = std::fs::read_to_string(path)?;
            raw.extend(content.lines().map(str::to_string));
        }

        Ok(dedup_names(raw))
    }
}

/// Trim, drop blanks, and de-duplicate exact strings while preserving
/// first-seen order. Case-sensitive: "Foo" and "foo" are distinct names.
pub fn dedup_names<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for entry in raw {
        let trimmed = entry.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_string()) {
            names.push(trimmed.to_string());
        }
    }

    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owned(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let names = dedup_names(owned(&["foo", "Foo ", "foo"]));
        assert_eq!(names, vec!["foo", "Foo"]);
    }

    #[test]
    fn test_dedup_drops_blanks() {
        let names = dedup_names(owned(&["", "  ", "bar", "\t"]));
        assert_eq!(names, vec!["bar"]);
    }

    #[test]
    fn test_load_names_merges_file_after_positionals() {
        use std::io::Write;

        let mut file = tempfile_path();
        writeln!(file.1, "from-file\n\nfoo").unwrap();

        let config = Config {
            names: owned(&["foo", "bar"]),
            file: Some(file.0.clone()),
            ..Default::default()
        };

        let names = config.load_names().unwrap();
        assert_eq!(names, vec!["foo", "bar", "from-file"]);

        std::fs::remove_file(&file.0).ok();
    }

    #[test]
    fn test_load_names_missing_file_is_an_error() {
        let config = Config {
            file: Some(PathBuf::from("/nonexistent/names.txt")),
            ..Default::default()
        };
        assert!(config.load_names().is_err());
    }

    fn tempfile_path() -> (PathBuf, std::fs::File) {
        let path = std::env::temp_dir().join(format!(
            "nscout-test-names-{}-{:?}.txt",
            std::process::id(),
            std::thread::current().id()
        ));
        let file = std::fs::File::create(&path).unwrap();
        (path, file)
    }
}
