//! Colored console output for check results.

use crate::types::{AggregateResult, Metadata, Status};
use colored::{ColoredString, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

/// Console output handler with colors and formatting.
///
/// Human rendering only: JSON mode silences every method here and the
/// raw results are serialized elsewhere, untouched.
pub struct ConsoleOutput {
    verbose: bool,
    json_mode: bool,
}

impl ConsoleOutput {
    pub fn new(verbose: bool, json_mode: bool) -> Self {
        Self { verbose, json_mode }
    }

    /// Render a batch of results: detail view for one name, table for
    /// several.
    pub fn print_results(&self, results: &[AggregateResult]) {
        if self.json_mode {
            return;
        }

        if let [single] = results {
            self.print_single(single);
        } else {
            self.print_table(results);
        }
    }

    fn print_single(&self, result: &AggregateResult) {
        println!("{}", result.name.bright_white().bold());
        println!(
            "  {:<10} {}",
            "PyPI:",
            tri_state_label(result.source.primary.taken)
        );
        println!(
            "  {:<10} {}",
            "TestPyPI:",
            tri_state_label(result.source.secondary.taken)
        );

        if let Some(ref record) = result.error {
            println!(
                "  {:<10} {}",
                "error:",
                format!("{} ({})", record.kind, record.detail).yellow()
            );
        }

        if let Some(ref meta) = result.metadata {
            println!();
            self.print_metadata(meta);
        }
    }

    fn print_metadata(&self, meta: &Metadata) {
        let row = |label: &str, value: Option<&str>| {
            let shown = value.filter(|v| !v.is_empty());
            println!(
                "  {:<17} {}",
                label,
                match shown {
                    Some(v) => v.normal(),
                    None => "-".dimmed(),
                }
            );
        };

        row("version:", meta.version.as_deref());
        row("summary:", meta.summary.as_deref());
        row("author:", meta.author.as_deref());
        row("author email:", meta.author_email.as_deref());
        row("license:", meta.license.as_deref());
        row("homepage:", meta.homepage.as_deref());
        row("requires python:", meta.requires_python.as_deref());

        let releases = match &meta.latest_release {
            Some(latest) => format!(
                "{} (latest {} at {})",
                meta.release_count,
                latest.version,
                latest.timestamp.as_deref().unwrap_or("-")
            ),
            None => meta.release_count.to_string(),
        };
        println!("  {:<17} {}", "releases:", releases);

        if self.verbose {
            if !meta.requires_dist.is_empty() {
                println!("  {:<17}", "requires dist:");
                for dep in &meta.requires_dist {
                    println!("    {}", dep.dimmed());
                }
            }
            if let Some(ref urls) = meta.project_urls {
                println!("  {:<17}", "project urls:");
                for (label, url) in urls {
                    println!(
                        "    {}: {}",
                        label,
                        url.as_deref().unwrap_or("-").dimmed()
                    );
                }
            }
        }
    }

    fn print_table(&self, results: &[AggregateResult]) {
        let name_width = results
            .iter()
            .map(|r| r.name.len())
            .chain(std::iter::once("NAME".len()))
            .max()
            .unwrap_or(4);

        println!(
            "{:<name_width$}  {:<10}  {:<10}  {:<10}",
            "NAME", "STATUS", "PYPI", "TESTPYPI"
        );

        for result in results {
            println!(
                "{:<name_width$}  {}  {}  {}",
                result.name,
                pad_colored(status_label(result.status), 10),
                pad_colored(tri_state_label(result.source.primary.taken), 10),
                pad_colored(tri_state_label(result.source.secondary.taken), 10),
            );

            if self.verbose {
                if let Some(ref record) = result.error {
                    println!(
                        "{:<name_width$}  {}",
                        "",
                        format!("{}: {}", record.kind, record.detail).dimmed()
                    );
                }
            }
        }
    }

    /// Create a progress bar for a multi-name run.
    pub fn create_progress_bar(&self, total: u64, message: &str) -> Option<ProgressBar> {
        if self.json_mode {
            return None;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb.set_message(message.to_string());
        Some(pb)
    }
}

impl Default for ConsoleOutput {
    fn default() -> Self {
        Self::new(false, false)
    }
}

fn status_label(status: Status) -> ColoredString {
    match status {
        Status::Taken => "taken".red().bold(),
        Status::NotTaken => "not taken".green(),
        Status::Error => "error".yellow(),
    }
}

fn tri_state_label(taken: Option<bool>) -> ColoredString {
    match taken {
        Some(true) => "taken".red(),
        Some(false) => "not taken".green(),
        None => "error".yellow(),
    }
}

/// Pad after coloring: escape codes make `{:<w$}` miscount the width.
fn pad_colored(text: ColoredString, width: usize) -> String {
    // ColoredString derefs to its uncolored input.
    let visible = text.chars().count();
    let padding = width.saturating_sub(visible);
    format!("{}{}", text, " ".repeat(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tri_state_labels() {
        assert_eq!(&*tri_state_label(Some(true)), "taken");
        assert_eq!(&*tri_state_label(Some(false)), "not taken");
        assert_eq!(&*tri_state_label(None), "error");
    }

    #[test]
    fn test_pad_colored_counts_visible_chars() {
        let padded = pad_colored("taken".red(), 10);
        assert!(padded.ends_with("     "));
    }
}
