//! Name checker orchestrating registry lookups and aggregation.

use crate::config::Config;
use crate::notify::ConsoleOutput;
use crate::registry::{PypiClient, PYPI, TEST_PYPI};
use crate::types::{AggregateResult, Result, Status};
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Checks names against the primary and secondary registries and merges
/// the verdicts into one result per name.
pub struct NameChecker {
    client: Arc<PypiClient>,
    primary: String,
    secondary: String,
    parallel: usize,
    console: ConsoleOutput,
}

impl NameChecker {
    /// Create a checker with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(PypiClient::new(config.rate_limit, config.cache_ttl())?);

        Ok(Self {
            client,
            primary: PYPI.to_string(),
            secondary: TEST_PYPI.to_string(),
            parallel: config.parallel.max(1),
            console: ConsoleOutput::new(config.verbose, config.json),
        })
    }

    /// Point the checker at different registry endpoints. The primary
    /// stays the metadata source.
    pub fn with_registries(
        mut self,
        primary: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        self.primary = primary.into();
        self.secondary = secondary.into();
        self
    }

    /// Check a single name against both registries.
    ///
    /// The two lookups are independent and run concurrently; the caller
    /// passes a pre-trimmed name.
    pub async fn check_name(&self, name: &str) -> AggregateResult {
        let (primary, secondary) = tokio::join!(
            self.client.check_registry(name, &self.primary, true),
            self.client.check_registry(name, &self.secondary, false),
        );

        AggregateResult::from_verdicts(name, primary, secondary)
    }

    /// Check many names with bounded concurrency, preserving input order.
    ///
    /// A failed lookup yields an error-status result for that name and
    /// never aborts the rest of the run.
    pub async fn check_all(&self, names: &[String]) -> Vec<AggregateResult> {
        let pb = if names.len() > 1 {
            self.console
                .create_progress_bar(names.len() as u64, "Checking registries")
        } else {
            None
        };

        let mut indexed: Vec<(usize, AggregateResult)> = stream::iter(names.iter().enumerate())
            .map(|(i, name)| {
                let pb = pb.clone();
                async move {
                    let result = self.check_name(name).await;
                    if let Some(ref pb) = pb {
                        pb.inc(1);
                    }
                    (i, result)
                }
            })
            .buffer_unordered(self.parallel)
            .collect()
            .await;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        indexed.sort_by_key(|(i, _)| *i);
        indexed.into_iter().map(|(_, r)| r).collect()
    }
}

/// Process exit code for a finished run: 4 if any name errored, else 1 if
/// any name is taken, else 0. Error wins over taken.
pub fn exit_code(results: &[AggregateResult]) -> u8 {
    let mut code = 0;
    for result in results {
        match result.status {
            Status::Error => return 4,
            Status::Taken => code = 1,
            Status::NotTaken => {}
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, ErrorRecord, RegistryVerdict};

    fn result(name: &str, primary: RegistryVerdict) -> AggregateResult {
        AggregateResult::from_verdicts(name, primary, RegistryVerdict::NotTaken)
    }

    #[test]
    fn test_exit_code_all_free() {
        let results = vec![
            result("a", RegistryVerdict::NotTaken),
            result("b", RegistryVerdict::NotTaken),
        ];
        assert_eq!(exit_code(&results), 0);
    }

    #[test]
    fn test_exit_code_any_taken() {
        let results = vec![
            result("a", RegistryVerdict::NotTaken),
            result("b", RegistryVerdict::Taken { metadata: None }),
        ];
        assert_eq!(exit_code(&results), 1);
    }

    #[test]
    fn test_exit_code_error_wins_over_taken() {
        let results = vec![
            result("a", RegistryVerdict::Taken { metadata: None }),
            result(
                "b",
                RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Timeout, "request timed out")),
            ),
        ];
        assert_eq!(exit_code(&results), 4);
    }

    #[test]
    fn test_exit_code_empty_run() {
        assert_eq!(exit_code(&[]), 0);
    }
}
