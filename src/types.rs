//! Core types and errors for the name availability checker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while setting up or running a check.
#[derive(Error, Debug)]
pub enum NscoutError {
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, NscoutError>;

/// Transport-level failure: the request never produced an HTTP response.
///
/// HTTP responses of any status are not errors at this layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response within the fixed deadline.
    Timeout,
    /// Any other transport failure (DNS, connection refused, TLS).
    Network(String),
}

/// An HTTP response reduced to what classification needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub body: String,
}

/// Outcome of a single lookup. Cached verbatim, errors included, so an
/// unreachable host is not hammered with repeat attempts within the TTL.
pub type FetchOutcome = std::result::Result<CachedResponse, TransportError>;

/// Error taxonomy surfaced to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No response within the deadline.
    Timeout,
    /// DNS, connection refused, TLS, and other transport failures.
    Network,
    /// HTTP 5xx from the registry.
    Server,
    /// Any other non-200/404/5xx status.
    Unknown,
    /// A 200 response whose body is not valid JSON.
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
            ErrorKind::Malformed => "malformed",
        };
        f.write_str(label)
    }
}

/// A classified failure from one registry lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorRecord {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub detail: String,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// Per-registry verdict for one package name.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryVerdict {
    /// The name resolves to an existing package. Metadata is populated only
    /// for the registry designated as the metadata source.
    Taken { metadata: Option<Metadata> },
    /// The registry reports no such package.
    NotTaken,
    /// The lookup failed; existence is unknown.
    Error(ErrorRecord),
}

impl RegistryVerdict {
    /// Tri-state existence: `Some(true)` taken, `Some(false)` free,
    /// `None` unknown.
    pub fn taken(&self) -> Option<bool> {
        match self {
            RegistryVerdict::Taken { .. } => Some(true),
            RegistryVerdict::NotTaken => Some(false),
            RegistryVerdict::Error(_) => None,
        }
    }
}

/// The moment of a release as the index reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LatestRelease {
    pub version: String,
    pub timestamp: Option<String>,
}

/// Structured package metadata extracted from the registry's JSON document.
///
/// Every scalar is nullable: absent upstream data maps to `None`, never to
/// an extraction error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub version: Option<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    pub author_email: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub project_url: Option<String>,
    pub project_urls: Option<BTreeMap<String, Option<String>>>,
    pub requires_python: Option<String>,
    pub requires_dist: Vec<String>,
    pub release_count: usize,
    pub latest_release: Option<LatestRelease>,
    /// Lexicographically sorted raw version strings, not semver order.
    pub all_versions: Vec<String>,
}

/// Unified availability status for one name, derived from the primary
/// registry alone.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Taken,
    NotTaken,
    Error,
}

/// Raw tri-state outcome of one registry, reported for information.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrySummary {
    pub taken: Option<bool>,
}

/// Both registries' raw outcomes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceVerdicts {
    pub primary: RegistrySummary,
    pub secondary: RegistrySummary,
}

/// Public result of checking one name against both registries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    pub name: String,
    pub status: Status,
    pub source: SourceVerdicts,
    pub metadata: Option<Metadata>,
    pub error: Option<ErrorRecord>,
}

impl AggregateResult {
    /// Merge the two per-registry verdicts into the unified result.
    ///
    /// `status`, `metadata` and `error` come from the primary verdict only;
    /// the secondary outcome is informational and never changes them.
    pub fn from_verdicts(
        name: impl Into<String>,
        primary: RegistryVerdict,
        secondary: RegistryVerdict,
    ) -> Self {
        let source = SourceVerdicts {
            primary: RegistrySummary {
                taken: primary.taken(),
            },
            secondary: RegistrySummary {
                taken: secondary.taken(),
            },
        };

        let (status, metadata, error) = match primary {
            RegistryVerdict::Taken { metadata } => (Status::Taken, metadata, None),
            RegistryVerdict::NotTaken => (Status::NotTaken, None, None),
            RegistryVerdict::Error(record) => (Status::Error, None, Some(record)),
        };

        Self {
            name: name.into(),
            status,
            source,
            metadata,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_taken_primary_carries_metadata() {
        let meta = Metadata {
            version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let result = AggregateResult::from_verdicts(
            "requests",
            RegistryVerdict::Taken {
                metadata: Some(meta.clone()),
            },
            RegistryVerdict::NotTaken,
        );

        assert_eq!(result.status, Status::Taken);
        assert_eq!(result.metadata, Some(meta));
        assert!(result.error.is_none());
        assert_eq!(result.source.primary.taken, Some(true));
        assert_eq!(result.source.secondary.taken, Some(false));
    }

    #[test]
    fn test_secondary_never_changes_status() {
        let result = AggregateResult::from_verdicts(
            "free-name",
            RegistryVerdict::NotTaken,
            RegistryVerdict::Taken { metadata: None },
        );

        assert_eq!(result.status, Status::NotTaken);
        assert!(result.metadata.is_none());
        assert!(result.error.is_none());
        assert_eq!(result.source.secondary.taken, Some(true));
    }

    #[test]
    fn test_primary_error_surfaces_record() {
        let record = ErrorRecord::new(ErrorKind::Server, "503");
        let result = AggregateResult::from_verdicts(
            "flaky",
            RegistryVerdict::Error(record.clone()),
            RegistryVerdict::NotTaken,
        );

        assert_eq!(result.status, Status::Error);
        assert!(result.metadata.is_none());
        assert_eq!(result.error, Some(record));
        assert_eq!(result.source.primary.taken, None);
    }

    #[test]
    fn test_result_sequence_serializes_cleanly() {
        let meta = Metadata {
            version: Some("1.0.0".to_string()),
            ..Default::default()
        };
        let results = vec![
            AggregateResult::from_verdicts(
                "foo",
                RegistryVerdict::Taken {
                    metadata: Some(meta),
                },
                RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Timeout, "request timed out")),
            ),
            AggregateResult::from_verdicts("bar", RegistryVerdict::NotTaken, RegistryVerdict::NotTaken),
        ];

        let json = serde_json::to_string_pretty(&results).expect("results must serialize");
        assert!(json.contains("\"status\": \"taken\""));
        assert!(json.contains("\"status\": \"not_taken\""));
        assert!(json.contains("\"taken\": null"));
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Status::NotTaken).unwrap(),
            "\"not_taken\""
        );
        assert_eq!(
            serde_json::to_string(&ErrorKind::Malformed).unwrap(),
            "\"malformed\""
        );
    }
}
