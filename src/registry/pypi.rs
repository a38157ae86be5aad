//! PyPI registry client: cached lookups and per-registry classification.

use crate::registry::cache::HttpCache;
use crate::registry::metadata::extract_metadata;
use crate::types::{
    CachedResponse, ErrorKind, ErrorRecord, FetchOutcome, RegistryVerdict, Result,
    TransportError,
};
use dashmap::DashMap;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

/// Primary index and metadata source.
pub const PYPI: &str = "https://pypi.org/pypi/{name}/json";
/// Secondary (staging) index, reported for information only.
pub const TEST_PYPI: &str = "https://test.pypi.org/pypi/{name}/json";

/// Fixed per-request deadline. Not configurable, never retried.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for querying package indexes that speak the PyPI JSON API.
///
/// Every lookup goes through the cache first; outcomes (errors included)
/// are cached unconditionally, and concurrent lookups for the same URL
/// are coalesced into a single network request.
pub struct PypiClient {
    client: Client,
    cache: HttpCache,
    cache_ttl: Option<Duration>,
    rate_limiter: Arc<DirectRateLimiter>,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl PypiClient {
    /// Create a new client. `cache_ttl = None` caches for the process
    /// lifetime.
    pub fn new(rate_limit: u32, cache_ttl: Option<Duration>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("nscout/", env!("CARGO_PKG_VERSION")))
            .http1_only()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        let quota =
            Quota::per_second(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::new(10).unwrap()));

        Ok(Self {
            client,
            cache: HttpCache::new(),
            cache_ttl,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            inflight: DashMap::new(),
        })
    }

    /// Substitute a (percent-encoded) package name into a URL template.
    pub fn resolve_url(template: &str, name: &str) -> String {
        template.replace("{name}", &urlencoding::encode(name))
    }

    pub fn cache(&self) -> &HttpCache {
        &self.cache
    }

    /// Check one name against one registry and classify the outcome.
    ///
    /// `want_metadata` marks the metadata-source registry; only then is a
    /// 200 body parsed as JSON.
    pub async fn check_registry(
        &self,
        name: &str,
        template: &str,
        want_metadata: bool,
    ) -> RegistryVerdict {
        let url = Self::resolve_url(template, name);
        let outcome = self.safe_get(&url).await;
        let verdict = classify(outcome, want_metadata);

        match &verdict {
            RegistryVerdict::Taken { .. } => debug!("{}: taken on {}", name, url),
            RegistryVerdict::NotTaken => debug!("{}: not taken on {}", name, url),
            RegistryVerdict::Error(record) => {
                warn!("{}: lookup failed on {}: {}", name, url, record.detail)
            }
        }

        verdict
    }

    /// Cached GET. Returns the cached pair unchanged on a hit, including
    /// cached failures.
    pub async fn safe_get(&self, url: &str) -> FetchOutcome {
        let key = HttpCache::make_key(["GET", url]);

        if let Some(hit) = self.cache.get(&key, self.cache_ttl) {
            trace!("cache hit for {}", url);
            return hit;
        }

        // At most one request per URL in flight: later callers queue on
        // the same gate and pick the finished outcome up from the cache.
        let gate = {
            let entry = self
                .inflight
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
        };
        let _guard = gate.lock().await;

        if let Some(hit) = self.cache.get(&key, self.cache_ttl) {
            trace!("coalesced concurrent lookup for {}", url);
            return hit;
        }

        let outcome = self.do_get(url).await;
        self.cache.set(&key, outcome.clone());

        drop(_guard);
        self.inflight.remove(&key);

        outcome
    }

    /// One network attempt, rate limited, normalized to a `FetchOutcome`.
    async fn do_get(&self, url: &str) -> FetchOutcome {
        self.rate_limiter.until_ready().await;
        trace!("GET {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return Err(TransportError::Timeout),
            Err(e) => return Err(TransportError::Network(e.to_string())),
        };

        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Ok(CachedResponse { status, body }),
            Err(e) if e.is_timeout() => Err(TransportError::Timeout),
            Err(e) => Err(TransportError::Network(e.to_string())),
        }
    }
}

/// Map a lookup outcome onto the verdict taxonomy.
fn classify(outcome: FetchOutcome, want_metadata: bool) -> RegistryVerdict {
    let response = match outcome {
        Err(TransportError::Timeout) => {
            return RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Timeout, "request timed out"))
        }
        Err(TransportError::Network(detail)) => {
            return RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Network, detail))
        }
        Ok(response) => response,
    };

    match response.status {
        404 => RegistryVerdict::NotTaken,
        200 => {
            if !want_metadata {
                return RegistryVerdict::Taken { metadata: None };
            }
            match serde_json::from_str(&response.body) {
                Ok(doc) => RegistryVerdict::Taken {
                    metadata: Some(extract_metadata(&doc)),
                },
                Err(e) => {
                    RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Malformed, e.to_string()))
                }
            }
        }
        status @ 500..=599 => {
            RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Server, status.to_string()))
        }
        status => RegistryVerdict::Error(ErrorRecord::new(ErrorKind::Unknown, status.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> FetchOutcome {
        Ok(CachedResponse {
            status,
            body: body.to_string(),
        })
    }

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            PypiClient::resolve_url(PYPI, "requests"),
            "https://pypi.org/pypi/requests/json"
        );
        // Names are percent-encoded into the template.
        assert_eq!(
            PypiClient::resolve_url(PYPI, "a/b"),
            "https://pypi.org/pypi/a%2Fb/json"
        );
    }

    #[test]
    fn test_classify_404_is_not_taken() {
        assert_eq!(classify(response(404, ""), true), RegistryVerdict::NotTaken);
    }

    #[test]
    fn test_classify_200_with_metadata() {
        let body = r#"{"info": {"version": "1.0.0"}, "releases": {}}"#;
        match classify(response(200, body), true) {
            RegistryVerdict::Taken {
                metadata: Some(meta),
            } => assert_eq!(meta.version.as_deref(), Some("1.0.0")),
            other => panic!("expected taken with metadata, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_200_secondary_skips_parsing() {
        // Not the metadata source: the body is never parsed, so even
        // garbage classifies as taken.
        assert_eq!(
            classify(response(200, "<html>not json</html>"), false),
            RegistryVerdict::Taken { metadata: None }
        );
    }

    #[test]
    fn test_classify_200_malformed_body() {
        match classify(response(200, "<html>proxy error</html>"), true) {
            RegistryVerdict::Error(record) => assert_eq!(record.kind, ErrorKind::Malformed),
            other => panic!("expected malformed error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_5xx_is_server_error() {
        match classify(response(503, ""), true) {
            RegistryVerdict::Error(record) => {
                assert_eq!(record.kind, ErrorKind::Server);
                assert_eq!(record.detail, "503");
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_other_status_is_unknown() {
        match classify(response(302, ""), true) {
            RegistryVerdict::Error(record) => {
                assert_eq!(record.kind, ErrorKind::Unknown);
                assert_eq!(record.detail, "302");
            }
            other => panic!("expected unknown error, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_transport_errors() {
        match classify(Err(TransportError::Timeout), true) {
            RegistryVerdict::Error(record) => assert_eq!(record.kind, ErrorKind::Timeout),
            other => panic!("expected timeout error, got {:?}", other),
        }

        match classify(Err(TransportError::Network("dns failure".into())), true) {
            RegistryVerdict::Error(record) => {
                assert_eq!(record.kind, ErrorKind::Network);
                assert_eq!(record.detail, "dns failure");
            }
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
