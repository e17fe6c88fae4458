use std::future::Future;
use std::time::Duration;

use tracing::debug;
use url::Url;

use crate::cache::TtlCache;
use crate::error::ApiError;

/// Decides whether a user-supplied URL is reachable.
///
/// Implementations never fail: any error is reported as unreachable.
pub trait UrlValidator: Send + Sync {
    fn validate(&self, url: &str, timeout: Duration) -> impl Future<Output = bool> + Send;
}

/// The outcome of one reachability probe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlCheck {
    pub reachable: bool,
    /// Why the URL was considered unreachable
    pub reason: Option<String>,
}

impl UrlCheck {
    fn reachable() -> Self {
        Self {
            reachable: true,
            reason: None,
        }
    }

    fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            reachable: false,
            reason: Some(reason.into()),
        }
    }
}

/// Probes URLs with a `HEAD` request and remembers the answer for a while
pub struct HttpUrlValidator {
    client: reqwest::Client,
    cache: TtlCache<String, UrlCheck>,
    ttl: Duration,
}

impl HttpUrlValidator {
    pub fn new(ttl: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("stars-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            cache: TtlCache::new(),
            ttl,
        })
    }

    /// Check a URL, consulting the cache first
    pub async fn check(&self, url: &str, timeout: Duration) -> UrlCheck {
        let parsed = Url::parse(url.trim());
        let key = match &parsed {
            Ok(parsed) => parsed.to_string(),
            Err(_) => url.to_string(),
        };

        if let Some(cached) = self.cache.get(&key) {
            debug!(url = %key, reachable = cached.reachable, "URL check served from cache");
            return cached;
        }

        let outcome = match parsed {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                self.probe(parsed, timeout).await
            }
            Ok(parsed) => UrlCheck::unreachable(format!("unsupported scheme {}", parsed.scheme())),
            Err(e) => UrlCheck::unreachable(format!("invalid URL: {e}")),
        };

        debug!(url = %key, reachable = outcome.reachable, reason = ?outcome.reason, "URL checked");
        self.cache.put(key, outcome.clone(), self.ttl);
        outcome
    }

    async fn probe(&self, url: Url, timeout: Duration) -> UrlCheck {
        match self.client.head(url).timeout(timeout).send().await {
            Ok(response) if response.status().as_u16() >= 400 => {
                UrlCheck::unreachable(format!("status {}", response.status().as_u16()))
            }
            Ok(_) => UrlCheck::reachable(),
            Err(e) if e.is_timeout() => UrlCheck::unreachable("timeout"),
            Err(_) => UrlCheck::unreachable("error"),
        }
    }
}

impl UrlValidator for HttpUrlValidator {
    async fn validate(&self, url: &str, timeout: Duration) -> bool {
        self.check(url, timeout).await.reachable
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn validator() -> HttpUrlValidator {
        HttpUrlValidator::new(Duration::from_secs(60)).unwrap()
    }

    #[tokio::test]
    async fn reachable_url_is_valid() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        assert!(validator().validate(&format!("{}/post", server.uri()), TIMEOUT).await);
    }

    #[tokio::test]
    async fn redirects_are_followed() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/new"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        assert!(validator().validate(&format!("{}/old", server.uri()), TIMEOUT).await);
    }

    #[tokio::test]
    async fn client_errors_are_unreachable_with_status_reason() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let check = validator().check(&server.uri(), TIMEOUT).await;

        assert_eq!(check, UrlCheck::unreachable("status 404"));
    }

    #[tokio::test]
    async fn timed_out_probe_is_cached_as_unreachable() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .expect(1)
            .mount(&server)
            .await;

        let validator = validator();
        let url = format!("{}/slow", server.uri());

        let first = validator.check(&url, TIMEOUT).await;
        assert_eq!(first, UrlCheck::unreachable("timeout"));

        // Served from the cache: the mock expects exactly one request
        assert!(!validator.validate(&url, TIMEOUT).await);
    }

    #[tokio::test]
    async fn equivalent_urls_share_a_cache_entry() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let validator = validator();
        let uri = server.uri();
        assert!(validator.validate(&uri, TIMEOUT).await);
        assert!(validator.validate(&format!("{uri}/"), TIMEOUT).await);
    }

    #[tokio::test]
    async fn malformed_urls_are_unreachable_without_a_request() {
        let validator = validator();

        let check = validator.check("not a url", TIMEOUT).await;
        assert!(!check.reachable);
        assert!(check.reason.unwrap().starts_with("invalid URL"));

        assert!(!validator.validate("ftp://example.com/file", TIMEOUT).await);
    }

    #[tokio::test]
    async fn unreachable_host_is_invalid() {
        assert!(!validator().validate("http://127.0.0.1:1/", TIMEOUT).await);
    }
}
