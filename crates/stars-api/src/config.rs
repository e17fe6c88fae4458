use std::collections::HashMap;
use std::fmt::Debug;
use std::ops::Deref;
use std::time::Duration;

use reqwest::header::HeaderMap;
use schemars::JsonSchema;
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::retry::RetryPolicy;

/// Connection settings for the Stars GraphQL API
#[derive(Clone, Debug, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StarsApiConfig {
    /// The GraphQL endpoint
    #[schemars(with = "String")]
    pub endpoint: Endpoint,

    /// Bearer token used for mutations and user-scoped reads
    #[schemars(with = "Option<String>")]
    pub token: Option<SecretString>,

    /// The HTTP client timeout for each GraphQL request
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// Hard-coded headers to include in every GraphQL request
    #[serde(deserialize_with = "parsers::header_map")]
    #[schemars(schema_with = "header_map")]
    pub headers: HeaderMap,

    /// Retry behaviour for transient failures
    pub retry: RetryPolicy,
}

impl Default for StarsApiConfig {
    fn default() -> Self {
        Self {
            endpoint: Endpoint::default(),
            token: None,
            timeout: Duration::from_secs(30),
            headers: HeaderMap::new(),
            retry: RetryPolicy::default(),
        }
    }
}

impl StarsApiConfig {
    /// Configuration pointing at a mock server, with fast retries
    pub fn for_tests(endpoint: Url) -> Self {
        Self {
            endpoint: Endpoint(endpoint),
            token: Some(SecretString::from("test-token")),
            timeout: Duration::from_secs(5),
            headers: HeaderMap::new(),
            retry: RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(5), 0.0),
        }
    }
}

/// What to do when a submitted URL fails its reachability probe
#[derive(Clone, Copy, Debug, Default, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UrlPolicy {
    /// Reject the operation without calling the API
    #[default]
    Blocking,

    /// Log a warning and submit anyway
    Advisory,
}

/// Pre-flight reachability checks for user-supplied URLs
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct UrlValidationConfig {
    /// Probe URLs before submitting them
    pub enabled: bool,

    /// Timeout for a single probe
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub timeout: Duration,

    /// How long a probe result is reused
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub ttl: Duration,

    /// Whether an unreachable URL blocks the operation
    pub policy: UrlPolicy,
}

impl Default for UrlValidationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout: Duration::from_secs(3),
            ttl: Duration::from_secs(3600),
            policy: UrlPolicy::Blocking,
        }
    }
}

/// The GraphQL endpoint of the Stars API
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint(Url);

impl Endpoint {
    pub fn new(url: Url) -> Self {
        Self(url)
    }

    pub fn into_inner(self) -> Url {
        self.0
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self(defaults::endpoint())
    }
}

impl<'de> Deserialize<'de> for Endpoint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Url::deserialize(deserializer).map(Self)
    }
}

impl Deref for Endpoint {
    type Target = Url;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn header_map(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
    HashMap::<String, String>::json_schema(generator)
}

mod defaults {
    use url::Url;

    pub(super) fn endpoint() -> Url {
        // SAFETY: constant input, covered by [test::default_endpoint_parses_correctly]
        #[allow(clippy::unwrap_used)]
        Url::parse("https://api-stars.github.com/").unwrap()
    }

}

mod parsers {
    use std::str::FromStr;

    use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
    use serde::Deserializer;

    pub(super) fn header_map<'de, D>(deserializer: D) -> Result<HeaderMap, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HeaderMapVisitor;
        impl<'de> serde::de::Visitor<'de> for HeaderMapVisitor {
            type Value = HeaderMap;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a map of header string keys and values")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut parsed = HeaderMap::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, String>()? {
                    let key = HeaderName::from_str(&key)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    let value = HeaderValue::from_str(&value)
                        .map_err(|e| serde::de::Error::custom(e.to_string()))?;
                    parsed.insert(key, value);
                }
                Ok(parsed)
            }
        }

        deserializer.deserialize_map(HeaderMapVisitor)
    }
}
