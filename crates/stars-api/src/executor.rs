//! Sending one GraphQL operation to the Stars API

use std::future::Future;

use reqwest::StatusCode;
use reqwest::header::{
    ACCEPT, AUTHORIZATION, CONTENT_TYPE, COOKIE, HeaderMap, HeaderValue, ORIGIN, REFERER,
};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::StarsApiConfig;
use crate::error::ApiError;
use crate::operation::OperationRequest;

const STARS_ORIGIN: &str = "https://stars.github.com";

/// Performs a single attempt of an operation. Retrying is the caller's job.
pub trait RequestExecutor: Send + Sync {
    /// Whether requests will carry a bearer token
    fn has_credential(&self) -> bool;

    /// Execute the operation once, returning the `data` member of the GraphQL response
    fn execute(
        &self,
        request: &OperationRequest,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

/// Executes operations over HTTP with `reqwest`
#[derive(Clone, Debug)]
pub struct HttpExecutor {
    client: reqwest::Client,
    endpoint: Url,
    has_credential: bool,
}

impl HttpExecutor {
    pub fn new(config: &StarsApiConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ORIGIN, HeaderValue::from_static(STARS_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static("https://stars.github.com/"));

        if let Some(token) = &config.token {
            let token = token.expose_secret();
            let mut bearer = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| ApiError::Config(format!("invalid token: {e}")))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);

            let mut cookie = HeaderValue::from_str(&format!("token={token}"))
                .map_err(|e| ApiError::Config(format!("invalid token: {e}")))?;
            cookie.set_sensitive(true);
            headers.insert(COOKIE, cookie);
        }

        // Configured headers win over the defaults
        for (name, value) in &config.headers {
            headers.insert(name.clone(), value.clone());
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("stars-mcp-server/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone().into_inner(),
            has_credential: config.token.is_some(),
        })
    }
}

impl RequestExecutor for HttpExecutor {
    fn has_credential(&self) -> bool {
        self.has_credential
    }

    async fn execute(&self, request: &OperationRequest) -> Result<Value, ApiError> {
        let body = request.to_graphql()?;
        debug!(operation = request.name(), endpoint = %self.endpoint, "Sending GraphQL request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        interpret(status, &text)
    }
}

#[derive(Deserialize)]
struct GraphQLResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQLError>>,
}

#[derive(Deserialize)]
struct GraphQLError {
    /// Only a string message is reported; anything else counts as missing
    #[serde(default)]
    message: Option<Value>,
}

/// Classify a raw HTTP response. GraphQL errors win over any partial `data`.
fn interpret(status: StatusCode, body: &str) -> Result<Value, ApiError> {
    if !status.is_success() {
        return Err(ApiError::status(status, body));
    }

    let response: GraphQLResponse =
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))?;

    if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
        let message = errors
            .into_iter()
            .next()
            .and_then(|error| match error.message {
                Some(Value::String(message)) => Some(message),
                _ => None,
            })
            .unwrap_or_else(|| "Unknown error".to_string());
        return Err(ApiError::GraphQL(message));
    }

    Ok(response.data.unwrap_or(Value::Null))
}
