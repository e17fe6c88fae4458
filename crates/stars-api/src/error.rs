use reqwest::StatusCode;

/// Longest response body kept in an error message
const MAX_BODY_CHARS: usize = 512;

/// A classified failure while talking to the Stars API
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("missing Stars API token: set STARS_API_TOKEN or `stars_api.token`")]
    MissingCredential,

    #[error("invalid client configuration: {0}")]
    Config(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("HTTP {}: {}", .status.as_u16(), .body)]
    Status { status: StatusCode, body: String },

    #[error("{0}")]
    GraphQL(String),

    #[error("Invalid JSON response: {0}")]
    InvalidResponse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid or unreachable URL: {0}")]
    UrlBlocked(String),

    #[error("{last} (after {attempts} attempts)")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<ApiError>,
    },
}

impl ApiError {
    pub(crate) fn status(status: StatusCode, body: &str) -> Self {
        ApiError::Status {
            status,
            body: body.chars().take(MAX_BODY_CHARS).collect(),
        }
    }

    /// Returns `true` if the error is transient (may succeed on retry), `false` otherwise.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Timeout(_) | ApiError::Connection(_) => true,
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::status(status, "")
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if err.is_builder() {
            ApiError::Config(err.to_string())
        } else {
            ApiError::Connection(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::any;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[rstest]
    #[case(ApiError::MissingCredential)]
    #[case(ApiError::Config("bad header".to_string()))]
    #[case(ApiError::GraphQL("Invalid date".to_string()))]
    #[case(ApiError::InvalidResponse("expected value".to_string()))]
    #[case(ApiError::InvalidInput("unknown platform".to_string()))]
    #[case(ApiError::UrlBlocked("https://example.com".to_string()))]
    fn semantic_errors_are_not_transient(#[case] error: ApiError) {
        assert!(!error.is_transient());
    }

    #[rstest]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, true)]
    #[case(StatusCode::BAD_GATEWAY, true)]
    #[case(StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(StatusCode::TOO_MANY_REQUESTS, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::UNAUTHORIZED, false)]
    #[case(StatusCode::FORBIDDEN, false)]
    #[case(StatusCode::NOT_FOUND, false)]
    fn status_errors_are_classified_by_code(#[case] status: StatusCode, #[case] transient: bool) {
        assert_eq!(ApiError::status(status, "body").is_transient(), transient);
    }

    #[test]
    fn exhausted_retries_are_permanent() {
        let error = ApiError::RetriesExhausted {
            attempts: 3,
            last: Box::new(ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "oops")),
        };

        assert!(!error.is_transient());
        assert_eq!(error.to_string(), "HTTP 500: oops (after 3 attempts)");
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(MAX_BODY_CHARS * 2);
        let ApiError::Status { body, .. } = ApiError::status(StatusCode::BAD_GATEWAY, &body) else {
            panic!("expected a status error");
        };
        assert_eq!(body.len(), MAX_BODY_CHARS);
    }

    #[tokio::test]
    async fn client_error_404_is_not_transient() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let result = reqwest::get(mock_server.uri()).await.unwrap();
        let error = ApiError::from(result.error_for_status().unwrap_err());

        assert!(matches!(error, ApiError::Status { status, .. } if status == StatusCode::NOT_FOUND));
        assert!(!error.is_transient());
    }

    #[tokio::test]
    async fn server_error_is_transient() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let result = reqwest::get(mock_server.uri()).await.unwrap();
        let error = ApiError::from(result.error_for_status().unwrap_err());

        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn timeout_error_is_transient() {
        let mock_server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(10)))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(1))
            .build()
            .unwrap();

        let error = ApiError::from(client.get(mock_server.uri()).send().await.unwrap_err());

        assert!(matches!(error, ApiError::Timeout(_)));
        assert!(error.is_transient());
    }

    #[tokio::test]
    async fn connection_error_is_transient() {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(1))
            .build()
            .unwrap();

        let error = ApiError::from(client.get("http://192.0.2.1:1").send().await.unwrap_err());

        assert!(error.is_transient());
    }
}
