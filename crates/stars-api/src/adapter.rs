use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::config::{StarsApiConfig, UrlPolicy, UrlValidationConfig};
use crate::envelope::ResultEnvelope;
use crate::error::ApiError;
use crate::executor::{HttpExecutor, RequestExecutor};
use crate::normalize::AliasNormalizer;
use crate::observe::Observer;
use crate::operation::OperationRequest;
use crate::retry::{RetryPolicy, RetryState};
use crate::url_check::{HttpUrlValidator, UrlValidator};

/// Performs logical Stars API operations and reports every outcome as a [`ResultEnvelope`]
pub struct StarsAdapter<E = HttpExecutor, V = HttpUrlValidator> {
    executor: E,
    validator: V,
    retry: RetryPolicy,
    normalizer: AliasNormalizer,
    url_validation: UrlValidationConfig,
    observer: Arc<dyn Observer>,
}

impl StarsAdapter {
    /// Build an adapter that talks to the configured endpoint over HTTP
    pub fn from_config(
        config: &StarsApiConfig,
        url_validation: UrlValidationConfig,
        observer: Arc<dyn Observer>,
    ) -> Result<Self, ApiError> {
        let executor = HttpExecutor::new(config)?;
        let validator = HttpUrlValidator::new(url_validation.ttl)?;

        Ok(Self::new(
            executor,
            validator,
            config.retry.clone(),
            url_validation,
            observer,
        ))
    }
}

impl<E, V> StarsAdapter<E, V>
where
    E: RequestExecutor,
    V: UrlValidator,
{
    pub fn new(
        executor: E,
        validator: V,
        retry: RetryPolicy,
        url_validation: UrlValidationConfig,
        observer: Arc<dyn Observer>,
    ) -> Self {
        Self {
            executor,
            validator,
            retry,
            normalizer: AliasNormalizer::new(observer.clone()),
            url_validation,
            observer,
        }
    }

    /// Perform one operation. Never fails: errors are folded into the envelope.
    pub async fn execute(&self, request: OperationRequest) -> ResultEnvelope {
        let name = request.name();
        let outcome = self.run(request).await;
        if let Err(error) = &outcome {
            debug!(operation = name, %error, "Stars API operation failed");
        }
        outcome.into()
    }

    /// Check that the configured token is accepted, giving up after `timeout`
    pub async fn verify_credentials(&self, timeout: Duration) -> Result<(), ApiError> {
        if !self.executor.has_credential() {
            return Err(ApiError::MissingCredential);
        }

        let data = tokio::time::timeout(
            timeout,
            self.executor.execute(&OperationRequest::GetUserData),
        )
        .await
        .map_err(|_| ApiError::Timeout(format!("no answer within {}ms", timeout.as_millis())))??;

        match data.get("loggedUser") {
            Some(Value::Null) | None => Err(ApiError::GraphQL(
                "the token is not associated with a logged in user".to_string(),
            )),
            Some(_) => Ok(()),
        }
    }

    async fn run(&self, mut request: OperationRequest) -> Result<Value, ApiError> {
        if request.requires_auth() && !self.executor.has_credential() {
            return Err(ApiError::MissingCredential);
        }

        request.normalize_platforms(&self.normalizer);
        request.validate()?;
        self.check_urls(&request).await?;

        let mut state = RetryState::new();
        loop {
            match self.executor.execute(&request).await {
                Ok(data) => return Ok(data),
                Err(error) => {
                    let message = error.to_string();
                    let delay = state.record_failure(&self.retry, error)?;
                    self.observer.warn(
                        "stars_api.retry",
                        &[
                            ("operation", &request.name()),
                            ("attempt", &state.attempt),
                            ("max_attempts", &self.retry.max_attempts),
                            ("delay_ms", &delay.as_millis()),
                            ("error", &message),
                        ],
                    );
                    tokio::time::sleep(delay).await;
                    state.advance();
                }
            }
        }
    }

    async fn check_urls(&self, request: &OperationRequest) -> Result<(), ApiError> {
        if !self.url_validation.enabled {
            return Ok(());
        }

        for url in request.urls() {
            if self
                .validator
                .validate(url, self.url_validation.timeout)
                .await
            {
                continue;
            }

            match self.url_validation.policy {
                UrlPolicy::Blocking => return Err(ApiError::UrlBlocked(url.to_string())),
                UrlPolicy::Advisory => self.observer.warn(
                    "url_validation.unreachable",
                    &[("operation", &request.name()), ("url", &url)],
                ),
            }
        }
        Ok(())
    }
}
