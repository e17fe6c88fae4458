//! Exponential backoff for transient Stars API failures.
//!
//! Only errors for which [`ApiError::is_transient`] holds are retried. The delay before retry
//! `n` is `base_delay * 2^(n-1)` capped at `max_delay`, plus a random jitter of up to
//! `jitter_ratio` of that backoff. The sum is clamped to `max_delay` again, so delays never
//! decrease as attempts increase.

use std::time::Duration;

use rand::Rng;
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::ApiError;

/// Largest jitter fraction; below 1 so a jittered delay never reaches the next backoff step
const MAX_JITTER_RATIO: f64 = 0.99;

/// When and how long to wait before retrying a failed request
#[derive(Clone, Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Delay before the first retry
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub base_delay: Duration,

    /// Cap for the exponential growth
    #[serde(with = "humantime_serde")]
    #[schemars(with = "String")]
    pub max_delay: Duration,

    /// Upper bound of the random jitter, as a fraction of the backoff
    pub jitter_ratio: f64,
}

impl RetryPolicy {
    pub const fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        jitter_ratio: f64,
    ) -> Self {
        Self {
            max_attempts,
            base_delay,
            max_delay,
            jitter_ratio,
        }
    }

    /// Whether a request that failed on `attempt` (1-indexed) should be tried again
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_transient()
    }

    /// The deterministic part of the delay after `attempt`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// The delay to sleep after `attempt` failed, jitter included
    pub fn next_delay(&self, attempt: u32) -> Duration {
        let backoff = self.backoff(attempt);
        let ratio = self.effective_jitter_ratio();
        let jitter = if ratio > 0.0 {
            backoff.mul_f64(rand::thread_rng().gen_range(0.0..ratio))
        } else {
            Duration::ZERO
        };
        backoff.saturating_add(jitter).min(self.max_delay)
    }

    fn effective_jitter_ratio(&self) -> f64 {
        if self.jitter_ratio.is_finite() {
            self.jitter_ratio.clamp(0.0, MAX_JITTER_RATIO)
        } else {
            0.0
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500), Duration::from_secs(8), 0.5)
    }
}

/// Progress through the retry budget of a single operation
#[derive(Debug)]
pub struct RetryState {
    pub attempt: u32,
    pub last_error: Option<ApiError>,
    pub next_delay: Duration,
}

impl RetryState {
    pub fn new() -> Self {
        Self {
            attempt: 1,
            last_error: None,
            next_delay: Duration::ZERO,
        }
    }

    /// Record a failure of the current attempt.
    ///
    /// Returns the delay to wait before the next attempt, or the error to surface when the
    /// policy says to stop. Transient errors that ran out of attempts are wrapped in
    /// [`ApiError::RetriesExhausted`].
    pub fn record_failure(
        &mut self,
        policy: &RetryPolicy,
        error: ApiError,
    ) -> Result<Duration, ApiError> {
        if policy.should_retry(&error, self.attempt) {
            self.next_delay = policy.next_delay(self.attempt);
            self.last_error = Some(error);
            Ok(self.next_delay)
        } else if error.is_transient() {
            Err(ApiError::RetriesExhausted {
                attempts: self.attempt,
                last: Box::new(error),
            })
        } else {
            Err(error)
        }
    }

    pub fn advance(&mut self) {
        self.attempt = self.attempt.saturating_add(1);
    }
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;
    use rstest::rstest;

    use super::*;

    fn server_error() -> ApiError {
        ApiError::status(StatusCode::INTERNAL_SERVER_ERROR, "")
    }

    #[rstest]
    #[case(1, true)]
    #[case(2, true)]
    #[case(3, false)]
    #[case(4, false)]
    fn transient_errors_retry_until_max_attempts(#[case] attempt: u32, #[case] expected: bool) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.should_retry(&server_error(), attempt), expected);
    }

    #[rstest]
    #[case(ApiError::GraphQL("Invalid date".to_string()))]
    #[case(ApiError::status(StatusCode::BAD_REQUEST, ""))]
    #[case(ApiError::MissingCredential)]
    fn permanent_errors_never_retry(#[case] error: ApiError) {
        assert!(!RetryPolicy::default().should_retry(&error, 1));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.backoff(1), Duration::from_millis(500));
        assert_eq!(policy.backoff(2), Duration::from_secs(1));
        assert_eq!(policy.backoff(3), Duration::from_secs(2));
        assert_eq!(policy.backoff(5), Duration::from_secs(8));
        assert_eq!(policy.backoff(6), Duration::from_secs(8));
        assert_eq!(policy.backoff(u32::MAX), Duration::from_secs(8));
    }

    #[test]
    fn next_delay_is_monotonic_and_bounded() {
        for ratio in [0.0, 0.5, 0.99, 5.0, f64::NAN] {
            let policy = RetryPolicy::new(
                10,
                Duration::from_millis(500),
                Duration::from_secs(8),
                ratio,
            );
            for _ in 0..50 {
                let mut previous = Duration::ZERO;
                for attempt in 1..=10 {
                    let delay = policy.next_delay(attempt);
                    assert!(delay >= previous, "delay decreased at attempt {attempt}");
                    assert!(delay >= policy.backoff(attempt));
                    assert!(delay <= policy.max_delay);
                    previous = delay;
                }
            }
        }
    }

    #[test]
    fn zero_jitter_is_deterministic() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), Duration::from_secs(1), 0.0);
        assert_eq!(policy.next_delay(2), Duration::from_millis(200));
    }

    #[test]
    fn state_stops_after_the_budget_is_spent() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1), Duration::from_millis(4), 0.0);
        let mut state = RetryState::new();

        assert!(state.record_failure(&policy, server_error()).is_ok());
        state.advance();
        assert!(state.record_failure(&policy, server_error()).is_ok());
        state.advance();

        let error = state.record_failure(&policy, server_error()).unwrap_err();
        assert_eq!(
            error,
            ApiError::RetriesExhausted {
                attempts: 3,
                last: Box::new(server_error())
            }
        );
    }

    #[test]
    fn state_surfaces_permanent_errors_unwrapped() {
        let policy = RetryPolicy::default();
        let mut state = RetryState::new();

        let error = state
            .record_failure(&policy, ApiError::GraphQL("Invalid date".to_string()))
            .unwrap_err();
        assert_eq!(error, ApiError::GraphQL("Invalid date".to_string()));
        assert!(state.last_error.is_none());
    }
}
