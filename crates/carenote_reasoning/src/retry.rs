//! Bounded retries for completion requests.
//!
//! Rate limits, server errors and network failures are retried with
//! exponential backoff. Client errors (bad key, bad request) fail at once.

use anyhow::Result;
use reqwest::{Response, StatusCode};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based), doubling each time.
    fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

/// Run `send` until it yields a successful response or the policy gives up.
pub async fn send_with_retry<F, Fut>(policy: &RetryPolicy, provider: &str, send: F) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    let mut last_error = String::from("no attempt made");

    for attempt in 1..=policy.max_attempts {
        match send().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                if !is_transient(status) {
                    anyhow::bail!("{} API error ({}): {}", provider, status, body);
                }
                tracing::warn!("{} returned {} (attempt {}/{})", provider, status, attempt, policy.max_attempts);
                last_error = format!("{} ({})", status, body.chars().take(200).collect::<String>());
            }
            Err(e) => {
                tracing::warn!("{} request failed (attempt {}/{}): {:#}", provider, attempt, policy.max_attempts, e);
                last_error = format!("{:#}", e);
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_after(attempt)).await;
        }
    }

    anyhow::bail!(
        "{} failed after {} attempts: {}",
        provider,
        policy.max_attempts,
        last_error
    )
}
