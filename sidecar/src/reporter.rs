//! Retrying HTTP delivery of lifecycle reports to the control-plane API.

use log::{debug, warn};
use serde::Serialize;
use shared::{MAX_DELIVERY_ATTEMPTS, RETRY_DELAY_MS};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Debug, Error)]
pub enum ReportError {
    /// 4xx response; the request itself is wrong, retrying cannot help.
    #[error("control plane rejected the report (HTTP {0})")]
    Rejected(u16),
    /// 5xx response; the control plane is unhealthy, worth retrying.
    #[error("control plane error (HTTP {0})")]
    Upstream(u16),
    /// The request never completed (DNS, connect, read failures).
    #[error("network error: {0}")]
    Network(String),
    /// The attempt budget ran out; `last` is the final attempt's error.
    #[error("delivery failed after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        last: Box<ReportError>,
    },
}

impl ReportError {
    fn is_retryable(&self) -> bool {
        matches!(self, ReportError::Upstream(_) | ReportError::Network(_))
    }
}

/// Delivers JSON reports with bounded, fixed-interval retries.
///
/// One instance is shared by all in-flight deliveries; it holds no mutable
/// state beyond the pooled HTTP client, so concurrent deliveries are fully
/// independent.
pub struct Reporter {
    client: reqwest::Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Reporter {
    /// Reporter with the protocol defaults: 5 attempts, 5000 ms apart.
    pub fn new() -> Self {
        Self::with_policy(
            MAX_DELIVERY_ATTEMPTS,
            Duration::from_millis(RETRY_DELAY_MS),
        )
    }

    /// Reporter with an explicit retry policy. At least one attempt is
    /// always made.
    pub fn with_policy(max_attempts: u32, retry_delay: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// POSTs `body` as JSON to `url`, retrying on network errors and 5xx
    /// responses until a 2xx arrives or the attempt budget is spent.
    ///
    /// A 4xx response fails immediately without consuming further attempts.
    pub async fn deliver<T: Serialize>(&self, url: &str, body: &T) -> Result<(), ReportError> {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            match self.attempt(url, body).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!("report to {} delivered on attempt {}", url, attempt);
                    }
                    return Ok(());
                }
                Err(error) if error.is_retryable() => {
                    warn!(
                        "report attempt {}/{} to {} failed: {}",
                        attempt, self.max_attempts, url, error
                    );
                    last_error = Some(error);
                    if attempt < self.max_attempts {
                        sleep(self.retry_delay).await;
                    }
                }
                Err(error) => return Err(error),
            }
        }

        let last = last_error
            .unwrap_or_else(|| ReportError::Network("no delivery attempt was made".to_string()));
        Err(ReportError::Exhausted {
            attempts: self.max_attempts,
            last: Box::new(last),
        })
    }

    async fn attempt<T: Serialize>(&self, url: &str, body: &T) -> Result<(), ReportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|error| ReportError::Network(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status.is_server_error() {
            Err(ReportError::Upstream(status.as_u16()))
        } else {
            Err(ReportError::Rejected(status.as_u16()))
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
