//! HTTP client for downloading N03 archives.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::SourceError;

/// User agent string identifying this exporter.
const USER_AGENT: &str = concat!("ksj-n03/", env!("CARGO_PKG_VERSION"));

/// Whole-request timeout. Archives for large prefectures run to tens of MB.
const HTTP_TIMEOUT_SECS: u64 = 300;

/// How often and how patiently to retry transient download failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff: base, 2×base, 4×base, ...
    fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << (attempt - 1).min(16))
    }
}

/// Create a configured HTTP client.
pub fn create_client() -> Result<Client, SourceError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Download a URL, retrying connection errors, timeouts and 5xx responses.
///
/// 4xx responses fail immediately since retrying cannot help.
pub async fn download_bytes(
    client: &Client,
    url: &str,
    policy: RetryPolicy,
) -> Result<Vec<u8>, SourceError> {
    let mut last_error: Option<String> = None;

    for attempt in 0..policy.max_attempts {
        if attempt > 0 {
            let delay = policy.delay(attempt);
            debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
            tokio::time::sleep(delay).await;
        }

        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_server_error() {
                    warn!(
                        status = %status,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        "Server error, will retry"
                    );
                    last_error = Some(format!("Server error: {status}"));
                    continue;
                }

                let response = response.error_for_status()?;
                let bytes = response.bytes().await?;
                debug!(url, size = bytes.len(), "Downloaded");
                return Ok(bytes.to_vec());
            }
            Err(e) => {
                if e.is_connect() || e.is_timeout() {
                    warn!(
                        error = %e,
                        attempt = attempt + 1,
                        max_attempts = policy.max_attempts,
                        "Connection error, will retry"
                    );
                    last_error = Some(e.to_string());
                    continue;
                }
                return Err(SourceError::Http(e));
            }
        }
    }

    Err(SourceError::RetriesExhausted {
        url: url.to_string(),
        attempts: policy.max_attempts,
        message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
    })
}
