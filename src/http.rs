use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::TrackerError;

/// HTTP client that retries connection-level failures with linear backoff
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    retries: u32,
    backoff_factor: Duration,
}

impl HttpClient {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            retries: config.retries,
            backoff_factor: Duration::from_millis(config.backoff_factor_ms),
        })
    }

    /// GET `url` and return the body as text.
    ///
    /// Connect errors, timeouts and broken bodies are retried up to `retries`
    /// times, sleeping `backoff_factor * n` before retry `n`. Any other error is
    /// returned at once.
    /// Non-success statuses are not retried; the body is returned with a warning.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {})", url, attempt);

            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if is_retryable(&e) && attempt <= self.retries => {
                    let delay = self.backoff_factor * attempt;
                    warn!(
                        "Request to {} failed ({}), retry {}/{} in {:?}",
                        url, e, attempt, self.retries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) if is_retryable(&e) => {
                    return Err(TrackerError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: e,
                    }
                    .into());
                }
                Err(e) => {
                    return Err(e).with_context(|| format!("Failed to fetch {}", url));
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> reqwest::Result<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("{} returned status: {}", url, status);
        }
        response.text().await
    }
}

fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout() || error.is_body()
}
