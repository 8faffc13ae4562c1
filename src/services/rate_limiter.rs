//! Rate-limited HTTP client for metadata APIs
//!
//! Every provider request goes through a [RateLimitedClient] so a large
//! library does not hammer the remote API. Requests are never retried: a
//! failure is reported to the caller, which treats it as fatal for the run.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Configuration for rate limiting
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per second
    pub requests_per_second: u32,
    /// Burst capacity (allows short bursts above the rate)
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 2,
            burst_size: 5,
        }
    }
}

/// A rate-limited HTTP client wrapper
pub struct RateLimitedClient {
    client: Client,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    name: String,
}

impl RateLimitedClient {
    /// Create a new rate-limited client
    pub fn new(name: &str, config: RateLimitConfig) -> Result<Self> {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::MIN));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("tv-transformer/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            limiter: Arc::new(RateLimiter::direct(quota)),
            name: name.to_string(),
        })
    }

    pub fn for_tvmaze() -> Result<Self> {
        // TVMaze allows ~20 requests per 10 seconds
        Self::new(
            "tvmaze",
            RateLimitConfig {
                requests_per_second: 2,
                burst_size: 5,
            },
        )
    }

    pub fn for_tvdb() -> Result<Self> {
        Self::new(
            "tvdb",
            RateLimitConfig {
                requests_per_second: 4,
                burst_size: 10,
            },
        )
    }

    /// Wait for rate limit and GET `url`, decoding a JSON body
    pub async fn get_json<T, Q>(&self, url: &str, query: &Q, bearer: Option<&str>) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let mut request = self.client.get(url).query(query);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send_json(url, request).await
    }

    /// Wait for rate limit and POST a JSON body to `url`, decoding a JSON response
    pub async fn post_json<T, B>(&self, url: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let request = self.client.post(url).json(body);
        self.send_json(url, request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> Result<T> {
        self.wait_for_permit().await;
        debug!(client = %self.name, url = %url, "Making rate-limited request");

        let response = request
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", self.name, url))?;
        let response = check_status(&self.name, response)?;

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response from {}", self.name, url))
    }

    /// Wait for a rate limit permit
    pub async fn wait_for_permit(&self) {
        self.limiter.until_ready().await;
    }
}

fn check_status(name: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if response.is_rate_limited() {
        bail!("{} rate limit exceeded (status {})", name, status);
    }
    bail!("{} request failed with status: {}", name, status)
}

/// Helper trait for classifying HTTP responses
pub trait ResponseExt {
    /// Check if the response indicates rate limiting (429)
    fn is_rate_limited(&self) -> bool;
}

impl ResponseExt for Response {
    fn is_rate_limited(&self) -> bool {
        self.status().as_u16() == 429
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_config_default() {
        let config = RateLimitConfig::default();
        assert_eq!(config.requests_per_second, 2);
        assert_eq!(config.burst_size, 5);
    }

    #[test]
    fn test_zero_rate_is_clamped() {
        let client = RateLimitedClient::new(
            "test",
            RateLimitConfig {
                requests_per_second: 0,
                burst_size: 0,
            },
        )
        .unwrap();
        assert_eq!(client.name, "test");
    }

    #[tokio::test]
    async fn test_burst_permits_are_immediate() {
        let client = RateLimitedClient::for_tvdb().unwrap();
        let start = std::time::Instant::now();
        for _ in 0..5 {
            client.wait_for_permit().await;
        }
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
