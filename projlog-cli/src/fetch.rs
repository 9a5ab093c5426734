//! Status sheet fetching
//!
//! One blocking HTTP GET per refresh cycle, with a request timeout so a
//! hanging source fails closed instead of stalling the refresh. The body is
//! memoized for a short fixed duration to bound the external call rate; the
//! cache has no invalidation beyond time expiry.

use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};

pub struct LogFetcher {
    client: reqwest::blocking::Client,
    url: String,
    cache_ttl: Duration,
    cached: Option<(Instant, String)>,
}

impl LogFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration, cache_ttl: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
            cache_ttl,
            cached: None,
        })
    }

    /// Fetch the log CSV body, reusing the cached body while it is fresh.
    pub fn fetch(&mut self) -> Result<String> {
        if let Some((fetched_at, body)) = &self.cached {
            if fetched_at.elapsed() < self.cache_ttl {
                log::debug!(
                    "using cached log body ({}s old)",
                    fetched_at.elapsed().as_secs()
                );
                return Ok(body.clone());
            }
        }

        log::info!("fetching status log from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .with_context(|| format!("Failed to fetch status log from {}", self.url))?;

        if !response.status().is_success() {
            bail!("log source returned {}: {}", response.status(), self.url);
        }

        let body = response
            .text()
            .context("Failed to read status log response body")?;

        self.cached = Some((Instant::now(), body.clone()));
        Ok(body)
    }
}
