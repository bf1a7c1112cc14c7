// # HTTP IP Resolver
//
// This crate provides the HTTP-based external address resolver for the
// Azure DNS updater.
//
// ## Architecture
//
// Issues one GET per update cycle against a plain-text IP echo service
// (default: https://api.ipify.org) and interprets the body as the host's
// public IPv4 address. The request is bounded by the configured timeout.
//
// No caching and no polling loop: the scheduler decides when to ask, and
// every cycle gets a fresh answer.

use azddns_core::traits::{IpResolver, parse_ipv4_body};
use azddns_core::{AzureDnsConfig, Error, Result};

use std::net::Ipv4Addr;
use std::time::Duration;

/// Default IP echo service, returns the caller's IPv4 address as plain text
pub const DEFAULT_LOOKUP_URL: &str = "https://api.ipify.org";

/// HTTP-based external IPv4 resolver
#[derive(Debug, Clone)]
pub struct HttpIpResolver {
    /// URL to fetch the address from
    url: String,

    /// Request timeout
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpResolver {
    /// Create a resolver against [`DEFAULT_LOOKUP_URL`]
    ///
    /// # Parameters
    ///
    /// - `timeout`: Upper bound for the whole request, connection included
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_url(DEFAULT_LOOKUP_URL, timeout)
    }

    /// Create a resolver against a custom echo service
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            timeout,
            client,
        })
    }

    /// Create a resolver using the configured timeout
    pub fn from_config(config: &AzureDnsConfig) -> Result<Self> {
        Self::new(config.timeout_duration())
    }

    /// Configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl IpResolver for HttpIpResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        tracing::debug!("Fetching external IP address from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::network(format!(
                    "Request to {} timed out after {}s",
                    self.url,
                    self.timeout.as_secs()
                ))
            } else {
                Error::network(format!("Request to {} failed: {}", self.url, e))
            }
        })?;

        if !response.status().is_success() {
            return Err(Error::network(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::network(format!("Failed to read response: {}", e)))?;

        parse_ipv4_body(&body)
    }

    fn source(&self) -> &str {
        &self.url
    }
}
