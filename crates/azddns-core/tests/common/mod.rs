//! Test doubles and common utilities for updater contract tests
//!
//! This module provides minimal test doubles that record how the updater
//! drives its collaborators without performing any network I/O.

#![allow(dead_code)]

use azddns_core::error::{Error, Result};
use azddns_core::traits::{
    Credentials, DnsProvider, IdentityProvider, IpResolver, RecordSetRequest, parse_ipv4_body,
};
use azddns_core::AzureDnsConfig;
use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Token handed out by [`StaticIdentity`]
pub const TEST_TOKEN: &str = "test-access-token";

/// One scripted answer from the resolver
#[derive(Debug, Clone)]
pub enum Lookup {
    /// Plain-text response body, interpreted like a real lookup service answer
    Body(&'static str),
    /// Transport failure or timeout
    Fail(&'static str),
}

/// A resolver that replays scripted lookups, then repeats a fallback
pub struct ScriptedResolver {
    script: Arc<std::sync::Mutex<VecDeque<Lookup>>>,
    fallback: Lookup,
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    /// Always answer with the same body
    pub fn answering(body: &'static str) -> Self {
        Self::scripted(Vec::new(), Lookup::Body(body))
    }

    /// Always fail
    pub fn failing(message: &'static str) -> Self {
        Self::scripted(Vec::new(), Lookup::Fail(message))
    }

    /// Replay `script` in order, then answer with `fallback`
    pub fn scripted(script: Vec<Lookup>, fallback: Lookup) -> Self {
        Self {
            script: Arc::new(std::sync::Mutex::new(script.into())),
            fallback,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a new ScriptedResolver that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            fallback: other.fallback.clone(),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl IpResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<Ipv4Addr> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let lookup = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());

        match lookup {
            Lookup::Body(body) => parse_ipv4_body(body),
            Lookup::Fail(message) => Err(Error::network(message)),
        }
    }

    fn source(&self) -> &str {
        "scripted"
    }
}

/// A DNS provider that records every create-or-update request
pub struct RecordingProvider {
    requests: Arc<std::sync::Mutex<Vec<RecordSetRequest>>>,
    tokens: Arc<std::sync::Mutex<Vec<String>>>,
    failure: Option<&'static str>,
    delay: Option<Duration>,
}

impl RecordingProvider {
    /// Accept every request
    pub fn accepting() -> Self {
        Self {
            requests: Arc::new(std::sync::Mutex::new(Vec::new())),
            tokens: Arc::new(std::sync::Mutex::new(Vec::new())),
            failure: None,
            delay: None,
        }
    }

    /// Reject every request with the given provider detail
    pub fn rejecting(detail: &'static str) -> Self {
        Self {
            failure: Some(detail),
            ..Self::accepting()
        }
    }

    /// Sleep before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get the number of times create_or_update() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Get the recorded requests
    pub fn requests(&self) -> Vec<RecordSetRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Get the bearer tokens presented with each request
    pub fn tokens(&self) -> Vec<String> {
        self.tokens.lock().unwrap().clone()
    }

    /// Create a new RecordingProvider that shares recordings with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            requests: Arc::clone(&other.requests),
            tokens: Arc::clone(&other.tokens),
            failure: other.failure,
            delay: other.delay,
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for RecordingProvider {
    async fn create_or_update(
        &self,
        credentials: &Credentials,
        record: &RecordSetRequest,
    ) -> Result<()> {
        self.requests.lock().unwrap().push(record.clone());
        self.tokens
            .lock()
            .unwrap()
            .push(credentials.access_token().to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.failure {
            Some(detail) => Err(Error::provider("recording", detail)),
            None => Ok(()),
        }
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// An identity provider with a fixed answer
pub struct StaticIdentity {
    outcome: std::result::Result<(), &'static str>,
    call_count: Arc<AtomicUsize>,
}

impl StaticIdentity {
    /// Hand out [`TEST_TOKEN`], valid for an hour
    pub fn granting() -> Self {
        Self {
            outcome: Ok(()),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Reject the client credentials
    pub fn rejecting(detail: &'static str) -> Self {
        Self {
            outcome: Err(detail),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the number of times acquire() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StaticIdentity {
    async fn acquire(&self) -> Result<Credentials> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Ok(()) => Ok(test_credentials()),
            Err(detail) => Err(Error::credential(detail)),
        }
    }

    fn provider_name(&self) -> &'static str {
        "static"
    }
}

/// Credentials valid for an hour
pub fn test_credentials() -> Credentials {
    Credentials::new(TEST_TOKEN, chrono::Utc::now() + chrono::Duration::hours(1))
}

/// Helper to create a minimal valid configuration for testing
pub fn test_config() -> AzureDnsConfig {
    AzureDnsConfig::new(
        "example.com",
        "test-tenant",
        "test-client-id",
        "test-client-secret",
        "test-subscription",
        "test-rg",
    )
}
