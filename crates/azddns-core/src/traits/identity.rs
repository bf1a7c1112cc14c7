// # Identity Provider Trait
//
// Defines the interface for obtaining an authenticated client handle.
//
// ## Purpose
//
// Credentials are acquired exactly once at startup and handed to the
// `DnsUpdater`, which owns them for the rest of the process. They are never
// refreshed: a long-running process keeps using the same token. Expiry is
// detectable through `Credentials::is_expired()` so the updater can warn
// about it.
//
// ## Implementations
//
// - Azure AD client-credentials flow: `azddns-provider-azure` crate

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Authenticated client handle
///
/// Immutable after creation. The `Debug` implementation never exposes the
/// access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Bearer token presented to the DNS management API
    /// ⚠️ NEVER log this value
    access_token: String,

    /// Instant after which the identity provider stops honouring the token
    expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<REDACTED>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credentials {
    /// Create a credentials handle
    pub fn new(access_token: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at,
        }
    }

    /// Bearer token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Expiry instant
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Whether the token has passed its expiry instant
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Trait for identity provider implementations
///
/// One operation: exchange the configured client credentials for an
/// authenticated client handle. Called once, at startup. Any failure is
/// reported as `Error::Credential` and aborts startup.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Acquire an authenticated client handle
    ///
    /// # Returns
    ///
    /// - `Ok(Credentials)`: Token ready for DNS API calls
    /// - `Err(Error::Credential)`: Tenant, client id or secret rejected, or endpoint unreachable
    async fn acquire(&self) -> Result<Credentials, crate::Error>;

    /// Get the identity provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
