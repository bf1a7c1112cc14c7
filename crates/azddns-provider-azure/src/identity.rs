//! Azure AD client-credentials identity provider
//!
//! Exchanges (tenant, client id, client secret) for a bearer token scoped to
//! Azure Resource Manager. Called once at startup; any failure here aborts
//! startup.
//!
//! ## API Call
//!
//! ```http
//! POST /{tenant}/oauth2/v2.0/token
//! Content-Type: application/x-www-form-urlencoded
//!
//! grant_type=client_credentials&client_id=...&client_secret=...&scope=https://management.azure.com/.default
//! ```

use async_trait::async_trait;
use azddns_core::traits::{Credentials, IdentityProvider};
use azddns_core::{AzureDnsConfig, Error, Result};
use serde::Deserialize;
use std::time::Duration;

/// Azure AD login endpoint (public cloud)
pub const AZURE_LOGIN_BASE: &str = "https://login.microsoftonline.com";

/// Token scope for Azure Resource Manager
pub const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

/// Successful token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Error response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Azure AD service-principal identity
pub struct AzureIdentity {
    /// Directory (tenant) identifier
    tenant: String,

    /// Application (client) identifier
    client_id: String,

    /// Client secret
    /// ⚠️ NEVER log this value
    client_secret: String,

    /// Login endpoint base URL
    login_base: String,

    /// HTTP client for token requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the client secret
impl std::fmt::Debug for AzureIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureIdentity")
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("login_base", &self.login_base)
            .finish()
    }
}

impl AzureIdentity {
    /// Create an identity provider for the given service principal
    ///
    /// # Parameters
    ///
    /// - `tenant`: Directory (tenant) identifier
    /// - `client_id`: Application (client) identifier
    /// - `client_secret`: Client secret
    /// - `timeout`: Upper bound for the token request
    pub fn new(
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            tenant: tenant.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            login_base: AZURE_LOGIN_BASE.to_string(),
            client,
        })
    }

    /// Create an identity provider from the updater configuration
    pub fn from_config(config: &AzureDnsConfig) -> Result<Self> {
        Self::new(
            config.tenant.clone(),
            config.client_id.clone(),
            config.client_secret.clone(),
            config.timeout_duration(),
        )
    }

    /// Point at a different login endpoint (sovereign clouds, tests)
    pub fn with_login_base(mut self, login_base: impl Into<String>) -> Self {
        self.login_base = login_base.into();
        self
    }

    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.login_base.trim_end_matches('/'),
            self.tenant
        )
    }
}

#[async_trait]
impl IdentityProvider for AzureIdentity {
    async fn acquire(&self) -> Result<Credentials> {
        tracing::debug!("Requesting Azure AD token for client {}", self.client_id);

        let response = self
            .client
            .post(self.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", MANAGEMENT_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| Error::credential(format!("Token request failed: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<TokenErrorResponse>(&body) {
                Ok(err) => match err.error_description {
                    Some(description) => format!("{}: {}", err.error, description),
                    None => err.error,
                },
                Err(_) => body,
            };
            return Err(Error::credential(format!(
                "Azure AD rejected client credentials ({}): {}",
                status, detail
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::credential(format!("Failed to parse token response: {}", e)))?;

        let lifetime = chrono::Duration::seconds(token.expires_in.min(u64::from(u32::MAX)) as i64);
        let expires_at = chrono::Utc::now() + lifetime;

        tracing::info!("Acquired Azure AD token, valid until {}", expires_at);
        Ok(Credentials::new(token.access_token, expires_at))
    }

    fn provider_name(&self) -> &'static str {
        "azure-ad"
    }
}
