// # Azure DNS Provider
//
// This crate provides the Azure side of the updater:
//
// - `AzureIdentity`: client-credentials token acquisition against Azure AD
// - `AzureDnsProvider`: create-or-update of an A record set through
//   Azure Resource Manager
//
// ## Behaviour
//
// - One HTTP request per update cycle, no retries (the scheduler's next
//   tick is the retry)
// - Full error propagation to the updater
// - HTTP timeout taken from the configuration
// - Status-specific error messages (401/403, 404, 429, 5xx)
// - Credentials are borrowed per call and never stored by the provider
//
// ## Security Requirements
//
// - Access tokens and client secrets NEVER appear in logs or Debug output
//
// ## API Reference
//
// - Record Sets - Create Or Update:
//   PUT `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones/{zone}/{type}/{name}?api-version=2018-05-01`

mod identity;

pub use identity::{AZURE_LOGIN_BASE, AzureIdentity, MANAGEMENT_SCOPE};

use async_trait::async_trait;
use azddns_core::traits::{Credentials, DnsProvider, RecordSetRequest};
use azddns_core::{AzureDnsConfig, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Azure Resource Manager base URL (public cloud)
pub const AZURE_MANAGEMENT_BASE: &str = "https://management.azure.com";

/// DNS record-set API version
pub const DNS_API_VERSION: &str = "2018-05-01";

const PROVIDER_NAME: &str = "azure";

/// Request body for a record-set PUT
#[derive(Debug, Serialize)]
struct RecordSetBody<'a> {
    properties: RecordSetProperties<'a>,
}

#[derive(Debug, Serialize)]
struct RecordSetProperties<'a> {
    metadata: &'a BTreeMap<String, String>,
    #[serde(rename = "TTL")]
    ttl: u32,
    #[serde(rename = "ARecords")]
    a_records: Vec<ARecord>,
}

#[derive(Debug, Serialize)]
struct ARecord {
    #[serde(rename = "ipv4Address")]
    ipv4_address: String,
}

/// ARM error envelope: `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Deserialize)]
struct CloudError {
    error: CloudErrorDetail,
}

#[derive(Debug, Deserialize)]
struct CloudErrorDetail {
    code: String,
    #[serde(default)]
    message: String,
}

/// Pull a readable detail out of an ARM error response body
fn error_detail(body: &str) -> String {
    match serde_json::from_str::<CloudError>(body) {
        Ok(CloudError { error }) if error.message.is_empty() => error.code,
        Ok(CloudError { error }) => format!("{}: {}", error.code, error.message),
        Err(_) => body.trim().to_string(),
    }
}

/// Azure DNS record-set client
///
/// Stateless apart from the HTTP client. Each `create_or_update` issues a
/// single PUT which Azure treats as an upsert, so there is no separate
/// lookup of the existing record.
pub struct AzureDnsProvider {
    /// Subscription that owns the resource group
    subscription_id: String,

    /// Resource Manager base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for AzureDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDnsProvider")
            .field("subscription_id", &self.subscription_id)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AzureDnsProvider {
    /// Create a new Azure DNS provider
    ///
    /// # Parameters
    ///
    /// - `subscription_id`: Subscription holding the DNS zone
    /// - `timeout`: Upper bound for each API request
    pub fn new(subscription_id: impl Into<String>, timeout: Duration) -> Result<Self> {
        let subscription_id = subscription_id.into();
        if subscription_id.trim().is_empty() {
            return Err(Error::config("Azure subscription id is required"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            subscription_id,
            base_url: AZURE_MANAGEMENT_BASE.to_string(),
            client,
        })
    }

    /// Create a provider from the updater configuration
    pub fn from_config(config: &AzureDnsConfig) -> Result<Self> {
        Self::new(config.subscription_id.clone(), config.timeout_duration())
    }

    /// Point at a different Resource Manager endpoint (sovereign clouds, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Full URL of the record set described by `record`
    fn record_set_url(&self, record: &RecordSetRequest) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}/{}/{}?api-version={}",
            self.base_url.trim_end_matches('/'),
            self.subscription_id,
            record.resource_group,
            record.zone,
            record.record_type,
            record.host,
            DNS_API_VERSION
        )
    }
}

#[async_trait]
impl DnsProvider for AzureDnsProvider {
    async fn create_or_update(
        &self,
        credentials: &Credentials,
        record: &RecordSetRequest,
    ) -> Result<()> {
        let url = self.record_set_url(record);
        let body = RecordSetBody {
            properties: RecordSetProperties {
                metadata: &record.metadata,
                ttl: record.ttl,
                a_records: vec![ARecord {
                    ipv4_address: record.address.to_string(),
                }],
            },
        };

        tracing::debug!(
            "PUT record set {} in zone {} (resource group {})",
            record.host,
            record.zone,
            record.resource_group
        );

        let response = self
            .client
            .put(&url)
            .bearer_auth(credentials.access_token())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!("Azure accepted record set {} ({})", record.host, status);
            return Ok(());
        }

        let error_text = response.text().await.unwrap_or_default();
        let detail = error_detail(&error_text);

        match status.as_u16() {
            401 | 403 => Err(Error::provider(
                PROVIDER_NAME,
                format!(
                    "Authorization failed: token rejected or missing DNS Zone Contributor role. Status: {} - {}",
                    status, detail
                ),
            )),
            404 => Err(Error::provider(
                PROVIDER_NAME,
                format!(
                    "DNS zone {} or resource group {} not found. Status: {} - {}",
                    record.zone, record.resource_group, status, detail
                ),
            )),
            429 => Err(Error::provider(
                PROVIDER_NAME,
                format!("Rate limit exceeded. Status: {} - {}", status, detail),
            )),
            500..=599 => Err(Error::provider(
                PROVIDER_NAME,
                format!("Azure server error (transient): {} - {}", status, detail),
            )),
            _ => Err(Error::provider(
                PROVIDER_NAME,
                format!("Failed to update record set: {} - {}", status, detail),
            )),
        }
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
