// # DNS Provider Trait
//
// Defines the interface for publishing the A record via a provider API.
//
// ## Implementations
//
// - Azure DNS: `azddns-provider-azure` crate
//
// ## Usage
//
// ```rust,ignore
// use azddns_core::{DnsProvider, RecordSetRequest};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let credentials = /* acquired once at startup */;
//
//     let record = RecordSetRequest::a_record(&config, "203.0.113.7".parse()?, chrono::Local::now());
//     provider.create_or_update(&credentials, &record).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::config::AzureDnsConfig;
use crate::traits::identity::Credentials;

/// The only record type this updater manages
pub const RECORD_TYPE_A: &str = "A";

/// Metadata key recording which agent last wrote the record
pub const METADATA_AGENT_KEY: &str = "Last_changed_by_azddns";

/// Render a local date-time the way the record metadata stores it
///
/// Format: `YYYY-MM-DD HH:MM:SS.ffffff`
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

/// A create-or-update request for one A record set
///
/// Identified by (resource group, zone, host, record type). Each cycle
/// builds a fresh request; the provider overwrites the record in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetRequest {
    /// Resource group holding the zone
    pub resource_group: String,
    /// Zone name (e.g., "example.com")
    pub zone: String,
    /// Relative record name ("@" for the apex)
    pub host: String,
    /// Record type, always "A"
    pub record_type: &'static str,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// The single A-record value
    pub address: Ipv4Addr,
    /// Update provenance: agent tag mapped to the last-update timestamp
    pub metadata: BTreeMap<String, String>,
}

impl RecordSetRequest {
    /// Build the A-record request for the configured zone and host
    pub fn a_record(config: &AzureDnsConfig, address: Ipv4Addr, updated_at: DateTime<Local>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_AGENT_KEY.to_string(), format_timestamp(updated_at));

        Self {
            resource_group: config.resource_group_name.clone(),
            zone: config.zone_domain.clone(),
            host: config.host.clone(),
            record_type: RECORD_TYPE_A,
            ttl: config.ttl,
            address,
            metadata,
        }
    }
}

/// Trait for DNS provider implementations
///
/// # Rules
///
/// - One create-or-update API call per invocation.
/// - No read-before-write comparison: the record is always overwritten.
/// - No retry, no backoff, no background tasks. Return an error and let the
///   next scheduled cycle try again.
/// - Authenticate with the credentials passed in; never acquire or refresh
///   tokens.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Create the record set, or overwrite it if it already exists
    ///
    /// # Parameters
    ///
    /// - `credentials`: Authenticated client handle owned by the updater
    /// - `record`: The record set to publish
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the record
    /// - `Err(Error::Provider)`: The provider rejected the request or was unreachable
    async fn create_or_update(
        &self,
        credentials: &Credentials,
        record: &RecordSetRequest,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
