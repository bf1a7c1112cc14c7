//! Configuration types for the Azure DNS updater
//!
//! The configuration is loaded once at startup and never changes afterwards.
//! Keys follow the documented kebab-case schema; unknown keys are ignored.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};

/// Record name used when no host is configured (zone apex)
pub const DEFAULT_HOST: &str = "@";

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default record time-to-live in seconds
pub const DEFAULT_TTL_SECS: u32 = 60;

/// Fixed interval between scheduled update cycles
pub const UPDATE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Azure DNS updater configuration
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct AzureDnsConfig {
    /// DNS zone managed in Azure (e.g., "example.com")
    #[serde(alias = "domain")]
    pub zone_domain: String,

    /// Relative record name inside the zone ("@" for the apex)
    #[serde(default = "default_host")]
    pub host: String,

    /// Azure AD tenant identifier
    pub tenant: String,

    /// Service principal client (application) identifier
    #[serde(alias = "clientid")]
    pub client_id: String,

    /// Service principal client secret
    /// ⚠️ NEVER log this value
    #[serde(alias = "clientsecret")]
    pub client_secret: String,

    /// Azure subscription holding the zone
    #[serde(alias = "subscriptionid")]
    pub subscription_id: String,

    /// Resource group holding the zone
    #[serde(alias = "resourcegroupname")]
    pub resource_group_name: String,

    /// HTTP timeout in seconds, applied to the address lookup and the record update
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Time-to-live of the published A record, in seconds
    #[serde(default = "default_ttl")]
    pub ttl: u32,
}

// Custom Debug implementation that hides the client secret
impl std::fmt::Debug for AzureDnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDnsConfig")
            .field("zone_domain", &self.zone_domain)
            .field("host", &self.host)
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("subscription_id", &self.subscription_id)
            .field("resource_group_name", &self.resource_group_name)
            .field("timeout", &self.timeout)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl AzureDnsConfig {
    /// Create a configuration with the required fields and default host, timeout and TTL
    pub fn new(
        zone_domain: impl Into<String>,
        tenant: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        subscription_id: impl Into<String>,
        resource_group_name: impl Into<String>,
    ) -> Self {
        Self {
            zone_domain: zone_domain.into(),
            host: default_host(),
            tenant: tenant.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            subscription_id: subscription_id.into(),
            resource_group_name: resource_group_name.into(),
            timeout: default_timeout(),
            ttl: default_ttl(),
        }
    }

    /// Set the record name
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the HTTP timeout in seconds
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the record TTL in seconds
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid configuration document: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read configuration file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }

    /// Validate the configuration
    ///
    /// Every required field must be non-empty and the numeric settings must be
    /// positive. This runs before any credential is requested.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("zone-domain", &self.zone_domain),
            ("host", &self.host),
            ("tenant", &self.tenant),
            ("client-id", &self.client_id),
            ("client-secret", &self.client_secret),
            ("subscription-id", &self.subscription_id),
            ("resource-group-name", &self.resource_group_name),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(Error::config(format!("{} cannot be empty", key)));
            }
        }

        if self.timeout == 0 {
            return Err(Error::config("timeout must be a positive number of seconds"));
        }

        if self.ttl == 0 {
            return Err(Error::config("ttl must be a positive number of seconds"));
        }

        Ok(())
    }

    /// HTTP timeout as a `Duration`
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_ttl() -> u32 {
    DEFAULT_TTL_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample() -> AzureDnsConfig {
        AzureDnsConfig::new(
            "example.com",
            "tenant-id",
            "client-id",
            "client-secret",
            "subscription-id",
            "dns-rg",
        )
    }

    #[test]
    fn defaults_apply_when_optional_keys_are_missing() {
        let config = AzureDnsConfig::from_json_str(
            r#"{
                "zone-domain": "example.com",
                "tenant": "t",
                "client-id": "c",
                "client-secret": "s",
                "subscription-id": "sub",
                "resource-group-name": "rg"
            }"#,
        )
        .unwrap();

        assert_eq!(config.host, "@");
        assert_eq!(config.timeout, 60);
        assert_eq!(config.ttl, 60);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let config = AzureDnsConfig::from_json_str(
            r#"{
                "zone-domain": "example.com",
                "host": "home",
                "tenant": "t",
                "client-id": "c",
                "client-secret": "s",
                "subscription-id": "sub",
                "resource-group-name": "rg",
                "colour": "blue"
            }"#,
        )
        .unwrap();

        assert_eq!(config.host, "home");
    }

    #[test]
    fn legacy_key_spellings_are_accepted() {
        let config = AzureDnsConfig::from_json_str(
            r#"{
                "domain": "example.com",
                "tenant": "t",
                "clientid": "c",
                "clientsecret": "s",
                "subscriptionid": "sub",
                "resourcegroupname": "rg",
                "ttl": 300
            }"#,
        )
        .unwrap();

        assert_eq!(config.zone_domain, "example.com");
        assert_eq!(config.ttl, 300);
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let result = AzureDnsConfig::from_json_str(
            r#"{ "zone-domain": "example.com", "tenant": "t" }"#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn empty_required_field_is_rejected() {
        let config = AzureDnsConfig {
            tenant: "  ".to_string(),
            ..sample()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tenant"));
    }

    #[test]
    fn non_positive_numbers_are_rejected() {
        assert!(sample().with_ttl(0).validate().is_err());
        assert!(sample().with_timeout(0).validate().is_err());

        let negative = AzureDnsConfig::from_json_str(
            r#"{
                "zone-domain": "example.com",
                "tenant": "t",
                "client-id": "c",
                "client-secret": "s",
                "subscription-id": "sub",
                "resource-group-name": "rg",
                "timeout": -5
            }"#,
        );
        assert!(negative.is_err());
    }

    #[test]
    fn client_secret_not_exposed_in_debug() {
        let config = sample().with_host("home");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("client-secret"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(debug_str.contains("home"));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "zone-domain": "example.com",
                "tenant": "t",
                "client-id": "c",
                "client-secret": "s",
                "subscription-id": "sub",
                "resource-group-name": "rg",
                "timeout": 10
            }}"#
        )
        .unwrap();

        let config = AzureDnsConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.timeout_duration(), Duration::from_secs(10));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = AzureDnsConfig::from_json_file("/nonexistent/azddns.json");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
