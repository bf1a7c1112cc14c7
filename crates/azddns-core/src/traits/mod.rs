//! Core traits for the Azure DNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpResolver`]: Discover the current public IPv4 address
//! - [`IdentityProvider`]: Acquire the authenticated client handle
//! - [`DnsProvider`]: Create or update the A record via provider APIs

pub mod ip_resolver;
pub mod identity;
pub mod dns_provider;

pub use ip_resolver::{IpResolver, parse_ipv4_body};
pub use identity::{Credentials, IdentityProvider};
pub use dns_provider::{
    DnsProvider, RecordSetRequest, format_timestamp, METADATA_AGENT_KEY, RECORD_TYPE_A,
};
