// # IP Resolver Trait
//
// Defines the interface for discovering the host's public IPv4 address.
//
// ## Implementations
//
// - HTTP echo service (api.ipify.org): `azddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use azddns_core::IpResolver;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let resolver = /* IpResolver implementation */;
//
//     let address = resolver.resolve().await?;
//     println!("External address: {}", address);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

use crate::error::{Error, Result};

/// Trait for external address resolvers
///
/// A resolver answers one question per call: what is the public IPv4 address
/// of this host right now. It is invoked once per update cycle.
///
/// # Rules
///
/// - One lookup per call. No retry, no backoff; the next scheduled cycle is
///   the retry.
/// - No caching between calls. Every cycle must see a fresh address.
/// - Every failure, including an empty or malformed answer, is reported as
///   [`Error::Network`] so the updater never pushes an invalid address.
#[async_trait]
pub trait IpResolver: Send + Sync {
    /// Fetch the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current external address
    /// - `Err(Error::Network)`: Lookup failed, timed out, or returned no usable address
    async fn resolve(&self) -> Result<Ipv4Addr>;

    /// Where the address comes from (for logging)
    fn source(&self) -> &str;
}

/// Interpret a plain-text lookup response as an IPv4 address
///
/// Surrounding whitespace is ignored. An empty body is a resolution failure,
/// never an address.
pub fn parse_ipv4_body(body: &str) -> Result<Ipv4Addr> {
    let text = body.trim();

    if text.is_empty() {
        return Err(Error::network("External IP lookup returned an empty response"));
    }

    text.parse()
        .map_err(|_| Error::network(format!("Invalid IPv4 address in response: {:?}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_address() {
        assert_eq!(
            parse_ipv4_body("203.0.113.7").unwrap(),
            Ipv4Addr::new(203, 0, 113, 7)
        );
    }

    #[test]
    fn trims_trailing_newline() {
        assert_eq!(
            parse_ipv4_body("198.51.100.1\n").unwrap(),
            Ipv4Addr::new(198, 51, 100, 1)
        );
    }

    #[test]
    fn empty_body_is_network_error() {
        assert!(matches!(parse_ipv4_body(""), Err(Error::Network(_))));
        assert!(matches!(parse_ipv4_body(" \n"), Err(Error::Network(_))));
    }

    #[test]
    fn rejects_ipv6_and_garbage() {
        assert!(parse_ipv4_body("2001:db8::1").is_err());
        assert!(parse_ipv4_body("<html>rate limited</html>").is_err());
    }
}
