//! DNS updater
//!
//! The DnsUpdater is responsible for:
//! - Resolving the current external address via IpResolver
//! - Publishing it as an A record via DnsProvider
//! - Owning the credentials acquired at startup
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐
//! │ IpResolver  │──── Ipv4Addr ───────┐
//! └─────────────┘                     │
//!                                     ▼
//!                            ┌──────────────┐
//!                            │  DnsUpdater  │◄── Credentials (owned)
//!                            └──────────────┘
//!                                     │
//!                     ┌───────────────┴───────────────┐
//!                     │                               │
//!                     ▼                               ▼
//!             ┌──────────────┐                ┌─────────────┐
//!             │ DnsProvider  │                │   Events    │
//!             │ (push)       │                │  (notify)   │
//!             └──────────────┘                └─────────────┘
//! ```
//!
//! ## Cycle Flow
//!
//! 1. Resolve the external address (failure ends the cycle, no push)
//! 2. Bind the provider call to the owned credentials
//! 3. Create or overwrite the A record
//! 4. Emit events for monitoring/logging
//!
//! Every failure is contained within the cycle: logged, reported as `false`,
//! and left for the next scheduled cycle to correct.

pub mod startup;

use crate::config::AzureDnsConfig;
use crate::error::{Error, Result};
use crate::traits::{Credentials, DnsProvider, IpResolver, RecordSetRequest};
use std::net::Ipv4Addr;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, warn};

/// Capacity of the updater event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Events emitted by the DnsUpdater and the Scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdaterEvent {
    /// Update cycle started
    CycleStarted,

    /// External address resolved
    AddressResolved {
        address: Ipv4Addr,
    },

    /// Provider accepted the record
    RecordPublished {
        record_name: String,
        address: Ipv4Addr,
    },

    /// Update cycle failed
    CycleFailed {
        error: String,
    },

    /// Update cycle requested while another was still running
    CycleSkipped,

    /// Scheduler entered steady-state polling
    SchedulerStarted {
        interval_secs: u64,
    },

    /// Scheduler stopped
    SchedulerStopped {
        reason: String,
    },
}

/// Publishes the host's external address into the configured zone
///
/// ## Lifecycle
///
/// 1. Acquire credentials and build with [`startup::bootstrap()`] (or [`DnsUpdater::new()`])
/// 2. Hand to a [`crate::Scheduler`], or call [`DnsUpdater::update_cycle()`] directly
/// 3. Drop to cleanup
///
/// ## Threading
///
/// Configuration and credentials are read-only after construction. A
/// per-instance lock keeps cycles from overlapping: a cycle requested while
/// another is in flight is skipped rather than queued.
pub struct DnsUpdater {
    /// Validated configuration
    config: AzureDnsConfig,

    /// Authenticated client handle, acquired once and never refreshed
    credentials: Credentials,

    /// External address lookup
    resolver: Box<dyn IpResolver>,

    /// DNS record API
    provider: Box<dyn DnsProvider>,

    /// Non-reentrancy guard for update cycles
    cycle_lock: Mutex<()>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<UpdaterEvent>,
}

impl DnsUpdater {
    /// Create a new updater
    ///
    /// # Parameters
    ///
    /// - `config`: Updater configuration (validated here)
    /// - `credentials`: Authenticated client handle from the identity provider
    /// - `resolver`: IP resolver implementation
    /// - `provider`: DNS provider implementation
    ///
    /// # Returns
    ///
    /// A tuple of (updater, event_receiver) where event_receiver yields updater events
    pub fn new(
        config: AzureDnsConfig,
        credentials: Credentials,
        resolver: Box<dyn IpResolver>,
        provider: Box<dyn DnsProvider>,
    ) -> Result<(Self, mpsc::Receiver<UpdaterEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let updater = Self {
            config,
            credentials,
            resolver,
            provider,
            cycle_lock: Mutex::new(()),
            event_tx: tx,
        };

        Ok((updater, rx))
    }

    /// The configuration this updater publishes with
    pub fn config(&self) -> &AzureDnsConfig {
        &self.config
    }

    /// The credentials acquired at startup
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fully-qualified name of the managed record
    pub fn record_fqdn(&self) -> String {
        if self.config.host == crate::config::DEFAULT_HOST {
            self.config.zone_domain.clone()
        } else {
            format!("{}.{}", self.config.host, self.config.zone_domain)
        }
    }

    /// Run one update cycle
    ///
    /// # Returns
    ///
    /// `true` if the provider accepted the record, `false` otherwise. Errors
    /// are logged and never propagated.
    pub async fn update_cycle(&self) -> bool {
        self.try_update_cycle().await.is_ok()
    }

    /// Run one update cycle, reporting why it failed
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The address that was published
    /// - `Err(Error::Network)`: Resolution failed; the provider was not called
    /// - `Err(Error::Provider)`: The provider rejected the record or timed out
    /// - `Err(Error::Other)`: Another cycle was already running
    pub async fn try_update_cycle(&self) -> Result<Ipv4Addr> {
        let Ok(_guard) = self.cycle_lock.try_lock() else {
            warn!("Update cycle already in progress, skipping");
            self.emit_event(UpdaterEvent::CycleSkipped);
            return Err(Error::Other("Update cycle already in progress".to_string()));
        };

        self.emit_event(UpdaterEvent::CycleStarted);

        // Step 1: Resolve
        let address = match self.resolver.resolve().await {
            Ok(address) => address,
            Err(e) => {
                error!(
                    "Failed to get external IP address from {}: {}",
                    self.resolver.source(),
                    e
                );
                return Err(self.fail(e));
            }
        };

        debug!("External IP address is: {}", address);
        self.emit_event(UpdaterEvent::AddressResolved { address });

        // Step 2: Authenticate client
        if self.credentials.is_expired() {
            warn!(
                "Credentials expired at {} and are not refreshed; the provider may reject the update",
                self.credentials.expires_at()
            );
        }

        // Step 3: Push
        let record = RecordSetRequest::a_record(&self.config, address, chrono::Local::now());
        let timeout = self.config.timeout_duration();

        let pushed = tokio::time::timeout(
            timeout,
            self.provider.create_or_update(&self.credentials, &record),
        )
        .await
        .unwrap_or_else(|_| {
            Err(Error::provider(
                self.provider.provider_name(),
                format!("create-or-update timed out after {}s", timeout.as_secs()),
            ))
        });

        if let Err(e) = pushed {
            error!("Failed to create or update DNS record: {}", e);
            return Err(self.fail(e));
        }

        let record_name = self.record_fqdn();
        info!(
            "Published {} -> {} (ttl: {}s)",
            record_name, address, self.config.ttl
        );
        self.emit_event(UpdaterEvent::RecordPublished {
            record_name,
            address,
        });

        Ok(address)
    }

    /// Record a cycle failure and hand the error back
    fn fail(&self, error: Error) -> Error {
        self.emit_event(UpdaterEvent::CycleFailed {
            error: error.to_string(),
        });
        error
    }

    /// Emit an updater event
    ///
    /// # Parameters
    ///
    /// - `event`: The event to emit
    pub(crate) fn emit_event(&self, event: UpdaterEvent) {
        // Drop rather than block when nobody is draining the channel
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Event channel full, dropping {:?}", event);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Event receiver dropped, not emitting event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticResolver;

    #[async_trait]
    impl IpResolver for StaticResolver {
        async fn resolve(&self) -> Result<Ipv4Addr> {
            Ok(Ipv4Addr::new(203, 0, 113, 7))
        }

        fn source(&self) -> &str {
            "static"
        }
    }

    struct AcceptingProvider;

    #[async_trait]
    impl DnsProvider for AcceptingProvider {
        async fn create_or_update(
            &self,
            _credentials: &Credentials,
            _record: &RecordSetRequest,
        ) -> Result<()> {
            Ok(())
        }

        fn provider_name(&self) -> &'static str {
            "accepting"
        }
    }

    fn updater(host: &str) -> (DnsUpdater, mpsc::Receiver<UpdaterEvent>) {
        let config =
            AzureDnsConfig::new("example.com", "t", "c", "s", "sub", "rg").with_host(host);
        DnsUpdater::new(
            config,
            Credentials::new("token", chrono::Utc::now() + chrono::Duration::hours(1)),
            Box::new(StaticResolver),
            Box::new(AcceptingProvider),
        )
        .unwrap()
    }

    #[test]
    fn record_fqdn_handles_apex() {
        assert_eq!(updater("@").0.record_fqdn(), "example.com");
        assert_eq!(updater("home").0.record_fqdn(), "home.example.com");
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = AzureDnsConfig::new("", "t", "c", "s", "sub", "rg");
        let result = DnsUpdater::new(
            config,
            Credentials::new("token", chrono::Utc::now()),
            Box::new(StaticResolver),
            Box::new(AcceptingProvider),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn successful_cycle_emits_events_in_order() {
        let (updater, mut rx) = updater("home");

        assert!(updater.update_cycle().await);

        assert_eq!(rx.recv().await, Some(UpdaterEvent::CycleStarted));
        assert_eq!(
            rx.recv().await,
            Some(UpdaterEvent::AddressResolved {
                address: Ipv4Addr::new(203, 0, 113, 7)
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(UpdaterEvent::RecordPublished {
                record_name: "home.example.com".to_string(),
                address: Ipv4Addr::new(203, 0, 113, 7),
            })
        );
    }
}
