//! Startup glue
//!
//! Startup is the only place where failures are fatal. The sequence is:
//!
//! 1. Validate the configuration
//! 2. Acquire credentials once from the identity provider
//! 3. Run one update cycle synchronously
//!
//! Only when all three succeed does the caller get a ready [`DnsUpdater`]
//! to hand to the [`crate::Scheduler`]. A failed first publish is treated as
//! a setup failure, not as a missed update.

use crate::config::AzureDnsConfig;
use crate::error::{Error, Result};
use crate::traits::{DnsProvider, IdentityProvider, IpResolver};
use crate::updater::{DnsUpdater, UpdaterEvent};
use tokio::sync::mpsc;
use tracing::{error, info};

/// Acquire credentials and perform the first publish
///
/// # Parameters
///
/// - `config`: Updater configuration
/// - `identity`: Identity provider used once to obtain credentials
/// - `resolver`: IP resolver implementation
/// - `provider`: DNS provider implementation
///
/// # Returns
///
/// - `Ok((DnsUpdater, Receiver))`: Updater whose first cycle succeeded, and its event stream
/// - `Err(Error::Config)`: Configuration invalid; nothing was contacted
/// - `Err(Error::Credential)`: Identity provider rejected the client; no cycle ran
/// - `Err(Error::Startup)`: The first update cycle failed
pub async fn bootstrap(
    config: AzureDnsConfig,
    identity: &dyn IdentityProvider,
    resolver: Box<dyn IpResolver>,
    provider: Box<dyn DnsProvider>,
) -> Result<(DnsUpdater, mpsc::Receiver<UpdaterEvent>)> {
    config.validate()?;

    info!(
        "Acquiring credentials from {} for tenant {}",
        identity.provider_name(),
        config.tenant
    );

    let credentials = identity.acquire().await.map_err(|e| {
        error!("Failed to acquire {} credential: {}", identity.provider_name(), e);
        match e {
            Error::Credential(_) => e,
            other => Error::credential(other.to_string()),
        }
    })?;

    let (updater, events) = DnsUpdater::new(config, credentials, resolver, provider)?;

    if let Err(e) = updater.try_update_cycle().await {
        error!("Failed to update DNS record {}", updater.record_fqdn());
        return Err(Error::startup(format!("initial update cycle failed: {}", e)));
    }

    info!("Initial update of {} succeeded", updater.record_fqdn());
    Ok((updater, events))
}
