// # azddnsd - Azure DNS dynamic-IP daemon
//
// Keeps one A record in an Azure DNS zone pointed at this host's public IPv4
// address. This is a thin integration layer: all update logic lives in
// azddns-core, the daemon only wires the pieces together.
//
// The azddnsd daemon is responsible for:
// 1. Loading configuration (JSON file or environment variables)
// 2. Initializing logging and the runtime
// 3. Acquiring credentials and running the first update cycle
// 4. Running the five-minute scheduler until SIGTERM/SIGINT
//
// ## Configuration
//
// If `AZDDNS_CONFIG` names a JSON file, it is read with the keys
// `zone-domain`, `host`, `tenant`, `client-id`, `client-secret`,
// `subscription-id`, `resource-group-name`, `timeout`, `ttl`.
//
// Otherwise every key comes from its own environment variable:
// - `AZDDNS_ZONE_DOMAIN`: DNS zone, e.g. example.com
// - `AZDDNS_HOST`: Record name inside the zone (default `@`)
// - `AZDDNS_TENANT`: Azure AD tenant
// - `AZDDNS_CLIENT_ID`: Service principal application id
// - `AZDDNS_CLIENT_SECRET`: Service principal secret
// - `AZDDNS_SUBSCRIPTION_ID`: Subscription holding the zone
// - `AZDDNS_RESOURCE_GROUP_NAME`: Resource group holding the zone
// - `AZDDNS_TIMEOUT`: HTTP timeout in seconds (default 60)
// - `AZDDNS_TTL`: Record TTL in seconds (default 60)
//
// `AZDDNS_LOG_LEVEL` (trace, debug, info, warn, error) applies to both.
//
// ## Example
//
// ```bash
// export AZDDNS_ZONE_DOMAIN=example.com
// export AZDDNS_HOST=home
// export AZDDNS_TENANT=00000000-0000-0000-0000-000000000000
// export AZDDNS_CLIENT_ID=11111111-1111-1111-1111-111111111111
// export AZDDNS_CLIENT_SECRET=...
// export AZDDNS_SUBSCRIPTION_ID=22222222-2222-2222-2222-222222222222
// export AZDDNS_RESOURCE_GROUP_NAME=dns-rg
//
// azddnsd
// ```

use anyhow::Result;
use azddns_core::config::{DEFAULT_HOST, DEFAULT_TIMEOUT_SECS, DEFAULT_TTL_SECS};
use azddns_core::{AzureDnsConfig, Scheduler, bootstrap};
use azddns_ip_http::HttpIpResolver;
use azddns_provider_azure::{AzureDnsProvider, AzureIdentity};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// How long an in-flight cycle may take to finish once shutdown is requested
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AzddnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<AzddnsExitCode> for ExitCode {
    fn from(code: AzddnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl AzddnsExitCode {
    /// Exit code for an error returned by [`run_daemon`]
    fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<azddns_core::Error>() {
            Some(e) if e.is_fatal_at_startup() => Self::ConfigError,
            _ => Self::RuntimeError,
        }
    }
}

/// Daemon settings: the updater configuration plus process-level knobs
#[derive(Debug)]
struct Settings {
    azure: AzureDnsConfig,
    log_level: String,
}

impl Settings {
    /// Load settings from the process environment
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let log_level = lookup("AZDDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let azure = match lookup("AZDDNS_CONFIG") {
            Some(path) => AzureDnsConfig::from_json_file(path)?,
            None => {
                let required = |key: &str| -> Result<String> {
                    lookup(key).ok_or_else(|| {
                        anyhow::anyhow!("{} is required. Set it via: export {}=...", key, key)
                    })
                };

                let timeout = parse_seconds(&lookup, "AZDDNS_TIMEOUT", DEFAULT_TIMEOUT_SECS)?;
                let ttl = parse_seconds(&lookup, "AZDDNS_TTL", u64::from(DEFAULT_TTL_SECS))?;
                let ttl = u32::try_from(ttl)
                    .map_err(|_| anyhow::anyhow!("AZDDNS_TTL is out of range. Got: {}", ttl))?;

                AzureDnsConfig::new(
                    required("AZDDNS_ZONE_DOMAIN")?,
                    required("AZDDNS_TENANT")?,
                    required("AZDDNS_CLIENT_ID")?,
                    required("AZDDNS_CLIENT_SECRET")?,
                    required("AZDDNS_SUBSCRIPTION_ID")?,
                    required("AZDDNS_RESOURCE_GROUP_NAME")?,
                )
                .with_host(lookup("AZDDNS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()))
                .with_timeout(timeout)
                .with_ttl(ttl)
            }
        };

        Ok(Self { azure, log_level })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        self.azure.validate()?;

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "AZDDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        Ok(())
    }

    fn tracing_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

/// Read a whole number of seconds, falling back to `default` when unset
fn parse_seconds<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            anyhow::anyhow!("{} must be a positive integer. Got: {}", key, raw)
        }),
    }
}

fn main() -> ExitCode {
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return AzddnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = settings.validate() {
        eprintln!("Configuration validation error: {}", e);
        return AzddnsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(settings.tracing_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return AzddnsExitCode::ConfigError.into();
    }

    info!("Starting azddnsd");
    info!(
        "Managing record {} in zone {} (resource group {})",
        settings.azure.host, settings.azure.zone_domain, settings.azure.resource_group_name
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return AzddnsExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run_daemon(settings.azure).await {
            Ok(()) => AzddnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                AzddnsExitCode::for_error(&e)
            }
        }
    });

    code.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: AzureDnsConfig) -> Result<()> {
    let identity = AzureIdentity::from_config(&config)?;
    let resolver = HttpIpResolver::from_config(&config)?;
    let provider = AzureDnsProvider::from_config(&config)?;

    let (updater, mut events) =
        bootstrap(config, &identity, Box::new(resolver), Box::new(provider)).await?;

    let event_log = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Updater event: {:?}", event);
        }
    });

    let scheduler = Scheduler::new(Arc::new(updater));

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let mut scheduler_task = tokio::spawn(scheduler.run_with_shutdown(shutdown_rx));

    tokio::select! {
        signal = wait_for_shutdown_signal() => {
            info!("Received shutdown signal: {}", signal?);
        }
        finished = &mut scheduler_task => {
            event_log.abort();
            return match finished {
                Ok(Ok(summary)) => Err(anyhow::anyhow!(
                    "Scheduler stopped unexpectedly after {} cycle(s)",
                    summary.cycles_run
                )),
                Ok(Err(e)) => Err(e.into()),
                Err(e) => Err(anyhow::anyhow!("Scheduler task failed: {}", e)),
            };
        }
    }

    // The scheduler may already be gone; nothing to signal then
    let _ = shutdown_tx.send(());

    let outcome = tokio::time::timeout(SHUTDOWN_GRACE, scheduler_task).await;
    event_log.abort();

    match outcome {
        Ok(Ok(Ok(_))) => {
            info!("Shutting down daemon");
            Ok(())
        }
        Ok(Ok(Err(e))) => Err(e.into()),
        Ok(Err(e)) => Err(anyhow::anyhow!("Scheduler task failed: {}", e)),
        Err(_) => Err(anyhow::anyhow!(
            "Shutdown timeout after {:?}",
            SHUTDOWN_GRACE
        )),
    }
}

/// Wait for SIGTERM or SIGINT
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let received = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(received)
}

/// Wait for Ctrl-C
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
