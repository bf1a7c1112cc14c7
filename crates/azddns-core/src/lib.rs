// # azddns-core
//
// Core library for the Azure DNS dynamic-IP updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping an A record in an
// Azure DNS zone pointed at the host's current public IPv4 address:
// - **IpResolver**: Trait for discovering the external address
// - **IdentityProvider**: Trait for acquiring credentials once at startup
// - **DnsProvider**: Trait for creating or updating the A record
// - **DnsUpdater**: Runs one resolve-then-push update cycle
// - **Scheduler**: Long-lived task running one cycle per tick until shutdown
// - **bootstrap**: Startup sequence (credentials, first publish)
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP implementations
// 2. **Contained Failures**: Per-cycle errors never escape the scheduler
// 3. **Explicit Ownership**: Credentials live on the updater, the updater is
//    passed to the scheduler; no global state
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod updater;
pub mod scheduler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{Credentials, DnsProvider, IdentityProvider, IpResolver, RecordSetRequest};
pub use updater::{DnsUpdater, UpdaterEvent};
pub use updater::startup::bootstrap;
pub use scheduler::{Scheduler, SchedulerSummary};
pub use config::AzureDnsConfig;
pub use error::{Error, Result};
