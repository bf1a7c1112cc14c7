//! Periodic scheduler
//!
//! The Scheduler is an explicit long-lived task that owns the updater and a
//! tick stream. Each tick runs exactly one independent update cycle. It is
//! started by the process after a successful [`crate::bootstrap()`] and
//! stops when its shutdown signal fires.
//!
//! ## Timing
//!
//! Production ticks fire every [`UPDATE_INTERVAL`]. The first tick fires one
//! full interval after start, because startup already ran a cycle.
//!
//! ## Failure Containment
//!
//! A failed cycle is logged and counted, never propagated. The loop keeps
//! running until shutdown.
//!
//! ## Shutdown
//!
//! Shutdown is observed between cycles. A cycle that is already running is
//! allowed to finish, which bounds shutdown latency by the cycle's own HTTP
//! timeouts.

use crate::config::UPDATE_INTERVAL;
use crate::error::Result;
use crate::updater::{DnsUpdater, UpdaterEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::wrappers::IntervalStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info, warn};

/// Counters describing a finished scheduler run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerSummary {
    /// Update cycles started by the scheduler
    pub cycles_run: usize,
    /// Of those, how many reported failure
    pub cycles_failed: usize,
}

/// Runs one update cycle per tick until shutdown
pub struct Scheduler {
    /// Updater shared with the owning application
    updater: Arc<DnsUpdater>,

    /// Interval between production ticks
    period: Duration,
}

impl Scheduler {
    /// Create a scheduler firing every [`UPDATE_INTERVAL`]
    pub fn new(updater: Arc<DnsUpdater>) -> Self {
        Self {
            updater,
            period: UPDATE_INTERVAL,
        }
    }

    /// Interval between production ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until SIGINT (Ctrl-C)
    pub async fn run(self) -> Result<SchedulerSummary> {
        let ticks = interval_ticks(self.period);
        self.run_internal(ticks, None).await
    }

    /// Run until the given shutdown signal fires (or its sender is dropped)
    pub async fn run_with_shutdown(
        self,
        shutdown_rx: oneshot::Receiver<()>,
    ) -> Result<SchedulerSummary> {
        let ticks = interval_ticks(self.period);
        self.run_internal(ticks, Some(shutdown_rx)).await
    }

    /// Run with a caller-supplied tick stream
    ///
    /// Each item of `ticks` triggers one update cycle. The scheduler stops
    /// when the stream ends or the optional shutdown signal fires. Intended
    /// for embedding applications with their own timing, and for tests.
    pub async fn run_with_ticks<S>(
        self,
        ticks: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<SchedulerSummary>
    where
        S: Stream<Item = ()> + Send + Unpin,
    {
        self.run_internal(ticks, shutdown_rx).await
    }

    async fn run_internal<S>(
        self,
        mut ticks: S,
        shutdown_rx: Option<oneshot::Receiver<()>>,
    ) -> Result<SchedulerSummary>
    where
        S: Stream<Item = ()> + Send + Unpin,
    {
        let mut summary = SchedulerSummary::default();

        info!(
            "Scheduling updates of {} every {}s",
            self.updater.record_fqdn(),
            self.period.as_secs()
        );
        self.updater.emit_event(UpdaterEvent::SchedulerStarted {
            interval_secs: self.period.as_secs(),
        });

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        warn!("Failed to listen for Ctrl-C: {}", e);
                        std::future::pending::<()>().await;
                    }
                }
            }
        };
        tokio::pin!(shutdown);

        let reason = loop {
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break "Shutdown signal";
                }

                tick = ticks.next() => {
                    if tick.is_none() {
                        debug!("Tick stream ended");
                        break "Tick stream ended";
                    }

                    summary.cycles_run += 1;
                    if !self.updater.update_cycle().await {
                        summary.cycles_failed += 1;
                        warn!(
                            "Scheduled update cycle failed ({} of {} so far), retrying in {}s",
                            summary.cycles_failed,
                            summary.cycles_run,
                            self.period.as_secs()
                        );
                    }
                }
            }
        };

        self.updater.emit_event(UpdaterEvent::SchedulerStopped {
            reason: reason.to_string(),
        });
        info!(
            "Scheduler stopped after {} cycle(s), {} failed",
            summary.cycles_run, summary.cycles_failed
        );

        Ok(summary)
    }
}

/// Tick stream firing every `period`, starting one period from now
fn interval_ticks(period: Duration) -> impl Stream<Item = ()> + Send + Unpin {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    IntervalStream::new(interval).map(|_| ())
}
