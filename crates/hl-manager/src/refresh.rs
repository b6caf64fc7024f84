//! Host status refresh
//!
//! A refresh probes every listed host with at most `max_concurrent_probes`
//! probes in flight, each bounded by `probe_timeout`. Results land in the
//! registry's status cache as they complete (last write per address wins),
//! so overlapping refreshes are harmless.
//!
//! [`RefreshTimer`] repeats the refresh on a fixed interval until its
//! keep-running flag is cleared or its cancellation token fires.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use hl_core::{HostAddress, HostEntry, HostStatus};

use crate::registry::HostRegistry;

/// Shortest period a [`RefreshTimer`] will tick at
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

impl HostRegistry {
    /// Probe `address` once, bounded by the probe timeout
    pub async fn probe_once(&self, address: &HostAddress) -> bool {
        let timeout = self.settings().probe_timeout;
        match tokio::time::timeout(timeout, self.probe().ping(address)).await {
            Ok(reachable) => {
                tracing::trace!("Probe {}: reachable={}", address, reachable);
                reachable
            }
            Err(_) => {
                tracing::debug!("Probe {} timed out after {:?}", address, timeout);
                false
            }
        }
    }

    /// Probe one host and store the result
    pub async fn refresh_host(&self, address: &HostAddress) -> Option<HostStatus> {
        let reachable = self.probe_once(address).await;
        self.record_probe(address, reachable)
    }

    /// Probe every listed host, yielding each update as its probe completes.
    ///
    /// Updates arrive in completion order, not display order. The connection
    /// target is always reported as `Connected`.
    pub fn refresh_stream(&self) -> impl Stream<Item = HostEntry> + '_ {
        let limit = self.settings().max_concurrent_probes.max(1);

        stream::iter(self.addresses())
            .map(move |address| async move {
                let reachable = self.probe_once(&address).await;
                (address, reachable)
            })
            .buffer_unordered(limit)
            .filter_map(move |(address, reachable)| {
                let update = self
                    .record_probe(&address, reachable)
                    .map(|status| HostEntry { address, status });
                futures::future::ready(update)
            })
    }

    /// Probe every listed host and return the refreshed list in display order
    pub async fn refresh_all(&self) -> Vec<HostEntry> {
        let updated = self.refresh_stream().count().await;
        tracing::debug!("Refreshed {} hosts", updated);
        self.snapshot()
    }
}

/// Periodic status refresh running on its own task
pub struct RefreshTimer {
    keep_running: Arc<AtomicBool>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RefreshTimer {
    /// Start refreshing `registry` every `interval`, sending each refreshed
    /// list to `updates`. The first refresh happens immediately.
    pub fn spawn(
        registry: Arc<HostRegistry>,
        interval: Duration,
        updates: mpsc::Sender<Vec<HostEntry>>,
    ) -> Self {
        // tokio::time::interval panics on a zero period
        let interval = if interval.is_zero() {
            tracing::warn!(
                "Refresh interval must be positive, using {:?}",
                MIN_REFRESH_INTERVAL
            );
            MIN_REFRESH_INTERVAL
        } else {
            interval
        };

        let keep_running = Arc::new(AtomicBool::new(true));
        let cancel = registry.cancellation_token().child_token();

        let handle = tokio::spawn(run_refresh_loop(
            registry,
            interval,
            Arc::clone(&keep_running),
            cancel.clone(),
            updates,
        ));

        Self {
            keep_running,
            cancel,
            handle,
        }
    }

    /// Suppress further ticks. A refresh already in progress completes.
    pub fn stop(&self) {
        self.keep_running.store(false, Ordering::SeqCst);
    }

    /// Whether further ticks will run
    pub fn is_running(&self) -> bool {
        self.keep_running.load(Ordering::SeqCst) && !self.handle.is_finished()
    }

    /// Stop at the next tick boundary without waiting for the interval
    pub fn cancel(&self) {
        self.stop();
        self.cancel.cancel();
    }

    /// Wait for the refresh task to exit
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::warn!("Refresh task ended abnormally: {}", e);
        }
    }
}

async fn run_refresh_loop(
    registry: Arc<HostRegistry>,
    interval: Duration,
    keep_running: Arc<AtomicBool>,
    cancel: CancellationToken,
    updates: mpsc::Sender<Vec<HostEntry>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::debug!("Starting status refresh every {:?}", interval);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !keep_running.load(Ordering::SeqCst) {
                    break;
                }
                let hosts = registry.refresh_all().await;
                if updates.send(hosts).await.is_err() {
                    tracing::debug!("Status receiver dropped");
                    break;
                }
            }
            _ = cancel.cancelled() => {
                break;
            }
        }
    }

    tracing::debug!("Status refresh stopped");
}
