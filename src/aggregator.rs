//! Background flushing of view counts
//!
//! One task for the lifetime of the process drains the [`ViewCounter`] on a
//! fixed interval and hands the deltas to [`NoteRepository::flush_counts`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::repository::NoteRepository;
use crate::views::ViewCounter;

/// Periodic drain-and-flush of view counts
///
/// Views are best-effort telemetry. When a flush fails the drained deltas
/// are logged and dropped, not put back, so a store outage loses the views
/// of that cycle instead of growing the pending map without bound. The
/// displayed count then lags by those views for good.
#[derive(Clone)]
pub struct Aggregator {
    views: Arc<ViewCounter>,
    repo: Arc<dyn NoteRepository>,
    period: Duration,
}

impl Aggregator {
    pub fn new(views: Arc<ViewCounter>, repo: Arc<dyn NoteRepository>, period: Duration) -> Self {
        Self {
            views,
            repo,
            period,
        }
    }

    /// Drains the counter once and flushes the result
    ///
    /// Returns how many notes had their stored count updated. Deltas for
    /// notes deleted since they were read are skipped and not counted; the
    /// result is zero when nothing was pending or the flush failed.
    pub fn flush_once(&self) -> usize {
        let deltas = self.views.drain_dirty();
        if deltas.is_empty() {
            return 0;
        }

        match self.repo.flush_counts(&deltas) {
            Ok(applied) => {
                debug!(
                    "flushed view counts for {applied} of {} drained notes",
                    deltas.len()
                );
                applied
            }
            Err(err) => {
                let dropped: u64 = deltas.values().sum();
                warn!(
                    "dropping {dropped} views of {} notes after failed flush: {err}; deltas: {deltas:?}",
                    deltas.len()
                );
                0
            }
        }
    }

    /// Starts the flush loop on the tokio runtime
    ///
    /// The loop exits after one final flush once `shutdown` turns true or its
    /// sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.period, self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.flush_blocking().await;
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            let flushed = self.flush_blocking().await;
            info!("view aggregator stopped; final flush covered {flushed} notes");
        })
    }

    // redb blocks on I/O, keep it off the async workers
    async fn flush_blocking(&self) -> usize {
        let this = self.clone();
        match tokio::task::spawn_blocking(move || this.flush_once()).await {
            Ok(flushed) => flushed,
            Err(err) => {
                warn!("view flush task failed: {err}");
                0
            }
        }
    }
}
