//! Age-based eviction of expired artifacts.
//!
//! The [`Sweeper`] runs either on demand ([`Sweeper::sweep_now`]) or as a
//! background task with its own start/stop lifecycle ([`Sweeper::spawn`]).
//!
//! `max_age` must exceed the longest expected gap between two pipeline
//! stages of the same session; otherwise an artifact can expire between the
//! stage that produced it and the stage that consumes it.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::store::ArtifactStore;

/// Default artifact lifetime: 6 hours.
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(6 * 60 * 60);

/// Default pause between background sweeps: 10 minutes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Eviction policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    /// Entries at least this old are removed.
    pub max_age: Duration,
    /// Pause between background passes.
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Garbage collector over an [`ArtifactStore`].
#[derive(Debug, Clone)]
pub struct Sweeper {
    store: ArtifactStore,
    config: SweeperConfig,
}

impl Sweeper {
    pub fn new(store: ArtifactStore, config: SweeperConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }

    /// Run one sweep pass and return the number of entries removed.
    ///
    /// Never fails: a directory that cannot be listed is logged and counts
    /// as zero removals.
    pub async fn sweep_now(&self) -> usize {
        let store = self.store.clone();
        let max_age = self.config.max_age;

        match tokio::task::spawn_blocking(move || store.sweep(max_age)).await {
            Ok(Ok(removed)) => removed,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "artifact sweep failed");
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "artifact sweep task panicked");
                0
            }
        }
    }

    /// Sweep every `interval` until `cancel` fires.
    ///
    /// The first pass runs immediately.
    pub async fn run(self, cancel: CancellationToken) {
        tracing::info!(
            max_age_secs = self.config.max_age.as_secs(),
            interval_secs = self.config.interval.as_secs(),
            "Artifact sweeper started"
        );

        // tokio panics on a zero period.
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.sweep_now().await;
                    tracing::debug!(removed, "sweep pass complete");
                }
                _ = cancel.cancelled() => break,
            }
        }

        tracing::info!("Artifact sweeper stopped");
    }

    /// Start [`Sweeper::run`] on the current tokio runtime.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }
}
