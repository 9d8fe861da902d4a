//! # Liveness Evaluator
//!
//! Derives a single boolean health verdict from the [`WatcherRegistry`]
//! against a staleness threshold. This is the predicate behind the HTTP
//! health endpoint's 200/500 decision.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::constants::defaults::STALENESS_THRESHOLD;
use crate::monitoring::watcher::WatcherRegistry;

/// Read-only view over a [`WatcherRegistry`] that answers "is the fleet of
/// watchers healthy" as a single boolean.
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    registry: Arc<WatcherRegistry>,
    threshold: Duration,
}

impl LivenessProbe {
    /// Creates a probe with the default five-minute staleness threshold.
    pub fn new(registry: Arc<WatcherRegistry>) -> Self {
        Self::with_threshold(registry, STALENESS_THRESHOLD)
    }

    /// Creates a probe with an explicit staleness threshold.
    pub fn with_threshold(registry: Arc<WatcherRegistry>, threshold: Duration) -> Self {
        Self {
            registry,
            threshold,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Returns true iff every registered watcher's last attempt is within the
    /// threshold of now. An empty registry is vacuously healthy. A watcher
    /// exactly at the threshold still counts as healthy; only strictly older
    /// entries fail the verdict.
    ///
    /// Pure read over a registry snapshot; concurrent touches are tolerated
    /// (eventual consistency is acceptable for a health signal).
    pub fn all_healthy(&self) -> bool {
        for (name, last_attempt) in self.registry.snapshot() {
            let age = last_attempt.elapsed();
            if age > self.threshold {
                debug!(
                    watcher = %name,
                    age_secs = age.as_secs(),
                    threshold_secs = self.threshold.as_secs(),
                    "watcher is stale"
                );
                return false;
            }
        }
        true
    }

    /// Names of watchers whose last attempt is strictly older than the
    /// threshold. Used for log context when the verdict flips unhealthy.
    pub fn stale_watchers(&self) -> Vec<String> {
        self.registry
            .snapshot()
            .into_iter()
            .filter(|(_, last_attempt)| last_attempt.elapsed() > self.threshold)
            .map(|(name, _)| name)
            .collect()
    }
}
