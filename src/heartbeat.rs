//! # Heartbeat Service
//!
//! Periodically announces this agent's identity to the central service over
//! the feedback queue, and registers itself as a watched task so its own
//! failure is visible through the liveness probe.
//!
//! The watcher entry is touched after every attempt, success or failure of
//! the publish. That makes two failure modes distinguishable: a broker outage
//! shows up as a publish error surfaced to the caller while the watcher stays
//! fresh, whereas a stalled scheduler never attempts at all and is caught by
//! staleness.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::{AgentIdentity, HeartbeatConfig};
use crate::constants::queues::FEEDBACK_QUEUE;
use crate::errors::RelayResult;
use crate::messaging::message::{ControlMessage, HeartbeatMessage};
use crate::messaging::publisher::QueuePublisher;
use crate::monitoring::watcher::WatcherRegistry;

/// Name this service registers under in the watcher registry.
pub const HEARTBEAT_WATCHER: &str = "heartbeat";

/// Drives heartbeat publishes on a schedule.
pub struct HeartbeatService {
    publisher: Arc<dyn QueuePublisher>,
    identity: AgentIdentity,
    interval: Duration,
    registry: Arc<WatcherRegistry>,
}

impl HeartbeatService {
    /// Creates the service and registers its watcher entry.
    ///
    /// Fails if a heartbeat service was already wired up against this
    /// registry; there must be exactly one per process.
    pub fn new(
        publisher: Arc<dyn QueuePublisher>,
        identity: AgentIdentity,
        config: &HeartbeatConfig,
        registry: Arc<WatcherRegistry>,
    ) -> RelayResult<Self> {
        registry.register(HEARTBEAT_WATCHER)?;
        Ok(Self {
            publisher,
            identity,
            interval: config.interval(),
            registry,
        })
    }

    /// Publishes one heartbeat and records the attempt.
    ///
    /// The publish is atomic from the caller's perspective: it either fully
    /// succeeds or returns an error with nothing half-sent. The watcher is
    /// touched either way.
    pub async fn beat(&self) -> RelayResult<()> {
        let message = HeartbeatMessage::new(&self.identity);
        let publish_result = match message.to_bytes() {
            Ok(body) => {
                self.publisher
                    .publish(FEEDBACK_QUEUE, &body, &self.identity.publisher_identity)
                    .await
            }
            Err(e) => Err(e),
        };

        // Touch before propagating any publish error: the attempt happened.
        self.registry.touch(HEARTBEAT_WATCHER)?;

        publish_result
    }

    /// Runs the heartbeat schedule until `cancel` fires.
    ///
    /// Publish failures are logged and surfaced to the watcher ledger via the
    /// per-beat touch; the schedule itself keeps going, since transport
    /// recovery belongs to the supervisor of the connection, not this driver.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            interval_secs = self.interval.as_secs(),
            cluster = %self.identity.cluster_name,
            organization = %self.identity.organization_name,
            "heartbeat service started"
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("heartbeat service cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.beat().await {
                        error!(error = %e, "heartbeat publish failed");
                    }
                }
            }
        }
    }
}
