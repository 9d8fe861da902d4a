#![allow(clippy::doc_markdown)] // Allow technical terms like RabbitMQ, GPU in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Fleet Relay
//!
//! Reliable messaging and watcher liveness layer for GPU fleet control-plane
//! agents.
//!
//! ## Overview
//!
//! Remote cluster agents exchange control signals — heartbeats, node
//! inventory, model-catalog deltas — with a central service through a durable,
//! dead-lettering RabbitMQ pipeline. Independently, every long-running poller
//! in the agent records its attempts in a shared watcher registry, and a
//! liveness probe folds those records into the single boolean behind the
//! agent's health endpoint.
//!
//! ## Module Organization
//!
//! - [`messaging`] - Queue topology, publisher, and consumer loop over lapin
//! - [`monitoring`] - Watcher registry and liveness evaluation
//! - [`heartbeat`] - Scheduled identity announcements on the feedback queue
//! - [`web`] - The axum liveness endpoint fragment
//! - [`config`] - Broker, identity, heartbeat, and liveness configuration
//! - [`constants`] - Wire-contract names shared with the central service
//! - [`errors`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use fleet_relay::monitoring::{LivenessProbe, WatcherRegistry};
//!
//! let registry = Arc::new(WatcherRegistry::new());
//! registry.register("inventory_poller").unwrap();
//! registry.touch("inventory_poller").unwrap();
//!
//! let probe = LivenessProbe::new(registry);
//! assert!(probe.all_healthy());
//! ```
//!
//! ## Delivery Semantics
//!
//! At-least-once, persisted publishes with per-queue FIFO as provided by the
//! broker. Exactly-once delivery, cross-queue ordering, and broker/database
//! transactionality are explicitly out of scope; redelivery and
//! dead-lettering are the broker's job once a publish is confirmed.

pub mod config;
pub mod constants;
pub mod errors;
pub mod heartbeat;
pub mod logging;
pub mod messaging;
pub mod monitoring;
pub mod web;

pub use config::{AgentIdentity, BrokerConfig, HeartbeatConfig, LivenessConfig, RelayConfig};
pub use errors::{RelayError, RelayResult};
pub use heartbeat::{HeartbeatService, HEARTBEAT_WATCHER};
pub use messaging::{
    connect, ensure_topology, publish, publish_on_connection, run_consumer, ChannelPublisher,
    ControlMessage, HeartbeatMessage, MessageHandler, MessageKind, QueuePublisher,
};
pub use monitoring::{LivenessProbe, WatcherError, WatcherRegistry};
