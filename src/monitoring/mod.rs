//! # Watcher Liveness Monitoring
//!
//! Turns a fleet of independently polling background tasks into a single
//! aggregate health verdict. Every long-running poller registers itself in the
//! [`WatcherRegistry`] once at startup and touches its entry after each poll
//! attempt; the [`LivenessProbe`] reads the registry to answer health queries
//! from the HTTP boundary.
//!
//! Staleness is not an error: it is a fact relayed entirely through the
//! boolean verdict.

pub mod liveness;
pub mod watcher;

pub use liveness::LivenessProbe;
pub use watcher::{WatcherError, WatcherRegistry};
