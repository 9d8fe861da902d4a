//! # HTTP Health Boundary
//!
//! The single outward-facing surface of this crate: a liveness endpoint that
//! relays the watcher fleet's aggregate verdict. All other HTTP routing
//! belongs to the embedding agent.

pub mod health;

pub use health::{health_router, liveness_handler};
