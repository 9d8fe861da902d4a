//! # Reliable Messaging Pipeline
//!
//! Durable, dead-lettering message pipeline used to move control signals
//! (heartbeats, node inventory, model-catalog deltas) between remote cluster
//! agents and the central service over RabbitMQ (`lapin`, AMQP 0.9.1).
//!
//! ## Data flow
//!
//! ```text
//! HeartbeatService ──► publish() ──► broker ──► run_consumer() ──► MessageHandler
//! ```
//!
//! Topology is declared once by [`topology::ensure_topology`]; publishers and
//! consumers assume it is already in place. Routing uses the default
//! (nameless) exchange with the queue name as routing key, a documented wire
//! convention rather than broker magic: every declared queue is implicitly
//! bound to the default exchange under its own name.

pub mod consumer;
pub mod message;
pub mod publisher;
pub mod topology;

pub use consumer::{connect, run_consumer, MessageHandler};
pub use message::{
    CatalogOp, ControlMessage, HeartbeatMessage, MessageKind, ModelCatalogMessage, ModelDelta,
    NodeInventoryMessage, NodeStatus,
};
pub use publisher::{publish, publish_on_connection, ChannelPublisher, QueuePublisher};
pub use topology::ensure_topology;
