//! # Queue Topology Manager
//!
//! Brings a channel's queue topology to a known state before any message
//! flows: the single shared dead-letter exchange and queue, plus the
//! application queue itself, durable and quorum-replicated, with its
//! dead-letter arguments pointing at the shared exchange.
//!
//! Declarations use AMQP declare semantics (create-if-absent), so re-invoking
//! with the same name is a broker-side no-op. A precondition mismatch means
//! the queue already exists with incompatible arguments; that is topology
//! drift requiring operator intervention, surfaced as a fatal
//! [`RelayError::Topology`] and never retried here.

use lapin::options::{ExchangeDeclareOptions, QueueBindOptions, QueueDeclareOptions};
use lapin::types::{AMQPValue, FieldTable};
use lapin::{Channel, ExchangeKind};
use tracing::debug;

use crate::constants::dead_letter::{DLX_EXCHANGE, DLX_QUEUE, DLX_ROUTING_KEY};
use crate::errors::{RelayError, RelayResult};

/// Declares the shared dead-letter infrastructure, then `queue_name` as a
/// durable quorum queue dead-lettering into it.
///
/// Idempotent; safe to call on process startup or lazily before first use.
/// The dead-letter queue itself carries no dead-letter binding, so passing
/// [`DLX_QUEUE`] stops after the shared infrastructure is in place.
pub async fn ensure_topology(channel: &Channel, queue_name: &str) -> RelayResult<()> {
    ensure_dead_letter_topology(channel).await?;

    if queue_name == DLX_QUEUE {
        return Ok(());
    }

    let mut args = FieldTable::default();
    args.insert("x-queue-type".into(), AMQPValue::LongString("quorum".into()));
    args.insert(
        "x-dead-letter-exchange".into(),
        AMQPValue::LongString(DLX_EXCHANGE.into()),
    );
    args.insert(
        "x-dead-letter-routing-key".into(),
        AMQPValue::LongString(DLX_ROUTING_KEY.into()),
    );

    channel
        .queue_declare(
            queue_name,
            QueueDeclareOptions {
                durable: true,
                auto_delete: false,
                ..Default::default()
            },
            args,
        )
        .await
        .map_err(|e| classify_declare_error(queue_name, e))?;

    debug!(queue = queue_name, "queue topology ensured");
    Ok(())
}

/// Declares the shared DLX exchange and queue and binds them under the fixed
/// routing key. Every application queue shares this one dead-letter target.
async fn ensure_dead_letter_topology(channel: &Channel) -> RelayResult<()> {
    channel
        .exchange_declare(
            DLX_EXCHANGE,
            ExchangeKind::Direct,
            ExchangeDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| classify_declare_error(DLX_EXCHANGE, e))?;

    channel
        .queue_declare(
            DLX_QUEUE,
            QueueDeclareOptions {
                durable: true,
                auto_delete: false,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await
        .map_err(|e| classify_declare_error(DLX_QUEUE, e))?;

    channel
        .queue_bind(
            DLX_QUEUE,
            DLX_EXCHANGE,
            DLX_ROUTING_KEY,
            QueueBindOptions::default(),
            FieldTable::default(),
        )
        .await
        .map_err(|e| {
            RelayError::queue_operation(DLX_QUEUE, "bind", format!("DLQ binding failed: {e}"))
        })?;

    Ok(())
}

/// Declare failures are either topology drift (broker precondition mismatch,
/// fatal) or transport trouble (supervisor-recoverable).
fn classify_declare_error(name: &str, err: lapin::Error) -> RelayError {
    let error_str = err.to_string();
    if error_str.contains("PRECONDITION-FAILED") || error_str.contains("PRECONDITION_FAILED") {
        RelayError::topology(name, error_str)
    } else {
        RelayError::queue_operation(name, "declare", error_str)
    }
}
