//! # Publisher
//!
//! Delivers one message to one queue with at-least-once, persisted semantics
//! under a specific claimed identity.
//!
//! Messages route through the default (nameless) exchange using the queue name
//! as routing key. The claimed identity travels in the AMQP `user_id`
//! property, which the broker verifies against the authenticated connection
//! identity before accepting the publish; a mismatch is surfaced as the
//! distinct [`RelayError::IdentityMismatch`] so callers never mistake
//! misconfiguration for transient network failure.

use async_trait::async_trait;
use lapin::options::BasicPublishOptions;
use lapin::publisher_confirm::Confirmation;
use lapin::{BasicProperties, Channel, Connection};
use tracing::{debug, warn};

use crate::errors::{RelayError, RelayResult};
use crate::messaging::consumer::open_confirming_channel;

/// Seam between message producers (heartbeat service, inventory pollers) and
/// the broker, so producers can be exercised without a live connection.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(
        &self,
        queue_name: &str,
        body: &[u8],
        claimed_identity: &str,
    ) -> RelayResult<()>;
}

/// [`QueuePublisher`] backed by a long-lived channel.
pub struct ChannelPublisher {
    channel: Channel,
}

impl ChannelPublisher {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl QueuePublisher for ChannelPublisher {
    async fn publish(
        &self,
        queue_name: &str,
        body: &[u8],
        claimed_identity: &str,
    ) -> RelayResult<()> {
        publish(&self.channel, queue_name, body, claimed_identity).await
    }
}

/// Publishes `body` to `queue_name` on an existing channel.
///
/// The channel must be in publisher-confirm mode ([`crate::messaging::connect`]
/// enables it on every channel it opens). The broker durably stores the
/// message (delivery mode 2) before the confirm resolves; when this returns
/// `Ok` the message is owned by the broker, and redelivery or dead-lettering
/// is no longer our concern. A nack or a channel without confirms enabled is
/// an error, never a silent success.
pub async fn publish(
    channel: &Channel,
    queue_name: &str,
    body: &[u8],
    claimed_identity: &str,
) -> RelayResult<()> {
    let properties = BasicProperties::default()
        .with_delivery_mode(2) // persistent
        .with_content_type("application/json".into())
        .with_user_id(claimed_identity.into());

    let confirm = channel
        .basic_publish(
            "", // default exchange; implicit binding routes by queue name
            queue_name,
            BasicPublishOptions::default(),
            body,
            properties,
        )
        .await
        .map_err(|e| classify_publish_error(queue_name, claimed_identity, e))?;

    let confirmation = confirm
        .await
        .map_err(|e| classify_publish_error(queue_name, claimed_identity, e))?;
    check_confirmation(queue_name, &confirmation)?;

    debug!(
        queue = queue_name,
        identity = claimed_identity,
        bytes = body.len(),
        "message published"
    );
    Ok(())
}

/// Publishes on a connection when no channel is at hand, opening one
/// confirm-mode channel for this logical publish call and releasing it
/// afterwards on every path.
pub async fn publish_on_connection(
    connection: &Connection,
    queue_name: &str,
    body: &[u8],
    claimed_identity: &str,
) -> RelayResult<()> {
    let channel = open_confirming_channel(connection).await?;

    let result = publish(&channel, queue_name, body, claimed_identity).await;

    if let Err(e) = channel.close(200, "publish complete").await {
        // The publish outcome is what matters to the caller; a close failure
        // on an already-torn-down channel is only worth a log line.
        warn!(queue = queue_name, error = %e, "channel close after publish failed");
    }

    result
}

/// Only a broker ack counts as success. A nack means the broker declined
/// durable storage; `NotRequested` means the channel never entered confirm
/// mode, so broker ownership is unverifiable and the publish must not be
/// reported as stored.
fn check_confirmation(queue_name: &str, confirmation: &Confirmation) -> RelayResult<()> {
    match confirmation {
        Confirmation::Ack(_) => Ok(()),
        Confirmation::Nack(_) => Err(RelayError::publish(
            queue_name,
            "broker refused durable storage (basic.nack)",
        )),
        Confirmation::NotRequested => Err(RelayError::publish(
            queue_name,
            "channel is not in publisher-confirm mode; broker ownership unverified",
        )),
    }
}

/// The broker rejects identity-forging publishes with a 406 precondition
/// failure on the `user_id` property; everything else is a plain publish
/// failure the supervisor may retry.
fn classify_publish_error(queue_name: &str, claimed_identity: &str, err: lapin::Error) -> RelayError {
    let error_str = err.to_string();
    if error_str.contains("PRECONDITION-FAILED") || error_str.contains("PRECONDITION_FAILED") {
        RelayError::identity_mismatch(queue_name, claimed_identity)
    } else {
        RelayError::publish(queue_name, error_str)
    }
}
