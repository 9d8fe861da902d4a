//! # Relay Error Types
//!
//! Structured error handling for the messaging and liveness layer using
//! thiserror instead of `Box<dyn Error>` patterns.
//!
//! The taxonomy mirrors how failures are handled operationally:
//!
//! - [`RelayError::Topology`] — broker-side precondition mismatch while
//!   declaring queues; fatal, requires operator intervention, never retried.
//! - [`RelayError::IdentityMismatch`] — the claimed publisher identity did not
//!   match the authenticated connection identity; a misconfiguration, kept
//!   distinct from transport failures so callers never confuse the two.
//! - [`RelayError::Transport`] — broker unreachable or connection dropped;
//!   propagates to the owning task's supervisor for restart.
//! - [`WatcherError`] (in `monitoring::watcher`) — wiring bugs in watcher
//!   registration, surfaced transparently through [`RelayError::Watcher`].

use thiserror::Error;

use crate::monitoring::watcher::WatcherError;

/// Errors produced by the messaging and liveness layer.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Topology declaration failed for queue {queue_name}: {message}")]
    Topology { queue_name: String, message: String },

    #[error("Publisher identity mismatch on queue {queue_name}: claimed '{claimed_identity}' but broker rejected it")]
    IdentityMismatch {
        queue_name: String,
        claimed_identity: String,
    },

    #[error("Broker transport error: {message}")]
    Transport { message: String },

    #[error("Queue operation failed: {queue_name}: {operation}: {message}")]
    QueueOperation {
        queue_name: String,
        operation: String,
        message: String,
    },

    #[error("Message serialization error: {message}")]
    MessageSerialization { message: String },

    #[error("Configuration error: {component}: {message}")]
    Configuration { component: String, message: String },

    #[error(transparent)]
    Watcher(#[from] WatcherError),
}

impl RelayError {
    /// Create a topology error (fatal; indicates broker-side drift)
    pub fn topology(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Topology {
            queue_name: queue_name.into(),
            message: message.into(),
        }
    }

    /// Create an identity mismatch error
    pub fn identity_mismatch(
        queue_name: impl Into<String>,
        claimed_identity: impl Into<String>,
    ) -> Self {
        Self::IdentityMismatch {
            queue_name: queue_name.into(),
            claimed_identity: claimed_identity.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a queue operation error
    pub fn queue_operation(
        queue_name: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a publish error
    pub fn publish(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: "publish".to_string(),
            message: message.into(),
        }
    }

    /// Create a consume error
    pub fn consume(queue_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::QueueOperation {
            queue_name: queue_name.into(),
            operation: "consume".to_string(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(component: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Whether this error indicates a condition that a process supervisor can
    /// recover from by reconnecting (as opposed to operator-level breakage).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::QueueOperation { .. })
    }
}

/// Conversion from lapin errors to transport errors.
///
/// Classification into more specific variants (topology drift, identity
/// mismatch) is done at the call sites that have the queue context.
impl From<lapin::Error> for RelayError {
    fn from(err: lapin::Error) -> Self {
        RelayError::transport(err.to_string())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::MessageSerialization {
            message: err.to_string(),
        }
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let topo = RelayError::topology("jobs", "PRECONDITION_FAILED");
        assert!(matches!(topo, RelayError::Topology { .. }));

        let publish = RelayError::publish("jobs", "channel closed");
        assert!(matches!(
            publish,
            RelayError::QueueOperation { ref operation, .. } if operation == "publish"
        ));
    }

    #[test]
    fn test_identity_mismatch_is_distinguishable() {
        let err = RelayError::identity_mismatch("feedback_queue", "agent-7");
        assert!(matches!(err, RelayError::IdentityMismatch { .. }));
        assert!(!err.is_recoverable());

        let display = format!("{err}");
        assert!(display.contains("feedback_queue"));
        assert!(display.contains("agent-7"));
    }

    #[test]
    fn test_transport_is_recoverable() {
        let err = RelayError::transport("connection reset");
        assert!(err.is_recoverable());

        let topo = RelayError::topology("jobs", "drift");
        assert!(!topo.is_recoverable());
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{broken").unwrap_err();
        let err: RelayError = json_err.into();
        assert!(matches!(err, RelayError::MessageSerialization { .. }));
    }

    #[test]
    fn test_watcher_error_passthrough() {
        let err: RelayError = WatcherError::AlreadyRegistered {
            name: "job_watcher".to_string(),
        }
        .into();
        assert!(matches!(err, RelayError::Watcher(_)));
        assert!(format!("{err}").contains("job_watcher"));
    }
}
