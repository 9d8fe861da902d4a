//! # Control Message Schemas
//!
//! Wire-visible payloads carried on the feedback channel. Field names and
//! kind tags are part of the contract between remote agents and the central
//! service; both sides deserialize these byte-for-byte.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AgentIdentity;
use crate::errors::RelayResult;

/// Kind tag identifying a control-message family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Heartbeat,
    NodeInventory,
    ModelCatalog,
}

impl MessageKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Heartbeat => crate::constants::message_kinds::HEARTBEAT,
            Self::NodeInventory => crate::constants::message_kinds::NODE_INVENTORY,
            Self::ModelCatalog => crate::constants::message_kinds::MODEL_CATALOG,
        }
    }
}

/// Serialization seam shared by every outbound control message.
///
/// Blanket-implemented for serde-compatible types; payloads become JSON bytes
/// that the publisher hands to the broker as an opaque body.
pub trait ControlMessage: Send + Sync + Clone + 'static {
    fn to_bytes(&self) -> RelayResult<Vec<u8>>;

    fn from_bytes(bytes: &[u8]) -> RelayResult<Self>
    where
        Self: Sized;
}

impl<T> ControlMessage for T
where
    T: Serialize + serde::de::DeserializeOwned + Send + Sync + Clone + 'static,
{
    fn to_bytes(&self) -> RelayResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> RelayResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Periodic identity announcement from an agent to the central service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartbeatMessage {
    pub kind: MessageKind,
    /// ISO-8601 timestamp of this heartbeat
    pub timestamp: DateTime<Utc>,
    pub cluster_name: String,
    pub organization_name: String,
}

impl HeartbeatMessage {
    /// Builds a heartbeat stamped with the current time.
    pub fn new(identity: &AgentIdentity) -> Self {
        Self {
            kind: MessageKind::Heartbeat,
            timestamp: Utc::now(),
            cluster_name: identity.cluster_name.clone(),
            organization_name: identity.organization_name.clone(),
        }
    }
}

/// Per-node GPU capacity and readiness snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStatus {
    pub name: String,
    pub gpu_count: u32,
    pub gpus_allocated: u32,
    pub ready: bool,
}

/// Cluster/node inventory report sourced from the Kubernetes API client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInventoryMessage {
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub cluster_name: String,
    pub organization_name: String,
    pub nodes: Vec<NodeStatus>,
}

impl NodeInventoryMessage {
    pub fn new(identity: &AgentIdentity, nodes: Vec<NodeStatus>) -> Self {
        Self {
            kind: MessageKind::NodeInventory,
            timestamp: Utc::now(),
            cluster_name: identity.cluster_name.clone(),
            organization_name: identity.organization_name.clone(),
            nodes,
        }
    }
}

/// Operation applied to a model-catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOp {
    Added,
    Updated,
    Removed,
}

/// One model-catalog change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDelta {
    pub name: String,
    pub revision: String,
    pub op: CatalogOp,
}

/// Batch of model-catalog changes observed since the last report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalogMessage {
    pub kind: MessageKind,
    pub timestamp: DateTime<Utc>,
    pub cluster_name: String,
    pub organization_name: String,
    pub deltas: Vec<ModelDelta>,
}

impl ModelCatalogMessage {
    pub fn new(identity: &AgentIdentity, deltas: Vec<ModelDelta>) -> Self {
        Self {
            kind: MessageKind::ModelCatalog,
            timestamp: Utc::now(),
            cluster_name: identity.cluster_name.clone(),
            organization_name: identity.organization_name.clone(),
            deltas,
        }
    }
}
