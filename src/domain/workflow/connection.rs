//! Connections between the fixed pipeline stages.
//!
//! There are always exactly two: source→transform and transform→destination.
//! Connection status is derived from the source endpoint's completeness and
//! is never taken from model output.

use serde::{Deserialize, Serialize};

use super::node::{Node, NodeRole};

/// Whether the upstream endpoint of a connection is fully configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Pending,
    Complete,
}

/// A directed edge between two adjacent pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// Fixed connection id.
    pub id: String,

    /// Upstream endpoint.
    pub source: NodeRole,

    /// Downstream endpoint.
    pub target: NodeRole,

    /// Derived from the source endpoint's completeness.
    pub status: ConnectionStatus,
}

impl Connection {
    fn new(id: &str, source: NodeRole, target: NodeRole) -> Self {
        Self {
            id: id.to_string(),
            source,
            target,
            status: ConnectionStatus::Pending,
        }
    }

    /// The two fixed pipeline connections, in pipeline order.
    pub fn pipeline_pair() -> [Connection; 2] {
        [
            Connection::new("connection-1", NodeRole::Source, NodeRole::Transform),
            Connection::new("connection-2", NodeRole::Transform, NodeRole::Destination),
        ]
    }

    /// Recomputes status from the current node set.
    pub fn refresh_status(&mut self, nodes: &[Node]) {
        let source_complete = nodes
            .iter()
            .find(|n| n.role == self.source)
            .map(|n| n.is_complete())
            .unwrap_or(false);

        self.status = if source_complete {
            ConnectionStatus::Complete
        } else {
            ConnectionStatus::Pending
        };
    }
}
