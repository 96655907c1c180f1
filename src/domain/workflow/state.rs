//! The canonical workflow state snapshot.
//!
//! Exactly three nodes in role order plus exactly two connections. The node
//! and connection sets are never resized; only statuses, provided fields,
//! names, and display metadata mutate. Created lazily on a conversation's
//! first turn and carried forward (or replaced by a merged successor) on
//! every assistant turn.

use serde::{Deserialize, Serialize};

use super::connection::Connection;
use super::node::{Node, NodeRole};

/// The full 3-node / 2-connection pipeline structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowState {
    /// The three stage nodes, always in role order.
    pub nodes: Vec<Node>,

    /// The two stage connections, always in pipeline order.
    pub connections: Vec<Connection>,

    /// True iff every node is complete. Always recomputed, never trusted
    /// from external input.
    pub complete: bool,
}

impl WorkflowState {
    /// Creates the initial state: default field templates, nothing provided.
    pub fn new() -> Self {
        let mut state = Self {
            nodes: NodeRole::ordered().iter().map(|r| Node::new(*r)).collect(),
            connections: Connection::pipeline_pair().to_vec(),
            complete: false,
        };
        state.refresh_derived();
        state
    }

    /// Returns the node for a role.
    ///
    /// The structural invariant guarantees presence; `None` can only occur
    /// on a snapshot that bypassed the merger, which callers normalize first.
    pub fn node(&self, role: NodeRole) -> Option<&Node> {
        self.nodes.iter().find(|n| n.role == role)
    }

    /// Mutable access to the node for a role.
    pub fn node_mut(&mut self, role: NodeRole) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.role == role)
    }

    /// Recomputes every derived value: node statuses, connection statuses,
    /// and overall completeness.
    pub fn refresh_derived(&mut self) {
        for node in &mut self.nodes {
            node.refresh_status();
        }
        let nodes = self.nodes.clone();
        for connection in &mut self.connections {
            connection.refresh_status(&nodes);
        }
        self.complete = self.nodes.iter().all(|n| n.is_complete());
    }

    /// True when no node has any provided field yet (turn one only).
    pub fn is_untouched(&self) -> bool {
        self.nodes.iter().all(|n| n.provided_fields.is_empty())
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::connection::ConnectionStatus;
    use crate::domain::workflow::node::NodeStatus;

    #[test]
    fn new_state_has_three_nodes_and_two_connections() {
        let state = WorkflowState::new();
        assert_eq!(state.nodes.len(), 3);
        assert_eq!(state.connections.len(), 2);
        assert!(!state.complete);
        assert!(state.is_untouched());
    }

    #[test]
    fn nodes_are_in_role_order() {
        let state = WorkflowState::new();
        let ids: Vec<&str> = state.nodes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["source-node", "transform-node", "destination-node"]);
    }

    #[test]
    fn completing_all_nodes_completes_workflow_and_connections() {
        let mut state = WorkflowState::new();
        for node in &mut state.nodes {
            for field in node.required_fields.clone() {
                node.provide_field(&field);
            }
        }
        state.refresh_derived();

        assert!(state.complete);
        assert!(state
            .nodes
            .iter()
            .all(|n| n.status == NodeStatus::Complete));
        assert!(state
            .connections
            .iter()
            .all(|c| c.status == ConnectionStatus::Complete));
    }

    #[test]
    fn partial_progress_is_not_complete() {
        let mut state = WorkflowState::new();
        state
            .node_mut(NodeRole::Source)
            .unwrap()
            .provide_field("store_url");
        state.refresh_derived();

        assert!(!state.complete);
        assert!(!state.is_untouched());
        assert_eq!(
            state.node(NodeRole::Source).unwrap().status,
            NodeStatus::Partial
        );
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut state = WorkflowState::new();
        state
            .node_mut(NodeRole::Source)
            .unwrap()
            .provide_field("store_url");
        state.refresh_derived();

        let json = serde_json::to_string(&state).unwrap();
        let back: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
