//! State merging: reconciling a model-supplied delta with known state.
//!
//! The model is an unreliable input source, not a contract partner. This
//! module is the single place where structural invariants are enforced:
//! whatever subset of nodes the model returned, the merged result always has
//! exactly three nodes and two connections, statuses recomputed from counts,
//! and completion derived rather than believed.

use super::connection::Connection;
use super::node::{Node, NodeRole};
use super::state::WorkflowState;

/// A partial node update extracted from a model reply.
///
/// Model-supplied `status` and required-field lists are deliberately absent:
/// status is always recomputed and the field template is fixed at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDelta {
    /// Which node this delta targets.
    pub role: NodeRole,

    /// Replacement display name, if the model supplied one.
    pub name: Option<String>,

    /// Field names the model declares as provided.
    pub provided_fields: Vec<String>,

    /// Display configuration to merge key-wise over the existing metadata.
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Merges model-supplied deltas into the previous turn's state.
///
/// Per node: provided fields are unioned (never shrunk; names outside the
/// fixed template are dropped), the name is replaced only when the delta
/// carries a non-empty one, and metadata merges key-wise with incoming keys
/// winning. Nodes without a delta are carried forward unchanged. Missing
/// structure is reconstructed from the default templates, and every derived
/// value (node status, connection status, workflow completeness) is
/// recomputed from scratch.
pub fn merge(existing: &WorkflowState, deltas: &[NodeDelta]) -> WorkflowState {
    let mut merged = normalize(existing);

    for delta in deltas {
        let node = merged
            .node_mut(delta.role)
            .expect("normalized state has all three nodes");

        for field in &delta.provided_fields {
            node.provide_field(field);
        }

        if let Some(name) = &delta.name {
            if !name.trim().is_empty() {
                node.name = name.clone();
            }
        }

        for (key, value) in &delta.metadata {
            node.metadata.insert(key.clone(), value.clone());
        }
    }

    merged.refresh_derived();
    merged
}

/// Rebuilds any missing structure so the 3-node / 2-connection invariant
/// holds, preserving data from whatever nodes exist.
fn normalize(state: &WorkflowState) -> WorkflowState {
    let nodes = NodeRole::ordered()
        .iter()
        .map(|role| {
            state
                .node(*role)
                .cloned()
                .unwrap_or_else(|| Node::new(*role))
        })
        .collect();

    // Connection status is derived, so rebuilt connections lose nothing.
    let mut normalized = WorkflowState {
        nodes,
        connections: Connection::pipeline_pair().to_vec(),
        complete: false,
    };
    normalized.refresh_derived();
    normalized
}
