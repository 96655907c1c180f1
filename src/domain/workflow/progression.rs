//! Field progression: which configuration value to ask for next.
//!
//! Scans nodes strictly in role order and returns the first missing field
//! of the first incomplete node. The transition classification only selects
//! conversational tone in the prompt builder; it has no effect on state
//! machine correctness.

use super::node::NodeRole;
use super::state::WorkflowState;

/// The single field the conversation should request next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextField {
    /// The node the field belongs to.
    pub role: NodeRole,
    /// The field name to request.
    pub field: String,
}

impl NextField {
    /// The owning node's fixed id.
    pub fn node_id(&self) -> &'static str {
        self.role.node_id()
    }
}

/// Where in the conversation arc this turn falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnTransition {
    /// No node has any provided field: the very first turn.
    StartOfWorkflow,
    /// The target node has no provided fields, but the workflow has begun.
    StartOfNode,
    /// The requested field is the last one missing for its node.
    CompletingNode,
    /// Anywhere else inside a node.
    MidNode,
}

/// Returns the first missing field of the first incomplete node, scanning
/// in strict role order. `None` means the workflow is complete.
pub fn next_field(state: &WorkflowState) -> Option<NextField> {
    for role in NodeRole::ordered() {
        if let Some(node) = state.node(role) {
            if let Some(field) = node.missing_fields().into_iter().next() {
                return Some(NextField { role, field });
            }
        }
    }
    None
}

/// Classifies the turn for prompt-tone selection.
pub fn classify_transition(state: &WorkflowState, next: &NextField) -> TurnTransition {
    if state.is_untouched() {
        return TurnTransition::StartOfWorkflow;
    }

    let node = match state.node(next.role) {
        Some(node) => node,
        None => return TurnTransition::MidNode,
    };

    if node.provided_fields.is_empty() {
        return TurnTransition::StartOfNode;
    }

    if node.missing_fields().len() == 1 {
        return TurnTransition::CompletingNode;
    }

    TurnTransition::MidNode
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provide(state: &mut WorkflowState, role: NodeRole, fields: &[&str]) {
        let node = state.node_mut(role).unwrap();
        for field in fields {
            node.provide_field(field);
        }
        state.refresh_derived();
    }

    fn complete_node(state: &mut WorkflowState, role: NodeRole) {
        let fields = state.node(role).unwrap().required_fields.clone();
        let node = state.node_mut(role).unwrap();
        for field in &fields {
            node.provide_field(field);
        }
        state.refresh_derived();
    }

    #[test]
    fn fresh_state_asks_for_first_source_field() {
        let state = WorkflowState::new();
        let next = next_field(&state).unwrap();
        assert_eq!(next.role, NodeRole::Source);
        assert_eq!(next.field, "store_url");
        assert_eq!(next.node_id(), "source-node");
    }

    #[test]
    fn progression_follows_template_order_within_node() {
        let mut state = WorkflowState::new();
        provide(&mut state, NodeRole::Source, &["store_url"]);

        let next = next_field(&state).unwrap();
        assert_eq!(next.field, "api_key");
    }

    #[test]
    fn transform_is_never_requested_while_source_incomplete() {
        let mut state = WorkflowState::new();
        provide(&mut state, NodeRole::Source, &["store_url", "api_key"]);
        // Even with transform fully empty, the source's last field comes first.
        let next = next_field(&state).unwrap();
        assert_eq!(next.role, NodeRole::Source);
        assert_eq!(next.field, "api_secret");
    }

    #[test]
    fn destination_waits_for_transform() {
        let mut state = WorkflowState::new();
        complete_node(&mut state, NodeRole::Source);

        let next = next_field(&state).unwrap();
        assert_eq!(next.role, NodeRole::Transform);
        assert_eq!(next.field, "transform_type");
    }

    #[test]
    fn complete_workflow_has_no_next_field() {
        let mut state = WorkflowState::new();
        for role in NodeRole::ordered() {
            complete_node(&mut state, role);
        }
        assert!(next_field(&state).is_none());
    }

    mod classification {
        use super::*;

        #[test]
        fn untouched_workflow_is_start_of_workflow() {
            let state = WorkflowState::new();
            let next = next_field(&state).unwrap();
            assert_eq!(
                classify_transition(&state, &next),
                TurnTransition::StartOfWorkflow
            );
        }

        #[test]
        fn first_field_of_later_node_is_start_of_node() {
            let mut state = WorkflowState::new();
            complete_node(&mut state, NodeRole::Source);

            let next = next_field(&state).unwrap();
            assert_eq!(next.role, NodeRole::Transform);
            assert_eq!(
                classify_transition(&state, &next),
                TurnTransition::StartOfNode
            );
        }

        #[test]
        fn last_missing_field_is_completing_node() {
            let mut state = WorkflowState::new();
            provide(&mut state, NodeRole::Source, &["store_url", "api_key"]);

            let next = next_field(&state).unwrap();
            assert_eq!(next.field, "api_secret");
            assert_eq!(
                classify_transition(&state, &next),
                TurnTransition::CompletingNode
            );
        }

        #[test]
        fn middle_of_node_is_mid_node() {
            let mut state = WorkflowState::new();
            provide(&mut state, NodeRole::Source, &["store_url"]);

            let next = next_field(&state).unwrap();
            assert_eq!(next.field, "api_key");
            assert_eq!(classify_transition(&state, &next), TurnTransition::MidNode);
        }
    }
}
