//! Outbound message schema consumed by UI/transport.
//!
//! Everything the engine produces crosses this boundary as a single message
//! shape, serialized in camelCase. Node views carry field names and
//! presence only; field values never leave the engine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::TurnId;
use crate::domain::workflow::{Connection, ConnectionStatus, Node, NodeStatus, WorkflowState};

use super::turn::TurnRole;

/// What kind of outbound entry this is. `thought` entries are advisory
/// progress notifications and must never be treated as authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Thought,
    Error,
    Status,
}

/// Node shape as it crosses the boundary: names and presence only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub name: String,
    pub status: NodeStatus,
    pub required_fields: Vec<String>,
    pub provided_fields: Vec<String>,
    pub missing_fields: Vec<String>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id().to_string(),
            node_type: node.role.to_string(),
            name: node.name.clone(),
            status: node.status,
            required_fields: node.required_fields.clone(),
            provided_fields: node.provided_fields.clone(),
            missing_fields: node.missing_fields(),
        }
    }
}

/// Connection shape as it crosses the boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub id: String,
    pub source: String,
    pub target: String,
    pub status: ConnectionStatus,
}

impl From<&Connection> for ConnectionView {
    fn from(connection: &Connection) -> Self {
        Self {
            id: connection.id.clone(),
            source: connection.source.node_id().to_string(),
            target: connection.target.node_id().to_string(),
            status: connection.status,
        }
    }
}

/// A message emitted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Unique message id.
    pub id: TurnId,

    /// The turn this message responds to, for threading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_to: Option<TurnId>,

    /// Sender role; always assistant for engine output.
    pub role: TurnRole,

    /// Message kind.
    #[serde(rename = "type")]
    pub kind: MessageKind,

    /// The text shown to the user.
    pub content: String,

    /// Current node views, present on successful turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<Vec<NodeView>>,

    /// Current connection views, present on successful turns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<ConnectionView>>,

    /// Whether the workflow is fully configured; always the engine's own
    /// derivation, never the model's claim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_complete: Option<bool>,
}

impl OutboundMessage {
    /// A successful assistant turn carrying the merged state.
    pub fn assistant(
        content: impl Into<String>,
        state: &WorkflowState,
        response_to: Option<TurnId>,
    ) -> Self {
        Self {
            id: TurnId::new(),
            response_to,
            role: TurnRole::Assistant,
            kind: MessageKind::Message,
            content: content.into(),
            nodes: Some(state.nodes.iter().map(NodeView::from).collect()),
            connections: Some(state.connections.iter().map(ConnectionView::from).collect()),
            workflow_complete: Some(state.complete),
        }
    }

    /// An advisory progress notification.
    pub fn thought(content: impl Into<String>, response_to: Option<TurnId>) -> Self {
        Self {
            id: TurnId::new(),
            response_to,
            role: TurnRole::Assistant,
            kind: MessageKind::Thought,
            content: content.into(),
            nodes: None,
            connections: None,
            workflow_complete: None,
        }
    }

    /// A terminal error presented as a plain assistant-style message.
    pub fn error(content: impl Into<String>, response_to: Option<TurnId>) -> Self {
        Self {
            id: TurnId::new(),
            response_to,
            role: TurnRole::Assistant,
            kind: MessageKind::Error,
            content: content.into(),
            nodes: None,
            connections: None,
            workflow_complete: None,
        }
    }

    /// A status notification (e.g., startup validation results).
    pub fn status(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            response_to: None,
            role: TurnRole::Assistant,
            kind: MessageKind::Status,
            content: content.into(),
            nodes: None,
            connections: None,
            workflow_complete: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_message_carries_views_and_completion() {
        let state = WorkflowState::new();
        let msg = OutboundMessage::assistant("hi", &state, None);

        assert_eq!(msg.kind, MessageKind::Message);
        assert_eq!(msg.nodes.as_ref().unwrap().len(), 3);
        assert_eq!(msg.connections.as_ref().unwrap().len(), 2);
        assert_eq!(msg.workflow_complete, Some(false));
    }

    #[test]
    fn node_view_never_contains_field_values() {
        let state = WorkflowState::new();
        let msg = OutboundMessage::assistant("hi", &state, None);
        let json = serde_json::to_value(&msg).unwrap();

        let node = &json["nodes"][0];
        assert_eq!(node["id"], "source-node");
        assert_eq!(node["type"], "source");
        assert!(node["requiredFields"].is_array());
        assert!(node["providedFields"].is_array());
        assert!(node["missingFields"].is_array());
        // The shape has no slot for values at all.
        assert!(node.get("values").is_none());
        assert!(node.get("fieldValues").is_none());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let state = WorkflowState::new();
        let msg = OutboundMessage::assistant("hi", &state, Some(TurnId::new()));
        let json = serde_json::to_value(&msg).unwrap();

        assert!(json.get("responseTo").is_some());
        assert!(json.get("workflowComplete").is_some());
        assert_eq!(json["type"], "message");
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn error_and_thought_messages_have_no_state() {
        let err = OutboundMessage::error("something went wrong", None);
        assert_eq!(err.kind, MessageKind::Error);
        assert!(err.nodes.is_none());
        assert!(err.workflow_complete.is_none());

        let thought = OutboundMessage::thought("working on it", None);
        assert_eq!(thought.kind, MessageKind::Thought);
        assert!(thought.nodes.is_none());

        let status = OutboundMessage::status("model credential verified");
        assert_eq!(status.kind, MessageKind::Status);
        assert!(status.response_to.is_none());
    }

    #[test]
    fn connection_views_reference_node_ids() {
        let state = WorkflowState::new();
        let msg = OutboundMessage::assistant("hi", &state, None);
        let connections = msg.connections.unwrap();
        assert_eq!(connections[0].source, "source-node");
        assert_eq!(connections[0].target, "transform-node");
        assert_eq!(connections[1].source, "transform-node");
        assert_eq!(connections[1].target, "destination-node");
    }
}
