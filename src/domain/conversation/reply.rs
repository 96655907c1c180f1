//! Inbound payload shapes for structured model replies.
//!
//! These are the serde targets the extractor parses candidate JSON into.
//! Everything beyond the `message` string is optional and advisory: the
//! merge step decides what survives. Keys are accepted in both camelCase
//! and snake_case since the model is inconsistent about casing.

use serde::Deserialize;

use crate::domain::workflow::{NodeDelta, NodeRole};

/// A parsed structured reply from the model.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelReply {
    /// The conversational text shown to the user. Required.
    pub message: String,

    /// Node updates, if the model supplied any.
    #[serde(default)]
    pub nodes: Option<Vec<NodePayload>>,

    /// Connection list; shape-validated but otherwise ignored, since
    /// connection status is always recomputed.
    #[serde(default)]
    pub connections: Option<Vec<ConnectionPayload>>,

    /// The model's own completion claim. Informational only; overridden by
    /// the merged state's recomputed completeness.
    #[serde(default, alias = "workflowComplete")]
    pub workflow_complete: Option<bool>,
}

impl ModelReply {
    /// Converts the reply's node list into merge deltas, dropping entries
    /// whose node id/type resolves to no known role.
    pub fn node_deltas(&self) -> Vec<NodeDelta> {
        self.nodes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(NodePayload::to_delta)
            .collect()
    }
}

/// A node entry as the model produces it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodePayload {
    /// Node id, e.g. "source-node".
    #[serde(default)]
    pub id: Option<String>,

    /// Node type keyword, e.g. "source".
    #[serde(default, rename = "type")]
    pub node_type: Option<String>,

    /// Display name.
    #[serde(default)]
    pub name: Option<String>,

    /// Model-claimed status. Parsed for shape tolerance, never trusted.
    #[serde(default)]
    pub status: Option<String>,

    /// Model-claimed required fields. Parsed for shape tolerance; the
    /// template fixed at node creation stays authoritative.
    #[serde(default, alias = "requiredFields")]
    pub required_fields: Option<Vec<String>>,

    /// Field names the model declares as provided.
    #[serde(default, alias = "providedFields")]
    pub provided_fields: Option<Vec<String>>,

    /// Model-claimed missing fields. Parsed for shape tolerance; always
    /// recomputed.
    #[serde(default, alias = "missingFields")]
    pub missing_fields: Option<Vec<String>>,

    /// Display configuration for the renderer.
    #[serde(default)]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}

impl NodePayload {
    /// Resolves which role this payload targets, from id first, then type.
    pub fn role(&self) -> Option<NodeRole> {
        self.id
            .as_deref()
            .and_then(NodeRole::parse)
            .or_else(|| self.node_type.as_deref().and_then(NodeRole::parse))
    }

    /// Converts to a merge delta, or `None` when no role resolves.
    pub fn to_delta(&self) -> Option<NodeDelta> {
        Some(NodeDelta {
            role: self.role()?,
            name: self.name.clone(),
            provided_fields: self.provided_fields.clone().unwrap_or_default(),
            metadata: self.config.clone().unwrap_or_default(),
        })
    }
}

/// A connection entry as the model produces it. Shape only; content ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionPayload {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}
