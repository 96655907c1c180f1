//! Pipeline node entity and its fixed role vocabulary.
//!
//! A workflow always contains exactly one node per role, created from the
//! role's default field template. Only status, provided fields, the display
//! name, and display metadata ever change after creation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three fixed pipeline stages, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Source,
    Transform,
    Destination,
}

impl NodeRole {
    /// All roles in strict pipeline order.
    pub fn ordered() -> [NodeRole; 3] {
        [NodeRole::Source, NodeRole::Transform, NodeRole::Destination]
    }

    /// The fixed node id for this role.
    pub fn node_id(&self) -> &'static str {
        match self {
            NodeRole::Source => "source-node",
            NodeRole::Transform => "transform-node",
            NodeRole::Destination => "destination-node",
        }
    }

    /// Default display name for a freshly created node.
    pub fn default_name(&self) -> &'static str {
        match self {
            NodeRole::Source => "Data Source",
            NodeRole::Transform => "Transform",
            NodeRole::Destination => "Destination",
        }
    }

    /// The configuration fields this role requires, in asking order.
    pub fn default_fields(&self) -> &'static [&'static str] {
        match self {
            NodeRole::Source => &["store_url", "api_key", "api_secret"],
            NodeRole::Transform => &["transform_type", "field_mappings"],
            NodeRole::Destination => &["destination_url", "auth_token"],
        }
    }

    /// Resolves a role from a node id or role keyword.
    pub fn parse(s: &str) -> Option<NodeRole> {
        match s {
            "source-node" | "source" => Some(NodeRole::Source),
            "transform-node" | "transform" => Some(NodeRole::Transform),
            "destination-node" | "destination" => Some(NodeRole::Destination),
            _ => None,
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeRole::Source => "source",
            NodeRole::Transform => "transform",
            NodeRole::Destination => "destination",
        };
        write!(f, "{}", s)
    }
}

/// Configuration progress of a single node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Partial,
    Complete,
    Error,
}

/// One stage of the pipeline and its configuration progress.
///
/// # Invariants
///
/// - `required_fields` is fixed at creation and never changes afterwards
/// - `provided_fields` only ever grows, and only with names from the template
/// - `status` is always derivable from the provided/required counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Which pipeline stage this node is.
    pub role: NodeRole,

    /// User-facing label, updatable by the model.
    pub name: String,

    /// Derived configuration progress.
    pub status: NodeStatus,

    /// Field names this node needs, in asking order.
    pub required_fields: Vec<String>,

    /// Field names the user has supplied a value for. Names only; values
    /// never enter the workflow state.
    pub provided_fields: Vec<String>,

    /// Display configuration carried for the renderer, merged key-wise.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Node {
    /// Creates a fresh node for a role from its default field template.
    pub fn new(role: NodeRole) -> Self {
        Self {
            role,
            name: role.default_name().to_string(),
            status: NodeStatus::Pending,
            required_fields: role
                .default_fields()
                .iter()
                .map(|f| f.to_string())
                .collect(),
            provided_fields: Vec::new(),
            metadata: serde_json::Map::new(),
        }
    }

    /// The node's fixed id.
    pub fn id(&self) -> &'static str {
        self.role.node_id()
    }

    /// Required fields not yet provided, in template order.
    pub fn missing_fields(&self) -> Vec<String> {
        self.required_fields
            .iter()
            .filter(|f| !self.provided_fields.iter().any(|p| p == *f))
            .cloned()
            .collect()
    }

    /// Marks a field as provided. Unknown names (not in the template) are
    /// ignored; duplicates are ignored.
    pub fn provide_field(&mut self, field: &str) {
        if self.required_fields.iter().any(|f| f == field)
            && !self.provided_fields.iter().any(|f| f == field)
        {
            self.provided_fields.push(field.to_string());
        }
    }

    /// Recomputes `status` from the provided/required counts.
    pub fn refresh_status(&mut self) {
        self.status = self.derived_status();
    }

    /// The status the counts imply, regardless of the stored value.
    pub fn derived_status(&self) -> NodeStatus {
        if self.missing_fields().is_empty() {
            NodeStatus::Complete
        } else if self.provided_fields.is_empty() {
            NodeStatus::Pending
        } else {
            NodeStatus::Partial
        }
    }

    /// True when every required field has been provided.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}
