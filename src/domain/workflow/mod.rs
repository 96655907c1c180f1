//! Workflow domain: the fixed three-stage pipeline structure.
//!
//! The structural model lives here: nodes, connections, the canonical
//! `WorkflowState`, field progression, and the merge step that keeps every
//! snapshot valid no matter what the model produced.

mod connection;
mod merge;
mod node;
mod progression;
mod state;

pub use connection::{Connection, ConnectionStatus};
pub use merge::{merge, NodeDelta};
pub use node::{Node, NodeRole, NodeStatus};
pub use progression::{classify_transition, next_field, NextField, TurnTransition};
pub use state::WorkflowState;
