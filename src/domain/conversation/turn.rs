//! Turn entity for conversations.
//!
//! Turns are immutable records of user/assistant exchanges. Assistant turns
//! may carry a workflow state snapshot; the latest such snapshot is the
//! canonical state for the next turn.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, TurnId};
use crate::domain::workflow::WorkflowState;

/// Role of a turn within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User input (including synthesized correction requests).
    User,
    /// Engine/model response.
    Assistant,
}

/// An immutable turn within a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Unique identifier, used for threading and repair feedback.
    pub id: TurnId,

    /// Who produced this turn.
    pub role: TurnRole,

    /// The turn's text content.
    pub content: String,

    /// Workflow state snapshot; only assistant turns carry one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<WorkflowState>,

    /// When the turn was recorded.
    pub created_at: Timestamp,
}

impl ConversationTurn {
    /// Creates a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            role: TurnRole::User,
            content: content.into(),
            snapshot: None,
            created_at: Timestamp::now(),
        }
    }

    /// Creates an assistant turn carrying a state snapshot.
    pub fn assistant(content: impl Into<String>, snapshot: WorkflowState) -> Self {
        Self {
            id: TurnId::new(),
            role: TurnRole::Assistant,
            content: content.into(),
            snapshot: Some(snapshot),
            created_at: Timestamp::now(),
        }
    }
}

/// Returns the most recent assistant snapshot in a turn log, if any.
pub fn latest_snapshot(turns: &[ConversationTurn]) -> Option<&WorkflowState> {
    turns
        .iter()
        .rev()
        .find_map(|turn| turn.snapshot.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turns_carry_no_snapshot() {
        let turn = ConversationTurn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert!(turn.snapshot.is_none());
    }

    #[test]
    fn assistant_turns_carry_a_snapshot() {
        let turn = ConversationTurn::assistant("hi", WorkflowState::new());
        assert_eq!(turn.role, TurnRole::Assistant);
        assert!(turn.snapshot.is_some());
    }

    #[test]
    fn latest_snapshot_finds_most_recent_assistant_state() {
        let mut first_state = WorkflowState::new();
        first_state
            .node_mut(crate::domain::workflow::NodeRole::Source)
            .unwrap()
            .provide_field("store_url");
        first_state.refresh_derived();

        let turns = vec![
            ConversationTurn::user("start"),
            ConversationTurn::assistant("ok", WorkflowState::new()),
            ConversationTurn::user("here's the url"),
            ConversationTurn::assistant("got it", first_state.clone()),
        ];

        assert_eq!(latest_snapshot(&turns), Some(&first_state));
    }

    #[test]
    fn latest_snapshot_is_none_for_empty_log() {
        assert!(latest_snapshot(&[]).is_none());
        assert!(latest_snapshot(&[ConversationTurn::user("hi")]).is_none());
    }

    #[test]
    fn turn_round_trips_through_json() {
        let turn = ConversationTurn::assistant("hi", WorkflowState::new());
        let json = serde_json::to_string(&turn).unwrap();
        let back: ConversationTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, back);
    }
}
