//! Prompt assembly for structure-producing model calls.
//!
//! Each turn's request is built from a fixed instruction preamble, a small
//! window of recent history, the current workflow state serialized verbatim,
//! and a transition-specific guidance line. The builder always requests
//! exactly one field and forbids skipping ahead; the merger re-asserts the
//! ordering constraint regardless of what the model returns.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::domain::workflow::{
    classify_transition, next_field, NextField, TurnTransition, WorkflowState,
};
use crate::ports::{MessageRole, ModelRequest};

use super::turn::{ConversationTurn, TurnRole};

/// Default number of recent turns included in the prompt.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Output token budget for structure-producing calls.
const STRUCTURE_MAX_TOKENS: u32 = 1024;

const PREAMBLE: &str = "\
You are a data-integration assistant guiding a user through configuring a \
pipeline with exactly three stages: a source (id \"source-node\"), a \
transform (id \"transform-node\"), and a destination (id \"destination-node\"), \
connected in that order.

Always answer with a single JSON object, and nothing else, of this shape:
{
  \"message\": \"<your conversational reply to the user>\",
  \"nodes\": [{
    \"id\": \"source-node\",
    \"type\": \"source\",
    \"name\": \"<display name>\",
    \"providedFields\": [\"<fields the user has now supplied>\"],
    \"missingFields\": [\"<fields still needed>\"]
  }],
  \"connections\": [],
  \"workflow_complete\": false
}

Rules:
- List a field in providedFields only when the user has actually supplied \
its value. Never include field values anywhere in the JSON.
- Ask for exactly one configuration field per reply.
- Configure the stages strictly in order; never move to a later stage while \
an earlier one still has missing fields.";

/// Builds model requests from conversation context.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    history_window: usize,
}

impl PromptBuilder {
    /// Creates a builder with the default history window.
    pub fn new() -> Self {
        Self {
            history_window: DEFAULT_HISTORY_WINDOW,
        }
    }

    /// Overrides the history window size.
    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    /// Assembles the request for one turn.
    pub fn build(&self, turns: &[ConversationTurn], state: &WorkflowState) -> ModelRequest {
        let state_json = serde_json::to_string_pretty(state)
            .unwrap_or_else(|_| "{}".to_string());

        let guidance = match next_field(state) {
            Some(next) => self.guidance_for(&next, classify_transition(state, &next)),
            None => "Every stage is fully configured. Confirm completion to the user, set \
                     workflow_complete to true, and do not ask for any further fields."
                .to_string(),
        };

        let system_prompt = format!(
            "{PREAMBLE}\n\nCurrent workflow state:\n{state_json}\n\nGuidance for this turn: {guidance}"
        );

        let mut request = ModelRequest::structure()
            .with_system_prompt(system_prompt)
            .with_max_tokens(STRUCTURE_MAX_TOKENS);

        let window_start = turns.len().saturating_sub(self.history_window);
        for turn in &turns[window_start..] {
            let role = match turn.role {
                TurnRole::User => MessageRole::User,
                TurnRole::Assistant => MessageRole::Assistant,
            };
            request = request.with_message(role, turn.content.clone());
        }

        request
    }

    fn guidance_for(&self, next: &NextField, transition: TurnTransition) -> String {
        let field = &next.field;
        let node_id = next.node_id();
        let example = example_value(field);

        match transition {
            TurnTransition::StartOfWorkflow => format!(
                "This is the first turn. Briefly introduce the three-stage pipeline, then \
                 ask only for the \"{field}\" field of {node_id} (for example: {example}). \
                 Do not request multiple fields."
            ),
            TurnTransition::StartOfNode => format!(
                "The previous stage is complete. Announce that configuration moves to \
                 {node_id}, then ask only for its \"{field}\" field (for example: {example}). \
                 Do not request multiple fields."
            ),
            TurnTransition::CompletingNode => format!(
                "\"{field}\" is the last field {node_id} still needs. Ask only for it \
                 (for example: {example}) and mention this completes the stage."
            ),
            TurnTransition::MidNode => format!(
                "Ask only for the \"{field}\" field of {node_id} (for example: {example}). \
                 Do not request multiple fields."
            ),
        }
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Example values per known field, used only in guidance text.
static FIELD_EXAMPLES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("store_url", "https://my-shop.example.com"),
        ("api_key", "key_0a1b2c3d"),
        ("api_secret", "sec_9f8e7d6c"),
        ("transform_type", "field_mapping"),
        ("field_mappings", "orders.total -> revenue"),
        ("destination_url", "https://warehouse.example.com/ingest"),
        ("auth_token", "tok_5f4e3d2c"),
    ])
});

/// A plausible example value for a field.
fn example_value(field: &str) -> &'static str {
    FIELD_EXAMPLES.get(field).copied().unwrap_or("example-value")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::NodeRole;
    use crate::ports::RequestPurpose;

    fn provide(state: &mut WorkflowState, role: NodeRole, fields: &[&str]) {
        let node = state.node_mut(role).unwrap();
        for field in fields {
            node.provide_field(field);
        }
        state.refresh_derived();
    }

    #[test]
    fn builds_structure_tuned_request() {
        let request = PromptBuilder::new().build(&[], &WorkflowState::new());
        assert_eq!(request.purpose, RequestPurpose::Structure);
        assert_eq!(request.max_tokens, 1024);
    }

    #[test]
    fn system_prompt_contains_serialized_state_and_contract() {
        let request = PromptBuilder::new().build(&[], &WorkflowState::new());
        let system = request.system_prompt.unwrap();
        assert!(system.contains("source-node"));
        assert!(system.contains("\"store_url\""));
        assert!(system.contains("exactly one configuration field"));
        assert!(system.contains("never move to a later stage"));
    }

    #[test]
    fn first_turn_guidance_introduces_the_workflow() {
        let request = PromptBuilder::new().build(&[], &WorkflowState::new());
        let system = request.system_prompt.unwrap();
        assert!(system.contains("first turn"));
        assert!(system.contains("\"store_url\""));
        assert!(system.contains("https://my-shop.example.com"));
    }

    #[test]
    fn new_node_guidance_announces_the_stage() {
        let mut state = WorkflowState::new();
        provide(
            &mut state,
            NodeRole::Source,
            &["store_url", "api_key", "api_secret"],
        );

        let request = PromptBuilder::new().build(&[], &state);
        let system = request.system_prompt.unwrap();
        assert!(system.contains("moves to"));
        assert!(system.contains("transform-node"));
        assert!(system.contains("\"transform_type\""));
    }

    #[test]
    fn last_field_guidance_mentions_stage_completion() {
        let mut state = WorkflowState::new();
        provide(&mut state, NodeRole::Source, &["store_url", "api_key"]);

        let request = PromptBuilder::new().build(&[], &state);
        let system = request.system_prompt.unwrap();
        assert!(system.contains("last field"));
        assert!(system.contains("\"api_secret\""));
    }

    #[test]
    fn complete_workflow_guidance_asks_for_no_fields() {
        let mut state = WorkflowState::new();
        for role in NodeRole::ordered() {
            let fields = state.node(role).unwrap().required_fields.clone();
            let node = state.node_mut(role).unwrap();
            for field in &fields {
                node.provide_field(field);
            }
        }
        state.refresh_derived();

        let request = PromptBuilder::new().build(&[], &state);
        let system = request.system_prompt.unwrap();
        assert!(system.contains("fully configured"));
        assert!(system.contains("workflow_complete to true"));
    }

    #[test]
    fn history_is_windowed_to_the_most_recent_turns() {
        let turns: Vec<ConversationTurn> = (0..8)
            .map(|i| ConversationTurn::user(format!("turn {i}")))
            .collect();

        let request = PromptBuilder::new().build(&turns, &WorkflowState::new());
        assert_eq!(request.messages.len(), DEFAULT_HISTORY_WINDOW);
        assert_eq!(request.messages[0].content, "turn 3");
        assert_eq!(request.messages.last().unwrap().content, "turn 7");
    }

    #[test]
    fn turn_roles_map_to_model_roles() {
        let turns = vec![
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello", WorkflowState::new()),
        ];
        let request = PromptBuilder::new().build(&turns, &WorkflowState::new());
        assert_eq!(request.messages[0].role, MessageRole::User);
        assert_eq!(request.messages[1].role, MessageRole::Assistant);
    }
}
