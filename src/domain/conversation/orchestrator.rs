//! Conversation Orchestrator - drives one turn end to end.
//!
//! Per turn: load (or lazily create) the workflow state from history, build
//! the prompt, call the model, decode the reply, and merge. A reply that
//! cannot be decoded triggers a self-correction round: the invalid text is
//! appended to history as an explicit correction request and the whole turn
//! re-runs, at most [`MAX_CORRECTION_ATTEMPTS`] times. Every code path
//! yields a well-formed outbound message; nothing escapes this boundary as
//! an error.

use std::sync::Arc;

use crate::domain::foundation::ConversationId;
use crate::domain::workflow::{merge, WorkflowState};
use crate::ports::{ConversationStore, ModelError, ModelProvider, TurnObserver};

use super::extractor::{ExtractionError, ReplyExtractor};
use super::outbound::OutboundMessage;
use super::prompt::PromptBuilder;
use super::turn::{latest_snapshot, ConversationTurn};

/// Hard bound on self-correction rounds per turn. An invariant, not a
/// tunable: after the third failed correction the turn terminates with an
/// error message.
pub const MAX_CORRECTION_ATTEMPTS: usize = 3;

/// Drives conversations turn by turn.
pub struct ConversationOrchestrator {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn ConversationStore>,
    observer: Arc<dyn TurnObserver>,
    prompt_builder: PromptBuilder,
    extractor: ReplyExtractor,
}

impl ConversationOrchestrator {
    /// Creates an orchestrator over the given provider and store.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn ConversationStore>,
        observer: Arc<dyn TurnObserver>,
    ) -> Self {
        Self {
            provider,
            store,
            observer,
            prompt_builder: PromptBuilder::new(),
            extractor: ReplyExtractor::new(),
        }
    }

    /// Overrides the prompt builder (e.g., a different history window).
    pub fn with_prompt_builder(mut self, builder: PromptBuilder) -> Self {
        self.prompt_builder = builder;
        self
    }

    /// Confirms the backing model service is reachable. Intended for
    /// process start only, never per turn.
    pub async fn validate(&self) -> Result<(), ModelError> {
        self.provider.validate().await
    }

    /// Processes one user turn and returns the resulting message.
    ///
    /// Turns for a given conversation must be submitted sequentially; each
    /// turn's prompt depends on the previous turn's merged state.
    pub async fn handle_turn(
        &self,
        conversation_id: ConversationId,
        user_text: &str,
    ) -> OutboundMessage {
        let mut turns = match self.store.load(conversation_id).await {
            Ok(existing) => existing.unwrap_or_default(),
            Err(err) => {
                tracing::error!("failed to load conversation {}: {}", conversation_id, err);
                return OutboundMessage::error(
                    "I couldn't load this conversation. Please try sending that again.",
                    None,
                );
            }
        };

        let user_turn = ConversationTurn::user(user_text);
        let user_turn_id = user_turn.id;
        turns.push(user_turn);

        // Lazily created on the first turn; otherwise the latest assistant
        // snapshot is canonical.
        let state = latest_snapshot(&turns)
            .cloned()
            .unwrap_or_else(WorkflowState::new);

        self.thought(conversation_id, "Reviewing your pipeline so far");

        let mut corrections = 0usize;
        loop {
            let request = self.prompt_builder.build(&turns, &state);
            self.thought(conversation_id, "Asking the assistant");

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::warn!(
                        "model call failed for conversation {}: {}",
                        conversation_id,
                        err
                    );
                    self.persist(conversation_id, &turns).await;
                    return OutboundMessage::error(
                        Self::model_failure_text(&err),
                        Some(user_turn_id),
                    );
                }
            };

            self.thought(conversation_id, "Reading the reply");

            match self.extractor.decode(&response.content) {
                Ok(reply) => {
                    self.thought(conversation_id, "Updating the workflow");

                    let merged = merge(&state, &reply.node_deltas());
                    turns.push(ConversationTurn::assistant(
                        reply.message.clone(),
                        merged.clone(),
                    ));
                    self.persist(conversation_id, &turns).await;

                    // The merged state's own completeness wins over any
                    // workflow_complete claim in the reply.
                    return OutboundMessage::assistant(
                        reply.message,
                        &merged,
                        Some(user_turn_id),
                    );
                }
                Err(parse_error) => {
                    if corrections >= MAX_CORRECTION_ATTEMPTS {
                        tracing::warn!(
                            "giving up after {} correction attempts for conversation {}",
                            corrections,
                            conversation_id
                        );
                        self.persist(conversation_id, &turns).await;
                        return OutboundMessage::error(
                            "I couldn't make sense of the assistant's reply after several \
                             tries. Please send your message again.",
                            Some(user_turn_id),
                        );
                    }

                    corrections += 1;
                    tracing::debug!(
                        "reply failed to parse (attempt {} of {}): {}",
                        corrections,
                        MAX_CORRECTION_ATTEMPTS,
                        parse_error
                    );
                    turns.push(Self::correction_turn(&response.content, &parse_error));
                    self.thought(conversation_id, "Asking the assistant to correct its reply");
                }
            }
        }
    }

    /// Builds the user-role turn that feeds an invalid reply back to the
    /// model with an explicit correction request.
    fn correction_turn(invalid_text: &str, error: &ExtractionError) -> ConversationTurn {
        ConversationTurn::user(format!(
            "Your previous reply could not be parsed ({error}). This is what you sent:\n\n\
             {invalid_text}\n\n\
             Please answer again with a single valid JSON object matching the required \
             shape, and nothing else."
        ))
    }

    fn model_failure_text(error: &ModelError) -> &'static str {
        match error {
            ModelError::NotConfigured | ModelError::AuthenticationFailed => {
                "The assistant isn't configured with a usable model credential. Please \
                 check the service configuration and try again."
            }
            _ => {
                "I couldn't reach the language model just now. Please try sending that \
                 again in a moment."
            }
        }
    }

    fn thought(&self, conversation_id: ConversationId, text: &str) {
        self.observer.on_thought(conversation_id, text);
    }

    async fn persist(&self, conversation_id: ConversationId, turns: &[ConversationTurn]) {
        if let Err(err) = self.store.save(conversation_id, turns).await {
            tracing::warn!(
                "failed to save conversation {}: {}",
                conversation_id,
                err
            );
        }
    }
}
