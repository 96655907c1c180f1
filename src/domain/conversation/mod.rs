//! Conversation domain: turns, structured replies, and the per-turn engine.
//!
//! The conversational side of the system: turn entities, the untrusted
//! reply decoder, prompt assembly, the outbound wire schema, and the
//! orchestrator that drives a turn from user text to a merged state and a
//! well-formed message.

mod extractor;
mod orchestrator;
mod outbound;
mod prompt;
mod reply;
mod turn;

pub use extractor::{ExtractionError, ReplyExtractor, MAX_RESPONSE_LENGTH};
pub use orchestrator::{ConversationOrchestrator, MAX_CORRECTION_ATTEMPTS};
pub use outbound::{ConnectionView, MessageKind, NodeView, OutboundMessage};
pub use prompt::{PromptBuilder, DEFAULT_HISTORY_WINDOW};
pub use reply::{ConnectionPayload, ModelReply, NodePayload};
pub use turn::{latest_snapshot, ConversationTurn, TurnRole};
