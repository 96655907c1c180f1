//! Conversation Store Port - Interface for the keyed turn log.
//!
//! The engine treats persistence as a simple load/save-by-key store of
//! ordered turn lists. Get/set must be atomic per conversation id;
//! cross-key concurrency is unrestricted. No transactional guarantees are
//! required beyond read-your-writes within one process.

use async_trait::async_trait;

use crate::domain::conversation::ConversationTurn;
use crate::domain::foundation::ConversationId;

/// Errors that can occur during conversation store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize turn log: {0}")]
    Serialization(String),

    #[error("failed to deserialize turn log: {0}")]
    Deserialization(String),

    #[error("io error: {0}")]
    Io(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Port for persisting and loading conversation turn logs.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Loads the ordered turn list for a conversation, or `None` if the
    /// conversation has no recorded turns.
    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Vec<ConversationTurn>>, StoreError>;

    /// Replaces the stored turn list for a conversation.
    async fn save(
        &self,
        conversation_id: ConversationId,
        turns: &[ConversationTurn],
    ) -> Result<(), StoreError>;
}
