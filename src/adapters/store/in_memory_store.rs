//! In-Memory Conversation Store Adapter
//!
//! Stores turn logs in a process-local map. Useful for testing and
//! development. Get/set is atomic per conversation id via the map-wide
//! lock; distinct conversations contend only on that lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::ConversationTurn;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// In-memory storage for conversation turn logs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Vec<ConversationTurn>>>>,
}

impl InMemoryConversationStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all stored conversations (useful for tests).
    pub async fn clear(&self) {
        self.conversations.write().await.clear();
    }

    /// Number of stored conversations.
    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Vec<ConversationTurn>>, StoreError> {
        let conversations = self.conversations.read().await;
        Ok(conversations.get(&conversation_id).cloned())
    }

    async fn save(
        &self,
        conversation_id: ConversationId,
        turns: &[ConversationTurn],
    ) -> Result<(), StoreError> {
        let mut conversations = self.conversations.write().await;
        conversations.insert(conversation_id, turns.to_vec());
        Ok(())
    }
}
