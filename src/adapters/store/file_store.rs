//! File-Backed Conversation Store Adapter
//!
//! Persists each conversation's turn log as one JSON document under a base
//! directory, named by conversation id. Suitable for single-process
//! deployments; read-your-writes holds per process.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::conversation::ConversationTurn;
use crate::domain::foundation::ConversationId;
use crate::ports::{ConversationStore, StoreError};

/// File-backed storage for conversation turn logs.
#[derive(Debug, Clone)]
pub struct FileConversationStore {
    base_dir: PathBuf,
}

impl FileConversationStore {
    /// Creates a store rooted at the given directory. The directory is
    /// created on first save.
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, conversation_id: ConversationId) -> PathBuf {
        self.base_dir.join(format!("{conversation_id}.json"))
    }
}

#[async_trait]
impl ConversationStore for FileConversationStore {
    async fn load(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Option<Vec<ConversationTurn>>, StoreError> {
        let path = self.path_for(conversation_id);

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StoreError::Io(err.to_string())),
        };

        let turns = serde_json::from_str(&contents)
            .map_err(|e| StoreError::Deserialization(e.to_string()))?;
        Ok(Some(turns))
    }

    async fn save(
        &self,
        conversation_id: ConversationId,
        turns: &[ConversationTurn],
    ) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;

        let contents = serde_json::to_string_pretty(turns)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        tokio::fs::write(self.path_for(conversation_id), contents)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }
}
