//! A single user's bound stores: memory, messages, and files, all loaded
//! fresh (or seeded, for a brand-new user) the first time the user is seen.

use std::sync::Arc;

use crate::error::AgentError;
use crate::files::{FileStoreRepository, InMemoryFileStore};
use crate::memory::{InMemoryMemoryBackend, MemoryRepository};
use crate::messages::{InMemoryMessageBackend, MessagesRepository};

/// The per-user datastore trio an agent loop turn runs against. Deliberately
/// holds no LLM/web/pool handle: those are process-wide and supplied by
/// [`super::Yae`] when assembling an [`crate::agent_loop::AgentLoopDeps`].
pub struct UserAgent {
    pub agent_id: String,
    pub memory: Arc<MemoryRepository>,
    pub messages: Arc<MessagesRepository>,
    pub files: Arc<FileStoreRepository>,
}

impl UserAgent {
    /// Loads (seeding defaults if new) the three stores for `agent_id`.
    pub async fn new(agent_id: impl Into<String>) -> Result<Self, AgentError> {
        let agent_id = agent_id.into();
        let memory = MemoryRepository::load(agent_id.clone(), Arc::new(InMemoryMemoryBackend::new())).await?;
        let messages = MessagesRepository::load(agent_id.clone(), Arc::new(InMemoryMessageBackend::new())).await?;
        let files = FileStoreRepository::new(agent_id.clone(), Arc::new(InMemoryFileStore::new()));
        Ok(Self {
            agent_id,
            memory: Arc::new(memory),
            messages: Arc::new(messages),
            files: Arc::new(files),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a fresh user agent's memory comes pre-seeded.
    #[tokio::test]
    async fn fresh_agent_has_seeded_memory() {
        let agent = UserAgent::new("user-1").await.unwrap();
        assert!(agent.memory.has("persona").await);
    }
}
