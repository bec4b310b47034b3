//! In-process cache over a [`MessageBackend`].
//!
//! The cache holds the full, unbounded run of saved messages for this
//! process's lifetime — `save` never trims it. [`Self::prune`] is the only
//! operation that shrinks the cache, and it touches the cache alone: the
//! backend is append-only and never loses a row, matching the store
//! invariant that summarization may prune the *cache* but must never delete
//! from durable storage.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::constants::MAX_CONVERSATION_HISTORY;
use crate::error::AgentError;

use super::backend::MessageBackend;
use super::message::Message;

pub struct MessagesRepository {
    agent_id: String,
    backend: Arc<dyn MessageBackend>,
    cache: RwLock<VecDeque<Message>>,
}

impl MessagesRepository {
    /// Loads the most recent [`MAX_CONVERSATION_HISTORY`] rows into the cache.
    pub async fn load(
        agent_id: impl Into<String>,
        backend: Arc<dyn MessageBackend>,
    ) -> Result<Self, AgentError> {
        let agent_id = agent_id.into();
        let recent = backend.load_recent(&agent_id, MAX_CONVERSATION_HISTORY).await?;
        Ok(Self {
            agent_id,
            backend,
            cache: RwLock::new(recent.into()),
        })
    }

    /// Appends to the durable store first, then the cache. The cache is not
    /// trimmed here — only [`Self::prune`] shrinks it.
    pub async fn save(&self, message: Message) -> Result<(), AgentError> {
        self.backend.append(&self.agent_id, &message).await?;
        let mut cache = self.cache.write().await;
        cache.push_back(message);
        Ok(())
    }

    /// The cached slice, chronologically ordered.
    pub async fn get_message_history(&self) -> Vec<Message> {
        self.cache.read().await.iter().cloned().collect()
    }

    /// The messages due for summarization: empty if the durable total is at
    /// or under [`MAX_CONVERSATION_HISTORY`], otherwise the oldest
    /// `total - MAX_CONVERSATION_HISTORY` durable rows, ascending. Reads the
    /// backend directly since the cache alone can't see rows already pruned
    /// from it by an earlier summarization pass.
    pub async fn get_messages_for_summarization(&self) -> Result<Vec<Message>, AgentError> {
        let total = self.backend.count(&self.agent_id).await?;
        if total <= MAX_CONVERSATION_HISTORY {
            return Ok(vec![]);
        }
        let overflow = total - MAX_CONVERSATION_HISTORY;
        self.backend.load_oldest(&self.agent_id, overflow).await
    }

    /// Removes up to `n` oldest entries from the cache only — the backend is
    /// never touched. Returns the number actually removed.
    pub async fn prune(&self, n: usize) -> usize {
        let mut cache = self.cache.write().await;
        let removed = n.min(cache.len());
        for _ in 0..removed {
            cache.pop_front();
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::backend::InMemoryMessageBackend;
    use crate::messages::message::Role;
    use chrono::Utc;

    async fn repo_with(n: usize) -> MessagesRepository {
        let backend = Arc::new(InMemoryMessageBackend::new());
        let repo = MessagesRepository::load("agent-1", backend).await.unwrap();
        for i in 0..n {
            repo.save(Message::new(Role::User, format!("m{i}"), Utc::now()))
                .await
                .unwrap();
        }
        repo
    }

    /// **Scenario**: under the threshold, summarization is not needed.
    #[tokio::test]
    async fn under_threshold_no_summarization_needed() {
        let repo = repo_with(10).await;
        assert!(repo.get_messages_for_summarization().await.unwrap().is_empty());
    }

    /// **Scenario**: with 70 durable messages, the oldest 20-over-threshold run
    /// is returned for summarization, ascending.
    #[tokio::test]
    async fn over_threshold_exposes_oldest_run() {
        let repo = repo_with(70).await;
        let pending = repo.get_messages_for_summarization().await.unwrap();
        assert_eq!(pending.len(), 20);
        assert_eq!(pending[0].content, "m0");
        assert_eq!(pending.last().unwrap().content, "m19");
    }

    /// **Scenario**: prune drops only from the cache; the backend keeps every row.
    #[tokio::test]
    async fn prune_only_shrinks_the_cache() {
        let repo = repo_with(70).await;
        let removed = repo.prune(25).await;
        assert_eq!(removed, 25);
        assert_eq!(repo.get_message_history().await.len(), 45);
        // the backend is untouched: the durable total is still the full 70,
        // so summarization still sees the same overflow it would have before pruning.
        assert_eq!(repo.backend.count(&repo.agent_id).await.unwrap(), 70);
    }

    /// **Scenario**: pruning more than the cache holds removes only what's there.
    #[tokio::test]
    async fn prune_clamps_to_cache_size() {
        let repo = repo_with(5).await;
        let removed = repo.prune(100).await;
        assert_eq!(removed, 5);
        assert!(repo.get_message_history().await.is_empty());
    }

    /// **Scenario**: save persists to the backend and appends to the cache in order.
    #[tokio::test]
    async fn save_appends_to_both_store_and_cache() {
        let repo = repo_with(3).await;
        repo.save(Message::new(Role::Assistant, "reply", Utc::now()))
            .await
            .unwrap();
        let history = repo.get_message_history().await;
        assert_eq!(history.len(), 4);
        assert_eq!(history.last().unwrap().content, "reply");
    }
}
