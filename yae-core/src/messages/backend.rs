//! Durable, append-only storage for conversation history. Summarization
//! prunes the in-process cache only — these rows never shrink.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AgentError;

use super::message::Message;

#[async_trait]
pub trait MessageBackend: Send + Sync {
    async fn append(&self, agent_id: &str, message: &Message) -> Result<(), AgentError>;

    /// Total durable row count for `agent_id`.
    async fn count(&self, agent_id: &str) -> Result<usize, AgentError>;

    /// Returns the `limit` most recent messages, oldest first.
    async fn load_recent(&self, agent_id: &str, limit: usize) -> Result<Vec<Message>, AgentError>;

    /// Returns the oldest `limit` messages, oldest first. Never removes rows.
    async fn load_oldest(&self, agent_id: &str, limit: usize) -> Result<Vec<Message>, AgentError>;
}

#[derive(Default)]
pub struct InMemoryMessageBackend {
    rows: DashMap<String, Vec<Message>>,
}

impl InMemoryMessageBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageBackend for InMemoryMessageBackend {
    async fn append(&self, agent_id: &str, message: &Message) -> Result<(), AgentError> {
        self.rows
            .entry(agent_id.to_string())
            .or_default()
            .push(message.clone());
        Ok(())
    }

    async fn count(&self, agent_id: &str) -> Result<usize, AgentError> {
        Ok(self.rows.get(agent_id).map(|r| r.len()).unwrap_or(0))
    }

    async fn load_recent(&self, agent_id: &str, limit: usize) -> Result<Vec<Message>, AgentError> {
        let rows = self.rows.get(agent_id);
        let Some(rows) = rows else {
            return Ok(vec![]);
        };
        let len = rows.len();
        let start = len.saturating_sub(limit);
        Ok(rows[start..].to_vec())
    }

    async fn load_oldest(&self, agent_id: &str, limit: usize) -> Result<Vec<Message>, AgentError> {
        let rows = self.rows.get(agent_id);
        let Some(rows) = rows else {
            return Ok(vec![]);
        };
        let end = limit.min(rows.len());
        Ok(rows[..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::message::Role;
    use chrono::Utc;

    /// **Scenario**: load_recent returns at most `limit` messages, oldest first.
    #[tokio::test]
    async fn load_recent_caps_at_limit() {
        let backend = InMemoryMessageBackend::new();
        for i in 0..5 {
            backend
                .append("a", &Message::new(Role::User, format!("msg-{i}"), Utc::now()))
                .await
                .unwrap();
        }
        let recent = backend.load_recent("a", 2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "msg-3");
        assert_eq!(recent[1].content, "msg-4");
    }

    /// **Scenario**: load_oldest returns the earliest rows and never shrinks the store.
    #[tokio::test]
    async fn load_oldest_returns_earliest_rows_without_mutating() {
        let backend = InMemoryMessageBackend::new();
        for i in 0..5 {
            backend
                .append("a", &Message::new(Role::User, format!("msg-{i}"), Utc::now()))
                .await
                .unwrap();
        }
        let oldest = backend.load_oldest("a", 3).await.unwrap();
        assert_eq!(oldest.len(), 3);
        assert_eq!(oldest[0].content, "msg-0");
        assert_eq!(oldest[2].content, "msg-2");
        assert_eq!(backend.count("a").await.unwrap(), 5);
    }

    /// **Scenario**: count reflects every appended row; nothing in this
    /// backend ever decreases it.
    #[tokio::test]
    async fn count_only_grows() {
        let backend = InMemoryMessageBackend::new();
        assert_eq!(backend.count("a").await.unwrap(), 0);
        backend
            .append("a", &Message::new(Role::User, "hi", Utc::now()))
            .await
            .unwrap();
        assert_eq!(backend.count("a").await.unwrap(), 1);
    }
}
