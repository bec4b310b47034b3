//! Durable storage for memory blocks, behind an async trait so the in-memory
//! reference backend can later be swapped for a real database without
//! touching [`super::repository::MemoryRepository`].

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AgentError;

use super::block::MemoryBlock;

/// Persists memory blocks for one agent. Implementations own durability;
/// [`super::repository::MemoryRepository`] owns the in-process cache and ordering rules.
#[async_trait]
pub trait MemoryBackend: Send + Sync {
    async fn load_all(&self, agent_id: &str) -> Result<Vec<MemoryBlock>, AgentError>;
    async fn put(&self, agent_id: &str, block: &MemoryBlock) -> Result<(), AgentError>;
    async fn delete(&self, agent_id: &str, label: &str) -> Result<(), AgentError>;
}

/// Reference backend: one [`DashMap`] keyed by `(agent_id, label)` for
/// content, plus a per-agent label list recording first-put order so
/// `load_all` can hand blocks back in the order they were created, not
/// dictionary order. Fine for tests and single-process deployments; not
/// durable across restarts.
#[derive(Default)]
pub struct InMemoryMemoryBackend {
    rows: DashMap<(String, String), MemoryBlock>,
    order: Mutex<HashMap<String, Vec<String>>>,
}

impl InMemoryMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MemoryBackend for InMemoryMemoryBackend {
    async fn load_all(&self, agent_id: &str) -> Result<Vec<MemoryBlock>, AgentError> {
        let labels = self
            .order
            .lock()
            .unwrap()
            .get(agent_id)
            .cloned()
            .unwrap_or_default();
        Ok(labels
            .into_iter()
            .filter_map(|label| {
                self.rows
                    .get(&(agent_id.to_string(), label))
                    .map(|entry| entry.value().clone())
            })
            .collect())
    }

    async fn put(&self, agent_id: &str, block: &MemoryBlock) -> Result<(), AgentError> {
        let key = (agent_id.to_string(), block.label.clone());
        let is_new = !self.rows.contains_key(&key);
        self.rows.insert(key, block.clone());
        if is_new {
            self.order
                .lock()
                .unwrap()
                .entry(agent_id.to_string())
                .or_default()
                .push(block.label.clone());
        }
        Ok(())
    }

    async fn delete(&self, agent_id: &str, label: &str) -> Result<(), AgentError> {
        self.rows.remove(&(agent_id.to_string(), label.to_string()));
        if let Some(labels) = self.order.lock().unwrap().get_mut(agent_id) {
            labels.retain(|l| l != label);
        }
        Ok(())
    }
}
