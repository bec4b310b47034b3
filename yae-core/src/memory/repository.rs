//! In-process cache over a [`MemoryBackend`], exposing both the raw
//! `set`/`delete` operations and the four `tool*` operations an agent's tool
//! loop calls directly.
//!
//! Writes go to the backend first, then the cache — a failed backend write
//! never leaves the cache out of sync with durable storage. The cache
//! preserves insertion order within a process lifetime, which is what
//! [`Self::to_xml`] renders blocks in.

use chrono::Utc;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::AgentError;

use super::backend::MemoryBackend;
use super::block::MemoryBlock;

/// Where `memory_insert` places new content within a block's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Beginning,
    End,
}

/// Optional fields accepted by [`MemoryRepository::set`] beyond label/description/content.
#[derive(Debug, Clone, Default)]
pub struct SetOptions {
    pub protected: bool,
    pub read_only: bool,
    pub limit: Option<usize>,
}

/// A small ordered set of descriptors an agent is seeded with if it has no
/// memory blocks yet (a brand-new agent).
fn seed_blocks() -> Vec<MemoryBlock> {
    let now = Utc::now();
    vec![
        MemoryBlock::new(
            "persona",
            "Who the assistant is and how it should behave.",
            "I am a helpful assistant.",
            now,
        ),
        MemoryBlock::new(
            "human",
            "What the assistant has learned about the person it's talking to.",
            "",
            now,
        ),
        MemoryBlock::new(
            "conversation_summary",
            "A running summary of older conversation history, replacing pruned messages.",
            "",
            now,
        )
        .protected(true),
    ]
}

pub struct MemoryRepository {
    agent_id: String,
    backend: Arc<dyn MemoryBackend>,
    /// Insertion-ordered; `to_xml` renders blocks in this order.
    cache: RwLock<Vec<MemoryBlock>>,
}

impl MemoryRepository {
    /// Loads every block for `agent_id`, seeding the default set if none exist.
    pub async fn load(
        agent_id: impl Into<String>,
        backend: Arc<dyn MemoryBackend>,
    ) -> Result<Self, AgentError> {
        let agent_id = agent_id.into();
        let mut blocks = backend.load_all(&agent_id).await?;

        if blocks.is_empty() {
            for block in seed_blocks() {
                backend.put(&agent_id, &block).await?;
                blocks.push(block);
            }
        }

        Ok(Self {
            agent_id,
            backend,
            cache: RwLock::new(blocks),
        })
    }

    pub async fn has(&self, label: &str) -> bool {
        self.cache.read().await.iter().any(|b| b.label == label)
    }

    pub async fn get(&self, label: &str) -> Option<MemoryBlock> {
        self.cache.read().await.iter().find(|b| b.label == label).cloned()
    }

    pub async fn get_all(&self) -> Vec<MemoryBlock> {
        self.cache.read().await.clone()
    }

    /// Upsert. Rejects a write onto an existing `read_only` row, and any
    /// content that would exceed `opts.limit`.
    pub async fn set(
        &self,
        label: &str,
        description: &str,
        content: &str,
        opts: SetOptions,
    ) -> Result<(), AgentError> {
        if let Some(limit) = opts.limit {
            if content.chars().count() > limit {
                return Err(AgentError::Validation(format!(
                    "content for memory block '{label}' exceeds limit {limit}"
                )));
            }
        }

        let mut cache = self.cache.write().await;
        if let Some(existing) = cache.iter().find(|b| b.label == label) {
            if existing.read_only {
                return Err(AgentError::Forbidden(format!(
                    "memory block '{label}' is read-only"
                )));
            }
        }

        let block = MemoryBlock {
            label: label.to_string(),
            description: description.to_string(),
            content: content.to_string(),
            updated_at: Utc::now(),
            protected: opts.protected,
            read_only: opts.read_only,
            limit: opts.limit,
        };
        self.backend.put(&self.agent_id, &block).await?;

        match cache.iter().position(|b| b.label == label) {
            Some(idx) => cache[idx] = block,
            None => cache.push(block),
        }
        Ok(())
    }

    /// Overwrites a block's content in place. Fails if the label is absent.
    pub async fn set_content(&self, label: &str, content: &str) -> Result<(), AgentError> {
        let mut cache = self.cache.write().await;
        let idx = cache
            .iter()
            .position(|b| b.label == label)
            .ok_or_else(|| AgentError::NotFound(format!("memory block '{label}'")))?;
        let mut updated = cache[idx].clone();
        updated.content = content.to_string();
        updated.updated_at = Utc::now();
        self.backend.put(&self.agent_id, &updated).await?;
        cache[idx] = updated;
        Ok(())
    }

    /// Deletes a block. Errors if protected; returns `false` (not an error)
    /// if the label is simply absent.
    pub async fn delete(&self, label: &str) -> Result<bool, AgentError> {
        let mut cache = self.cache.write().await;
        let Some(idx) = cache.iter().position(|b| b.label == label) else {
            return Ok(false);
        };
        if cache[idx].protected {
            return Err(AgentError::Forbidden(format!(
                "memory block '{label}' is protected"
            )));
        }
        self.backend.delete(&self.agent_id, label).await?;
        cache.remove(idx);
        Ok(true)
    }

    /// Replaces the first (and required-to-be-only) exact occurrence of
    /// `old_content` with `new_content`.
    pub async fn tool_replace_memory(
        &self,
        label: &str,
        old_content: &str,
        new_content: &str,
    ) -> Result<(), AgentError> {
        let mut cache = self.cache.write().await;
        let idx = cache
            .iter()
            .position(|b| b.label == label)
            .ok_or_else(|| AgentError::NotFound(format!("memory block '{label}'")))?;
        let block = &cache[idx];
        if block.read_only {
            return Err(AgentError::Forbidden(format!(
                "memory block '{label}' is read-only"
            )));
        }
        let occurrences = block.content.matches(old_content).count();
        if occurrences != 1 {
            return Err(AgentError::Validation(format!(
                "old_content must match exactly once in memory block '{label}' (found {occurrences}); \
                 provide the exact text to replace, verbatim"
            )));
        }
        let candidate = block.content.replacen(old_content, new_content, 1);
        if let Some(limit) = block.limit {
            if candidate.chars().count() > limit {
                return Err(AgentError::Validation(format!(
                    "replacement would exceed limit for memory block '{label}'"
                )));
            }
        }
        let mut updated = block.clone();
        updated.content = candidate;
        updated.updated_at = Utc::now();
        self.backend.put(&self.agent_id, &updated).await?;
        cache[idx] = updated;
        Ok(())
    }

    /// Inserts `content` at `position`, separated from existing content by a newline.
    pub async fn tool_insert_memory(
        &self,
        label: &str,
        content: &str,
        position: InsertPosition,
    ) -> Result<(), AgentError> {
        let mut cache = self.cache.write().await;
        let idx = cache
            .iter()
            .position(|b| b.label == label)
            .ok_or_else(|| AgentError::NotFound(format!("memory block '{label}'")))?;
        let block = &cache[idx];
        if block.read_only {
            return Err(AgentError::Forbidden(format!(
                "memory block '{label}' is read-only"
            )));
        }
        let additional = content.chars().count() + if block.content.is_empty() { 0 } else { 1 };
        if !block.fits_additional(additional) {
            return Err(AgentError::Validation(format!(
                "insert would exceed limit for memory block '{label}'"
            )));
        }
        let new_content = if block.content.is_empty() {
            content.to_string()
        } else {
            match position {
                InsertPosition::Beginning => format!("{content}\n{}", block.content),
                InsertPosition::End => format!("{}\n{content}", block.content),
            }
        };
        let mut updated = block.clone();
        updated.content = new_content;
        updated.updated_at = Utc::now();
        self.backend.put(&self.agent_id, &updated).await?;
        cache[idx] = updated;
        Ok(())
    }

    /// Creates a new block with `default_limit` when no explicit limit is
    /// otherwise supplied. Errors if `label` is already in use.
    pub async fn tool_create_memory(
        &self,
        label: &str,
        description: &str,
        content: &str,
        default_limit: usize,
    ) -> Result<(), AgentError> {
        if self.has(label).await {
            return Err(AgentError::Validation(format!(
                "memory block '{label}' already exists"
            )));
        }
        self.set(
            label,
            description,
            content,
            SetOptions {
                limit: Some(default_limit),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes a block and returns a human-readable status string instead of
    /// a bare unit, for direct surfacing as a tool result.
    pub async fn tool_delete_memory(&self, label: &str) -> Result<String, AgentError> {
        match self.delete(label).await? {
            true => Ok(format!("Memory block \"{label}\" deleted.")),
            false => Ok(format!("Memory block \"{label}\" not found.")),
        }
    }

    /// Renders every block, in insertion order, as `<memory>` wrapping one
    /// `<block>` per entry.
    pub async fn to_xml(&self) -> String {
        let cache = self.cache.read().await;
        let body = cache
            .iter()
            .map(|b| b.to_xml_fragment())
            .collect::<Vec<_>>()
            .join("");
        format!("<memory>{body}</memory>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::backend::InMemoryMemoryBackend;

    async fn repo() -> MemoryRepository {
        MemoryRepository::load("agent-1", Arc::new(InMemoryMemoryBackend::new()))
            .await
            .unwrap()
    }

    /// **Scenario**: a brand-new agent is seeded with its default blocks.
    #[tokio::test]
    async fn fresh_agent_is_seeded() {
        let repo = repo().await;
        assert!(repo.has("persona").await);
        assert!(repo.has("conversation_summary").await);
    }

    /// **Scenario**: set then get round-trips a block through the cache.
    #[tokio::test]
    async fn set_then_get_round_trips() {
        let repo = repo().await;
        repo.set("notes", "scratch", "hello", SetOptions::default())
            .await
            .unwrap();
        assert_eq!(repo.get("notes").await.unwrap().content, "hello");
    }

    /// **Scenario**: set onto a read-only row is rejected.
    #[tokio::test]
    async fn set_onto_read_only_rejected() {
        let repo = repo().await;
        repo.set(
            "locked",
            "d",
            "fixed",
            SetOptions {
                read_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let err = repo.set("locked", "d", "changed", SetOptions::default()).await;
        assert!(matches!(err, Err(AgentError::Forbidden(_))));
    }

    /// **Scenario**: set_content fails when the label doesn't exist.
    #[tokio::test]
    async fn set_content_requires_existing_label() {
        let repo = repo().await;
        let err = repo.set_content("ghost", "x").await.unwrap_err();
        assert!(matches!(err, AgentError::NotFound(_)));
    }

    /// **Scenario**: set_content overwrites in place, preserving other fields.
    #[tokio::test]
    async fn set_content_overwrites_content() {
        let repo = repo().await;
        repo.set_content("conversation_summary", "merged summary").await.unwrap();
        let block = repo.get("conversation_summary").await.unwrap();
        assert_eq!(block.content, "merged summary");
        assert!(block.protected);
    }

    /// **Scenario**: tool_replace_memory requires an exact single match.
    #[tokio::test]
    async fn tool_replace_requires_unique_match() {
        let repo = repo().await;
        repo.set("notes", "d", "a cat and a cat", SetOptions::default())
            .await
            .unwrap();
        let err = repo.tool_replace_memory("notes", "cat", "dog").await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
        let err = repo.tool_replace_memory("notes", "dog", "x").await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    /// **Scenario**: tool_replace_memory succeeds on a unique match.
    #[tokio::test]
    async fn tool_replace_succeeds_on_unique_match() {
        let repo = repo().await;
        repo.set("notes", "d", "a cat sat", SetOptions::default())
            .await
            .unwrap();
        repo.tool_replace_memory("notes", "cat", "dog").await.unwrap();
        assert_eq!(repo.get("notes").await.unwrap().content, "a dog sat");
    }

    /// **Scenario**: tool_insert_memory joins existing content with a newline.
    #[tokio::test]
    async fn tool_insert_joins_with_newline() {
        let repo = repo().await;
        repo.set("log", "d", "middle", SetOptions::default()).await.unwrap();
        repo.tool_insert_memory("log", "start", InsertPosition::Beginning)
            .await
            .unwrap();
        repo.tool_insert_memory("log", "end", InsertPosition::End)
            .await
            .unwrap();
        assert_eq!(repo.get("log").await.unwrap().content, "start\nmiddle\nend");
    }

    /// **Scenario**: tool_insert_memory past the block's limit is rejected.
    #[tokio::test]
    async fn tool_insert_past_limit_rejected() {
        let repo = repo().await;
        repo.set(
            "tight",
            "d",
            "1234567890",
            SetOptions {
                limit: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let err = repo
            .tool_insert_memory("tight", "x", InsertPosition::End)
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    /// **Scenario**: tool_create_memory uses the default limit and rejects duplicates.
    #[tokio::test]
    async fn tool_create_uses_default_limit_and_rejects_duplicates() {
        let repo = repo().await;
        repo.tool_create_memory("scratch", "d", "x", 500).await.unwrap();
        assert_eq!(repo.get("scratch").await.unwrap().limit, Some(500));
        let err = repo.tool_create_memory("scratch", "d", "y", 500).await.unwrap_err();
        assert!(matches!(err, AgentError::Validation(_)));
    }

    /// **Scenario**: tool_delete_memory reports found vs not-found in plain text.
    #[tokio::test]
    async fn tool_delete_reports_status_string() {
        let repo = repo().await;
        repo.set("scratch", "d", "x", SetOptions::default()).await.unwrap();
        let msg = repo.tool_delete_memory("scratch").await.unwrap();
        assert!(msg.contains("deleted"));
        let msg = repo.tool_delete_memory("scratch").await.unwrap();
        assert!(msg.contains("not found"));
    }

    /// **Scenario**: deleting a protected block is forbidden; an unprotected one succeeds.
    #[tokio::test]
    async fn delete_respects_protected_flag() {
        let repo = repo().await;
        let err = repo.delete("conversation_summary").await.unwrap_err();
        assert!(matches!(err, AgentError::Forbidden(_)));

        repo.set("scratch", "d", "y", SetOptions::default()).await.unwrap();
        assert!(repo.delete("scratch").await.unwrap());
        assert!(!repo.delete("scratch").await.unwrap());
    }

    /// **Scenario**: to_xml wraps every block in a <memory> element, preserving insertion order.
    #[tokio::test]
    async fn to_xml_wraps_blocks_in_memory_element() {
        let repo = repo().await;
        repo.set("zeta", "d", "z", SetOptions::default()).await.unwrap();
        let xml = repo.to_xml().await;
        assert!(xml.starts_with("<memory>"));
        assert!(xml.ends_with("</memory>"));
        assert!(xml.contains("<block label=\"zeta\">"));
    }
}
