//! Storage for an agent's file tree plus the tool-call audit trail
//! (`record_tool_pending`/`_success`/`_failure`) that lets a reviewer trace
//! which tool invocation produced a given write.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AgentError;

use super::entry::{AuditStatus, FileEntry, ToolAudit};

#[async_trait]
pub trait FileStoreBackend: Send + Sync {
    async fn read(&self, agent_id: &str, path: &str) -> Result<FileEntry, AgentError>;
    async fn write(&self, agent_id: &str, path: &str, content: &str) -> Result<(), AgentError>;
    async fn list(&self, agent_id: &str, dir: &str) -> Result<Vec<FileEntry>, AgentError>;
    async fn delete(&self, agent_id: &str, path: &str) -> Result<(), AgentError>;

    /// Every entry for `agent_id`, unsorted, for tree rendering.
    async fn list_all(&self, agent_id: &str) -> Result<Vec<FileEntry>, AgentError>;

    /// Records that `tool_name` is about to act on `path`; returns an id to
    /// close out with `record_tool_success`/`record_tool_failure`.
    async fn record_tool_pending(
        &self,
        agent_id: &str,
        tool_name: &str,
        path: &str,
    ) -> Result<Uuid, AgentError>;
    async fn record_tool_success(
        &self,
        agent_id: &str,
        audit_id: Uuid,
        detail: &str,
    ) -> Result<(), AgentError>;
    async fn record_tool_failure(
        &self,
        agent_id: &str,
        audit_id: Uuid,
        detail: &str,
    ) -> Result<(), AgentError>;
}

#[derive(Default)]
pub struct InMemoryFileStore {
    files: DashMap<(String, String), FileEntry>,
    audits: DashMap<(String, Uuid), ToolAudit>,
}

impl InMemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileStoreBackend for InMemoryFileStore {
    async fn read(&self, agent_id: &str, path: &str) -> Result<FileEntry, AgentError> {
        self.files
            .get(&(agent_id.to_string(), path.to_string()))
            .map(|e| e.clone())
            .ok_or_else(|| AgentError::NotFound(format!("file '{path}'")))
    }

    async fn write(&self, agent_id: &str, path: &str, content: &str) -> Result<(), AgentError> {
        let key = (agent_id.to_string(), path.to_string());
        let now = Utc::now();
        let entry = match self.files.get(&key) {
            Some(existing) => FileEntry {
                content: content.to_string(),
                updated_at: now,
                ..existing.clone()
            },
            None => FileEntry::new(path, content, now),
        };
        self.files.insert(key, entry);
        Ok(())
    }

    async fn list(&self, agent_id: &str, dir: &str) -> Result<Vec<FileEntry>, AgentError> {
        let mut entries: Vec<FileEntry> = self
            .files
            .iter()
            .filter(|e| e.key().0 == agent_id && e.value().parent_dir() == dir)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn list_all(&self, agent_id: &str) -> Result<Vec<FileEntry>, AgentError> {
        let mut entries: Vec<FileEntry> = self
            .files
            .iter()
            .filter(|e| e.key().0 == agent_id)
            .map(|e| e.value().clone())
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn delete(&self, agent_id: &str, path: &str) -> Result<(), AgentError> {
        self.files
            .remove(&(agent_id.to_string(), path.to_string()))
            .ok_or_else(|| AgentError::NotFound(format!("file '{path}'")))?;
        Ok(())
    }

    async fn record_tool_pending(
        &self,
        agent_id: &str,
        tool_name: &str,
        path: &str,
    ) -> Result<Uuid, AgentError> {
        let id = Uuid::new_v4();
        self.audits.insert(
            (agent_id.to_string(), id),
            ToolAudit {
                id,
                tool_name: tool_name.to_string(),
                path: path.to_string(),
                status: AuditStatus::Pending,
                detail: None,
                recorded_at: Utc::now(),
            },
        );
        Ok(id)
    }

    async fn record_tool_success(
        &self,
        agent_id: &str,
        audit_id: Uuid,
        detail: &str,
    ) -> Result<(), AgentError> {
        let mut audit = self
            .audits
            .get_mut(&(agent_id.to_string(), audit_id))
            .ok_or_else(|| AgentError::NotFound(format!("tool audit '{audit_id}'")))?;
        audit.status = AuditStatus::Success;
        audit.detail = Some(detail.to_string());
        Ok(())
    }

    async fn record_tool_failure(
        &self,
        agent_id: &str,
        audit_id: Uuid,
        detail: &str,
    ) -> Result<(), AgentError> {
        let mut audit = self
            .audits
            .get_mut(&(agent_id.to_string(), audit_id))
            .ok_or_else(|| AgentError::NotFound(format!("tool audit '{audit_id}'")))?;
        audit.status = AuditStatus::Failure;
        audit.detail = Some(detail.to_string());
        Ok(())
    }
}
