//! Binds a [`FileStoreBackend`] to one agent, so callers don't thread
//! `agent_id` through every call.

use std::sync::Arc;

use super::backend::FileStoreBackend;
use super::entry::FileEntry;
use crate::error::AgentError;
use uuid::Uuid;

pub struct FileStoreRepository {
    agent_id: String,
    backend: Arc<dyn FileStoreBackend>,
}

impl FileStoreRepository {
    pub fn new(agent_id: impl Into<String>, backend: Arc<dyn FileStoreBackend>) -> Self {
        Self {
            agent_id: agent_id.into(),
            backend,
        }
    }

    pub async fn read(&self, path: &str) -> Result<FileEntry, AgentError> {
        self.backend.read(&self.agent_id, path).await
    }

    pub async fn write(&self, path: &str, content: &str) -> Result<(), AgentError> {
        self.backend.write(&self.agent_id, path, content).await
    }

    pub async fn list(&self, dir: &str) -> Result<Vec<FileEntry>, AgentError> {
        self.backend.list(&self.agent_id, dir).await
    }

    /// Renders every file at or beneath `path` as an indented tree, one path
    /// per line, depth-indented relative to `path`.
    pub async fn get_file_tree(&self, path: &str) -> Result<String, AgentError> {
        let root = if path.is_empty() { "/" } else { path };
        let mut entries = self.backend.list_all(&self.agent_id).await?;
        entries.retain(|e| root == "/" || e.path == root || e.path.starts_with(&format!("{root}/")));
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        let root_depth = root.matches('/').count();
        let lines: Vec<String> = entries
            .iter()
            .map(|e| {
                let depth = e.path.matches('/').count().saturating_sub(root_depth);
                let name = e.path.rsplit('/').next().unwrap_or(&e.path);
                format!("{}{name}", "  ".repeat(depth))
            })
            .collect();
        Ok(lines.join("\n"))
    }

    pub async fn delete(&self, path: &str) -> Result<(), AgentError> {
        self.backend.delete(&self.agent_id, path).await
    }

    pub async fn record_tool_pending(&self, tool_name: &str, path: &str) -> Result<Uuid, AgentError> {
        self.backend.record_tool_pending(&self.agent_id, tool_name, path).await
    }

    pub async fn record_tool_success(&self, audit_id: Uuid, detail: &str) -> Result<(), AgentError> {
        self.backend.record_tool_success(&self.agent_id, audit_id, detail).await
    }

    pub async fn record_tool_failure(&self, audit_id: Uuid, detail: &str) -> Result<(), AgentError> {
        self.backend.record_tool_failure(&self.agent_id, audit_id, detail).await
    }
}
