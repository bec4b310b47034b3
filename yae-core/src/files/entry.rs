//! A file or directory in an agent's file tree, plus the audit trail
//! recording which tool call touched it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A node in an agent's hierarchical file tree. Paths are absolute
/// (`/notes/todo.md`); directories are implicit — there is no row for `/notes`
/// itself, only for the files beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    pub path: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The immediate parent directory of this entry's path (`/` for top-level files).
    pub fn parent_dir(&self) -> &str {
        match self.path.rfind('/') {
            Some(0) => "/",
            Some(idx) => &self.path[..idx],
            None => "/",
        }
    }
}

/// Outcome of a tool call that touched a file, recorded for audit/debugging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditStatus {
    Pending,
    Success,
    Failure,
}

/// One audit row: a tool call's attempted effect on a path, and its eventual outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolAudit {
    pub id: Uuid,
    pub tool_name: String,
    pub path: String,
    pub status: AuditStatus,
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
