//! Durable storage for [`WorkflowRun`] rows, and the startup sweep that
//! fails any row left `running` by a process that died mid-flow.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::error::AgentError;

use super::run::{RunStatus, WorkflowRun};

/// The fixed reason recorded on every row swept by [`WorkflowRunBackend::mark_stale_as_failed`].
pub const STALE_RUN_REASON: &str = "workflow run was still 'running' at server restart";

#[async_trait]
pub trait WorkflowRunBackend: Send + Sync {
    async fn create(&self, run: &WorkflowRun) -> Result<(), AgentError>;

    /// Partial update: sets `status`/`state`/`error`, always bumps
    /// `updated_at`, and stamps `completed_at` the first time the row leaves
    /// `running`.
    async fn update(
        &self,
        id: Uuid,
        status: RunStatus,
        state: Option<Value>,
        error: Option<String>,
    ) -> Result<(), AgentError>;

    async fn get(&self, id: Uuid) -> Result<WorkflowRun, AgentError>;
    async fn list_by_status(&self, status: RunStatus, limit: usize) -> Result<Vec<WorkflowRun>, AgentError>;
    async fn list_by_agent(&self, agent_id: &str, limit: usize) -> Result<Vec<WorkflowRun>, AgentError>;

    /// Every row with `status = running` becomes `failed` with
    /// [`STALE_RUN_REASON`]. Called exactly once at store open, before any
    /// new workflow may be scheduled. Returns the number of rows changed.
    async fn mark_stale_as_failed(&self) -> Result<usize, AgentError>;
}

#[derive(Default)]
pub struct InMemoryWorkflowRunBackend {
    rows: DashMap<Uuid, WorkflowRun>,
}

impl InMemoryWorkflowRunBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRunBackend for InMemoryWorkflowRunBackend {
    async fn create(&self, run: &WorkflowRun) -> Result<(), AgentError> {
        self.rows.insert(run.id, run.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        status: RunStatus,
        state: Option<Value>,
        error: Option<String>,
    ) -> Result<(), AgentError> {
        let mut run = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| AgentError::NotFound(format!("workflow run '{id}'")))?;
        let leaving_running = run.status == RunStatus::Running
            && matches!(status, RunStatus::Completed | RunStatus::Failed);
        run.status = status;
        if state.is_some() {
            run.state = state;
        }
        run.error = error;
        run.updated_at = Utc::now();
        if leaving_running {
            run.completed_at = Some(run.updated_at);
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<WorkflowRun, AgentError> {
        self.rows
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| AgentError::NotFound(format!("workflow run '{id}'")))
    }

    async fn list_by_status(&self, status: RunStatus, limit: usize) -> Result<Vec<WorkflowRun>, AgentError> {
        let mut rows: Vec<WorkflowRun> = self
            .rows
            .iter()
            .filter(|r| r.status == status)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn list_by_agent(&self, agent_id: &str, limit: usize) -> Result<Vec<WorkflowRun>, AgentError> {
        let mut rows: Vec<WorkflowRun> = self
            .rows
            .iter()
            .filter(|r| r.agent_id == agent_id)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn mark_stale_as_failed(&self) -> Result<usize, AgentError> {
        let mut swept = 0usize;
        let now = Utc::now();
        for mut entry in self.rows.iter_mut() {
            if entry.status == RunStatus::Running {
                entry.status = RunStatus::Failed;
                entry.error = Some(STALE_RUN_REASON.to_string());
                entry.updated_at = now;
                entry.completed_at = Some(now);
                swept += 1;
            }
        }
        Ok(swept)
    }
}
