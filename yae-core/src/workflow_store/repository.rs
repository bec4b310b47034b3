//! Thin pass-through over [`WorkflowRunBackend`], kept as its own type for
//! symmetry with the other stores and as the seam where a future cache could go.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::AgentError;

use super::backend::WorkflowRunBackend;
use super::run::{RunStatus, WorkflowRun};

pub struct WorkflowRunRepository {
    backend: Arc<dyn WorkflowRunBackend>,
}

impl WorkflowRunRepository {
    pub fn new(backend: Arc<dyn WorkflowRunBackend>) -> Self {
        Self { backend }
    }

    pub async fn create(&self, run: &WorkflowRun) -> Result<(), AgentError> {
        self.backend.create(run).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        status: RunStatus,
        state: Option<Value>,
        error: Option<String>,
    ) -> Result<(), AgentError> {
        self.backend.update(id, status, state, error).await
    }

    pub async fn get(&self, id: Uuid) -> Result<WorkflowRun, AgentError> {
        self.backend.get(id).await
    }

    pub async fn list_by_status(&self, status: RunStatus, limit: usize) -> Result<Vec<WorkflowRun>, AgentError> {
        self.backend.list_by_status(status, limit).await
    }

    pub async fn list_by_agent(&self, agent_id: &str, limit: usize) -> Result<Vec<WorkflowRun>, AgentError> {
        self.backend.list_by_agent(agent_id, limit).await
    }

    /// Run once at process startup, before any new workflow is dispatched.
    /// Returns the number of rows swept.
    pub async fn sweep_stale(&self) -> Result<usize, AgentError> {
        self.backend.mark_stale_as_failed().await
    }
}
