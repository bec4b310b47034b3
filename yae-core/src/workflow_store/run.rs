//! A persisted record of one workflow execution, used for crash recovery:
//! a `running` row still `running` at next startup means the process died
//! mid-flow, so it gets swept to `failed` rather than silently forgotten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub id: Uuid,
    pub agent_id: String,
    pub workflow_name: String,
    pub status: RunStatus,
    /// The workflow's final (or last-observed) state, serialized opaquely —
    /// the store never interprets it, only stores and returns it.
    pub state: Option<Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl WorkflowRun {
    /// A run is `running` from the moment it's created (spec: no separate
    /// `pending` interstitial state for runs dispatched by `run_workflow`).
    pub fn new(agent_id: impl Into<String>, workflow_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent_id: agent_id.into(),
            workflow_name: workflow_name.into(),
            status: RunStatus::Running,
            state: None,
            error: None,
            started_at: now,
            updated_at: now,
            completed_at: None,
        }
    }
}
