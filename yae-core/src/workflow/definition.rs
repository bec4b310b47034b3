//! Defines a workflow as a named graph start node, and runs it with
//! persistence: a [`WorkflowRun`] row tracks `running` → `completed`/`failed`
//! so a crash mid-flow is visible and recoverable at the next startup via
//! [`recover_stale_runs`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::engine::Flow;
use crate::files::FileStoreRepository;
use crate::memory::MemoryRepository;
use crate::messages::MessagesRepository;
use crate::workflow_store::{RunStatus, WorkflowRun, WorkflowRunRepository};

use super::factory::{node_factory, NodeFactory, StateNode};
use super::state::{AgentState, RunMeta};

/// A named, reusable graph over `AgentState<T>`.
pub struct Workflow<T> {
    pub name: String,
    start: StateNode<T>,
}

impl<T> Workflow<T>
where
    T: Send + Sync + 'static,
{
    /// Builds a workflow's graph by calling `build` with a curried
    /// [`NodeFactory`] bound to `T` — `build` wires `node`/`parallel`/
    /// `chain`/`branch` calls into a start node without repeating
    /// `AgentState<T>` at every call site.
    pub fn define(name: impl Into<String>, build: impl FnOnce(&NodeFactory<T>) -> StateNode<T>) -> Self {
        let factory = node_factory::<T>();
        let start = build(&factory);
        Self {
            name: name.into(),
            start,
        }
    }
}

impl<T> Workflow<T>
where
    T: Send + Sync + Default + 'static,
{
    /// Builds a fresh [`AgentState<T>`] for a new run of this workflow.
    /// `initial_data` seeds `state.data`; omitting it starts from `T::default()`.
    pub fn create(
        &self,
        agent_id: impl Into<String>,
        memory: Arc<MemoryRepository>,
        messages: Arc<MessagesRepository>,
        files: Arc<FileStoreRepository>,
        initial_data: Option<T>,
    ) -> AgentState<T> {
        let agent_id = agent_id.into();
        AgentState::new(
            memory,
            messages,
            files,
            initial_data.unwrap_or_default(),
            RunMeta {
                run_id: Uuid::new_v4(),
                workflow_name: self.name.clone(),
                agent_id,
            },
        )
    }
}

/// The outcome of one [`run_workflow`] call. Never an `Err` — a flow
/// failure is carried in `error` alongside the (possibly partial) state, so
/// callers never need a `match` to find out what happened to their data.
pub struct WorkflowOutcome<T> {
    pub run_id: uuid::Uuid,
    pub status: RunStatus,
    pub state: AgentState<T>,
    pub duration: Duration,
    pub error: Option<String>,
}

/// Runs `workflow` to completion against a freshly built [`AgentState`],
/// recording a [`WorkflowRun`] row for the attempt. This never propagates a
/// flow failure as an `Err` — the caller always gets the state back, with
/// `error` set when the run failed. Failures to persist the run row itself
/// are logged and otherwise swallowed: a storage hiccup must not stop an
/// agent turn that otherwise succeeded.
pub async fn run_workflow<T>(
    workflow: &Workflow<T>,
    mut state: AgentState<T>,
    runs: &WorkflowRunRepository,
) -> WorkflowOutcome<T>
where
    T: Send + Sync + Serialize + 'static,
{
    let started = Instant::now();
    let run_row = WorkflowRun::new(&state.run.agent_id, &workflow.name, Utc::now());
    let run_id = run_row.id;
    state.run = RunMeta {
        run_id,
        workflow_name: workflow.name.clone(),
        agent_id: state.run.agent_id.clone(),
    };
    if let Err(e) = runs.create(&run_row).await {
        tracing::error!(error = %e, %run_id, "failed to persist workflow run row at creation");
    }

    let flow = Flow::new(workflow.start.clone());
    let flow_result = flow.run(&mut state).await;
    let duration = started.elapsed();

    let (status, error) = match &flow_result {
        Ok(()) => (RunStatus::Completed, None),
        Err(e) => (RunStatus::Failed, Some(e.to_string())),
    };

    let snapshot = serde_json::to_value(&state.data).ok();
    if let Err(e) = runs.update(run_id, status, snapshot, error.clone()).await {
        tracing::error!(error = %e, %run_id, "failed to persist workflow run row at completion");
    }

    WorkflowOutcome {
        run_id,
        status,
        state,
        duration,
        error,
    }
}

/// Sweeps `running` rows left behind by a process that died mid-flow. Call
/// once at startup, before any new workflow is dispatched. Returns the
/// number of rows swept.
pub async fn recover_stale_runs(runs: &WorkflowRunRepository) -> Result<usize, crate::error::AgentError> {
    runs.sweep_stale().await
}
