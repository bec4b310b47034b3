//! A fixed-size, non-blocking worker pool backing background workflows
//! (summarization, webhook dispatch) so an unbounded number of triggers
//! can't spawn an unbounded number of concurrent LLM calls.

mod worker;

pub use worker::{Worker, WorkerAnnotation};

use std::collections::HashMap;

use tokio::sync::Mutex;

use crate::error::AgentError;

/// Fixed-size stack of [`Worker`] slots. `checkout` never blocks: it returns
/// `None` immediately if every worker is busy, leaving the caller to decide
/// whether to queue, drop, or retry later.
pub struct WorkerPool {
    available: Mutex<Vec<Worker>>,
    annotations: Mutex<HashMap<usize, WorkerAnnotation>>,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let available = (0..size).map(|id| Worker { id }).collect();
        Self {
            available: Mutex::new(available),
            annotations: Mutex::new(HashMap::new()),
        }
    }

    /// Takes a worker if one is free, recording `agent_id`/`workflow` as its
    /// `currentOwner` annotation. Never waits.
    pub async fn checkout(&self, agent_id: impl Into<String>, workflow: impl Into<String>) -> Option<Worker> {
        let worker = self.available.lock().await.pop()?;
        self.annotations.lock().await.insert(
            worker.id,
            WorkerAnnotation {
                current_owner: agent_id.into(),
                workflow: workflow.into(),
            },
        );
        Some(worker)
    }

    /// Returns a worker previously taken via `checkout`, clearing its
    /// owner/workflow annotation. Idempotent: returning an already-available
    /// worker just clears a (by then absent) annotation and re-pushes it.
    pub async fn return_worker(&self, worker: Worker) {
        self.annotations.lock().await.remove(&worker.id);
        self.available.lock().await.push(worker);
    }

    pub async fn available_count(&self) -> usize {
        self.available.lock().await.len()
    }

    /// The current owner/workflow annotation for a checked-out worker, if any.
    pub async fn annotation(&self, worker_id: usize) -> Option<WorkerAnnotation> {
        self.annotations.lock().await.get(&worker_id).cloned()
    }
}

/// Runs `f` on a worker checked out for `agent_id`/`workflow`, returning
/// `Err` if none is free, and always returning the worker afterward
/// regardless of `f`'s outcome.
pub async fn with_worker<F, Fut, T>(
    pool: &WorkerPool,
    agent_id: impl Into<String>,
    workflow: impl Into<String>,
    f: F,
) -> Result<T, AgentError>
where
    F: FnOnce(Worker) -> Fut,
    Fut: std::future::Future<Output = Result<T, AgentError>>,
{
    let worker = pool
        .checkout(agent_id, workflow)
        .await
        .ok_or_else(|| AgentError::Upstream("worker pool exhausted".to_string()))?;
    let result = f(worker).await;
    pool.return_worker(worker).await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: checkout returns None once every worker is in use.
    #[tokio::test]
    async fn checkout_exhausts_then_returns_none() {
        let pool = WorkerPool::new(2);
        let a = pool.checkout("agent-a", "wf").await;
        let b = pool.checkout("agent-b", "wf").await;
        let c = pool.checkout("agent-c", "wf").await;
        assert!(a.is_some());
        assert!(b.is_some());
        assert!(c.is_none());
    }

    /// **Scenario**: returning a worker makes it available to the next checkout.
    #[tokio::test]
    async fn returned_worker_is_available_again() {
        let pool = WorkerPool::new(1);
        let w = pool.checkout("agent-a", "wf").await.unwrap();
        assert!(pool.checkout("agent-b", "wf").await.is_none());
        pool.return_worker(w).await;
        assert!(pool.checkout("agent-b", "wf").await.is_some());
    }

    /// **Scenario**: checkout records the caller as currentOwner; return clears it.
    #[tokio::test]
    async fn checkout_records_and_return_clears_the_owner_annotation() {
        let pool = WorkerPool::new(1);
        let w = pool.checkout("agent-a", "summarize-conversation").await.unwrap();
        let annotation = pool.annotation(w.id).await.unwrap();
        assert_eq!(annotation.current_owner, "agent-a");
        assert_eq!(annotation.workflow, "summarize-conversation");

        pool.return_worker(w).await;
        assert!(pool.annotation(w.id).await.is_none());
    }

    /// **Scenario**: with_worker always returns the worker, even when the closure errors.
    #[tokio::test]
    async fn with_worker_returns_slot_on_error() {
        let pool = WorkerPool::new(1);
        let result: Result<(), AgentError> =
            with_worker(&pool, "agent-a", "wf", |_w| async { Err(AgentError::Internal("boom".to_string())) })
                .await;
        assert!(result.is_err());
        assert_eq!(pool.available_count().await, 1);
    }
}
