//! Per-item concurrent exec, fail-fast unless the node's `on_error` recovers.
//!
//! Shares `Node`'s prep/post split: `prep` produces a list of items, each
//! item's `exec` runs concurrently, `post` sees every output together. The
//! first `exec` failure short-circuits the rest (`try_join_all` semantics) —
//! outstanding futures keep running to completion but their results are
//! discarded.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::try_join_all;

use crate::error::AgentError;

use super::action::{Action, DEFAULT_ACTION};
use super::node::GraphNode;
use super::retry::RetryConfig;

/// Per-item fan-out behavior. `Item`/`Output` must be `Send + Sync` to cross
/// the `try_join_all` future boundary.
#[async_trait]
pub trait ParallelNodeBehavior<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    type Item: Send + Sync + 'static;
    type Output: Send + Sync + 'static;

    async fn prep(&self, state: &S) -> Result<Vec<Self::Item>, AgentError>;

    async fn exec(&self, item: &Self::Item) -> Result<Self::Output, AgentError>;

    async fn post(
        &self,
        state: &mut S,
        items: &[Self::Item],
        outputs: &[Self::Output],
    ) -> Result<Option<Action>, AgentError>;

    /// Consulted when any item's `exec` fails, or `prep`/`post` fail. `None`
    /// (the default) re-raises the error.
    async fn on_error(&self, _err: &AgentError, _state: &mut S) -> Option<Action> {
        None
    }

    /// Retry policy applied to each item's `exec` call independently.
    /// Default: one attempt, no retry.
    fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
    }

    /// Per-item `exec` timeout. `None` (the default) means no deadline.
    fn timeout(&self) -> Option<Duration> {
        None
    }
}

/// Wraps a [`ParallelNodeBehavior`] into a [`GraphNode`].
pub struct ParallelNode<S, B>
where
    S: Send + Sync + 'static,
    B: ParallelNodeBehavior<S> + Clone + 'static,
{
    id: String,
    behavior: B,
    successors: HashMap<Action, Arc<dyn GraphNode<S>>>,
}

impl<S, B> ParallelNode<S, B>
where
    S: Send + Sync + 'static,
    B: ParallelNodeBehavior<S> + Clone + 'static,
{
    pub fn new(id: impl Into<String>, behavior: B) -> Self {
        Self {
            id: id.into(),
            behavior,
            successors: HashMap::new(),
        }
    }

    pub fn to(mut self, target: Arc<dyn GraphNode<S>>) -> Self {
        self.successors.insert(DEFAULT_ACTION.to_string(), target);
        self
    }

    pub fn when(mut self, action: impl Into<String>, target: Arc<dyn GraphNode<S>>) -> Self {
        self.successors.insert(action.into(), target);
        self
    }

    pub fn into_arc(self) -> Arc<dyn GraphNode<S>> {
        Arc::new(self)
    }

    async fn handle_error(&self, err: AgentError, state: &mut S) -> Result<Action, AgentError> {
        match self.behavior.on_error(&err, state).await {
            Some(action) => Ok(action),
            None => Err(err),
        }
    }

    /// Runs one item's `exec` under the behavior's retry/timeout policy,
    /// independent of every other item's attempts.
    async fn exec_item_with_retry(&self, item: &B::Item) -> Result<B::Output, AgentError> {
        let cfg = self.behavior.retry_config();
        let mut attempt: u32 = 1;
        loop {
            let result = match self.behavior.timeout() {
                Some(d) => match tokio::time::timeout(d, self.behavior.exec(item)).await {
                    Ok(r) => r,
                    Err(_) => Err(AgentError::Timeout(format!(
                        "node '{}' item exec timed out after {:?}",
                        self.id, d
                    ))),
                },
                None => self.behavior.exec(item).await,
            };
            match result {
                Ok(o) => return Ok(o),
                Err(err) => {
                    if attempt < cfg.max_attempts {
                        let delay = cfg.delay_after(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl<S, B> GraphNode<S> for ParallelNode<S, B>
where
    S: Send + Sync + 'static,
    B: ParallelNodeBehavior<S> + Clone + 'static,
{
    fn node_id(&self) -> &str {
        &self.id
    }

    async fn work(&self, state: &mut S) -> Result<Action, AgentError> {
        let items = match self.behavior.prep(state).await {
            Ok(items) => items,
            Err(e) => return self.handle_error(e, state).await,
        };

        let outputs = match try_join_all(items.iter().map(|item| self.exec_item_with_retry(item)))
            .await
        {
            Ok(outputs) => outputs,
            Err(e) => return self.handle_error(e, state).await,
        };

        match self.behavior.post(state, &items, &outputs).await {
            Ok(action) => Ok(action.unwrap_or_else(|| DEFAULT_ACTION.to_string())),
            Err(e) => self.handle_error(e, state).await,
        }
    }

    fn next(&self, action: &Action) -> Result<Option<Arc<dyn GraphNode<S>>>, AgentError> {
        super::node::resolve_next(&self.id, &self.successors, action)
    }

    fn clone_node(&self) -> Arc<dyn GraphNode<S>> {
        Arc::new(ParallelNode {
            id: self.id.clone(),
            behavior: self.behavior.clone(),
            successors: self.successors.clone(),
        })
    }

    fn with_edge(&self, action: Action, target: Arc<dyn GraphNode<S>>) -> Arc<dyn GraphNode<S>> {
        let mut successors = self.successors.clone();
        successors.insert(action, target);
        Arc::new(ParallelNode {
            id: self.id.clone(),
            behavior: self.behavior.clone(),
            successors,
        })
    }
}

impl<S, B> Debug for ParallelNode<S, B>
where
    S: Send + Sync + 'static,
    B: ParallelNodeBehavior<S> + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelNode")
            .field("id", &self.id)
            .field("successors", &self.successors.keys().collect::<Vec<_>>())
            .finish()
    }
}
