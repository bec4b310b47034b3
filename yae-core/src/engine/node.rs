//! The node lifecycle: `prep` → `exec` (retried/timed-out) → `post`.
//!
//! Workflow authors implement [`NodeBehavior`] (three phases, optional
//! `on_error`/`fallback`, retry/timeout config); [`Node`] wraps any behavior
//! into the object-safe [`GraphNode`] trait that [`super::flow::Flow`] walks.
//! `exec` never sees the shared state — only `prep` and `post` do — so retries
//! of `exec` are always safe to replay.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::AgentError;

use super::action::{Action, DEFAULT_ACTION};
use super::retry::RetryConfig;

/// One step in a graph, implemented by workflow authors.
///
/// - `prep` may read `state`; its output feeds `exec`.
/// - `exec` MUST NOT touch `state`; it is retried/timed-out per `retry_config`/`timeout`.
/// - `post` writes results into `state` and returns the next edge's `Action`
///   (`None` selects the `"default"` edge).
#[async_trait]
pub trait NodeBehavior<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    type Prep: Send + Sync + 'static;
    type Exec: Send + Sync + 'static;

    async fn prep(&self, state: &S) -> Result<Self::Prep, AgentError>;

    async fn exec(&self, prep: &Self::Prep) -> Result<Self::Exec, AgentError>;

    async fn post(
        &self,
        state: &mut S,
        prep: &Self::Prep,
        exec: &Self::Exec,
    ) -> Result<Option<Action>, AgentError>;

    /// Consulted when any phase fails. `None` (the default) re-raises the error.
    async fn on_error(&self, _err: &AgentError, _state: &mut S) -> Option<Action> {
        None
    }

    /// Retry policy for `exec`. Default: one attempt, no retry.
    fn retry_config(&self) -> RetryConfig {
        RetryConfig::default()
    }

    /// Per-`exec`-call timeout. `None` (the default) means no deadline.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Consulted after the final retry attempt of `exec` fails. Returning
    /// `Some` recovers; `None` (the default) lets the error propagate to `on_error`.
    async fn fallback(&self, _prep: &Self::Prep, _err: &AgentError) -> Option<Self::Exec> {
        None
    }
}

/// Object-safe entry point every graph node implements; what [`super::flow::Flow`] walks.
#[async_trait]
pub trait GraphNode<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    /// Node id, unique within a graph.
    fn node_id(&self) -> &str;

    /// Runs the full lifecycle once and returns the action selecting the next edge.
    async fn work(&self, state: &mut S) -> Result<Action, AgentError>;

    /// Resolves `action` to the next node, or `None` if terminal/unmatched.
    ///
    /// Errors (typo guard) when the node has successors, `action` doesn't
    /// match any of them, and `action != "default"`.
    fn next(&self, action: &Action) -> Result<Option<Arc<dyn GraphNode<S>>>, AgentError>;

    /// Shallow copy: same behavior, independent copy of the successors map
    /// (the map's `Arc` targets are shared, not deep-cloned).
    fn clone_node(&self) -> Arc<dyn GraphNode<S>>;

    /// Returns a clone of this node with one additional outgoing edge
    /// installed for `action`, overriding any edge already at that key.
    /// Lets graph-building helpers (`chain`, `branch`) wire nodes that have
    /// already been erased to `Arc<dyn GraphNode<S>>`.
    fn with_edge(&self, action: Action, target: Arc<dyn GraphNode<S>>) -> Arc<dyn GraphNode<S>>;
}

pub(crate) fn resolve_next<S>(
    id: &str,
    successors: &HashMap<Action, Arc<dyn GraphNode<S>>>,
    action: &Action,
) -> Result<Option<Arc<dyn GraphNode<S>>>, AgentError>
where
    S: Send + Sync + 'static,
{
    if successors.is_empty() {
        return Ok(None);
    }
    if let Some(n) = successors.get(action) {
        return Ok(Some(n.clone()));
    }
    if action == DEFAULT_ACTION {
        return Ok(None);
    }
    Err(AgentError::Validation(format!(
        "node '{id}': no edge for action '{action}' (known: {:?})",
        successors.keys().collect::<Vec<_>>()
    )))
}

/// Wraps a [`NodeBehavior`] with an id and a successor map, producing a
/// concrete [`GraphNode`].
pub struct Node<S, B>
where
    S: Send + Sync + 'static,
    B: NodeBehavior<S> + Clone + 'static,
{
    id: String,
    behavior: B,
    successors: HashMap<Action, Arc<dyn GraphNode<S>>>,
}

impl<S, B> Node<S, B>
where
    S: Send + Sync + 'static,
    B: NodeBehavior<S> + Clone + 'static,
{
    pub fn new(id: impl Into<String>, behavior: B) -> Self {
        Self {
            id: id.into(),
            behavior,
            successors: HashMap::new(),
        }
    }

    /// Installs the `"default"` outgoing edge. Re-installing overrides (logged).
    pub fn to(mut self, target: Arc<dyn GraphNode<S>>) -> Self {
        if self.successors.contains_key(DEFAULT_ACTION) {
            tracing::warn!(node = %self.id, "overriding existing 'default' edge");
        }
        self.successors.insert(DEFAULT_ACTION.to_string(), target);
        self
    }

    /// Installs a named outgoing edge. Re-installing the same action overrides (logged).
    pub fn when(mut self, action: impl Into<String>, target: Arc<dyn GraphNode<S>>) -> Self {
        let action = action.into();
        if self.successors.contains_key(&action) {
            tracing::warn!(node = %self.id, %action, "overriding existing edge");
        }
        self.successors.insert(action, target);
        self
    }

    pub fn into_arc(self) -> Arc<dyn GraphNode<S>> {
        Arc::new(self)
    }

    async fn exec_with_retry(&self, prep: &B::Prep) -> Result<B::Exec, AgentError> {
        let cfg = self.behavior.retry_config();
        let mut attempt: u32 = 1;
        loop {
            let result = match self.behavior.timeout() {
                Some(d) => match tokio::time::timeout(d, self.behavior.exec(prep)).await {
                    Ok(r) => r,
                    Err(_) => Err(AgentError::Timeout(format!(
                        "node '{}' exec timed out after {:?}",
                        self.id, d
                    ))),
                },
                None => self.behavior.exec(prep).await,
            };
            match result {
                Ok(e) => return Ok(e),
                Err(err) => {
                    if attempt < cfg.max_attempts {
                        let delay = cfg.delay_after(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        attempt += 1;
                        continue;
                    }
                    if let Some(recovered) = self.behavior.fallback(prep, &err).await {
                        return Ok(recovered);
                    }
                    return Err(err);
                }
            }
        }
    }
}

#[async_trait]
impl<S, B> GraphNode<S> for Node<S, B>
where
    S: Send + Sync + 'static,
    B: NodeBehavior<S> + Clone + 'static,
{
    fn node_id(&self) -> &str {
        &self.id
    }

    async fn work(&self, state: &mut S) -> Result<Action, AgentError> {
        let prep = match self.behavior.prep(state).await {
            Ok(p) => p,
            Err(e) => {
                return match self.behavior.on_error(&e, state).await {
                    Some(action) => Ok(action),
                    None => Err(e),
                }
            }
        };

        let exec = match self.exec_with_retry(&prep).await {
            Ok(e) => e,
            Err(e) => {
                return match self.behavior.on_error(&e, state).await {
                    Some(action) => Ok(action),
                    None => Err(e),
                }
            }
        };

        match self.behavior.post(state, &prep, &exec).await {
            Ok(action) => Ok(action.unwrap_or_else(|| DEFAULT_ACTION.to_string())),
            Err(e) => match self.behavior.on_error(&e, state).await {
                Some(action) => Ok(action),
                None => Err(e),
            },
        }
    }

    fn next(&self, action: &Action) -> Result<Option<Arc<dyn GraphNode<S>>>, AgentError> {
        resolve_next(&self.id, &self.successors, action)
    }

    fn clone_node(&self) -> Arc<dyn GraphNode<S>> {
        Arc::new(Node {
            id: self.id.clone(),
            behavior: self.behavior.clone(),
            successors: self.successors.clone(),
        })
    }

    fn with_edge(&self, action: Action, target: Arc<dyn GraphNode<S>>) -> Arc<dyn GraphNode<S>> {
        let mut successors = self.successors.clone();
        successors.insert(action, target);
        Arc::new(Node {
            id: self.id.clone(),
            behavior: self.behavior.clone(),
            successors,
        })
    }
}

impl<S, B> Debug for Node<S, B>
where
    S: Send + Sync + 'static,
    B: NodeBehavior<S> + Clone + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("successors", &self.successors.keys().collect::<Vec<_>>())
            .finish()
    }
}
