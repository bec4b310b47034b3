//! Walks a graph from a start node until a terminal node (no outgoing edge
//! for the returned action) or the iteration guard trips.
//!
//! Cycles are legal: a node's successors map may point back at an ancestor.
//! What makes repeated runs of the same prototype node safe across concurrent
//! flows is [`super::node::GraphNode::clone_node`] — `Flow::run` clones every
//! node it visits, start and successors alike, so no two concurrent runs
//! share one node's internal state (only the state value `S` threads through
//! a single run).

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;

use super::node::GraphNode;

/// Safety ceiling on node hops within one `Flow::run` call. Prevents a
/// misconfigured cycle (no terminal edge) from looping forever.
pub const MAX_ITERATIONS: u32 = 1000;

/// Observation hooks around a flow run. All methods default to no-ops;
/// implement only the ones you need.
#[async_trait]
pub trait FlowHooks<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    async fn before_start(&self, _state: &S) {}
    async fn after_complete(&self, _state: &S) {}
    async fn on_node_execute(&self, _node_id: &str) {}
    async fn on_error(&self, _node_id: &str, _err: &AgentError) {}
}

/// No-op hook set, used when a caller doesn't care to observe a run.
pub struct NoopHooks;

#[async_trait]
impl<S> FlowHooks<S> for NoopHooks where S: Send + Sync + 'static {}

/// A runnable graph: a start node plus observation hooks.
pub struct Flow<S>
where
    S: Send + Sync + 'static,
{
    start: Arc<dyn GraphNode<S>>,
    hooks: Arc<dyn FlowHooks<S>>,
}

impl<S> Flow<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(start: Arc<dyn GraphNode<S>>) -> Self {
        Self {
            start,
            hooks: Arc::new(NoopHooks),
        }
    }

    pub fn with_hooks(start: Arc<dyn GraphNode<S>>, hooks: Arc<dyn FlowHooks<S>>) -> Self {
        Self { start, hooks }
    }

    /// Runs the flow to completion, mutating `state` in place.
    ///
    /// Clones each node before executing it, start and every successor
    /// alike, so this call is independent of any other concurrent call
    /// sharing the same prototype graph.
    pub async fn run(&self, state: &mut S) -> Result<(), AgentError> {
        self.hooks.before_start(state).await;

        let mut current = self.start.clone_node();
        let mut iterations: u32 = 0;

        loop {
            if iterations >= MAX_ITERATIONS {
                let err = AgentError::Internal(format!(
                    "flow exceeded {MAX_ITERATIONS} iterations without reaching a terminal node"
                ));
                self.hooks.on_error(current.node_id(), &err).await;
                return Err(err);
            }
            iterations += 1;

            self.hooks.on_node_execute(current.node_id()).await;

            let action = match current.work(state).await {
                Ok(a) => a,
                Err(e) => {
                    self.hooks.on_error(current.node_id(), &e).await;
                    return Err(e);
                }
            };

            match current.next(&action) {
                Ok(Some(next)) => current = next.clone_node(),
                Ok(None) => break,
                Err(e) => {
                    self.hooks.on_error(current.node_id(), &e).await;
                    return Err(e);
                }
            }
        }

        self.hooks.after_complete(state).await;
        Ok(())
    }
}
