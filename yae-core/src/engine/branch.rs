//! `chain`/`branch` helpers for wiring nodes without hand-writing `to`/`when`
//! calls at every call site.

use std::sync::Arc;

use super::action::DEFAULT_ACTION;
use super::node::GraphNode;

/// Chains nodes `a -> b -> c -> ...` along the `"default"` edge and returns
/// `a`. Built right-to-left with [`GraphNode::with_edge`] so every node in
/// the list, not just the first, ends up wired to its successor — the last
/// node in `nodes` is left as given (its own edges, if any, are untouched).
pub fn chain<S>(nodes: Vec<Arc<dyn GraphNode<S>>>) -> Option<Arc<dyn GraphNode<S>>>
where
    S: Send + Sync + 'static,
{
    let mut rest = nodes.into_iter().rev();
    let mut acc = rest.next()?;
    for node in rest {
        acc = node.with_edge(DEFAULT_ACTION.to_string(), acc);
    }
    Some(acc)
}

/// A named branch out of a router: `action` selects this arm when taken.
pub struct Branch<S>
where
    S: Send + Sync + 'static,
{
    pub action: String,
    pub target: Arc<dyn GraphNode<S>>,
}

impl<S> Branch<S>
where
    S: Send + Sync + 'static,
{
    pub fn new(action: impl Into<String>, target: Arc<dyn GraphNode<S>>) -> Self {
        Self {
            action: action.into(),
            target,
        }
    }
}

/// Builds a fan-out point: wires every arm's `action -> target` edge onto
/// `head` via [`GraphNode::with_edge`] and returns the rewired node. `head`'s
/// own `work()` is expected to return one of the arms' actions to select it.
pub fn branch<S>(head: Arc<dyn GraphNode<S>>, arms: Vec<Branch<S>>) -> Arc<dyn GraphNode<S>>
where
    S: Send + Sync + 'static,
{
    arms.into_iter()
        .fold(head, |acc, arm| acc.with_edge(arm.action, arm.target))
}
