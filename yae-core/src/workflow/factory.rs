//! Curried `node`/`parallel`/`chain`/`branch` constructors: bind the
//! workflow's data type `T` once and build every node and every piece of
//! wiring for that workflow without repeating `AgentState<T>` at each call
//! site. Passed into [`super::Workflow::define`]'s `build` closure.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::engine::{self, Branch, GraphNode, Node, NodeBehavior, ParallelNode, ParallelNodeBehavior};

use super::state::AgentState;

/// Call [`node_factory`] once per workflow data type, then use `.node(...)`/
/// `.parallel(...)`/`.chain(...)`/`.branch(...)` to build every node and edge
/// without re-annotating `AgentState<T>`.
pub struct NodeFactory<T>(PhantomData<fn() -> T>);

impl<T> Default for NodeFactory<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T> NodeFactory<T>
where
    T: Send + Sync + 'static,
{
    pub fn node<B>(&self, id: impl Into<String>, behavior: B) -> Node<AgentState<T>, B>
    where
        B: NodeBehavior<AgentState<T>> + Clone + 'static,
    {
        Node::new(id, behavior)
    }

    pub fn parallel<B>(&self, id: impl Into<String>, behavior: B) -> ParallelNode<AgentState<T>, B>
    where
        B: ParallelNodeBehavior<AgentState<T>> + Clone + 'static,
    {
        ParallelNode::new(id, behavior)
    }

    /// Wires `nodes` head-to-tail along their `"default"` edges; see [`engine::chain`].
    pub fn chain(&self, nodes: Vec<StateNode<T>>) -> Option<StateNode<T>> {
        engine::chain(nodes)
    }

    /// Wires each arm's action onto `head`; see [`engine::branch`].
    pub fn branch(&self, head: StateNode<T>, arms: Vec<Branch<AgentState<T>>>) -> StateNode<T> {
        engine::branch(head, arms)
    }
}

/// Binds a workflow's scratch-data type `T`, returning a factory for its nodes.
pub fn node_factory<T>() -> NodeFactory<T>
where
    T: Send + Sync + 'static,
{
    NodeFactory::default()
}

/// Shorthand for the `Arc<dyn GraphNode<AgentState<T>>>` every `.to`/`.when`
/// edge and every `Flow::new` call expects.
pub type StateNode<T> = Arc<dyn GraphNode<AgentState<T>>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentError;
    use async_trait::async_trait;

    #[derive(Debug, Default)]
    struct St {
        path: Vec<&'static str>,
    }

    #[derive(Clone)]
    struct Mark(&'static str);

    #[async_trait]
    impl NodeBehavior<AgentState<St>> for Mark {
        type Prep = ();
        type Exec = ();

        async fn prep(&self, _state: &AgentState<St>) -> Result<(), AgentError> {
            Ok(())
        }

        async fn exec(&self, _prep: &()) -> Result<(), AgentError> {
            Ok(())
        }

        async fn post(
            &self,
            state: &mut AgentState<St>,
            _prep: &(),
            _exec: &(),
        ) -> Result<Option<String>, AgentError> {
            state.data.path.push(self.0);
            Ok(None)
        }
    }

    /// **Scenario**: a factory's `.chain` wires curried nodes together without
    /// the call site repeating `AgentState<St>`.
    #[tokio::test]
    async fn factory_chain_wires_curried_nodes() {
        let factory = node_factory::<St>();
        let a = factory.node("a", Mark("a")).into_arc();
        let b = factory.node("b", Mark("b")).into_arc();
        let first = factory.chain(vec![a, b]).unwrap();

        let mut state = super::AgentState::new(
            Arc::new(
                crate::memory::MemoryRepository::load(
                    "t",
                    Arc::new(crate::memory::InMemoryMemoryBackend::new()),
                )
                .await
                .unwrap(),
            ),
            Arc::new(
                crate::messages::MessagesRepository::load(
                    "t",
                    Arc::new(crate::messages::InMemoryMessageBackend::new()),
                )
                .await
                .unwrap(),
            ),
            Arc::new(crate::files::FileStoreRepository::new(
                "t",
                Arc::new(crate::files::InMemoryFileStore::new()),
            )),
            St::default(),
            super::super::state::RunMeta {
                run_id: uuid::Uuid::new_v4(),
                workflow_name: "test".to_string(),
                agent_id: "t".to_string(),
            },
        );
        crate::engine::Flow::new(first).run(&mut state).await.unwrap();
        assert_eq!(state.data.path, vec!["a", "b"]);
    }
}
