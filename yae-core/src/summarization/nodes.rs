//! The five-stage summarization pipeline: collect the messages due for
//! summarization (skipping the run entirely if there are none), chunk them,
//! summarize each chunk concurrently, merge the chunk summaries together
//! with any prior summary, and store the result back into memory.

use std::sync::Arc;

use async_trait::async_trait;

use crate::agent_loop::LlmAdapter;
use crate::constants::{MAX_CONVERSATION_HISTORY, SUMMARIZATION_CHUNK_SIZE};
use crate::engine::{Action, NodeBehavior, ParallelNodeBehavior};
use crate::error::AgentError;
use crate::messages::Message;
use crate::workflow::AgentState;

use super::chunk::chunk_messages;
use super::data::SummarizationData;

type State = AgentState<SummarizationData>;

/// The action [`CollectNode`] returns when there's nothing due for
/// summarization, routing straight to [`SkipNode`] instead of the chunk/merge/store chain.
pub const SKIP_ACTION: &str = "skip";

#[derive(Clone)]
pub struct CollectNode;

#[async_trait]
impl NodeBehavior<State> for CollectNode {
    type Prep = (Option<String>, Vec<Message>);
    type Exec = (Option<String>, Vec<Message>);

    async fn prep(&self, state: &State) -> Result<Self::Prep, AgentError> {
        let existing_summary = state.memory.get("conversation_summary").await.and_then(|b| {
            if b.content.is_empty() {
                None
            } else {
                Some(b.content)
            }
        });
        let pending = state.messages.get_messages_for_summarization().await?;
        Ok((existing_summary, pending))
    }

    async fn exec(&self, prep: &Self::Prep) -> Result<Self::Exec, AgentError> {
        Ok(prep.clone())
    }

    async fn post(
        &self,
        state: &mut State,
        _prep: &Self::Prep,
        exec: &Self::Exec,
    ) -> Result<Option<Action>, AgentError> {
        let (existing_summary, pending) = exec;
        state.data.existing_summary = existing_summary.clone();
        state.data.pending = pending.clone();
        if pending.is_empty() {
            return Ok(Some(SKIP_ACTION.to_string()));
        }
        Ok(None)
    }
}

/// Terminal no-op reached when there was nothing to summarize.
#[derive(Clone)]
pub struct SkipNode;

#[async_trait]
impl NodeBehavior<State> for SkipNode {
    type Prep = ();
    type Exec = ();

    async fn prep(&self, _state: &State) -> Result<(), AgentError> {
        Ok(())
    }

    async fn exec(&self, _prep: &()) -> Result<(), AgentError> {
        Ok(())
    }

    async fn post(&self, _state: &mut State, _prep: &(), _exec: &()) -> Result<Option<Action>, AgentError> {
        Ok(None)
    }
}

#[derive(Clone)]
pub struct ChunkNode;

#[async_trait]
impl NodeBehavior<State> for ChunkNode {
    type Prep = Vec<Message>;
    type Exec = Vec<Vec<Message>>;

    async fn prep(&self, state: &State) -> Result<Vec<Message>, AgentError> {
        Ok(state.data.pending.clone())
    }

    async fn exec(&self, prep: &Vec<Message>) -> Result<Vec<Vec<Message>>, AgentError> {
        Ok(chunk_messages(prep, SUMMARIZATION_CHUNK_SIZE))
    }

    async fn post(
        &self,
        state: &mut State,
        _prep: &Vec<Message>,
        exec: &Vec<Vec<Message>>,
    ) -> Result<Option<Action>, AgentError> {
        state.data.chunks = exec.clone();
        Ok(None)
    }
}

#[derive(Clone)]
pub struct SummarizeChunksNode {
    pub llm: Arc<dyn LlmAdapter>,
}

#[async_trait]
impl ParallelNodeBehavior<State> for SummarizeChunksNode {
    type Item = Vec<Message>;
    type Output = String;

    async fn prep(&self, state: &State) -> Result<Vec<Vec<Message>>, AgentError> {
        Ok(state.data.chunks.clone())
    }

    async fn exec(&self, item: &Vec<Message>) -> Result<String, AgentError> {
        let response = self.llm.complete(item, &[]).await?;
        Ok(response.content.unwrap_or_default())
    }

    async fn post(
        &self,
        state: &mut State,
        _items: &[Vec<Message>],
        outputs: &[String],
    ) -> Result<Option<Action>, AgentError> {
        state.data.chunk_summaries = outputs.to_vec();
        Ok(None)
    }
}

#[derive(Clone)]
pub struct MergeNode {
    pub llm: Arc<dyn LlmAdapter>,
}

#[async_trait]
impl NodeBehavior<State> for MergeNode {
    type Prep = (Option<String>, Vec<String>);
    type Exec = String;

    async fn prep(&self, state: &State) -> Result<Self::Prep, AgentError> {
        Ok((state.data.existing_summary.clone(), state.data.chunk_summaries.clone()))
    }

    async fn exec(&self, prep: &Self::Prep) -> Result<String, AgentError> {
        let (existing_summary, chunk_summaries) = prep;
        self.llm
            .merge_summaries(chunk_summaries, existing_summary.as_deref())
            .await
    }

    async fn post(&self, state: &mut State, _prep: &Self::Prep, exec: &String) -> Result<Option<Action>, AgentError> {
        state.data.merged = Some(exec.clone());
        Ok(None)
    }
}

#[derive(Clone)]
pub struct StoreNode;

#[async_trait]
impl NodeBehavior<State> for StoreNode {
    type Prep = String;
    type Exec = String;

    async fn prep(&self, state: &State) -> Result<String, AgentError> {
        Ok(state.data.merged.clone().unwrap_or_default())
    }

    async fn exec(&self, prep: &String) -> Result<String, AgentError> {
        Ok(prep.clone())
    }

    async fn post(&self, state: &mut State, _prep: &String, exec: &String) -> Result<Option<Action>, AgentError> {
        state.memory.set_content("conversation_summary", exec).await?;
        let pruned = state.messages.prune(MAX_CONVERSATION_HISTORY / 2).await;
        state.data.pruned_count = pruned;
        Ok(None)
    }
}
