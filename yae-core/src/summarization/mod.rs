//! Builds the summarization workflow: a fixed five-node pipeline collapsing
//! overflow conversation history into one summary message.

pub mod chunk;
pub mod data;
pub mod nodes;

use std::sync::Arc;

use crate::agent_loop::LlmAdapter;
use crate::workflow::Workflow;

pub use chunk::chunk_messages;
pub use data::SummarizationData;
pub use nodes::{ChunkNode, CollectNode, MergeNode, SkipNode, StoreNode, SummarizeChunksNode, SKIP_ACTION};

/// The name this workflow is recorded under in `WorkflowRun` rows.
pub const WORKFLOW_NAME: &str = "summarize-conversation";

/// Wires collect -> chunk -> summarize (parallel) -> merge -> store, with
/// collect routing straight to a no-op skip node when nothing is due.
pub fn build_workflow(llm: Arc<dyn LlmAdapter>) -> Workflow<SummarizationData> {
    Workflow::define(WORKFLOW_NAME, |f| {
        let skip = f.node("skip", SkipNode).into_arc();
        let store = f.node("store", StoreNode).into_arc();
        let merge = f.node("merge", MergeNode { llm: llm.clone() }).to(store).into_arc();
        let summarize = f
            .parallel("summarize-chunks", SummarizeChunksNode { llm })
            .to(merge)
            .into_arc();
        let chunk = f.node("chunk", ChunkNode).to(summarize).into_arc();
        f.node("collect", CollectNode)
            .to(chunk)
            .when(SKIP_ACTION, skip)
            .into_arc()
    })
}
