//! Scratch data threaded through the summarization workflow's `AgentState`.

use serde::Serialize;

use crate::messages::Message;

#[derive(Debug, Default, Clone, Serialize)]
pub struct SummarizationData {
    /// The `conversation_summary` memory block's content before this run, if any.
    pub existing_summary: Option<String>,
    pub pending: Vec<Message>,
    pub chunks: Vec<Vec<Message>>,
    pub chunk_summaries: Vec<String>,
    pub merged: Option<String>,
    /// How many cache entries [`crate::messages::MessagesRepository::prune`]
    /// actually removed once the merged summary was stored.
    pub pruned_count: usize,
}
