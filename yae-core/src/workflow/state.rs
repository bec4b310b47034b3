//! The state type every workflow node actually operates on: an agent's
//! three owned stores, plus the workflow's own typed scratch data.

use std::sync::Arc;
use uuid::Uuid;

use crate::files::FileStoreRepository;
use crate::memory::MemoryRepository;
use crate::messages::MessagesRepository;

/// Identifies which run a state belongs to, for logging and the run-status
/// row a workflow updates as it progresses.
#[derive(Debug, Clone)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub workflow_name: String,
    pub agent_id: String,
}

/// The shared state threaded through a workflow's graph. `T` is the
/// workflow-specific scratch data (e.g. the summarization workflow's
/// in-progress chunks); the stores are always the same three.
pub struct AgentState<T> {
    pub memory: Arc<MemoryRepository>,
    pub messages: Arc<MessagesRepository>,
    pub files: Arc<FileStoreRepository>,
    pub data: T,
    pub run: RunMeta,
}

impl<T> AgentState<T> {
    pub fn new(
        memory: Arc<MemoryRepository>,
        messages: Arc<MessagesRepository>,
        files: Arc<FileStoreRepository>,
        data: T,
        run: RunMeta,
    ) -> Self {
        Self {
            memory,
            messages,
            files,
            data,
            run,
        }
    }
}
