//! Agent-owned core memory: labelled blocks always present in the agent's
//! context window, with bounded replace/insert/create/delete operations.

pub mod backend;
pub mod block;
pub mod repository;

pub use backend::{InMemoryMemoryBackend, MemoryBackend};
pub use block::MemoryBlock;
pub use repository::{InsertPosition, MemoryRepository, SetOptions};
