//! Agent-owned conversation history: append-only storage with a bounded
//! in-memory cache, summarized down once it grows past the threshold.

pub mod backend;
pub mod message;
pub mod repository;

pub use backend::{InMemoryMessageBackend, MessageBackend};
pub use message::{Message, Role};
pub use repository::MessagesRepository;
