//! Normative defaults. [`crate::config::AppConfig`] overrides each of these
//! from environment variables; code that needs a value should generally go
//! through `AppConfig` rather than reaching for a constant directly, except
//! in contexts (like the store layer) that have no config handle threaded in.

/// Cached conversation turns kept in memory before summarization kicks in.
pub const MAX_CONVERSATION_HISTORY: usize = 50;

/// Upper bound on think/act steps in one `run_agent_loop` call.
pub const MAX_AGENT_STEPS: u32 = 20;

/// A tool result longer than this (in chars) is truncated before being
/// appended to conversation history.
pub const MAX_TOOL_RESULT_CHARS: usize = 10_000;

/// Maximum tool calls dispatched concurrently within one agent step.
pub const MAX_TOOL_CONCURRENCY: usize = 5;

/// Default character limit for a newly created memory block.
pub const DEFAULT_MEMORY_BLOCK_LIMIT: usize = 500;

/// Deadline for a single LLM call.
pub const LLM_TIMEOUT_MS: u64 = 60_000;

/// Deadline for a single tool call.
pub const TOOL_TIMEOUT_MS: u64 = 30_000;

/// Worker pool size backing summarization and other background workflows.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Messages per chunk when summarizing conversation history.
pub const SUMMARIZATION_CHUNK_SIZE: usize = 20;

/// Requests per minute allowed for unauthenticated callers.
pub const RATE_LIMIT_PUBLIC_PER_MIN: u32 = 5;

/// Requests per minute allowed for authenticated callers.
pub const RATE_LIMIT_AUTHED_PER_MIN: u32 = 30;
