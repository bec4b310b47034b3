//! The bounded tool-calling loop that drives one agent turn: think, call
//! tools, observe, repeat — up to [`crate::constants::MAX_AGENT_STEPS`] steps.

pub mod concurrency;
pub mod context;
pub mod events;
pub mod llm;
pub mod run;
pub mod tools;
pub mod web;

pub use concurrency::map_settled;
pub use context::build_context;
pub use events::AgentEvent;
pub use llm::{LlmAdapter, LlmResponse, MockLlmAdapter, ToolCall, ToolSchema};
pub use run::{run_agent_loop, AgentLoopDeps};
pub use tools::execute_tool;
pub use web::{guarded_fetch, is_public_url, SearchDepth, WebAdapter};
