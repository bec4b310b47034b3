//! Yae: a multi-tenant agent runtime built on a small directed-graph
//! execution engine. An HTTP or CLI caller resolves a [`yae::UserAgent`] and
//! drives it through [`agent_loop::run_agent_loop`]; conversation history
//! beyond the retention window is summarized in the background by the
//! [`summarization`] workflow, dispatched to the [`pool`].

pub mod agent_loop;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod files;
pub mod memory;
pub mod messages;
pub mod pool;
pub mod summarization;
pub mod users;
pub mod webhooks;
pub mod workflow;
pub mod workflow_store;
pub mod yae;

pub use error::AgentError;
