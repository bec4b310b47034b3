//! Placeholder adapters for the CLI's demo chat driver. No real LLM or web
//! provider is in scope (spec treats both as external collaborators); these
//! exist so `yae chat` has something to talk to locally.

use async_trait::async_trait;
use yae_core::agent_loop::{LlmResponse, SearchDepth, WebAdapter};
use yae_core::messages::{Message, Role};
use yae_core::AgentError;

/// Echoes the latest user message back as the final reply. Never calls any
/// tool, so a chat turn always ends on the first step.
pub struct EchoLlmAdapter;

#[async_trait]
impl yae_core::agent_loop::LlmAdapter for EchoLlmAdapter {
    async fn complete(
        &self,
        history: &[Message],
        _tools: &[yae_core::agent_loop::ToolSchema],
    ) -> Result<LlmResponse, AgentError> {
        let last_user = history
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        Ok(LlmResponse {
            thinking: "no model is configured; echoing the input".to_string(),
            content: Some(format!("you said: {last_user}")),
            tool_calls: vec![],
        })
    }
}

/// Rejects every call: no web provider is configured for the CLI demo.
pub struct UnavailableWebAdapter;

#[async_trait]
impl WebAdapter for UnavailableWebAdapter {
    async fn search(&self, _query: &str, _depth: SearchDepth) -> Result<String, AgentError> {
        Err(AgentError::Upstream("no web provider configured".to_string()))
    }

    async fn fetch(&self, _url: &str) -> Result<String, AgentError> {
        Err(AgentError::Upstream("no web provider configured".to_string()))
    }
}
