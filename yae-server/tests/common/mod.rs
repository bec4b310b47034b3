//! Shared bootstrap for integration tests. Each test file is its own process
//! (cargo's default for `tests/*.rs`), so each is free to call
//! [`yae_core::yae::Yae::initialize`] exactly once via [`spawn_server`].

use std::sync::Arc;

use async_trait::async_trait;
use yae_core::agent_loop::{LlmResponse, SearchDepth, ToolSchema, WebAdapter};
use yae_core::config::AppConfig;
use yae_core::messages::Message;
use yae_core::AgentError;

/// Echoes the last user message; never calls a tool, so a chat turn always
/// ends on the first step.
pub struct EchoLlm;

#[async_trait]
impl yae_core::agent_loop::LlmAdapter for EchoLlm {
    async fn complete(&self, history: &[Message], _tools: &[ToolSchema]) -> Result<LlmResponse, AgentError> {
        let last = history.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(LlmResponse {
            thinking: "echo".to_string(),
            content: Some(format!("echo: {last}")),
            tool_calls: vec![],
        })
    }
}

pub struct NullWeb;

#[async_trait]
impl WebAdapter for NullWeb {
    async fn search(&self, _query: &str, _depth: SearchDepth) -> Result<String, AgentError> {
        Ok(String::new())
    }
    async fn fetch(&self, _url: &str) -> Result<String, AgentError> {
        Ok(String::new())
    }
}

/// Binds a random port, spawns the server, and returns its base URL and
/// admin bearer token alongside the server's join handle.
pub async fn spawn_server() -> (String, String, tokio::task::JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let (ready_tx, ready_rx) = tokio::sync::oneshot::channel();
    let handle = tokio::spawn(async move {
        yae_server::run_serve_on_listener_with_ready(
            listener,
            Arc::new(EchoLlm),
            Arc::new(NullWeb),
            AppConfig::default(),
            Some(ready_tx),
        )
        .await
        .unwrap();
    });

    let admin_token = ready_rx.await.unwrap();
    (base_url, admin_token, handle)
}
