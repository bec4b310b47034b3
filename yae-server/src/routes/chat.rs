//! `POST /chat` — drives one agent turn and streams [`AgentEvent`]s back as
//! server-sent events.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::Stream;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use yae_core::agent_loop::{run_agent_loop, AgentEvent};
use yae_core::yae::Yae;

use crate::auth::Authed;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
}

fn default_max_steps() -> u32 {
    yae_core::constants::MAX_AGENT_STEPS
}

fn event_for(event: AgentEvent) -> Event {
    let (kind, body) = match event {
        AgentEvent::Thinking(text) => ("thinking", text),
        AgentEvent::Message(text) => ("message", text),
        AgentEvent::ToolCall(text) => ("tool_call", text),
        AgentEvent::ToolResult(text) => ("tool_result", text),
        AgentEvent::ToolError(text) => ("tool_error", text),
        AgentEvent::Error(text) => ("error", text),
    };
    Event::default().event(kind).data(json!({ "body": body }).to_string())
}

pub async fn chat(
    Authed(user): Authed,
    Json(req): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let yae = Yae::get_instance()?;
    let agent = yae.create_user_agent(user.id.to_string()).await?;
    let deps = yae.agent_loop_deps(&agent);

    let stream = run_agent_loop(deps, req.message, req.instructions, req.max_steps)
        .map(|event| Ok(event_for(event)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
