//! `run_agent_loop`: the bounded think/act loop that drives one user turn to
//! either a final message or a fallback error, streaming events as it goes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::constants::{
    DEFAULT_MEMORY_BLOCK_LIMIT, LLM_TIMEOUT_MS, MAX_AGENT_STEPS, MAX_CONVERSATION_HISTORY,
    MAX_TOOL_CONCURRENCY, MAX_TOOL_RESULT_CHARS, TOOL_TIMEOUT_MS,
};
use crate::files::FileStoreRepository;
use crate::memory::MemoryRepository;
use crate::messages::{Message, MessagesRepository, Role};
use crate::pool::{with_worker, WorkerPool};
use crate::summarization;
use crate::workflow::run_workflow;
use crate::workflow_store::WorkflowRunRepository;

use super::concurrency::map_settled;
use super::context::build_context;
use super::events::AgentEvent;
use super::llm::{LlmAdapter, ToolSchema};
use super::tools::execute_tool;
use super::web::WebAdapter;

/// Everything one call to [`run_agent_loop`] needs, bundled so the call site
/// doesn't thread eight parameters through. Mirrors the stores + adapters a
/// `UserAgent` owns.
#[derive(Clone)]
pub struct AgentLoopDeps {
    pub agent_id: String,
    pub memory: Arc<MemoryRepository>,
    pub messages: Arc<MessagesRepository>,
    pub files: Arc<FileStoreRepository>,
    pub llm: Arc<dyn LlmAdapter>,
    pub web: Arc<dyn WebAdapter>,
    pub pool: Arc<WorkerPool>,
    pub runs: Arc<WorkflowRunRepository>,
}

fn tool_schemas() -> Vec<ToolSchema> {
    let empty_params = json!({"type": "object", "properties": {}});
    vec![
        ToolSchema {
            name: "memory_replace".to_string(),
            description: "Replace an exact substring within a memory block's content.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "memory_insert".to_string(),
            description: "Insert content at the beginning or end of a memory block.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "memory_create".to_string(),
            description: "Create a new memory block.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "memory_delete".to_string(),
            description: "Delete a memory block.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "file_read".to_string(),
            description: "Read a file's content.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "file_write".to_string(),
            description: "Write content to a file, creating or overwriting it.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "file_list".to_string(),
            description: "List the file tree beneath a path.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "file_delete".to_string(),
            description: "Delete a file.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "web_search".to_string(),
            description: "Search the web at standard or deep depth.".to_string(),
            parameters: empty_params.clone(),
        },
        ToolSchema {
            name: "web_fetch".to_string(),
            description: "Fetch a public URL's content.".to_string(),
            parameters: empty_params,
        },
    ]
}

fn wrap_tool_xml(step: u32, index: usize, ok: bool, body: &str) -> String {
    let tag = if ok { "tool_result" } else { "tool_error" };
    let truncated = body.chars().count() > MAX_TOOL_RESULT_CHARS;
    let content: String = if truncated {
        let mut s: String = body.chars().take(MAX_TOOL_RESULT_CHARS).collect();
        s.push_str("\n[truncated]");
        s
    } else {
        body.to_string()
    };
    format!("<{tag} step=\"{step}\" tool=\"{index}\">{content}</{tag}>")
}

/// Fires the summarization workflow on the worker pool without blocking the
/// caller. Errors (pool exhaustion, workflow failure) are logged, never
/// propagated — this is explicitly fire-and-forget per the pre-flight step.
fn spawn_preflight_summarization(deps: &AgentLoopDeps) -> tokio::task::JoinHandle<()> {
    let deps = deps.clone();
    tokio::spawn(async move {
        let workflow = summarization::build_workflow(Arc::clone(&deps.llm));
        let state = workflow.create(
            deps.agent_id.clone(),
            Arc::clone(&deps.memory),
            Arc::clone(&deps.messages),
            Arc::clone(&deps.files),
            None,
        );
        let outcome = with_worker(&deps.pool, deps.agent_id.clone(), summarization::WORKFLOW_NAME, |_worker| async {
            Ok(run_workflow(&workflow, state, &deps.runs).await)
        })
        .await;
        match outcome {
            Ok(outcome) => {
                if let Some(error) = outcome.error {
                    tracing::error!(agent_id = %deps.agent_id, %error, "pre-flight summarization run failed");
                }
            }
            Err(error) => {
                tracing::error!(agent_id = %deps.agent_id, %error, "pre-flight summarization could not be scheduled");
            }
        }
    })
}

/// Drives one user turn: think, optionally call tools, repeat, up to
/// `max_steps` (clamped to [`MAX_AGENT_STEPS`]). Never propagates an `Err` —
/// every failure becomes an `AgentEvent::Error` or `AgentEvent::ToolError` on
/// the returned stream.
pub fn run_agent_loop(
    deps: AgentLoopDeps,
    user_message: String,
    instructions: Option<String>,
    max_steps: u32,
) -> ReceiverStream<AgentEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        drive(deps, user_message, instructions, max_steps, tx).await;
    });
    ReceiverStream::new(rx)
}

async fn drive(
    deps: AgentLoopDeps,
    user_message: String,
    instructions: Option<String>,
    max_steps: u32,
    tx: mpsc::Sender<AgentEvent>,
) {
    let max_steps = max_steps.min(MAX_AGENT_STEPS);
    let tools = tool_schemas();

    let preflight = if deps.messages.get_message_history().await.len() >= MAX_CONVERSATION_HISTORY {
        Some(spawn_preflight_summarization(&deps))
    } else {
        None
    };

    let user_msg = Message::new(Role::User, user_message.clone(), Utc::now());
    let mut transient: Vec<Message> = vec![user_msg.clone()];
    let mut all_results: Vec<String> = Vec::new();
    let mut responded = false;

    'steps: for step in 0..max_steps {
        let context = match build_context(Utc::now(), &deps.memory, &deps.files).await {
            Ok(c) => c,
            Err(e) => {
                let _ = tx.send(AgentEvent::Error(format!("Agent turn failed: {e}"))).await;
                break 'steps;
            }
        };
        let mut history = deps.messages.get_message_history().await;
        history.push(Message::new(Role::System, context, Utc::now()));
        if let Some(instructions) = instructions.as_deref().filter(|s| !s.is_empty()) {
            history.push(Message::new(
                Role::System,
                format!("Additional instructions for this turn:\n{instructions}"),
                Utc::now(),
            ));
        }
        history.extend(transient.iter().cloned());

        let response = match tokio::time::timeout(
            Duration::from_millis(LLM_TIMEOUT_MS),
            deps.llm.complete(&history, &tools),
        )
        .await
        {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => {
                let _ = tx.send(AgentEvent::Error(format!("Agent turn failed: {e}"))).await;
                break 'steps;
            }
            Err(_) => {
                let _ = tx
                    .send(AgentEvent::Error("Agent turn failed: LLM call timed out".to_string()))
                    .await;
                break 'steps;
            }
        };

        let _ = tx.send(AgentEvent::Thinking(response.thinking.clone())).await;

        if let Some(content) = response.content {
            let _ = deps.messages.save(user_msg.clone()).await;
            let _ = deps
                .messages
                .save(Message::new(Role::Assistant, content.clone(), Utc::now()))
                .await;
            let _ = tx.send(AgentEvent::Message(content)).await;
            responded = true;
            break 'steps;
        }

        if response.tool_calls.is_empty() {
            let _ = tx
                .send(AgentEvent::ToolError("empty tool list returned by the model".to_string()))
                .await;
            continue 'steps;
        }

        for call in &response.tool_calls {
            let _ = tx.send(AgentEvent::ToolCall(call.name.clone())).await;
        }

        let exec_calls = response.tool_calls.clone();
        let memory = Arc::clone(&deps.memory);
        let files = Arc::clone(&deps.files);
        let web = Arc::clone(&deps.web);
        let tool_timeout = Duration::from_millis(TOOL_TIMEOUT_MS);
        let settled = map_settled(exec_calls, MAX_TOOL_CONCURRENCY, move |call| {
            let memory = Arc::clone(&memory);
            let files = Arc::clone(&files);
            let web = Arc::clone(&web);
            async move {
                match tokio::time::timeout(
                    tool_timeout,
                    execute_tool(&call, &memory, &files, &*web, DEFAULT_MEMORY_BLOCK_LIMIT),
                )
                .await
                {
                    Ok(inner) => inner,
                    Err(_) => Err(crate::error::AgentError::Timeout(format!(
                        "tool '{}' timed out",
                        call.name
                    ))),
                }
            }
        })
        .await;

        for (index, result) in settled.into_iter().enumerate() {
            let (ok, body) = match &result {
                Ok(body) => (true, body.clone()),
                Err(e) => (false, e.to_string()),
            };
            let xml = wrap_tool_xml(step, index, ok, &body);
            all_results.push(xml.clone());
            transient.push(Message::new(Role::Tool, xml.clone(), Utc::now()));
            let event = if ok { AgentEvent::ToolResult(xml) } else { AgentEvent::ToolError(xml) };
            let _ = tx.send(event).await;
        }
    }

    if !responded {
        let fallback = "I wasn't able to complete my response within the allowed steps. \
                         Please try again or rephrase your request."
            .to_string();
        let _ = tx.send(AgentEvent::Error(fallback.clone())).await;
        if !all_results.is_empty() {
            let _ = deps.messages.save(user_msg.clone()).await;
            let _ = deps
                .messages
                .save(Message::new(Role::Assistant, fallback, Utc::now()))
                .await;
        }
    }

    if let Some(handle) = preflight {
        let _ = handle.await;
    }
}
