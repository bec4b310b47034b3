//! The provider-agnostic seam between the agent loop and whatever LLM API
//! backs it. Concrete adapters (OpenAI, Anthropic, ...) live outside this
//! crate; [`MockLlmAdapter`] exists for tests.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AgentError;
use crate::messages::{Message, Role};

/// A tool the LLM may choose to call, described as a JSON Schema `parameters` object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// One requested tool invocation from the LLM's response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What one LLM turn produced. `thinking` is always present (yielded as a
/// `THINKING` event regardless of variant); the turn is a final message when
/// `content` is `Some` and a tool step when `tool_calls` is non-empty.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub thinking: String,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
}

/// Implemented once per LLM provider; the agent loop only ever talks to this trait.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    async fn complete(
        &self,
        history: &[Message],
        tools: &[ToolSchema],
    ) -> Result<LlmResponse, AgentError>;

    /// Merges one or more chunk summaries, optionally folding in a prior
    /// summary, into a single summary string. Default implementation routes
    /// through `complete` with a synthetic merge prompt; a provider adapter
    /// may override this to call a cheaper dedicated summarization model.
    async fn merge_summaries(
        &self,
        summaries: &[String],
        existing_summary: Option<&str>,
    ) -> Result<String, AgentError> {
        let mut prompt = String::from(
            "Merge the following conversation summaries into a single concise summary.",
        );
        if let Some(existing) = existing_summary {
            prompt.push_str("\n\nExisting summary:\n");
            prompt.push_str(existing);
        }
        for (i, summary) in summaries.iter().enumerate() {
            prompt.push_str(&format!("\n\nChunk summary {}:\n{summary}", i + 1));
        }
        let history = [Message::new(Role::User, prompt, Utc::now())];
        let response = self.complete(&history, &[]).await?;
        Ok(response.content.unwrap_or_default())
    }
}

/// Scripted responses for tests: returns `responses[call_index]`, erroring
/// past the end of the script.
pub struct MockLlmAdapter {
    responses: std::sync::Mutex<std::collections::VecDeque<LlmResponse>>,
}

impl MockLlmAdapter {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses.into()),
        }
    }

    pub fn text_only(replies: Vec<&str>) -> Self {
        Self::new(
            replies
                .into_iter()
                .map(|r| LlmResponse {
                    thinking: String::new(),
                    content: Some(r.to_string()),
                    tool_calls: vec![],
                })
                .collect(),
        )
    }
}

#[async_trait]
impl LlmAdapter for MockLlmAdapter {
    async fn complete(
        &self,
        _history: &[Message],
        _tools: &[ToolSchema],
    ) -> Result<LlmResponse, AgentError> {
        let mut responses = self.responses.lock().unwrap();
        responses
            .pop_front()
            .ok_or_else(|| AgentError::Upstream("mock LLM adapter script exhausted".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: the mock adapter replays its scripted responses in order.
    #[tokio::test]
    async fn mock_adapter_replays_responses_in_order() {
        let adapter = MockLlmAdapter::text_only(vec!["first", "second"]);
        let first = adapter.complete(&[], &[]).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));
        let second = adapter.complete(&[], &[]).await.unwrap();
        assert_eq!(second.content.as_deref(), Some("second"));
    }

    /// **Scenario**: exhausting the script surfaces an upstream error instead of panicking.
    #[tokio::test]
    async fn mock_adapter_errors_past_end_of_script() {
        let adapter = MockLlmAdapter::text_only(vec!["only"]);
        adapter.complete(&[], &[]).await.unwrap();
        let err = adapter.complete(&[], &[]).await.unwrap_err();
        assert!(matches!(err, AgentError::Upstream(_)));
    }
}
