//! The fixed tool table an agent step may invoke, and the dispatcher
//! (`execute_tool`) that is the sole entry point into it — every call is
//! bookended with a `files.record_tool_*` audit triple regardless of which
//! store it actually touches.

use serde_json::Value;

use crate::error::AgentError;
use crate::files::FileStoreRepository;
use crate::memory::{InsertPosition, MemoryRepository};

use super::llm::ToolCall;
use super::web::{guarded_fetch, SearchDepth, WebAdapter};

fn require_str<'a>(args: &'a Value, field: &str, tool: &str) -> Result<&'a str, AgentError> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::Validation(format!("{tool}: missing or non-string field '{field}'")))
}

fn optional_str<'a>(args: &'a Value, field: &str) -> Option<&'a str> {
    args.get(field).and_then(Value::as_str)
}

/// Dispatches one [`ToolCall`] to its implementation, bookended with a
/// `files.record_tool_*` audit triple.
pub async fn execute_tool(
    call: &ToolCall,
    memory: &MemoryRepository,
    files: &FileStoreRepository,
    web: &dyn WebAdapter,
    default_memory_block_limit: usize,
) -> Result<String, AgentError> {
    let audit_path = optional_str(&call.arguments, "path")
        .or_else(|| optional_str(&call.arguments, "label"))
        .unwrap_or(&call.name)
        .to_string();
    let audit_id = files.record_tool_pending(&call.name, &audit_path).await?;

    let result = dispatch(call, memory, files, web, default_memory_block_limit).await;

    match &result {
        Ok(detail) => {
            files.record_tool_success(audit_id, detail).await?;
        }
        Err(err) => {
            files.record_tool_failure(audit_id, &err.to_string()).await?;
        }
    }
    result
}

async fn dispatch(
    call: &ToolCall,
    memory: &MemoryRepository,
    files: &FileStoreRepository,
    web: &dyn WebAdapter,
    default_memory_block_limit: usize,
) -> Result<String, AgentError> {
    let args = &call.arguments;
    match call.name.as_str() {
        "memory_replace" => {
            let label = require_str(args, "label", "memory_replace")?;
            let old_content = require_str(args, "old_content", "memory_replace")?;
            let new_content = require_str(args, "new_content", "memory_replace")?;
            memory.tool_replace_memory(label, old_content, new_content).await?;
            Ok(format!("Memory block \"{label}\" updated."))
        }
        "memory_insert" => {
            let label = require_str(args, "label", "memory_insert")?;
            let content = require_str(args, "content", "memory_insert")?;
            let position = match require_str(args, "position", "memory_insert")? {
                "beginning" => InsertPosition::Beginning,
                "end" => InsertPosition::End,
                other => {
                    return Err(AgentError::Validation(format!(
                        "memory_insert: position must be 'beginning' or 'end', got '{other}'"
                    )))
                }
            };
            memory.tool_insert_memory(label, content, position).await?;
            Ok(format!("Memory block \"{label}\" updated."))
        }
        "memory_create" => {
            let label = require_str(args, "label", "memory_create")?;
            let description = require_str(args, "description", "memory_create")?;
            let content = args.get("content").and_then(Value::as_str).unwrap_or("");
            memory
                .tool_create_memory(label, description, content, default_memory_block_limit)
                .await?;
            Ok(format!("Memory block \"{label}\" created."))
        }
        "memory_delete" => {
            let label = require_str(args, "label", "memory_delete")?;
            memory.tool_delete_memory(label).await
        }
        "file_read" => {
            let path = require_str(args, "path", "file_read")?;
            let entry = files.read(path).await?;
            Ok(entry.content)
        }
        "file_write" => {
            let path = require_str(args, "path", "file_write")?;
            let content = require_str(args, "content", "file_write")?;
            files.write(path, content).await?;
            Ok(format!("File \"{path}\" written."))
        }
        "file_list" => {
            let path = args.get("path").and_then(Value::as_str).unwrap_or("");
            files.get_file_tree(path).await
        }
        "file_delete" => {
            let path = require_str(args, "path", "file_delete")?;
            files.delete(path).await?;
            Ok(format!("File \"{path}\" deleted."))
        }
        "web_search" => {
            let query = require_str(args, "query", "web_search")?;
            let depth = match optional_str(args, "depth") {
                Some("deep") => SearchDepth::Deep,
                _ => SearchDepth::Standard,
            };
            web.search(query, depth).await
        }
        "web_fetch" => {
            let url = require_str(args, "url", "web_fetch")?;
            guarded_fetch(web, url).await
        }
        other => Err(AgentError::Validation(format!("Unknown tool: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::InMemoryFileStore;
    use crate::memory::InMemoryMemoryBackend;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use uuid::Uuid;

    struct NullWeb;

    #[async_trait]
    impl WebAdapter for NullWeb {
        async fn search(&self, _query: &str, _depth: SearchDepth) -> Result<String, AgentError> {
            Ok("no results".to_string())
        }
        async fn fetch(&self, _url: &str) -> Result<String, AgentError> {
            Ok("fetched".to_string())
        }
    }

    async fn fixtures() -> (MemoryRepository, FileStoreRepository) {
        let memory = MemoryRepository::load("a", Arc::new(InMemoryMemoryBackend::new())).await.unwrap();
        let files = FileStoreRepository::new("a", Arc::new(InMemoryFileStore::new()));
        (memory, files)
    }

    fn call(name: &str, args: Value) -> ToolCall {
        ToolCall {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            arguments: args,
        }
    }

    /// **Scenario**: memory_create makes a new block with the default limit.
    #[tokio::test]
    async fn memory_create_dispatches_to_tool_create_memory() {
        let (memory, files) = fixtures().await;
        let result = execute_tool(
            &call("memory_create", json!({"label": "test-block", "description": "d", "content": "hello"})),
            &memory,
            &files,
            &NullWeb,
            500,
        )
        .await
        .unwrap();
        assert!(result.contains("created"));
        assert_eq!(memory.get("test-block").await.unwrap().content, "hello");
    }

    /// **Scenario**: an unrecognized tool name surfaces "Unknown tool: ...".
    #[tokio::test]
    async fn unknown_tool_name_is_rejected() {
        let (memory, files) = fixtures().await;
        let err = execute_tool(&call("teleport", json!({})), &memory, &files, &NullWeb, 500)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown tool"));
    }

    /// **Scenario**: web_fetch rejects a non-public URL before the adapter is ever called.
    #[tokio::test]
    async fn web_fetch_rejects_ssrf_target() {
        let (memory, files) = fixtures().await;
        let err = execute_tool(
            &call("web_fetch", json!({"url": "http://169.254.169.254/latest/meta-data/"})),
            &memory,
            &files,
            &NullWeb,
            500,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AgentError::Forbidden(_)));
    }

    /// **Scenario**: file_write then file_read round-trips through the dispatcher.
    #[tokio::test]
    async fn file_write_then_file_read_round_trips() {
        let (memory, files) = fixtures().await;
        execute_tool(
            &call("file_write", json!({"path": "/notes.md", "content": "hi"})),
            &memory,
            &files,
            &NullWeb,
            500,
        )
        .await
        .unwrap();
        let read = execute_tool(&call("file_read", json!({"path": "/notes.md"})), &memory, &files, &NullWeb, 500)
            .await
            .unwrap();
        assert_eq!(read, "hi");
    }
}
