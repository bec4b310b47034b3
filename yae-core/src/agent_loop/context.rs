//! Assembles the deterministic context string an agent sees at the top of
//! every step: current time, core memory, and the file tree.

use chrono::{DateTime, Utc};

use crate::error::AgentError;
use crate::files::FileStoreRepository;
use crate::memory::MemoryRepository;

/// Builds the context block from `now` plus the current memory and file
/// tree snapshots. `now` is threaded in rather than read internally so the
/// function stays deterministic for callers that need to reproduce a step.
pub async fn build_context(
    now: DateTime<Utc>,
    memory: &MemoryRepository,
    files: &FileStoreRepository,
) -> Result<String, AgentError> {
    let memory_xml = memory.to_xml().await;
    let file_tree = files.get_file_tree("").await?;

    Ok(format!(
        "<context><current_time>{}</current_time>{memory_xml}<files>{file_tree}</files></context>",
        now.to_rfc3339(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::files::InMemoryFileStore;
    use crate::memory::InMemoryMemoryBackend;
    use std::sync::Arc;

    /// **Scenario**: the context string carries the timestamp, memory, and file tree sections.
    #[tokio::test]
    async fn context_carries_all_three_sections() {
        let memory = MemoryRepository::load("a", Arc::new(InMemoryMemoryBackend::new())).await.unwrap();
        let files = FileStoreRepository::new("a", Arc::new(InMemoryFileStore::new()));
        files.write("/notes.md", "hi").await.unwrap();

        let now = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&Utc);
        let ctx = build_context(now, &memory, &files).await.unwrap();

        assert!(ctx.contains("2026-01-01T00:00:00+00:00"));
        assert!(ctx.contains("<memory>"));
        assert!(ctx.contains("notes.md"));
    }
}
