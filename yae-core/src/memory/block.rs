//! A single labelled memory block kept in an agent's core memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One block of an agent's always-in-context memory.
///
/// `limit`, when set, bounds `content`'s character count; writes that would
/// exceed it are rejected rather than silently truncated. `protected` blocks
/// can't be deleted; `read_only` blocks can't be replaced or appended to
/// (both can still be read and rendered).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryBlock {
    pub label: String,
    pub description: String,
    pub content: String,
    pub updated_at: DateTime<Utc>,
    pub protected: bool,
    pub read_only: bool,
    pub limit: Option<usize>,
}

impl MemoryBlock {
    pub fn new(
        label: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            content: content.into(),
            updated_at,
            protected: false,
            read_only: false,
            limit: None,
        }
    }

    pub fn protected(mut self, protected: bool) -> Self {
        self.protected = protected;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Whether `content` could grow by `additional` chars without exceeding
    /// `limit`. Unlimited blocks (`limit: None`) always fit.
    pub fn fits_additional(&self, additional: usize) -> bool {
        match self.limit {
            Some(limit) => self.char_len() + additional <= limit,
            None => true,
        }
    }

    /// Renders as `<block label="…"><description>…</description><content>…</content></block>`,
    /// the unit [`super::repository::MemoryRepository::to_xml`] wraps in `<memory>`.
    pub fn to_xml_fragment(&self) -> String {
        format!(
            "<block label=\"{label}\"><description>{description}</description><content>{content}</content></block>",
            label = self.label,
            description = self.description,
            content = self.content,
        )
    }
}
