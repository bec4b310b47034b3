//! Crate-wide error type.
//!
//! One enum for every error kind distinguished by the core (spec §7): timeouts,
//! validation, auth, not-found, upstream/provider failures, internal bugs, and
//! stale workflow runs. Graph-engine and store errors convert into this type at
//! their call boundaries so callers deal with one error type end to end.

use thiserror::Error;

/// Error produced anywhere in the core.
#[derive(Debug, Error)]
pub enum AgentError {
    /// A task (tool call, LLM call, node `exec`) exceeded its deadline.
    #[error("timeout: {0}")]
    Timeout(String),

    /// Malformed input: bad slug, missing label, `old_content` mismatch, etc.
    #[error("validation: {0}")]
    Validation(String),

    /// Missing or unrecognized credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Recognized credential, disallowed action (e.g. blocked URL).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unknown user/webhook/label/run.
    #[error("not found: {0}")]
    NotFound(String),

    /// The LLM or an external provider failed.
    #[error("upstream: {0}")]
    Upstream(String),

    /// Unexpected internal failure; logged with detail, surfaced generically.
    #[error("internal: {0}")]
    Internal(String),

    /// A `running` workflow row observed at startup, swept to `failed`.
    #[error("stale run: {0}")]
    StaleRun(String),
}

impl AgentError {
    /// True for errors that are safe to retry (timeouts only, for now).
    pub fn is_retryable(&self) -> bool {
        matches!(self, AgentError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each variant contains a recognizable keyword.
    #[test]
    fn agent_error_display_all_variants() {
        assert!(AgentError::Timeout("t".into())
            .to_string()
            .contains("timeout"));
        assert!(AgentError::Validation("v".into())
            .to_string()
            .contains("validation"));
        assert!(AgentError::Unauthorized("u".into())
            .to_string()
            .contains("unauthorized"));
        assert!(AgentError::Forbidden("f".into())
            .to_string()
            .contains("forbidden"));
        assert!(AgentError::NotFound("n".into())
            .to_string()
            .contains("not found"));
        assert!(AgentError::Upstream("p".into())
            .to_string()
            .contains("upstream"));
        assert!(AgentError::Internal("i".into())
            .to_string()
            .contains("internal"));
        assert!(AgentError::StaleRun("s".into())
            .to_string()
            .contains("stale run"));
    }

    /// **Scenario**: only Timeout is retry-eligible.
    #[test]
    fn only_timeout_is_retryable() {
        assert!(AgentError::Timeout("x".into()).is_retryable());
        assert!(!AgentError::Validation("x".into()).is_retryable());
        assert!(!AgentError::Internal("x".into()).is_retryable());
    }
}
