//! Runtime configuration loaded from the environment. Mirrors
//! [`crate::constants`] one-for-one, with each value overridable for
//! deployments that need a different worker pool size, timeout, or rate
//! limit than the compiled-in default.

use std::time::Duration;

use thiserror::Error;

use crate::constants::{
    DEFAULT_MEMORY_BLOCK_LIMIT, DEFAULT_POOL_SIZE, LLM_TIMEOUT_MS, MAX_AGENT_STEPS,
    MAX_CONVERSATION_HISTORY, MAX_TOOL_CONCURRENCY, MAX_TOOL_RESULT_CHARS,
    RATE_LIMIT_AUTHED_PER_MIN, RATE_LIMIT_PUBLIC_PER_MIN, SUMMARIZATION_CHUNK_SIZE, TOOL_TIMEOUT_MS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-wide configuration, loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub max_conversation_history: usize,
    pub max_agent_steps: u32,
    pub max_tool_result_chars: usize,
    pub max_tool_concurrency: usize,
    pub default_memory_block_limit: usize,
    pub llm_timeout: Duration,
    pub tool_timeout: Duration,
    pub pool_size: usize,
    pub summarization_chunk_size: usize,
    pub rate_limit_public_per_min: u32,
    pub rate_limit_authed_per_min: u32,
    pub bind_addr: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_conversation_history: MAX_CONVERSATION_HISTORY,
            max_agent_steps: MAX_AGENT_STEPS,
            max_tool_result_chars: MAX_TOOL_RESULT_CHARS,
            max_tool_concurrency: MAX_TOOL_CONCURRENCY,
            default_memory_block_limit: DEFAULT_MEMORY_BLOCK_LIMIT,
            llm_timeout: Duration::from_millis(LLM_TIMEOUT_MS),
            tool_timeout: Duration::from_millis(TOOL_TIMEOUT_MS),
            pool_size: DEFAULT_POOL_SIZE,
            summarization_chunk_size: SUMMARIZATION_CHUNK_SIZE,
            rate_limit_public_per_min: RATE_LIMIT_PUBLIC_PER_MIN,
            rate_limit_authed_per_min: RATE_LIMIT_AUTHED_PER_MIN,
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

fn parse_env<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Err(_) => Ok(default),
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            key,
            value: raw,
            reason: e.to_string(),
        }),
    }
}

impl AppConfig {
    /// Loads `.env` (if present) via `dotenv`, then overlays environment
    /// variables onto the compiled-in defaults. Unset variables keep the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            max_conversation_history: parse_env("MAX_CONVERSATION_HISTORY", defaults.max_conversation_history)?,
            max_agent_steps: parse_env("MAX_AGENT_STEPS", defaults.max_agent_steps)?,
            max_tool_result_chars: parse_env("MAX_TOOL_RESULT_CHARS", defaults.max_tool_result_chars)?,
            max_tool_concurrency: parse_env("MAX_TOOL_CONCURRENCY", defaults.max_tool_concurrency)?,
            default_memory_block_limit: parse_env(
                "DEFAULT_MEMORY_BLOCK_LIMIT",
                defaults.default_memory_block_limit,
            )?,
            llm_timeout: Duration::from_millis(parse_env("LLM_TIMEOUT_MS", LLM_TIMEOUT_MS)?),
            tool_timeout: Duration::from_millis(parse_env("TOOL_TIMEOUT_MS", TOOL_TIMEOUT_MS)?),
            pool_size: parse_env("POOL_SIZE", defaults.pool_size)?,
            summarization_chunk_size: parse_env("SUMMARIZATION_CHUNK_SIZE", defaults.summarization_chunk_size)?,
            rate_limit_public_per_min: parse_env("RATE_LIMIT_PUBLIC_PER_MIN", defaults.rate_limit_public_per_min)?,
            rate_limit_authed_per_min: parse_env("RATE_LIMIT_AUTHED_PER_MIN", defaults.rate_limit_authed_per_min)?,
            bind_addr: parse_env("BIND_ADDR", defaults.bind_addr)?,
        })
    }
}
