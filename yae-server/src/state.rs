use yae_core::config::AppConfig;

use crate::rate_limit::RateLimiter;

/// Shared state threaded through every handler via axum's `State` extractor.
/// The [`yae_core::yae::Yae`] singleton itself is reached through
/// `Yae::get_instance()` rather than stored here, since it's process-wide.
pub struct AppState {
    pub config: AppConfig,
    pub limiter: RateLimiter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            limiter: RateLimiter::new(),
        }
    }
}
