//! HTTP surface for Yae (axum): health, admin user/webhook management,
//! webhook ingestion, and the streaming chat endpoint.
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`].

mod auth;
mod error;
mod middleware;
mod rate_limit;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::info;
use yae_core::agent_loop::{LlmAdapter, WebAdapter};
use yae_core::config::AppConfig;
use yae_core::yae::Yae;

use routes::router;
use state::AppState;

const DEFAULT_ADDR: &str = "0.0.0.0:8080";

/// Initializes the [`Yae`] singleton, logs the one-time admin token, and
/// serves on an already-bound listener. Used directly by tests (bind to
/// `127.0.0.1:0` so the OS picks a free port).
pub async fn run_serve_on_listener(
    listener: TcpListener,
    llm: Arc<dyn LlmAdapter>,
    web: Arc<dyn WebAdapter>,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    run_serve_on_listener_with_ready(listener, llm, web, config, None).await
}

/// As [`run_serve_on_listener`], but reports the one-time admin token on
/// `ready` as soon as initialization completes and before the accept loop
/// starts — tests use this to grab the token without a second, failing call
/// to [`Yae::initialize`].
pub async fn run_serve_on_listener_with_ready(
    listener: TcpListener,
    llm: Arc<dyn LlmAdapter>,
    web: Arc<dyn WebAdapter>,
    config: AppConfig,
    ready: Option<oneshot::Sender<String>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("yae-server listening on http://{addr}");

    let admin_token = Yae::initialize(llm, web, config.pool_size).await?;
    info!("admin token (shown once): {admin_token}");
    if let Some(ready) = ready {
        let _ = ready.send(admin_token);
    }

    let state = Arc::new(AppState::new(config));
    let app = router(state);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

/// Binds `addr` (default `0.0.0.0:8080`, or [`AppConfig::bind_addr`] when
/// `addr` is `None`) and serves forever.
pub async fn run_serve(
    addr: Option<&str>,
    llm: Arc<dyn LlmAdapter>,
    web: Arc<dyn WebAdapter>,
    config: AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bind_addr = addr.map(str::to_string).unwrap_or_else(|| {
        if config.bind_addr.is_empty() {
            DEFAULT_ADDR.to_string()
        } else {
            config.bind_addr.clone()
        }
    });
    let listener = TcpListener::bind(&bind_addr).await?;
    run_serve_on_listener(listener, llm, web, config).await
}
