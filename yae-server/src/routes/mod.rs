pub mod admin_users;
pub mod chat;
pub mod health;
pub mod verify;
pub mod webhooks;

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::middleware::rate_limit;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/verify", post(verify::verify))
        .route("/admin/users", post(admin_users::create_user).get(admin_users::list_users))
        .route("/admin/users/:id", delete(admin_users::delete_user))
        .route(
            "/admin/webhooks",
            post(webhooks::create_webhook).get(webhooks::list_webhooks),
        )
        .route("/admin/webhooks/:id", delete(webhooks::delete_webhook))
        .route("/admin/webhooks/:id/events", get(webhooks::list_events))
        .route("/webhooks/:slug", post(webhooks::ingest))
        .route("/chat", post(chat::chat))
        .route_layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit))
        .with_state(state)
}
