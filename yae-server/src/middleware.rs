//! The rate-limit layer applied to every route: keyed by bearer token when
//! one is present (authed rate), otherwise by peer address (public rate).

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use axum::Json;

use crate::auth::bearer_token;
use crate::state::AppState;

pub async fn rate_limit(State(state): State<Arc<AppState>>, req: Request<Body>, next: Next) -> Response {
    let token = bearer_token(req.headers());
    let (key, limit) = match &token {
        Some(t) => (t.clone(), state.config.rate_limit_authed_per_min),
        None => {
            let peer = req
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            (peer, state.config.rate_limit_public_per_min)
        }
    };

    if !state.limiter.check(&key, limit) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({ "error": "rate limit exceeded" })),
        )
            .into_response();
    }

    next.run(req).await
}
