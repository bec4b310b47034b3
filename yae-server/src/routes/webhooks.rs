//! Admin registration (`/admin/webhooks`) and the public ingestion endpoint
//! (`POST /webhooks/:slug`), which implements the HMAC contract: a required
//! `X-Webhook-Timestamp`, an optional `X-Webhook-Signature` (checked in
//! constant time when present), a 5-minute freshness window, a 1 MiB body
//! cap, and `(webhook_id, external_id)` idempotency via `X-Webhook-Id`.

use axum::body::Bytes;
use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;
use yae_core::users::token::constant_time_eq;
use yae_core::webhooks::{Webhook, WebhookEvent};
use yae_core::yae::Yae;
use yae_core::AgentError;

use crate::auth::AdminOnly;
use crate::error::ApiError;

/// `ingest`'s error path needs a 413, which has no [`AgentError`] counterpart.
enum IngestError {
    TooLarge,
    Api(AgentError),
}

impl From<AgentError> for IngestError {
    fn from(err: AgentError) -> Self {
        IngestError::Api(err)
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        match self {
            IngestError::TooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(json!({ "error": "webhook body exceeds 1 MiB" })),
            )
                .into_response(),
            IngestError::Api(err) => ApiError(err).into_response(),
        }
    }
}

const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;
const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

#[derive(Deserialize)]
pub struct CreateWebhookRequest {
    pub name: String,
    pub slug: String,
    pub secret: String,
    #[serde(default)]
    pub target_user_id: Option<String>,
    #[serde(default)]
    pub target_workflow: Option<String>,
}

pub async fn create_webhook(
    AdminOnly(_admin): AdminOnly,
    Json(req): Json<CreateWebhookRequest>,
) -> Result<Json<Value>, ApiError> {
    let yae = Yae::get_instance()?;
    let mut webhook = Webhook::new(req.name, req.slug, req.secret, Utc::now());
    webhook.target_user_id = req.target_user_id;
    webhook.target_workflow = req.target_workflow;
    yae.webhooks().create_webhook(&webhook).await?;
    Ok(Json(json!({ "id": webhook.id, "slug": webhook.slug })))
}

pub async fn list_webhooks(AdminOnly(_admin): AdminOnly) -> Result<Json<Value>, ApiError> {
    let yae = Yae::get_instance()?;
    let webhooks = yae.webhooks().list_webhooks().await?;
    Ok(Json(json!({ "webhooks": webhooks })))
}

pub async fn delete_webhook(AdminOnly(_admin): AdminOnly, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    let yae = Yae::get_instance()?;
    yae.webhooks().delete_webhook(id).await?;
    Ok(())
}

pub async fn list_events(AdminOnly(_admin): AdminOnly, Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let yae = Yae::get_instance()?;
    let events = yae.webhooks().list_events(id, 100).await?;
    Ok(Json(json!({ "events": events })))
}

fn verify_signature(secret: &str, timestamp: &str, body: &[u8], signature_header: &str) -> bool {
    let candidate = signature_header.strip_prefix("sha256=").unwrap_or(signature_header);
    let mut mac = match Hmac::<Sha256>::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    let expected = mac.finalize().into_bytes();
    let expected_hex: String = expected.iter().map(|b| format!("{b:02x}")).collect();
    constant_time_eq(&expected_hex, candidate)
}

pub async fn ingest(
    Path(slug): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, IngestError> {
    if body.len() > MAX_WEBHOOK_BODY_BYTES {
        return Err(IngestError::TooLarge);
    }

    let yae = Yae::get_instance()?;
    let webhook = yae.webhooks().get_webhook_by_slug(&slug).await?;
    if !webhook.active {
        return Err(AgentError::NotFound(format!("webhook '{slug}'")).into());
    }

    let timestamp = headers
        .get("X-Webhook-Timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AgentError::Validation("missing X-Webhook-Timestamp".to_string()))?;
    let timestamp_secs: i64 = timestamp
        .parse()
        .map_err(|_| AgentError::Validation("X-Webhook-Timestamp is not a unix timestamp".to_string()))?;
    let age = (Utc::now().timestamp() - timestamp_secs).abs();
    if age > MAX_TIMESTAMP_SKEW_SECS {
        return Err(AgentError::Validation("X-Webhook-Timestamp is stale".to_string()).into());
    }

    if let Some(signature) = headers.get("X-Webhook-Signature").and_then(|v| v.to_str().ok()) {
        if !verify_signature(&webhook.secret, timestamp, &body, signature) {
            return Err(AgentError::Unauthorized("signature mismatch".to_string()).into());
        }
    }

    let payload: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let external_id = headers
        .get("X-Webhook-Id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let headers_json: Value = json!(headers
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.to_string(), v.to_string())))
        .collect::<std::collections::BTreeMap<_, _>>());

    let event = WebhookEvent::new(webhook.id, external_id, headers_json, payload, Utc::now());
    let stored = yae.webhooks().ingest(event).await?;
    Ok(Json(json!({ "event_id": stored.id })))
}
