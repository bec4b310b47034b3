//! A registered inbound webhook and the events received through it. Signature
//! verification itself lives outside the core (spec §1 lists it as an
//! external collaborator); this module only models the registration and the
//! idempotency ledger the ingestion endpoint reads and writes against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub id: Uuid,
    pub name: String,
    /// Unique, `^[a-z0-9][a-z0-9-]*$`. [`super::repository::WebhookRepository::create_webhook`]
    /// validates the pattern; the backend enforces uniqueness.
    pub slug: String,
    pub secret: String,
    pub target_user_id: Option<String>,
    pub target_workflow: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Whether `slug` matches `^[a-z0-9][a-z0-9-]*$`.
pub fn is_valid_slug(slug: &str) -> bool {
    let mut chars = slug.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

impl Webhook {
    pub fn new(
        name: impl Into<String>,
        slug: impl Into<String>,
        secret: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            slug: slug.into(),
            secret: secret.into(),
            target_user_id: None,
            target_workflow: None,
            active: true,
            created_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventStatus {
    Received,
    Dispatched,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub id: Uuid,
    pub webhook_id: Uuid,
    pub external_id: Option<String>,
    pub headers: Value,
    pub payload: Value,
    pub status: WebhookEventStatus,
    pub error: Option<String>,
    pub received_at: DateTime<Utc>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl WebhookEvent {
    pub fn new(
        webhook_id: Uuid,
        external_id: Option<String>,
        headers: Value,
        payload: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            webhook_id,
            external_id,
            headers,
            payload,
            status: WebhookEventStatus::Received,
            error: None,
            received_at: now,
            processed_at: None,
        }
    }
}
