//! Thin pass-through over [`WebhookBackend`], kept as its own type for
//! symmetry with the other stores.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AgentError;

use super::backend::WebhookBackend;
use super::webhook::{is_valid_slug, Webhook, WebhookEvent};

pub struct WebhookRepository {
    backend: Arc<dyn WebhookBackend>,
}

impl WebhookRepository {
    pub fn new(backend: Arc<dyn WebhookBackend>) -> Self {
        Self { backend }
    }

    pub async fn create_webhook(&self, webhook: &Webhook) -> Result<(), AgentError> {
        if !is_valid_slug(&webhook.slug) {
            return Err(AgentError::Validation(format!(
                "webhook slug '{}' must match ^[a-z0-9][a-z0-9-]*$",
                webhook.slug
            )));
        }
        self.backend.create_webhook(webhook).await
    }

    pub async fn get_webhook(&self, id: Uuid) -> Result<Webhook, AgentError> {
        self.backend.get_webhook(id).await
    }

    pub async fn get_webhook_by_slug(&self, slug: &str) -> Result<Webhook, AgentError> {
        self.backend.get_webhook_by_slug(slug).await
    }

    pub async fn list_webhooks(&self) -> Result<Vec<Webhook>, AgentError> {
        self.backend.list_webhooks().await
    }

    pub async fn update_webhook(&self, webhook: &Webhook) -> Result<(), AgentError> {
        self.backend.update_webhook(webhook).await
    }

    pub async fn delete_webhook(&self, id: Uuid) -> Result<(), AgentError> {
        self.backend.delete_webhook(id).await
    }

    /// Records `event`, unless `external_id` is set and already present for
    /// this webhook — in which case the prior event is returned untouched.
    pub async fn ingest(&self, event: WebhookEvent) -> Result<WebhookEvent, AgentError> {
        if let Some(external_id) = event.external_id.as_deref() {
            if let Some(prior) = self
                .backend
                .find_event_by_external_id(event.webhook_id, external_id)
                .await?
            {
                return Ok(prior);
            }
        }
        self.backend.create_event(&event).await?;
        Ok(event)
    }

    pub async fn list_events(&self, webhook_id: Uuid, limit: usize) -> Result<Vec<WebhookEvent>, AgentError> {
        self.backend.list_events(webhook_id, limit).await
    }
}
