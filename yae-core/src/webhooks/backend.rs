//! Durable storage for registered [`Webhook`]s and the [`WebhookEvent`]
//! ledger, including the `(webhook_id, external_id)` idempotency lookup the
//! ingestion endpoint consults before recording a new event.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AgentError;

use super::webhook::{Webhook, WebhookEvent};

#[async_trait]
pub trait WebhookBackend: Send + Sync {
    async fn create_webhook(&self, webhook: &Webhook) -> Result<(), AgentError>;
    async fn get_webhook(&self, id: Uuid) -> Result<Webhook, AgentError>;
    async fn get_webhook_by_slug(&self, slug: &str) -> Result<Webhook, AgentError>;
    async fn list_webhooks(&self) -> Result<Vec<Webhook>, AgentError>;
    async fn update_webhook(&self, webhook: &Webhook) -> Result<(), AgentError>;
    async fn delete_webhook(&self, id: Uuid) -> Result<(), AgentError>;

    /// Returns the existing event if `external_id` is `Some` and a row for
    /// `(webhook_id, external_id)` already exists.
    async fn find_event_by_external_id(
        &self,
        webhook_id: Uuid,
        external_id: &str,
    ) -> Result<Option<WebhookEvent>, AgentError>;

    async fn create_event(&self, event: &WebhookEvent) -> Result<(), AgentError>;
    async fn list_events(&self, webhook_id: Uuid, limit: usize) -> Result<Vec<WebhookEvent>, AgentError>;
}

#[derive(Default)]
pub struct InMemoryWebhookBackend {
    webhooks: DashMap<Uuid, Webhook>,
    slugs: DashMap<String, Uuid>,
    events: DashMap<Uuid, WebhookEvent>,
}

impl InMemoryWebhookBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WebhookBackend for InMemoryWebhookBackend {
    async fn create_webhook(&self, webhook: &Webhook) -> Result<(), AgentError> {
        if self.slugs.contains_key(&webhook.slug) {
            return Err(AgentError::Validation(format!("slug '{}' already in use", webhook.slug)));
        }
        self.slugs.insert(webhook.slug.clone(), webhook.id);
        self.webhooks.insert(webhook.id, webhook.clone());
        Ok(())
    }

    async fn get_webhook(&self, id: Uuid) -> Result<Webhook, AgentError> {
        self.webhooks
            .get(&id)
            .map(|w| w.clone())
            .ok_or_else(|| AgentError::NotFound(format!("webhook '{id}'")))
    }

    async fn get_webhook_by_slug(&self, slug: &str) -> Result<Webhook, AgentError> {
        let id = self
            .slugs
            .get(slug)
            .map(|id| *id)
            .ok_or_else(|| AgentError::NotFound(format!("webhook '{slug}'")))?;
        self.get_webhook(id).await
    }

    async fn list_webhooks(&self) -> Result<Vec<Webhook>, AgentError> {
        let mut rows: Vec<Webhook> = self.webhooks.iter().map(|w| w.value().clone()).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_webhook(&self, webhook: &Webhook) -> Result<(), AgentError> {
        if !self.webhooks.contains_key(&webhook.id) {
            return Err(AgentError::NotFound(format!("webhook '{}'", webhook.id)));
        }
        self.webhooks.insert(webhook.id, webhook.clone());
        Ok(())
    }

    async fn delete_webhook(&self, id: Uuid) -> Result<(), AgentError> {
        let (_, webhook) = self
            .webhooks
            .remove(&id)
            .ok_or_else(|| AgentError::NotFound(format!("webhook '{id}'")))?;
        self.slugs.remove(&webhook.slug);
        Ok(())
    }

    async fn find_event_by_external_id(
        &self,
        webhook_id: Uuid,
        external_id: &str,
    ) -> Result<Option<WebhookEvent>, AgentError> {
        let found = self
            .events
            .iter()
            .find(|e| e.webhook_id == webhook_id && e.external_id.as_deref() == Some(external_id))
            .map(|e| e.value().clone());
        Ok(found)
    }

    async fn create_event(&self, event: &WebhookEvent) -> Result<(), AgentError> {
        self.events.insert(event.id, event.clone());
        Ok(())
    }

    async fn list_events(&self, webhook_id: Uuid, limit: usize) -> Result<Vec<WebhookEvent>, AgentError> {
        let mut rows: Vec<WebhookEvent> = self
            .events
            .iter()
            .filter(|e| e.webhook_id == webhook_id)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| b.received_at.cmp(&a.received_at));
        rows.truncate(limit);
        Ok(rows)
    }
}
