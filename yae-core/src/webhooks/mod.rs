//! Registered inbound webhooks and the event ledger used for idempotency.
//! Signature verification is the ingestion endpoint's job (`yae-server`);
//! this module only stores registrations and received events.

pub mod backend;
pub mod repository;
pub mod webhook;

pub use backend::{InMemoryWebhookBackend, WebhookBackend};
pub use repository::WebhookRepository;
pub use webhook::{Webhook, WebhookEvent, WebhookEventStatus};
