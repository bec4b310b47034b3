//! Durable storage for [`User`] rows.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::AgentError;

use super::user::User;

#[async_trait]
pub trait UserBackend: Send + Sync {
    async fn create(&self, user: &User) -> Result<(), AgentError>;
    async fn get(&self, id: Uuid) -> Result<User, AgentError>;
    async fn list_all(&self) -> Result<Vec<User>, AgentError>;
    /// Deletes the row only; per the Open Question recorded in `DESIGN.md`,
    /// any live in-process agent for this user is left untouched by the caller.
    async fn delete(&self, id: Uuid) -> Result<(), AgentError>;
}

#[derive(Default)]
pub struct InMemoryUserBackend {
    rows: DashMap<Uuid, User>,
}

impl InMemoryUserBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserBackend for InMemoryUserBackend {
    async fn create(&self, user: &User) -> Result<(), AgentError> {
        self.rows.insert(user.id, user.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<User, AgentError> {
        self.rows
            .get(&id)
            .map(|u| u.clone())
            .ok_or_else(|| AgentError::NotFound(format!("user '{id}'")))
    }

    async fn list_all(&self) -> Result<Vec<User>, AgentError> {
        Ok(self.rows.iter().map(|r| r.value().clone()).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AgentError> {
        self.rows
            .remove(&id)
            .ok_or_else(|| AgentError::NotFound(format!("user '{id}'")))?;
        Ok(())
    }
}
