//! Binds a [`UserBackend`] to the one operation external callers actually
//! need beyond plain CRUD: resolving a bearer token to its owning user.

use std::sync::Arc;

use uuid::Uuid;

use crate::error::AgentError;

use super::backend::UserBackend;
use super::token::verify_token;
use super::user::User;

pub struct UserRepository {
    backend: Arc<dyn UserBackend>,
}

impl UserRepository {
    pub fn new(backend: Arc<dyn UserBackend>) -> Self {
        Self { backend }
    }

    pub async fn create(&self, user: &User) -> Result<(), AgentError> {
        self.backend.create(user).await
    }

    pub async fn get(&self, id: Uuid) -> Result<User, AgentError> {
        self.backend.get(id).await
    }

    pub async fn list_all(&self) -> Result<Vec<User>, AgentError> {
        self.backend.list_all().await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AgentError> {
        self.backend.delete(id).await
    }

    /// Scans every user, comparing the candidate token against each stored
    /// hash in constant time. Returns `Unauthorized` if none match.
    pub async fn get_user_by_token(&self, candidate_token: &str) -> Result<User, AgentError> {
        let users = self.backend.list_all().await?;
        users
            .into_iter()
            .find(|u| verify_token(candidate_token, &u.token_hash))
            .ok_or_else(|| AgentError::Unauthorized("unknown or invalid token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::backend::InMemoryUserBackend;
    use crate::users::token::{generate_token, hash_token};
    use crate::users::Role;
    use chrono::Utc;

    /// **Scenario**: a user is resolvable by the plaintext token that produced their stored hash.
    #[tokio::test]
    async fn get_user_by_token_resolves_matching_user() {
        let repo = UserRepository::new(Arc::new(InMemoryUserBackend::new()));
        let token = generate_token();
        let user = User::new("ada", hash_token(&token), Role::User, Utc::now());
        repo.create(&user).await.unwrap();

        let found = repo.get_user_by_token(&token).await.unwrap();
        assert_eq!(found.id, user.id);
    }

    /// **Scenario**: an unrecognized token is rejected as unauthorized.
    #[tokio::test]
    async fn get_user_by_token_rejects_unknown_token() {
        let repo = UserRepository::new(Arc::new(InMemoryUserBackend::new()));
        let err = repo.get_user_by_token("bogus").await.unwrap_err();
        assert!(matches!(err, AgentError::Unauthorized(_)));
    }
}
