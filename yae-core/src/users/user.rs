//! A registered caller: either an ordinary user or an admin, identified by a
//! bearer token whose hash — never the plaintext — is what gets stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// SHA-256 hex digest of the bearer token; see [`super::token::hash_token`].
    pub token_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: impl Into<String>, token_hash: impl Into<String>, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            token_hash: token_hash.into(),
            role,
            created_at: now,
        }
    }
}
