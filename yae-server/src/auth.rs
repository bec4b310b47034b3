//! Bearer-token resolution. Every protected route pulls in [`Authed`] (any
//! recognized user) or [`AdminOnly`] (recognized and `Role::Admin`) as an
//! extractor; an unresolvable or missing token rejects the request before
//! the handler body runs.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use yae_core::users::{Role, User};
use yae_core::yae::Yae;
use yae_core::AgentError;

use crate::error::ApiError;

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    raw.strip_prefix("Bearer ").map(str::to_string)
}

pub struct Authed(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for Authed
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AgentError::Unauthorized("missing bearer token".to_string()))?;
        let yae = Yae::get_instance()?;
        let user = yae.users().get_user_by_token(&token).await?;
        Ok(Authed(user))
    }
}

pub struct AdminOnly(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authed(user) = Authed::from_request_parts(parts, state).await?;
        if user.role != Role::Admin {
            return Err(ApiError(AgentError::Forbidden("admin only".to_string())));
        }
        Ok(AdminOnly(user))
    }
}
