//! Admin-only user management: `POST/GET /admin/users`, `DELETE /admin/users/:id`.

use axum::extract::Path;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;
use yae_core::users::token::{generate_token, hash_token};
use yae_core::users::{Role, User};
use yae_core::yae::Yae;

use crate::auth::AdminOnly;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    #[serde(default)]
    pub admin: bool,
}

/// Creates a user and returns the plaintext token once — it is never
/// retrievable again.
pub async fn create_user(
    AdminOnly(_admin): AdminOnly,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<Value>, ApiError> {
    let yae = Yae::get_instance()?;
    let token = generate_token();
    let role = if req.admin { Role::Admin } else { Role::User };
    let user = User::new(req.name, hash_token(&token), role, Utc::now());
    yae.users().create(&user).await?;
    Ok(Json(json!({
        "id": user.id,
        "name": user.name,
        "role": user.role,
        "token": token,
    })))
}

pub async fn list_users(AdminOnly(_admin): AdminOnly) -> Result<Json<Value>, ApiError> {
    let yae = Yae::get_instance()?;
    let users = yae.users().list_all().await?;
    let rows: Vec<Value> = users
        .into_iter()
        .map(|u| json!({ "id": u.id, "name": u.name, "role": u.role, "created_at": u.created_at }))
        .collect();
    Ok(Json(json!({ "users": rows })))
}

/// Removes the user's row from the admin datastore. Their in-process agent,
/// if any, is left untouched (see DESIGN.md).
pub async fn delete_user(AdminOnly(_admin): AdminOnly, Path(id): Path<Uuid>) -> Result<(), ApiError> {
    let yae = Yae::get_instance()?;
    yae.users().delete(id).await?;
    Ok(())
}
