//! `POST /verify` — the extractor itself does the verification; a handler
//! that type-checks means the token resolved to a real user.

use axum::Json;
use serde_json::{json, Value};

use crate::auth::Authed;

pub async fn verify(Authed(user): Authed) -> Json<Value> {
    Json(json!({
        "user_id": user.id,
        "name": user.name,
        "role": user.role,
    }))
}
