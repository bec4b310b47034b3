mod common;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

fn sign(secret: &str, timestamp: &str, body: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body.as_bytes());
    let digest = mac.finalize().into_bytes();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("sha256={hex}")
}

async fn register_webhook(
    client: &reqwest::Client,
    base_url: &str,
    admin_token: &str,
    slug: &str,
    secret: &str,
) {
    let resp = client
        .post(format!("{base_url}/admin/webhooks"))
        .bearer_auth(admin_token)
        .json(&json!({ "name": slug, "slug": slug, "secret": secret }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn ingest_accepts_a_correctly_signed_event() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let body = json!({ "order_id": 1 }).to_string();
    let timestamp = Utc::now().timestamp().to_string();
    let signature = sign("shh", &timestamp, &body);

    let resp = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .header("X-Webhook-Signature", &signature)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn ingest_rejects_a_wrong_signature() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let body = json!({ "order_id": 1 }).to_string();
    let timestamp = Utc::now().timestamp().to_string();

    let resp = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .header("X-Webhook-Signature", "sha256=deadbeef")
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn ingest_rejects_a_stale_timestamp() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let body = json!({ "order_id": 1 }).to_string();
    let stale_timestamp = (Utc::now().timestamp() - 10_000).to_string();
    let signature = sign("shh", &stale_timestamp, &body);

    let resp = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &stale_timestamp)
        .header("X-Webhook-Signature", &signature)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn ingest_rejects_a_body_over_one_mebibyte() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let oversized = "x".repeat(1024 * 1024 + 1);
    let timestamp = Utc::now().timestamp().to_string();

    let resp = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .body(oversized)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 413);
}

#[tokio::test]
async fn ingest_is_idempotent_on_webhook_id() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let body = json!({ "order_id": 1 }).to_string();
    let timestamp = Utc::now().timestamp().to_string();

    let first = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .header("X-Webhook-Id", "evt-1")
        .header("Content-Type", "application/json")
        .body(body.clone())
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), 200);
    let first: serde_json::Value = first.json().await.unwrap();

    let retry = client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .header("X-Webhook-Id", "evt-1")
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(retry.status(), 200);
    let retry: serde_json::Value = retry.json().await.unwrap();

    assert_eq!(first["event_id"], retry["event_id"]);
}

#[tokio::test]
async fn admin_lists_events_and_deletes_a_webhook() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();
    register_webhook(&client, &base_url, &admin_token, "orders", "shh").await;

    let listed = client
        .get(format!("{base_url}/admin/webhooks"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(listed.status(), 200);
    let listed: serde_json::Value = listed.json().await.unwrap();
    let webhook_id = listed["webhooks"][0]["id"].as_str().unwrap().to_string();

    let body = json!({ "order_id": 1 }).to_string();
    let timestamp = Utc::now().timestamp().to_string();
    client
        .post(format!("{base_url}/webhooks/orders"))
        .header("X-Webhook-Timestamp", &timestamp)
        .header("Content-Type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();

    let events = client
        .get(format!("{base_url}/admin/webhooks/{webhook_id}/events"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(events.status(), 200);
    let events: serde_json::Value = events.json().await.unwrap();
    assert_eq!(events["events"].as_array().unwrap().len(), 1);

    let deleted = client
        .delete(format!("{base_url}/admin/webhooks/{webhook_id}"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);
}
