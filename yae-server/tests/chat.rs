mod common;

use futures::StreamExt;
use serde_json::json;

#[tokio::test]
async fn chat_streams_an_echoed_reply() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/chat"))
        .bearer_auth(&admin_token)
        .json(&json!({ "message": "hello there" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let mut stream = resp.bytes_stream();
    let mut collected = String::new();
    while let Some(chunk) = tokio::time::timeout(std::time::Duration::from_secs(5), stream.next())
        .await
        .unwrap()
    {
        collected.push_str(&String::from_utf8_lossy(&chunk.unwrap()));
        if collected.contains("event: message") {
            break;
        }
    }

    assert!(collected.contains("event: message"), "got: {collected}");
    assert!(collected.contains("hello there"), "got: {collected}");
}

#[tokio::test]
async fn chat_rejects_an_unauthenticated_caller() {
    let (base_url, _admin_token, _handle) = common::spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/chat"))
        .json(&json!({ "message": "hello" }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}
