mod common;

#[tokio::test]
async fn verify_accepts_the_admin_token() {
    let (base_url, admin_token, _handle) = common::spawn_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/verify"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn verify_rejects_an_unrecognized_token() {
    let (base_url, _admin_token, _handle) = common::spawn_server().await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/verify"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn verify_rejects_a_missing_token() {
    let (base_url, _admin_token, _handle) = common::spawn_server().await;

    let resp = reqwest::Client::new()
        .post(format!("{base_url}/verify"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 401);
}
