mod common;

#[tokio::test]
async fn health_returns_200() {
    let (base_url, _admin_token, _handle) = common::spawn_server().await;

    let resp = reqwest::get(format!("{base_url}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
}
