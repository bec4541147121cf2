//! Tests against a running server

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:3000";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_ready_reaches_the_database() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_create_get_and_delete_genre() {
    let client = Client::new();
    let name = format!("Live genre {}", std::process::id());

    let response = client
        .post(format!("{}/genres", BASE_URL))
        .json(&json!({ "genre": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    let id = body["id"].as_i64().expect("No genre ID");
    assert_eq!(body["genre"], name);

    let response = client
        .get(format!("{}/genres/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 200);

    let response = client
        .delete(format!("{}/genres/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/genres/{}", BASE_URL, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_reader_password_stays_hidden() {
    let client = Client::new();
    let email = format!("live-{}@example.org", std::process::id());

    let response = client
        .post(format!("{}/readers", BASE_URL))
        .json(&json!({
            "name": "Live Reader",
            "email": email,
            "password": "live-password"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.get("password").is_none());
    let id = body["id"].as_i64().expect("No reader ID");

    // Cleanup
    let _ = client
        .delete(format!("{}/readers/{}", BASE_URL, id))
        .send()
        .await;
}

#[tokio::test]
#[ignore]
async fn test_duplicate_author_is_rejected() {
    let client = Client::new();
    let name = format!("Live author {}", std::process::id());

    let first = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({ "author": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(first.status(), 201);
    let created: Value = first.json().await.expect("Failed to parse response");

    let second = client
        .post(format!("{}/authors", BASE_URL))
        .json(&json!({ "author": name }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(second.status(), 400);

    let _ = client
        .delete(format!("{}/authors/{}", BASE_URL, created["id"]))
        .send()
        .await;
}
