//! Customer registration and listing.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use merchant_bank_integration_tests::TestApp;

#[tokio::test]
async fn test_list_hides_password_digests() {
    let app = TestApp::new().await;
    app.register("alice", "secret123").await;

    let response = app.get("/api/customers").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body,
        json!([{ "id": "1", "username": "alice", "logged_in": false }])
    );

    let stored = std::fs::read_to_string(app.data_dir().join("customer.json")).unwrap();
    assert!(stored.contains("\"password\": \"$argon2id$"));
    assert!(!stored.contains("secret123"));
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::new().await;

    let response = app.register("alice smith", "secret123").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "invalid_username");

    let response = app.register("alice", "short").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "weak_password");

    let response = app.post("/api/customers", &json!({ "username": "alice" })).await;
    assert!(response.status.is_client_error());
}

#[tokio::test]
async fn test_unique_usernames_toggle() {
    let lenient = TestApp::new().await;
    assert_eq!(lenient.register("alice", "secret123").await.status, StatusCode::CREATED);
    assert_eq!(lenient.register("alice", "secret456").await.status, StatusCode::CREATED);

    let strict = TestApp::with_unique_usernames(true).await;
    assert_eq!(strict.register("alice", "secret123").await.status, StatusCode::CREATED);
    let duplicate = strict.register("alice", "secret456").await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);
    assert_eq!(duplicate.body["error"], "username_taken");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registrations() {
    const N: usize = 20;
    let app = Arc::new(TestApp::new().await);

    let mut handles = Vec::new();
    for i in 0..N {
        let app = Arc::clone(&app);
        handles.push(tokio::spawn(async move {
            app.register(&format!("user{i}"), "secret123").await.status
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::CREATED);
    }

    let customers = app.state().customers().list_all().await.unwrap();
    assert_eq!(customers.len(), N);

    let mut ids: Vec<usize> = customers
        .iter()
        .filter_map(|c| c.id.sequence_number())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=N).collect::<Vec<_>>());
}
