// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::helpers::create_test_app;
use axum::http::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_create_key_returns_plaintext_secret() {
    let app = create_test_app();

    let response = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "default", "environment": "development" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert_eq!(data["name"], "default");
    assert_eq!(data["environment"], "development");
    assert_eq!(data["usage_count"], 0);
    assert_eq!(data["rate_limit_rpm"], 100);
    assert!(data["secret"]
        .as_str()
        .unwrap()
        .starts_with("junfan-dev-"));
}

#[tokio::test]
async fn test_create_key_rejects_bad_input() {
    let app = create_test_app();

    let response = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "   ", "environment": "development" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], false);

    let response = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "ok", "environment": "staging" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_keys_masks_and_orders() {
    let app = create_test_app();

    for (name, env) in [
        ("alpha", "development"),
        ("bravo", "production"),
        ("charlie", "development"),
    ] {
        let response = app
            .server
            .post("/v1/keys")
            .json(&json!({ "name": name, "environment": env }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
    }

    let response = app.server.get("/v1/keys").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();

    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["charlie", "bravo", "alpha"]);

    for view in body["data"].as_array().unwrap() {
        let masked = view["masked_secret"].as_str().unwrap();
        assert!(masked.contains("**"));
        assert!(view.get("secret").is_none());
    }
}

#[tokio::test]
async fn test_list_keys_search_filter() {
    let app = create_test_app();

    for name in ["backend", "frontend", "Billing"] {
        app.server
            .post("/v1/keys")
            .json(&json!({ "name": name, "environment": "production" }))
            .await;
    }

    let response = app
        .server
        .get("/v1/keys")
        .add_query_param("search", "bill")
        .await;
    let body: Value = response.json();
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["name"], "Billing");
}

#[tokio::test]
async fn test_reveal_returns_minted_secret() {
    let app = create_test_app();

    let created: Value = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "copy me", "environment": "production" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let secret = created["data"]["secret"].as_str().unwrap().to_string();

    let response = app.server.get(&format!("/v1/keys/{}/secret", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["secret"], secret.as_str());

    let missing = app
        .server
        .get(&format!("/v1/keys/{}/secret", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_revoke_key_then_absent() {
    let app = create_test_app();

    let created: Value = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "doomed", "environment": "development" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = app.server.delete(&format!("/v1/keys/{}", id)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let again = app.server.delete(&format!("/v1/keys/{}", id)).await;
    assert_eq!(again.status_code(), StatusCode::NOT_FOUND);

    let listing: Value = app.server.get("/v1/keys").await.json();
    assert!(listing["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_playground_validates_and_counts_usage() {
    let app = create_test_app();

    let created: Value = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "playground", "environment": "development" }))
        .await
        .json();
    let secret = created["data"]["secret"].as_str().unwrap().to_string();

    let response = app
        .server
        .post("/v1/playground/validate")
        .json(&json!({ "api_key": secret }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["message"], "Valid API key");
    assert_eq!(body["data"]["usage_count"], 1);

    // Leading/trailing whitespace is tolerated
    let response = app
        .server
        .post("/v1/playground/validate")
        .json(&json!({ "api_key": format!("  {}  ", secret) }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["data"]["usage_count"], 2);
}

#[tokio::test]
async fn test_playground_rejects_uniformly() {
    let app = create_test_app();

    let created: Value = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "to delete", "environment": "production" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();
    let secret = created["data"]["secret"].as_str().unwrap().to_string();
    app.server.delete(&format!("/v1/keys/{}", id)).await;

    // A revoked secret and a never-issued one produce identical responses
    let revoked: Value = {
        let response = app
            .server
            .post("/v1/playground/validate")
            .json(&json!({ "api_key": secret }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        response.json()
    };
    let unknown: Value = {
        let response = app
            .server
            .post("/v1/playground/validate")
            .json(&json!({ "api_key": "junfan-prod-never-issued" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        response.json()
    };
    assert_eq!(revoked, unknown);
    assert_eq!(unknown["error"], "Invalid API key");
}

#[tokio::test]
async fn test_protected_route_requires_valid_key() {
    let app = create_test_app();

    let created: Value = app
        .server
        .post("/v1/keys")
        .json(&json!({ "name": "gate pass", "environment": "production" }))
        .await
        .json();
    let secret = created["data"]["secret"].as_str().unwrap().to_string();

    let denied = app.server.get("/v1/protected").await;
    assert_eq!(denied.status_code(), StatusCode::UNAUTHORIZED);

    let allowed = app
        .server
        .get("/v1/protected")
        .authorization_bearer(&secret)
        .await;
    assert_eq!(allowed.status_code(), StatusCode::OK);
    let body: Value = allowed.json();
    assert_eq!(body["data"]["rate_limit_rpm"], 1000);
    assert_eq!(body["data"]["usage_count"], 1);
}

#[tokio::test]
async fn test_health_and_version() {
    let app = create_test_app();

    let health = app.server.get("/health").await;
    assert_eq!(health.status_code(), StatusCode::OK);
    assert_eq!(health.text(), "OK");

    let version = app.server.get("/v1/version").await;
    assert_eq!(version.status_code(), StatusCode::OK);
}
