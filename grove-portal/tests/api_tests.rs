//! Integration tests for the portal API surface

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use grove_common::config::{DiscordConfig, PortalConfig};
use grove_common::events::EventBus;
use grove_portal::AppState;

/// Test helper: app with a temporary database and no external services
async fn create_test_app(config: PortalConfig) -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = grove_common::db::init_database(&dir.path().join("grove.db"))
        .await
        .expect("init database");

    let state = AppState::new(pool, EventBus::new(100), config);
    (grove_portal::build_router(state), dir)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "grove-portal");
}

#[tokio::test]
async fn project_crud_round_trip() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    // Create
    let response = app
        .clone()
        .oneshot(post_json(
            "/projects",
            json!({
                "name": "Coral Atlas",
                "wallet_address": "0xabc",
                "description": "Mapping reef health"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    assert_eq!(created["name"], "Coral Atlas");
    assert_eq!(created["level"], 1);
    let id = created["id"].as_str().unwrap().to_string();

    // Read
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/projects/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Update
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri(format!("/projects/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(json!({ "description": "Reef health atlas" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["description"], "Reef health atlas");
    assert_eq!(updated["name"], "Coral Atlas");

    // Delete
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/projects/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/projects/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_project_creation_is_rejected() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .oneshot(post_json(
            "/projects",
            json!({ "name": "  ", "wallet_address": "0xabc" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn webhook_message_counts_paper_exactly_once() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_json("/projects", json!({ "name": "P", "wallet_address": "0x1" })))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let payload = json!({
        "event": "message",
        "project_id": id,
        "activity": {
            "id": "msg-42",
            "text": "",
            "attachments": [
                { "filename": "2504.11091.pdf", "size_bytes": 1400000 }
            ]
        }
    });

    // Delivered twice (live handler + reconciliation replay)
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/webhook/discord", payload.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/projects/{id}/community"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["metrics"]["papers_shared"], 1);
    assert_eq!(status["metrics"]["messages_count"], 0);
}

#[tokio::test]
async fn webhook_requires_secret_when_configured() {
    let config = PortalConfig {
        discord: DiscordConfig {
            bot_token: None,
            webhook_secret: Some("hunter2".to_string()),
        },
        ..Default::default()
    };
    let (app, _dir) = create_test_app(config).await;

    let payload = json!({
        "event": "member_count",
        "project_id": uuid::Uuid::new_v4(),
        "member_count": 5
    });

    // Missing secret
    let response = app
        .clone()
        .oneshot(post_json("/webhook/discord", payload.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Wrong secret
    let mut request = post_json("/webhook/discord", payload);
    request
        .headers_mut()
        .insert("x-grove-webhook-secret", "wrong".parse().unwrap());
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bot_link_and_member_growth_cannot_skip_the_asset_gate() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_json("/projects", json!({ "name": "P", "wallet_address": "0x1" })))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            "/webhook/discord",
            json!({ "event": "bot_linked", "project_id": id, "guild_id": "g-1" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json(
            "/webhook/discord",
            json!({ "event": "member_count", "project_id": id, "member_count": 10 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    // Level 1 gate needs minted assets, so no transition from chatter alone
    assert_eq!(body["outcome"]["advanced"], false);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/projects/{id}/community"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = body_json(response).await;
    assert_eq!(status["metrics"]["member_count"], 10);
    assert_eq!(status["metrics"]["bot_linked"], true);
    assert_eq!(status["level"], 1);
}

#[tokio::test]
async fn manual_progress_check_reports_outcome() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_json("/projects", json!({ "name": "P", "wallet_address": "0x1" })))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(&format!("/projects/{id}/progress/check"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let outcome = body_json(response).await;
    assert_eq!(outcome["advanced"], false);
    assert_eq!(outcome["from_level"], 1);
}

#[tokio::test]
async fn mint_without_configured_service_is_bad_gateway() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_json("/projects", json!({ "name": "P", "wallet_address": "0x1" })))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(&format!("/projects/{id}/assets/idea/mint"), json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn chat_without_configured_relay_is_bad_gateway() {
    let (app, _dir) = create_test_app(PortalConfig::default()).await;

    let response = app
        .clone()
        .oneshot(post_json("/projects", json!({ "name": "P", "wallet_address": "0x1" })))
        .await
        .unwrap();
    let id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            &format!("/projects/{id}/chat"),
            json!({ "message": "How do we reach level 3?" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}
