// Integration tests for the credential and user-device admin routes

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use domotica::api::{create_admin_router, AdminAppState};
use domotica::credentials::SqliteCredentialRegistry;
use domotica::devices::{SqliteDeviceMappingStore, UserDeviceMapping};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    registry: Arc<SqliteCredentialRegistry>,
    devices: Arc<SqliteDeviceMappingStore>,
    _dir: TempDir,
}

fn create_test_app(admin_token: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(SqliteCredentialRegistry::new(dir.path().join("credentials.db")).unwrap());
    let devices = Arc::new(
        SqliteDeviceMappingStore::new(dir.path().join("devices.db").to_str().unwrap()).unwrap(),
    );

    let router = create_admin_router(AdminAppState {
        registry: registry.clone(),
        devices: devices.clone(),
        admin_token: admin_token.map(|t| t.to_string()),
    });

    TestApp {
        router,
        registry,
        devices,
        _dir: dir,
    }
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_register_list_and_revoke_card() {
    let app = create_test_app(None);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/credentials",
            json!({"card_uid": "04A1B2C3", "label": "Front door fob"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(app.registry.exists("04A1B2C3").unwrap());

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/credentials"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cards = body_json(response).await;
    assert_eq!(cards.as_array().unwrap().len(), 1);
    assert_eq!(cards[0]["card_uid"], "04A1B2C3");
    assert_eq!(cards[0]["label"], "Front door fob");

    let response = app
        .router
        .clone()
        .oneshot(empty_request("DELETE", "/api/credentials/04A1B2C3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(!app.registry.exists("04A1B2C3").unwrap());

    let response = app
        .router
        .oneshot(empty_request("DELETE", "/api/credentials/04A1B2C3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_blank_card_rejected() {
    let app = create_test_app(None);

    let response = app
        .router
        .oneshot(json_request("POST", "/api/credentials", json!({"card_uid": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "card_uid must not be empty");
    assert!(app.registry.list().unwrap().is_empty());
}

#[tokio::test]
async fn test_assign_and_remove_user_device() {
    let app = create_test_app(None);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/users/amzn1.ask.account.TEST/device",
            json!({"thing_name": "MiCasa"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["thing_name"], "MiCasa");
    assert_eq!(
        app.devices
            .device_for_user("amzn1.ask.account.TEST")
            .await
            .unwrap(),
        Some("MiCasa".to_string())
    );

    let response = app
        .router
        .clone()
        .oneshot(empty_request("DELETE", "/api/users/amzn1.ask.account.TEST/device"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .router
        .oneshot(empty_request("DELETE", "/api/users/amzn1.ask.account.TEST/device"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_token_required_when_configured() {
    let app = create_test_app(Some("s3cret"));

    let response = app
        .router
        .clone()
        .oneshot(json_request("POST", "/api/credentials", json!({"card_uid": "04A1B2C3"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(!app.registry.exists("04A1B2C3").unwrap());

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/api/credentials"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .method("POST")
        .uri("/api/credentials")
        .header("Content-Type", "application/json")
        .header("Authorization", "Bearer s3cret")
        .body(Body::from(json!({"card_uid": "04A1B2C3"}).to_string()))
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(app.registry.exists("04A1B2C3").unwrap());
}
