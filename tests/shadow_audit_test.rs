// Reported state posted over HTTP flows through the diff processor into the audit log

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use domotica::api::{create_history_router, create_shadow_router, HistoryAppState, ShadowAppState};
use domotica::audit::{AuditRecord, SqliteAuditStore};
use domotica::shadow::MemoryShadowService;
use domotica::state::{StateChangeProcessor, StateDiffEngine};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

fn create_test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let audit = Arc::new(SqliteAuditStore::new(dir.path().join("audit.db").to_str().unwrap()).unwrap());
    let shadow = Arc::new(MemoryShadowService::new());

    let processor = Arc::new(StateChangeProcessor::new(
        StateDiffEngine::default(),
        audit.clone(),
    ));
    tokio::spawn(processor.run(shadow.subscribe_documents()));

    let router = create_shadow_router(Arc::new(ShadowAppState { shadow }))
        .merge(create_history_router(Arc::new(HistoryAppState { audit })));

    (router, dir)
}

async fn post_reported(router: &Router, body: serde_json::Value) -> StatusCode {
    router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/shadow/MiCasa/reported")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn history(router: &Router, actuator_id: &str) -> Vec<AuditRecord> {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(format!("/api/audit/{}", actuator_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Poll until the processor has written what we expect
async fn wait_for_history(router: &Router, actuator_id: &str) -> Vec<AuditRecord> {
    for _ in 0..100 {
        let records = history(router, actuator_id).await;
        if !records.is_empty() {
            return records;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("no audit records for {}", actuator_id);
}

#[tokio::test]
async fn test_reported_changes_are_audited() {
    let (router, _dir) = create_test_app();

    assert_eq!(
        post_reported(&router, json!({"luz_cocina": "OFF"})).await,
        StatusCode::OK
    );
    let first = wait_for_history(&router, "MiCasa_luz_cocina").await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].new_state, "OFF");
    assert_eq!(first[0].previous_state, None);
    assert_eq!(first[0].actuator_type, "luz");
    assert_eq!(first[0].location, "cocina");

    assert_eq!(
        post_reported(&router, json!({"luz_cocina": "OFF", "puerta_cocina": "CLOSED"})).await,
        StatusCode::OK
    );
    let door = wait_for_history(&router, "MiCasa_puerta_cocina").await;
    assert_eq!(door.len(), 1);
    assert_eq!(door[0].new_state, "CLOSED");
    assert_eq!(door[0].actuator_type, "puerta");

    // Unchanged light produced no second record
    let light = history(&router, "MiCasa_luz_cocina").await;
    assert_eq!(light.len(), 1);
}

#[tokio::test]
async fn test_unknown_actuator_has_empty_history() {
    let (router, _dir) = create_test_app();
    assert!(history(&router, "MiCasa_ventana_sala").await.is_empty());
}

#[tokio::test]
async fn test_get_shadow_document() {
    let (router, _dir) = create_test_app();

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/shadow/MiCasa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    post_reported(&router, json!({"ventana_sala": "OPEN"})).await;

    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/shadow/MiCasa")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let document: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(document["state"]["reported"]["ventana_sala"], "OPEN");
    assert_eq!(document["version"], 1);
}
