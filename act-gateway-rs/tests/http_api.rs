// HTTP-level tests for the ACT gateway.
//
// The router is exercised in-process with tower's oneshot; the engine behind
// the adapter is the real in-process engine with either the production
// worker or a purpose-built failing one.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use regex::Regex;
use serde_json::Value;
use tower::ServiceExt;

use act_core::workflow::WORKFLOW_NAME;
use act_core::{AllowAllChecker, AuthorizationChecker, DispatchAdapter};
use act_gateway::{build_router, start_engine, AppState};
use async_trait::async_trait;
use config_rs::EngineConfig;
use durable_engine::{EngineError, ExecutionEngine, InProcessEngine, Worker, WorkflowContext};

/// Checker that denies every token
struct DenyAllChecker;

#[async_trait]
impl AuthorizationChecker for DenyAllChecker {
    async fn checks(&self, _token: &str) -> bool {
        false
    }
}

fn test_engine_config() -> EngineConfig {
    EngineConfig {
        namespace: "act-usecases".to_string(),
        task_queue: "act-communication-task-queue".to_string(),
    }
}

async fn production_router() -> Router {
    let config = test_engine_config();
    let engine: Arc<dyn ExecutionEngine> = start_engine(&config).await;
    let adapter = Arc::new(DispatchAdapter::new(engine, &config));
    build_router(AppState {
        adapter,
        auth: Arc::new(AllowAllChecker),
    })
}

/// Router whose workflow fails with an explicit unit-of-work error
async fn failing_router(message: &'static str) -> Router {
    let config = test_engine_config();
    let engine = Arc::new(InProcessEngine::new(config.namespace.clone()));
    let mut worker = Worker::new(config.task_queue.clone());
    worker.register_workflow(WORKFLOW_NAME, move |_ctx: WorkflowContext, _input: Value| {
        async move { Err(EngineError::ActivityFailed(message.to_string())) }
    });
    engine.attach_worker(worker).await;

    let engine: Arc<dyn ExecutionEngine> = engine;
    let adapter = Arc::new(DispatchAdapter::new(engine, &config));
    build_router(AppState {
        adapter,
        auth: Arc::new(AllowAllChecker),
    })
}

/// Production router with every access token rejected
async fn denying_router() -> Router {
    let config = test_engine_config();
    let engine: Arc<dyn ExecutionEngine> = start_engine(&config).await;
    let adapter = Arc::new(DispatchAdapter::new(engine, &config));
    build_router(AppState {
        adapter,
        auth: Arc::new(DenyAllChecker),
    })
}

/// Router over an engine with no worker attached, so every submission fails
async fn engineless_router() -> Router {
    let config = test_engine_config();
    let engine: Arc<dyn ExecutionEngine> = Arc::new(InProcessEngine::new("act-usecases"));
    let adapter = Arc::new(DispatchAdapter::new(engine, &config));
    build_router(AppState {
        adapter,
        auth: Arc::new(AllowAllChecker),
    })
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = router
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    (status, body.to_vec())
}

#[tokio::test(start_paused = true)]
async fn dispatch_returns_normalized_status_and_null_error() {
    let router = production_router().await;
    let (status, body) = get(router, "/Network/v1/Provisioning/actRequest/REQ-42").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");

    let pattern =
        Regex::new(r"^act-communication-workflow-REQ-42 : run-[0-9a-f]{32} : COMPLETED$")
            .expect("valid regex");
    let status_field = json["status"].as_str().expect("status is a string");
    assert!(
        pattern.is_match(status_field),
        "unexpected status string: {}",
        status_field
    );
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn unauthorized_request_is_rejected_with_403() {
    let router = denying_router().await;
    let (status, body) = get(router, "/Network/v1/Provisioning/actRequest/REQ-42").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["error"], "Not Authorized");
}

#[tokio::test]
async fn unit_of_work_failure_maps_to_500_with_verbatim_message() {
    let router = failing_router("downstream unreachable").await;
    let (status, body) = get(router, "/Network/v1/Provisioning/actRequest/REQ-9").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["error"], Value::String("downstream unreachable".to_string()));
}

#[tokio::test]
async fn submission_failure_maps_to_500_submission_error() {
    let router = engineless_router().await;
    let (status, body) = get(router, "/Network/v1/Provisioning/actRequest/REQ-1").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    let message = json["error"].as_str().expect("error is a string");
    assert!(
        message.starts_with("workflow submission failed"),
        "unexpected error message: {}",
        message
    );
}

#[tokio::test]
async fn health_endpoint_reports_serving() {
    let router = production_router().await;
    let (status, body) = get(router, "/Network/v1/Provisioning/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["healthy"], Value::Bool(true));
    assert_eq!(json["service_name"], Value::String("act-gateway".to_string()));
    assert_eq!(json["status"], Value::String("SERVING".to_string()));
}

#[tokio::test]
async fn index_endpoint_returns_service_banner() {
    let router = production_router().await;
    let (status, body) = get(router, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8_lossy(&body), "Act Core Communication Flow");
}

#[tokio::test]
async fn info_endpoint_lists_routes() {
    let router = production_router().await;
    let (status, body) = get(router, "/Network/v1/Provisioning/info").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["service"], Value::String("ACT Dispatch Service".to_string()));
    assert!(json["endpoints"].as_array().map_or(false, |e| !e.is_empty()));
}

#[tokio::test]
async fn processing_details_is_not_implemented() {
    let router = production_router().await;
    let (status, body) = get(
        router,
        "/Network/v1/Provisioning/actRequest/REQ-42/processingDetails",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["status"], Value::String("NOT IMPLEMENTED".to_string()));
}

#[tokio::test]
async fn post_act_request_is_not_implemented() {
    let router = production_router().await;
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/Network/v1/Provisioning/actRequest")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json: Value = serde_json::from_slice(&body).expect("json body");
    assert_eq!(json["status"], Value::String("NOT IMPLEMENTED".to_string()));
}
