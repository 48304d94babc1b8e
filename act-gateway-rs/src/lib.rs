// act-gateway-rs/src/lib.rs
// HTTP boundary for the ACT dispatch service
//
// Parses path parameters into ACT requests, hands them to the dispatch
// adapter, and serializes the result or error to JSON. The boundary holds
// typed handles to its collaborators, constructed once at startup.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::header::HeaderMap,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use once_cell::sync::Lazy;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use act_core::activity::execute_act_request_operation;
use act_core::workflow::{act_request_workflow, ACTIVITY_NAME, WORKFLOW_NAME};
use act_core::{ActRequest, AuthorizationChecker, DispatchAdapter, DispatchError};
use config_rs::EngineConfig;
use durable_engine::{InProcessEngine, Worker};

/// Maximum accepted request payload size (1MB)
pub const MAX_PAYLOAD_SIZE: usize = 1024 * 1024;

/// Service start time for uptime reporting
pub static START_TIME: Lazy<Instant> = Lazy::new(Instant::now);

/// Shared application state: typed handles injected at startup
pub struct AppState {
    pub adapter: Arc<DispatchAdapter>,
    pub auth: Arc<dyn AuthorizationChecker>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    healthy: bool,
    service_name: String,
    uptime_seconds: i64,
    status: String,
}

/// Create the in-process engine and attach the ACT worker to its task queue,
/// mirroring the worker that runs alongside the HTTP server.
pub async fn start_engine(config: &EngineConfig) -> Arc<InProcessEngine> {
    let engine = Arc::new(InProcessEngine::new(config.namespace.clone()));

    log::info!("registering workflows and activities...");
    let mut worker = Worker::new(config.task_queue.clone());
    worker.register_workflow(WORKFLOW_NAME, act_request_workflow);
    worker.register_activity(ACTIVITY_NAME, execute_act_request_operation);
    engine.attach_worker(worker).await;

    engine
}

/// Build the gateway router with permissive CORS and a request size limit
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/Network/v1/Provisioning/health", get(health_handler))
        .route("/Network/v1/Provisioning/info", get(info_handler))
        .route(
            "/Network/v1/Provisioning/actRequest/:identifier_id",
            get(get_act_request_handler),
        )
        .route(
            "/Network/v1/Provisioning/actRequest/:identifier_id/processingDetails",
            get(processing_details_handler),
        )
        .route(
            "/Network/v1/Provisioning/actRequest",
            post(post_act_request_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(MAX_PAYLOAD_SIZE))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// GET / - Index endpoint
async fn index_handler() -> impl IntoResponse {
    "Act Core Communication Flow"
}

/// GET /Network/v1/Provisioning/health - Health check endpoint
async fn health_handler() -> impl IntoResponse {
    let uptime = START_TIME.elapsed().as_secs() as i64;
    Json(HealthResponse {
        healthy: true,
        service_name: "act-gateway".to_string(),
        uptime_seconds: uptime,
        status: "SERVING".to_string(),
    })
}

/// GET /Network/v1/Provisioning/info - Service info endpoint
async fn info_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "ACT Dispatch Service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /Network/v1/Provisioning/health",
            "GET /Network/v1/Provisioning/info",
            "GET /Network/v1/Provisioning/actRequest/{identifierID}",
            "GET /Network/v1/Provisioning/actRequest/{identifierID}/processingDetails",
            "POST /Network/v1/Provisioning/actRequest"
        ]
    }))
}

/// GET /Network/v1/Provisioning/actRequest/{identifierID}
///
/// Dispatches an ACT request as a durable execution and holds the connection
/// open until the engine reports completion. Closing the connection does not
/// cancel the execution; it runs to completion unattended.
async fn get_act_request_handler(
    State(state): State<Arc<AppState>>,
    Path(identifier_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let token = headers
        .get("accessToken")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !state.auth.checks(token).await {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "Not Authorized".to_string(),
            }),
        )
            .into_response();
    }

    log::info!("act request received: identifier_id={}", identifier_id);

    let request = ActRequest::with_identifier(identifier_id);
    match state.adapter.submit_and_await(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => dispatch_error_response(err),
    }
}

/// GET .../processingDetails - Placeholder endpoint
async fn processing_details_handler(Path(_identifier_id): Path<String>) -> impl IntoResponse {
    Json(serde_json::json!({"status": "NOT IMPLEMENTED"}))
}

/// POST /Network/v1/Provisioning/actRequest - Placeholder endpoint
async fn post_act_request_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "NOT IMPLEMENTED"}))
}

/// Map a dispatch failure to a JSON error body. Submission and wait failures
/// are both server-side faults from the caller's perspective.
fn dispatch_error_response(err: DispatchError) -> Response {
    log::error!("dispatch failed: {}", err);
    let status = match err {
        DispatchError::Submission(_) | DispatchError::Wait(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
