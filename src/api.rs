//! REST API server for the budget analysis service
//!
//! Exposes the orchestrator via HTTP endpoints consumed by the dashboard UI

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::analysis::AnalysisOrchestrator;
use crate::error::AnalysisError;
use crate::report;
use crate::simulation::SimulationRequest;

/// =============================
/// Error Body
/// =============================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub details: Value,
    pub timestamp: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, details: Value) -> Self {
        Self {
            error: error.into(),
            details,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

fn error_response(context: &str, err: &AnalysisError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(%status, "{}: {}", context, err);
    } else {
        info!(%status, "{}: {}", context, err);
    }

    (status, Json(ErrorBody::new(context, err.details()))).into_response()
}

/// Malformed JSON bodies are reported like any other validation failure
fn rejection_response(context: &str, rejection: JsonRejection) -> Response {
    let err = AnalysisError::Validation(vec![crate::error::FieldIssue::new(
        "body",
        rejection.body_text(),
    )]);
    error_response(context, &err)
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Questionnaire Endpoints
/// =============================

async fn submit_questionnaire(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    const CONTEXT: &str = "Failed to process questionnaire";

    let Json(raw) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(CONTEXT, rejection),
    };

    match state.orchestrator.submit(&raw).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(CONTEXT, &e),
    }
}

async fn get_analysis(
    State(state): State<ApiState>,
    Path(questionnaire_id): Path<String>,
) -> Response {
    match state.orchestrator.get_analysis(&questionnaire_id).await {
        Ok(lookup) => (StatusCode::OK, Json(lookup)).into_response(),
        Err(e) => error_response("Failed to get analysis", &e),
    }
}

async fn download_report(
    State(state): State<ApiState>,
    Path(questionnaire_id): Path<String>,
) -> Response {
    match state.orchestrator.report(&questionnaire_id).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, report::CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    report::content_disposition(&questionnaire_id),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => error_response("Failed to generate PDF report", &e),
    }
}

async fn run_simulation(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    const CONTEXT: &str = "Failed to run simulation";

    let Json(raw) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(CONTEXT, rejection),
    };

    let request: SimulationRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            return error_response(CONTEXT, &AnalysisError::InvalidSimulation(e.to_string()))
        }
    };

    match state.orchestrator.simulate(&request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => error_response(CONTEXT, &e),
    }
}

/// =============================
/// Session Endpoints
/// =============================

async fn create_financial_session(
    State(state): State<ApiState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    const CONTEXT: &str = "Failed to create financial session";

    let Json(form_data) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(CONTEXT, rejection),
    };

    match state.orchestrator.stash_session(form_data).await {
        Ok(session_id) => (
            StatusCode::OK,
            Json(serde_json::json!({ "sessionId": session_id })),
        )
            .into_response(),
        Err(e) => error_response(CONTEXT, &e),
    }
}

async fn analyze_session(
    State(state): State<ApiState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.orchestrator.analyze_session(&session_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response("Failed to analyze financial data", &e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(orchestrator: Arc<AnalysisOrchestrator>) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route("/health", get(health))
        .route("/api/questionnaire", post(submit_questionnaire))
        .route("/api/analysis/:questionnaire_id", get(get_analysis))
        .route("/api/report/:questionnaire_id", get(download_report))
        .route("/api/simulate", post(run_simulation))
        .route("/api/financial-session", post(create_financial_session))
        .route("/api/analyze-session/:session_id", post(analyze_session))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    orchestrator: Arc<AnalysisOrchestrator>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(orchestrator);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
