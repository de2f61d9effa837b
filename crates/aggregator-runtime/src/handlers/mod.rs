//! # HTTP Handlers
//!
//! | Route | Success | Failure |
//! |-------|---------|---------|
//! | `POST /api/aggregator` | 200 `{"status":"success","decided":...}` | 400 client error, 500 infrastructure |
//! | `GET /api/task/:task_id` | 200 `{"result","address"}` | 404 no performer |
//! | `GET /health` | 200 `{"status":"ok"}` | |
//! | `GET /metrics` | 200 Prometheus text | 500 encode failure |
//!
//! Every error body is `{"error": "<message>"}`.

use ag_02_vote_validation::VoteRequest;
use ag_03_task_verification::{AggregatorApi, AggregatorError, SubmissionOutcome};
use aggregator_telemetry::{encode_metrics, record_http_request, task_span};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use shared_types::TaskId;
use std::sync::Arc;
use tracing::{debug, error, Instrument};


const SUBMIT_ROUTE: &str = "/api/aggregator";
const TASK_ROUTE: &str = "/api/task/:task_id";

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn AggregatorApi>,
}

/// Build the aggregator's HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(SUBMIT_ROUTE, post(submit_vote))
        .route(TASK_ROUTE, get(get_task))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
}

/// Error response with a JSON `{"error"}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<AggregatorError> for ApiError {
    fn from(err: AggregatorError) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!(kind = err.kind(), error = %err, "Vote processing failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn submit_vote(
    State(state): State<AppState>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = match payload {
        Ok(Json(request)) => {
            let span = task_span!("submit_vote", task_id = request.task_id, role = %request.role);
            state
                .api
                .submit_vote(request)
                .instrument(span)
                .await
                .map_err(ApiError::from)
        }
        Err(rejection) => {
            debug!(error = %rejection, "Rejected malformed vote body");
            Err(ApiError::new(StatusCode::BAD_REQUEST, rejection.body_text()))
        }
    };

    match result {
        Ok(outcome) => {
            record_http_request(SUBMIT_ROUTE, StatusCode::OK.as_u16());
            let decided = match outcome {
                SubmissionOutcome::Accepted => None,
                SubmissionOutcome::Decided(outcome) => Some(outcome.label()),
            };
            Ok(Json(json!({ "status": "success", "decided": decided })))
        }
        Err(err) => {
            record_http_request(SUBMIT_ROUTE, err.status.as_u16());
            Err(err)
        }
    }
}

async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<TaskId>,
) -> Result<Response, ApiError> {
    let view = state.api.performer_of(task_id).await.map_err(|e| {
        let err = ApiError::from(e);
        record_http_request(TASK_ROUTE, err.status.as_u16());
        err
    })?;

    match view {
        Some(view) => {
            record_http_request(TASK_ROUTE, StatusCode::OK.as_u16());
            Ok(Json(view).into_response())
        }
        None => {
            record_http_request(TASK_ROUTE, StatusCode::NOT_FOUND.as_u16());
            Err(ApiError::new(
                StatusCode::NOT_FOUND,
                "performer data not found",
            ))
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn metrics() -> Result<Response, ApiError> {
    let body = encode_metrics()
        .map_err(|e| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
        .into_response())
}
