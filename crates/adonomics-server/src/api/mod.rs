mod advertisements;
mod analysis;
mod preferences;

use std::sync::Arc;

use adonomics_pipeline::{AdvertisementStore, AnalysisOrchestrator, PipelineError, StoreError};
use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: &str, data: T) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id.to_owned()),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" | "already_analyzed" | "missing_video" => {
                StatusCode::BAD_REQUEST
            }
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "indexing_failed" => StatusCode::UNPROCESSABLE_ENTITY,
            "indexing_timeout" => StatusCode::GATEWAY_TIMEOUT,
            "provider_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

/// Single translation point from pipeline failures to API error codes.
pub(super) fn map_pipeline_error(request_id: &str, error: &PipelineError) -> ApiError {
    let message = error.to_string();
    match error {
        PipelineError::Configuration(_) => {
            tracing::error!(request_id, error = %error, "service is not configured");
            ApiError::new(request_id, "configuration_error", message)
        }
        PipelineError::InvalidRequest(_) => ApiError::new(request_id, "validation_error", message),
        PipelineError::Provider(_) => {
            tracing::error!(request_id, error = %error, "provider call failed");
            ApiError::new(request_id, "provider_error", message)
        }
        PipelineError::IndexingFailed { .. } => {
            ApiError::new(request_id, "indexing_failed", message)
        }
        PipelineError::IndexingTimedOut { .. } => {
            ApiError::new(request_id, "indexing_timeout", message)
        }
        PipelineError::StillIndexing { .. } | PipelineError::AnalysisInProgress(_) => {
            ApiError::new(request_id, "conflict", message)
        }
        PipelineError::MissingVideo(_) => ApiError::new(request_id, "missing_video", message),
        PipelineError::AlreadyAnalyzed(_) => {
            ApiError::new(request_id, "already_analyzed", message)
        }
        PipelineError::NotFound(_) => ApiError::new(request_id, "not_found", message),
        PipelineError::InvalidTransition(_) => ApiError::new(request_id, "bad_request", message),
        PipelineError::Store(store) => map_store_error(request_id, store),
    }
}

pub(super) fn map_store_error(request_id: &str, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound => ApiError::new(request_id, "not_found", "record not found"),
        StoreError::VersionConflict { .. } => {
            ApiError::new(request_id, "conflict", error.to_string())
        }
        StoreError::Backend(_) => {
            tracing::error!(request_id, error = %error, "storage operation failed");
            ApiError::new(request_id, "internal_error", "storage operation failed")
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(
    auth: AuthState,
    rate_limit: RateLimitState,
    max_upload_bytes: usize,
) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/advertisements",
            get(advertisements::list_advertisements).merge(
                post(advertisements::create_advertisement)
                    .layer(DefaultBodyLimit::max(max_upload_bytes)),
            ),
        )
        .route(
            "/api/v1/advertisements/upload-progress",
            post(advertisements::upload_progress).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/api/v1/advertisements/{id}",
            get(advertisements::get_advertisement).patch(advertisements::decide_advertisement),
        )
        .route(
            "/api/v1/analyze-advertisement",
            post(analysis::analyze_advertisement),
        )
        .route("/api/v1/analyze-video", post(analysis::analyze_video))
        .route("/api/v1/search-videos", post(analysis::search_videos))
        .route(
            "/api/v1/users/{user_id}/preferences",
            get(preferences::get_preferences).merge(put(preferences::put_preferences)),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(
    state: AppState,
    auth: AuthState,
    rate_limit: RateLimitState,
    max_upload_bytes: usize,
) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit, max_upload_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match state.orchestrator.store().ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
