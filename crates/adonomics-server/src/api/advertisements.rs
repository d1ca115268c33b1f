//! Advertisement upload, lookup, and decision handlers.

use std::convert::Infallible;
use std::sync::Arc;

use adonomics_core::{AdStatus, Advertisement, CoreError, DecisionKind};
use adonomics_pipeline::{upload_with_progress, AdvertisementStore, UploadOutcome};
use adonomics_twelvelabs::VideoUpload;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_pipeline_error, map_store_error, normalize_limit, ApiError, ApiResponse, AppState,
};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub(in crate::api) struct UploadForm {
    pub user_id: String,
    pub upload: VideoUpload,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct ListAdvertisementsQuery {
    pub user_id: Option<String>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct DecisionRequest {
    pub decision: String,
    pub decision_comments: Option<String>,
    pub status: Option<String>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(in crate::api) fn parse_advertisement_id(req_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("advertisement id must be a UUID, got '{raw}'"),
        )
    })
}

fn multipart_error(req_id: &str, e: &MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(req_id, "payload_too_large", "video exceeds the upload limit");
    }
    ApiError::new(
        req_id,
        "bad_request",
        format!("invalid multipart body: {}", e.body_text()),
    )
}

/// Reads `userId` plus one of `videoFile` / `videoUrl`. A non-empty file
/// wins over a URL when both are sent.
async fn read_upload_form(
    req_id: &str,
    mut multipart: Multipart,
) -> Result<UploadForm, ApiError> {
    let mut user_id = None;
    let mut file = None;
    let mut url = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(req_id, &e))?
    {
        let name = field.name().map(ToOwned::to_owned);
        match name.as_deref() {
            Some("userId") => {
                let value = field.text().await.map_err(|e| multipart_error(req_id, &e))?;
                user_id = Some(value);
            }
            Some("videoFile") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.trim().is_empty())
                    .map_or_else(|| "video.mp4".to_owned(), ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(|e| multipart_error(req_id, &e))?;
                if !bytes.is_empty() {
                    file = Some(VideoUpload::File {
                        file_name,
                        bytes: bytes.to_vec(),
                    });
                }
            }
            Some("videoUrl") => {
                let value = field.text().await.map_err(|e| multipart_error(req_id, &e))?;
                let value = value.trim();
                if !value.is_empty() {
                    url = Some(VideoUpload::Url(value.to_owned()));
                }
            }
            other => tracing::debug!(field = ?other, "ignoring unknown multipart field"),
        }
    }

    let user_id = user_id
        .map(|u| u.trim().to_owned())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(req_id, "validation_error", "userId is required"))?;
    let upload = file.or(url).ok_or_else(|| {
        ApiError::new(
            req_id,
            "validation_error",
            "either videoFile or videoUrl is required",
        )
    })?;

    Ok(UploadForm { user_id, upload })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/advertisements: upload, wait for indexing, and record.
pub(in crate::api) async fn create_advertisement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadOutcome>), ApiError> {
    let rid = &req_id.0;
    let form = read_upload_form(rid, multipart).await?;

    let outcome = state
        .orchestrator
        .submit(&form.user_id, form.upload)
        .await
        .map_err(|e| map_pipeline_error(rid, &e))?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// POST /api/v1/advertisements/upload-progress: same inputs, streamed as
/// server-sent events.
pub(in crate::api) async fn upload_progress(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    multipart: Multipart,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let form = read_upload_form(&req_id.0, multipart).await?;

    let events = upload_with_progress(Arc::clone(&state.orchestrator), form.user_id, form.upload)
        .map(|event| {
            Ok(Event::default().json_data(&event).unwrap_or_else(|e| {
                tracing::error!(error = %e, "failed to encode progress event");
                Event::default().event("error").data("failed to encode progress event")
            }))
        });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// GET /api/v1/advertisements/{id}
pub(in crate::api) async fn get_advertisement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Advertisement>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_advertisement_id(rid, &id)?;

    let ad = state
        .orchestrator
        .load(id)
        .await
        .map_err(|e| map_pipeline_error(rid, &e))?;

    Ok(Json(ApiResponse::new(rid, ad)))
}

/// GET /api/v1/advertisements?user_id=..., newest first.
pub(in crate::api) async fn list_advertisements(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListAdvertisementsQuery>,
) -> Result<Json<ApiResponse<Vec<Advertisement>>>, ApiError> {
    let rid = &req_id.0;
    let user_id = params
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::new(rid, "validation_error", "user_id is required"))?;

    let ads = state
        .orchestrator
        .store()
        .list_for_user(user_id, normalize_limit(params.limit))
        .await
        .map_err(|e| map_store_error(rid, &e))?;

    Ok(Json(ApiResponse::new(rid, ads)))
}

/// PATCH /api/v1/advertisements/{id}: record an approve/suspend/reject decision.
pub(in crate::api) async fn decide_advertisement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(body): Json<DecisionRequest>,
) -> Result<Json<ApiResponse<Advertisement>>, ApiError> {
    let rid = &req_id.0;
    let id = parse_advertisement_id(rid, &id)?;

    let decision: DecisionKind = body
        .decision
        .trim()
        .parse()
        .map_err(|e: CoreError| ApiError::new(rid, "validation_error", e.to_string()))?;
    if let Some(raw) = body.status.as_deref() {
        let status: AdStatus = raw
            .trim()
            .parse()
            .map_err(|e: CoreError| ApiError::new(rid, "validation_error", e.to_string()))?;
        if status != decision.target_status() {
            return Err(ApiError::new(
                rid,
                "validation_error",
                format!(
                    "status '{status}' does not match decision; expected '{}'",
                    decision.target_status()
                ),
            ));
        }
    }

    let comments = body
        .decision_comments
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());
    let ad = state
        .orchestrator
        .decide(id, decision, comments)
        .await
        .map_err(|e| map_pipeline_error(rid, &e))?;

    Ok(Json(ApiResponse::new(rid, ad)))
}
