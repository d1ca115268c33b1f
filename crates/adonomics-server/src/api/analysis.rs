//! Analysis pipeline trigger plus direct video-index passthroughs.

use adonomics_core::AnalysisResults;
use adonomics_pipeline::{PipelineError, VideoIndex};
use adonomics_twelvelabs::{AnalysisKind, AnalysisPayload, VideoHit};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::advertisements::parse_advertisement_id;
use super::{map_pipeline_error, ApiError, AppState};

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct AnalyzeAdvertisementRequest {
    pub advertisement_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(in crate::api) struct SearchVideosRequest {
    pub query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct AnalyzeVideoRequest {
    pub video_id: Option<String>,
    pub analysis_type: Option<String>,
    pub prompt: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct AnalyzeAdvertisementResponse {
    pub success: bool,
    pub advertisement_id: Uuid,
    pub analysis: AnalysisResults,
}

/// Body of the 202 "come back later" answer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(in crate::api) struct StillIndexingResponse {
    pub error: &'static str,
    pub message: String,
    pub retry_after: u64,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SuccessResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

fn required<'a>(req_id: &str, value: Option<&'a str>, field: &str) -> Result<&'a str, ApiError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ApiError::new(req_id, "validation_error", format!("{field} is required"))
        })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/analyze-advertisement: run the full pipeline for one record.
pub(in crate::api) async fn analyze_advertisement(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeAdvertisementRequest>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let raw = required(rid, body.advertisement_id.as_deref(), "advertisementId")?;
    let id = parse_advertisement_id(rid, raw)?;

    match state.orchestrator.analyze(id).await {
        Ok(ad) => Ok(Json(AnalyzeAdvertisementResponse {
            success: true,
            advertisement_id: ad.id,
            analysis: ad.analysis_results,
        })
        .into_response()),
        Err(PipelineError::StillIndexing { retry_after_secs }) => {
            tracing::info!(advertisement_id = %id, retry_after_secs, "analysis deferred");
            Ok((
                StatusCode::ACCEPTED,
                Json(StillIndexingResponse {
                    error: "still_indexing",
                    message: "The video is still being indexed. Analysis will be available once \
                              indexing completes; please try again later."
                        .to_owned(),
                    retry_after: retry_after_secs,
                }),
            )
                .into_response())
        }
        Err(e) => Err(map_pipeline_error(rid, &e)),
    }
}

/// POST /api/v1/search-videos: free-text search over the index.
pub(in crate::api) async fn search_videos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchVideosRequest>,
) -> Result<Json<SuccessResponse<Vec<VideoHit>>>, ApiError> {
    let rid = &req_id.0;
    let query = required(rid, body.query.as_deref(), "query")?;

    let orchestrator = &state.orchestrator;
    let index = orchestrator
        .video_index()
        .map_err(|e| map_pipeline_error(rid, &e))?;
    let hits = index
        .search_by_text(query)
        .await
        .map_err(|e| map_pipeline_error(rid, &orchestrator.provider_error(e)))?;

    Ok(SuccessResponse::new(hits))
}

/// POST /api/v1/analyze-video: one named analysis of an indexed video.
pub(in crate::api) async fn analyze_video(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<AnalyzeVideoRequest>,
) -> Result<Json<SuccessResponse<AnalysisPayload>>, ApiError> {
    let rid = &req_id.0;
    let video_id = required(rid, body.video_id.as_deref(), "videoId")?;
    let kind: AnalysisKind = required(rid, body.analysis_type.as_deref(), "analysisType")?
        .parse()
        .map_err(|message: String| ApiError::new(rid, "validation_error", message))?;
    let prompt = body.prompt.as_deref().map(str::trim).filter(|p| !p.is_empty());
    if kind == AnalysisKind::OpenEnded && prompt.is_none() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "prompt is required for open-ended analysis",
        ));
    }

    let orchestrator = &state.orchestrator;
    let index = orchestrator
        .video_index()
        .map_err(|e| map_pipeline_error(rid, &e))?;
    let payload = index
        .run_analysis(video_id, kind, prompt)
        .await
        .map_err(|e| map_pipeline_error(rid, &orchestrator.provider_error(e)))?;

    Ok(SuccessResponse::new(payload))
}
