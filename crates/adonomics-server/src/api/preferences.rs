//! Onboarding preference record read/upsert. The summarizer reads the same record.

use adonomics_core::UserPreferences;
use adonomics_pipeline::AdvertisementStore;
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState};

/// Answers as sent by the onboarding wizard; `user_id` comes from the path.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(in crate::api) struct PreferencesRequest {
    pub role: Option<String>,
    pub goals: Vec<String>,
    pub decision_factors: Vec<String>,
    pub technical_comfort: Option<String>,
    pub campaign_types: Vec<String>,
    pub platforms: Vec<String>,
    pub insight_timing: Option<String>,
    pub result_speed: Option<String>,
    pub team_size: Option<String>,
    pub sharing: Vec<String>,
    pub pain_points: Vec<String>,
    pub current_step: i16,
    pub onboarding_completed: bool,
}

impl PreferencesRequest {
    fn into_preferences(self, user_id: String) -> UserPreferences {
        UserPreferences {
            user_id,
            role: self.role,
            goals: self.goals,
            decision_factors: self.decision_factors,
            technical_comfort: self.technical_comfort,
            campaign_types: self.campaign_types,
            platforms: self.platforms,
            insight_timing: self.insight_timing,
            result_speed: self.result_speed,
            team_size: self.team_size,
            sharing: self.sharing,
            pain_points: self.pain_points,
            current_step: self.current_step,
            onboarding_completed: self.onboarding_completed,
            updated_at: Some(Utc::now()),
        }
    }
}

fn validate_user_id(req_id: &str, raw: &str) -> Result<String, ApiError> {
    let user_id = raw.trim();
    if user_id.is_empty() || user_id.len() > 200 {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            "user_id must be 1–200 characters",
        ));
    }
    Ok(user_id.to_owned())
}

/// GET /api/v1/users/{user_id}/preferences
pub(in crate::api) async fn get_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserPreferences>>, ApiError> {
    let rid = &req_id.0;
    let user_id = validate_user_id(rid, &user_id)?;

    let prefs = state
        .orchestrator
        .store()
        .preferences(&user_id)
        .await
        .map_err(|e| map_store_error(rid, &e))?
        .ok_or_else(|| {
            ApiError::new(
                rid,
                "not_found",
                format!("no preferences recorded for user '{user_id}'"),
            )
        })?;

    Ok(Json(ApiResponse::new(rid, prefs)))
}

/// PUT /api/v1/users/{user_id}/preferences: full replace.
pub(in crate::api) async fn put_preferences(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Json(body): Json<PreferencesRequest>,
) -> Result<Json<ApiResponse<UserPreferences>>, ApiError> {
    let rid = &req_id.0;
    let user_id = validate_user_id(rid, &user_id)?;

    let saved = state
        .orchestrator
        .store()
        .save_preferences(&body.into_preferences(user_id))
        .await
        .map_err(|e| map_store_error(rid, &e))?;
    tracing::info!(user_id = %saved.user_id, step = saved.current_step, "preferences saved");

    Ok(Json(ApiResponse::new(rid, saved)))
}
