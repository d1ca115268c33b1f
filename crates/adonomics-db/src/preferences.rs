//! Database operations for `user_preferences`.

use adonomics_core::UserPreferences;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserPreferencesRow {
    pub user_id: String,
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
    pub updated_at: DateTime<Utc>,
}

impl From<UserPreferencesRow> for UserPreferences {
    fn from(row: UserPreferencesRow) -> Self {
        Self {
            user_id: row.user_id,
            role: row.role,
            goals: row.goals,
            decision_factors: row.decision_factors,
            technical_comfort: row.technical_comfort,
            campaign_types: row.campaign_types,
            platforms: row.platforms,
            insight_timing: row.insight_timing,
            result_speed: row.result_speed,
            team_size: row.team_size,
            sharing: row.sharing,
            pain_points: row.pain_points,
            current_step: row.current_step,
            onboarding_completed: row.onboarding_completed,
            updated_at: Some(row.updated_at),
        }
    }
}

const COLUMNS: &str = "user_id, role, goals, decision_factors, technical_comfort, \
     campaign_types, platforms, insight_timing, result_speed, team_size, sharing, \
     pain_points, current_step, onboarding_completed, updated_at";

/// Returns the preference record for `user_id`, or `None` for users who never
/// started onboarding.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_user_preferences(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<UserPreferences>, DbError> {
    let row = sqlx::query_as::<_, UserPreferencesRow>(&format!(
        "SELECT {COLUMNS} FROM user_preferences WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(UserPreferences::from))
}

/// Inserts or replaces the preference record for `prefs.user_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_user_preferences(
    pool: &PgPool,
    prefs: &UserPreferences,
) -> Result<UserPreferences, DbError> {
    let row = sqlx::query_as::<_, UserPreferencesRow>(&format!(
        "INSERT INTO user_preferences \
             (user_id, role, goals, decision_factors, technical_comfort, campaign_types, \
              platforms, insight_timing, result_speed, team_size, sharing, pain_points, \
              current_step, onboarding_completed, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NOW()) \
         ON CONFLICT (user_id) DO UPDATE SET \
             role                 = EXCLUDED.role, \
             goals                = EXCLUDED.goals, \
             decision_factors     = EXCLUDED.decision_factors, \
             technical_comfort    = EXCLUDED.technical_comfort, \
             campaign_types       = EXCLUDED.campaign_types, \
             platforms            = EXCLUDED.platforms, \
             insight_timing       = EXCLUDED.insight_timing, \
             result_speed         = EXCLUDED.result_speed, \
             team_size            = EXCLUDED.team_size, \
             sharing              = EXCLUDED.sharing, \
             pain_points          = EXCLUDED.pain_points, \
             current_step         = EXCLUDED.current_step, \
             onboarding_completed = EXCLUDED.onboarding_completed, \
             updated_at           = NOW() \
         RETURNING {COLUMNS}"
    ))
    .bind(&prefs.user_id)
    .bind(prefs.role.as_deref())
    .bind(&prefs.goals)
    .bind(&prefs.decision_factors)
    .bind(prefs.technical_comfort.as_deref())
    .bind(&prefs.campaign_types)
    .bind(&prefs.platforms)
    .bind(prefs.insight_timing.as_deref())
    .bind(prefs.result_speed.as_deref())
    .bind(prefs.team_size.as_deref())
    .bind(&prefs.sharing)
    .bind(&prefs.pain_points)
    .bind(prefs.current_step)
    .bind(prefs.onboarding_completed)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}
