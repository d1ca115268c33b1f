//! Database operations for `advertisements`.
//!
//! Every update carries the caller's `version` as a precondition and bumps it
//! on success, so two writers racing on the same record cannot interleave
//! status changes silently: the loser gets [`DbError::VersionConflict`].

use adonomics_core::{
    AdStatus, Advertisement, AnalysisResults, Decision, StatusEntry, VideoSource,
};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const COLUMNS: &str = "id, user_id, source_kind, video_file_name, video_url, \
     twelve_labs_index_id, twelve_labs_task_id, twelve_labs_video_id, status, \
     status_history, analysis_results, decision, decision_history, performance_metrics, \
     version, created_at, updated_at, uploaded_at, analyzed_at, decided_at";

/// A row from the `advertisements` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdvertisementRow {
    pub id: Uuid,
    pub user_id: String,
    pub source_kind: String,
    pub video_file_name: Option<String>,
    pub video_url: Option<String>,
    pub twelve_labs_index_id: Option<String>,
    pub twelve_labs_task_id: Option<String>,
    pub twelve_labs_video_id: Option<String>,
    pub status: String,
    pub status_history: Json<Vec<StatusEntry>>,
    pub analysis_results: Json<AnalysisResults>,
    pub decision: Option<Json<Decision>>,
    pub decision_history: Json<Vec<Decision>>,
    pub performance_metrics: Option<serde_json::Value>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl TryFrom<AdvertisementRow> for Advertisement {
    type Error = DbError;

    fn try_from(row: AdvertisementRow) -> Result<Self, Self::Error> {
        let source = match (row.source_kind.as_str(), row.video_file_name, row.video_url) {
            ("file", Some(file_name), _) => VideoSource::File { file_name },
            ("url", _, Some(url)) => VideoSource::Url { url },
            (kind, _, _) => {
                return Err(DbError::InvalidRow(format!(
                    "advertisement {} has source_kind '{kind}' without a matching value",
                    row.id
                )))
            }
        };
        let status = row
            .status
            .parse::<AdStatus>()
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;

        Ok(Advertisement {
            id: row.id,
            user_id: row.user_id,
            source,
            twelve_labs_index_id: row.twelve_labs_index_id,
            twelve_labs_task_id: row.twelve_labs_task_id,
            twelve_labs_video_id: row.twelve_labs_video_id,
            status,
            status_history: row.status_history.0,
            analysis_results: row.analysis_results.0,
            decision: row.decision.map(|d| d.0),
            decision_history: row.decision_history.0,
            performance_metrics: row.performance_metrics,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            uploaded_at: row.uploaded_at,
            analyzed_at: row.analyzed_at,
            decided_at: row.decided_at,
        })
    }
}

fn source_columns(source: &VideoSource) -> (&'static str, Option<&str>, Option<&str>) {
    match source {
        VideoSource::File { file_name } => ("file", Some(file_name.as_str()), None),
        VideoSource::Url { url } => ("url", None, Some(url.as_str())),
    }
}

/// Inserts a new advertisement and returns it as stored.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_advertisement(
    pool: &PgPool,
    ad: &Advertisement,
) -> Result<Advertisement, DbError> {
    let (source_kind, file_name, url) = source_columns(&ad.source);

    let row = sqlx::query_as::<_, AdvertisementRow>(&format!(
        "INSERT INTO advertisements \
             (id, user_id, source_kind, video_file_name, video_url, \
              twelve_labs_index_id, twelve_labs_task_id, twelve_labs_video_id, status, \
              status_history, analysis_results, decision, decision_history, performance_metrics, \
              version, created_at, updated_at, uploaded_at, analyzed_at, decided_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, \
                 $15, $16, $17, $18, $19, $20) \
         RETURNING {COLUMNS}"
    ))
    .bind(ad.id)
    .bind(&ad.user_id)
    .bind(source_kind)
    .bind(file_name)
    .bind(url)
    .bind(ad.twelve_labs_index_id.as_deref())
    .bind(ad.twelve_labs_task_id.as_deref())
    .bind(ad.twelve_labs_video_id.as_deref())
    .bind(ad.status.as_str())
    .bind(Json(&ad.status_history))
    .bind(Json(&ad.analysis_results))
    .bind(ad.decision.as_ref().map(Json))
    .bind(Json(&ad.decision_history))
    .bind(ad.performance_metrics.as_ref())
    .bind(ad.version)
    .bind(ad.created_at)
    .bind(ad.updated_at)
    .bind(ad.uploaded_at)
    .bind(ad.analyzed_at)
    .bind(ad.decided_at)
    .fetch_one(pool)
    .await?;

    row.try_into()
}

/// Fetches a single advertisement by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists, or [`DbError::Sqlx`] if
/// the query fails.
pub async fn get_advertisement(pool: &PgPool, id: Uuid) -> Result<Advertisement, DbError> {
    sqlx::query_as::<_, AdvertisementRow>(&format!(
        "SELECT {COLUMNS} FROM advertisements WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?
    .try_into()
}

/// Lists a user's advertisements, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_advertisements_for_user(
    pool: &PgPool,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Advertisement>, DbError> {
    let rows = sqlx::query_as::<_, AdvertisementRow>(&format!(
        "SELECT {COLUMNS} FROM advertisements \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2"
    ))
    .bind(user_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Advertisement::try_from).collect()
}

/// Writes the mutable parts of `ad`, guarded by `ad.version`.
///
/// Returns the stored record with its new version.
///
/// # Errors
///
/// Returns [`DbError::VersionConflict`] if the row was modified since `ad`
/// was read (or no longer exists), or [`DbError::Sqlx`] if the update fails.
pub async fn update_advertisement(
    pool: &PgPool,
    ad: &Advertisement,
) -> Result<Advertisement, DbError> {
    let row = sqlx::query_as::<_, AdvertisementRow>(&format!(
        "UPDATE advertisements SET \
             twelve_labs_index_id = $3, \
             twelve_labs_task_id  = $4, \
             twelve_labs_video_id = $5, \
             status               = $6, \
             status_history       = $7, \
             analysis_results     = $8, \
             decision             = $9, \
             decision_history     = $10, \
             performance_metrics  = $11, \
             uploaded_at          = $12, \
             analyzed_at          = $13, \
             decided_at           = $14, \
             updated_at           = NOW(), \
             version              = version + 1 \
         WHERE id = $1 AND version = $2 \
         RETURNING {COLUMNS}"
    ))
    .bind(ad.id)
    .bind(ad.version)
    .bind(ad.twelve_labs_index_id.as_deref())
    .bind(ad.twelve_labs_task_id.as_deref())
    .bind(ad.twelve_labs_video_id.as_deref())
    .bind(ad.status.as_str())
    .bind(Json(&ad.status_history))
    .bind(Json(&ad.analysis_results))
    .bind(ad.decision.as_ref().map(Json))
    .bind(Json(&ad.decision_history))
    .bind(ad.performance_metrics.as_ref())
    .bind(ad.uploaded_at)
    .bind(ad.analyzed_at)
    .bind(ad.decided_at)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::VersionConflict {
        id: ad.id,
        expected_version: ad.version,
    })?;

    row.try_into()
}
