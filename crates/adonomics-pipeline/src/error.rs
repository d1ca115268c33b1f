use adonomics_core::CoreError;
use adonomics_db::DbError;
use adonomics_twelvelabs::TwelveLabsError;
use thiserror::Error;
use uuid::Uuid;

/// Persistence failures as seen by the pipeline, independent of backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    /// Another writer updated the record first.
    #[error("advertisement {id} was modified concurrently (expected version {expected_version})")]
    VersionConflict { id: Uuid, expected_version: i64 },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound => StoreError::NotFound,
            DbError::VersionConflict {
                id,
                expected_version,
            } => StoreError::VersionConflict {
                id,
                expected_version,
            },
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Provider credentials or index id are missing. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A video-index call failed and was not absorbed by polling.
    #[error("provider error: {0}")]
    Provider(String),

    /// The provider reported permanent indexing failure for this task.
    #[error("indexing failed for task {task_id}: {reason}")]
    IndexingFailed { task_id: String, reason: String },

    #[error("indexing task {task_id} did not finish within {waited_secs}s")]
    IndexingTimedOut { task_id: String, waited_secs: u64 },

    /// Expected condition: the video is not searchable yet. Callers should
    /// come back after `retry_after_secs`.
    #[error("video is still being indexed; retry in {retry_after_secs}s")]
    StillIndexing { retry_after_secs: u64 },

    #[error("advertisement {0} has no indexed video")]
    MissingVideo(Uuid),

    #[error("advertisement {0} has already been analyzed")]
    AlreadyAnalyzed(Uuid),

    #[error("advertisement {0} is already being analyzed")]
    AnalysisInProgress(Uuid),

    #[error("advertisement {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    InvalidTransition(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PipelineError {
    /// Maps a video-index failure onto the pipeline taxonomy.
    ///
    /// A "not ready" refusal becomes [`PipelineError::StillIndexing`] so the
    /// orchestrator defers instead of failing.
    #[must_use]
    pub fn from_provider(err: TwelveLabsError, retry_after_secs: u64) -> Self {
        if err.is_not_ready() {
            return PipelineError::StillIndexing { retry_after_secs };
        }
        match err {
            TwelveLabsError::Configuration(msg) => PipelineError::Configuration(msg),
            TwelveLabsError::InvalidRequest(msg) => PipelineError::InvalidRequest(msg),
            other => PipelineError::Provider(other.to_string()),
        }
    }

    #[must_use]
    pub fn is_still_indexing(&self) -> bool {
        matches!(self, PipelineError::StillIndexing { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_provider_errors_become_still_indexing() {
        let err = PipelineError::from_provider(
            TwelveLabsError::Api {
                status: 400,
                code: Some("video_not_ready".to_string()),
                message: "not ready".to_string(),
            },
            900,
        );
        assert!(matches!(
            err,
            PipelineError::StillIndexing {
                retry_after_secs: 900
            }
        ));
    }

    #[test]
    fn configuration_and_validation_keep_their_kind() {
        let err =
            PipelineError::from_provider(TwelveLabsError::Configuration("no key".into()), 900);
        assert!(matches!(err, PipelineError::Configuration(_)));

        let err =
            PipelineError::from_provider(TwelveLabsError::InvalidRequest("no prompt".into()), 900);
        assert!(matches!(err, PipelineError::InvalidRequest(_)));
    }

    #[test]
    fn db_version_conflict_is_preserved() {
        let id = Uuid::nil();
        let err: StoreError = DbError::VersionConflict {
            id,
            expected_version: 2,
        }
        .into();
        assert!(matches!(
            err,
            StoreError::VersionConflict {
                expected_version: 2,
                ..
            }
        ));
    }
}
