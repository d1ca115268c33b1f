//! Live progress for the upload → index → record sequence.
//!
//! [`upload_with_progress`] drives the same steps as
//! [`AnalysisOrchestrator::submit`] but yields a [`ProgressEvent`] at each
//! transition. The stream ends after exactly one terminal event: `success`
//! carrying the new record's identifiers, or `error` carrying the reason.

use std::fmt;
use std::sync::Arc;

use adonomics_twelvelabs::{TaskStatus, VideoUpload};
use futures::Stream;
use serde::Serialize;

use crate::error::PipelineError;
use crate::indexing::IndexingStep;
use crate::orchestrator::{validate_user_id, video_source, AnalysisOrchestrator, UploadOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressStage {
    Uploading,
    Validating,
    Pending,
    Queued,
    Indexing,
    Ready,
    Saving,
    Success,
    Error,
}

impl ProgressStage {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ProgressStage::Success | ProgressStage::Error)
    }

    /// Progress floor for a provider task status; `None` for statuses that
    /// carry no position of their own.
    fn for_task(status: &TaskStatus) -> Option<(Self, u8)> {
        match status {
            TaskStatus::Uploading => Some((ProgressStage::Uploading, 15)),
            TaskStatus::Validating => Some((ProgressStage::Validating, 25)),
            TaskStatus::Pending => Some((ProgressStage::Pending, 35)),
            TaskStatus::Queued => Some((ProgressStage::Queued, 45)),
            TaskStatus::Indexing => Some((ProgressStage::Indexing, 70)),
            TaskStatus::Ready => Some((ProgressStage::Ready, 90)),
            TaskStatus::Failed | TaskStatus::Unknown => None,
        }
    }
}

impl fmt::Display for ProgressStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProgressStage::Uploading => "uploading",
            ProgressStage::Validating => "validating",
            ProgressStage::Pending => "pending",
            ProgressStage::Queued => "queued",
            ProgressStage::Indexing => "indexing",
            ProgressStage::Ready => "ready",
            ProgressStage::Saving => "saving",
            ProgressStage::Success => "success",
            ProgressStage::Error => "error",
        };
        f.write_str(s)
    }
}

/// One frame of the progress stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub status: ProgressStage,
    pub message: String,
    /// 0–100, never lower than the previous event's.
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<UploadOutcome>,
}

/// Keeps the reported percentage monotonic.
#[derive(Debug, Clone, Copy)]
struct Tracker {
    stage: ProgressStage,
    progress: u8,
}

impl Tracker {
    fn new() -> Self {
        Self {
            stage: ProgressStage::Uploading,
            progress: 0,
        }
    }

    fn advance(&mut self, stage: ProgressStage, progress: u8, message: String) -> ProgressEvent {
        self.stage = stage;
        self.progress = self.progress.max(progress.min(100));
        ProgressEvent {
            status: stage,
            message,
            progress: self.progress,
            data: None,
        }
    }

    fn task_status(&mut self, status: &TaskStatus) -> ProgressEvent {
        let message = format!("Indexing status: {status}");
        match ProgressStage::for_task(status) {
            Some((stage, progress)) => self.advance(stage, progress, message),
            None => self.advance(self.stage, self.progress, message),
        }
    }

    fn success(&mut self, outcome: UploadOutcome) -> ProgressEvent {
        let mut event = self.advance(
            ProgressStage::Success,
            100,
            "Video uploaded and indexed".to_string(),
        );
        event.data = Some(outcome);
        event
    }

    fn error(&mut self, err: &PipelineError) -> ProgressEvent {
        tracing::warn!(error = %err, progress = self.progress, "upload progress stream failed");
        self.advance(ProgressStage::Error, self.progress, err.to_string())
    }
}

/// Uploads `upload` for `user_id` and reports each step as it happens.
///
/// Failures never surface as stream errors; they become the final `error`
/// event.
pub fn upload_with_progress(
    orchestrator: Arc<AnalysisOrchestrator>,
    user_id: String,
    upload: VideoUpload,
) -> impl Stream<Item = ProgressEvent> + Send + 'static {
    async_stream::stream! {
        let mut tracker = Tracker::new();

        let user_id = match validate_user_id(&user_id) {
            Ok(user_id) => user_id.to_string(),
            Err(e) => {
                yield tracker.error(&e);
                return;
            }
        };
        let index = match orchestrator.video_index() {
            Ok(index) => Arc::clone(index),
            Err(e) => {
                yield tracker.error(&e);
                return;
            }
        };
        let source = video_source(&upload);

        yield tracker.advance(
            ProgressStage::Uploading,
            5,
            "Uploading video to the index".to_string(),
        );
        let handle = match index.submit(upload).await {
            Ok(handle) => handle,
            Err(e) => {
                yield tracker.error(&orchestrator.provider_error(e));
                return;
            }
        };
        tracing::info!(
            task_id = %handle.task_id,
            user_id = %user_id,
            "progress: indexing task submitted"
        );
        yield tracker.advance(
            ProgressStage::Uploading,
            10,
            format!("Upload accepted; indexing task {} created", handle.task_id),
        );

        let mut watch = orchestrator.poller().watch(index.as_ref(), &handle);
        let video_id = loop {
            match watch.next_step().await {
                Ok(IndexingStep::Pending(status)) => yield tracker.task_status(&status),
                Ok(IndexingStep::Ready { video_id }) => break video_id,
                Err(e) => {
                    yield tracker.error(&e);
                    return;
                }
            }
        };
        yield tracker.advance(ProgressStage::Ready, 90, "Video indexed".to_string());

        yield tracker.advance(ProgressStage::Saving, 95, "Saving advertisement".to_string());
        match orchestrator
            .record_upload(&user_id, source, &handle.task_id, &video_id)
            .await
        {
            Ok(outcome) => yield tracker.success(outcome),
            Err(e) => yield tracker.error(&e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::StreamExt;

    use super::*;
    use crate::indexing::IndexingPoller;
    use crate::store::{AdvertisementStore, MemoryStore};
    use crate::synthesis::ReportSynthesizer;
    use crate::testing::{ScriptedFailure, ScriptedVideoIndex};
    use crate::video_index::VideoIndex;

    fn orchestrator(
        index: Option<ScriptedVideoIndex>,
    ) -> (Arc<AnalysisOrchestrator>, Arc<MemoryStore>) {
        orchestrator_with_poller(
            index,
            IndexingPoller::new(Duration::ZERO, Some(Duration::from_secs(5))),
        )
    }

    fn orchestrator_with_poller(
        index: Option<ScriptedVideoIndex>,
        poller: IndexingPoller,
    ) -> (Arc<AnalysisOrchestrator>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let index = index.map(|i| {
            let index: Arc<dyn VideoIndex> = Arc::new(i);
            index
        });
        let store_dyn: Arc<dyn AdvertisementStore> = store.clone();
        let orchestrator = AnalysisOrchestrator::new(
            store_dyn,
            index,
            ReportSynthesizer::new(None, "m", Duration::from_secs(1)),
            poller,
            900,
        );
        (Arc::new(orchestrator), store)
    }

    fn file() -> VideoUpload {
        VideoUpload::File {
            file_name: "ad.mp4".to_string(),
            bytes: b"fake video".to_vec(),
        }
    }

    async fn collect(
        orchestrator: Arc<AnalysisOrchestrator>,
        user_id: &str,
    ) -> Vec<ProgressEvent> {
        upload_with_progress(orchestrator, user_id.to_string(), file())
            .collect()
            .await
    }

    #[tokio::test]
    async fn indexing_sequence_is_monotonic_and_ends_in_success() {
        let index = ScriptedVideoIndex::new().with_task_statuses(vec![
            TaskStatus::Uploading,
            TaskStatus::Validating,
            TaskStatus::Queued,
            TaskStatus::Indexing,
            TaskStatus::Ready,
        ]);
        let (orchestrator, store) = orchestrator(Some(index));

        let events = collect(orchestrator, "u1").await;

        assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));
        let last = events.last().expect("events");
        assert_eq!(last.status, ProgressStage::Success);
        assert_eq!(last.progress, 100);
        let outcome = last.data.as_ref().expect("outcome");
        assert!(!outcome.advertisement_id.is_nil());
        assert_eq!(outcome.video_id, "vid-1");
        assert_eq!(events.iter().filter(|e| e.status.is_terminal()).count(), 1);

        let stored = store.get(outcome.advertisement_id).await.expect("stored");
        assert_eq!(stored.user_id, "u1");
        assert_eq!(stored.twelve_labs_video_id.as_deref(), Some("vid-1"));

        let stages: Vec<ProgressStage> = events.iter().map(|e| e.status).collect();
        assert!(stages.contains(&ProgressStage::Validating));
        assert!(stages.contains(&ProgressStage::Queued));
        assert!(stages.contains(&ProgressStage::Saving));
    }

    #[tokio::test]
    async fn unknown_status_keeps_previous_progress() {
        let index = ScriptedVideoIndex::new().with_task_statuses(vec![
            TaskStatus::Indexing,
            TaskStatus::Unknown,
            TaskStatus::Ready,
        ]);
        let (orchestrator, _) = orchestrator(Some(index));

        let events = collect(orchestrator, "u1").await;

        let indexing = events
            .iter()
            .position(|e| e.status == ProgressStage::Indexing)
            .expect("indexing event");
        assert_eq!(events[indexing + 1].progress, events[indexing].progress);
        assert_eq!(events[indexing + 1].status, ProgressStage::Indexing);
    }

    #[tokio::test]
    async fn failed_indexing_emits_single_error_and_ends() {
        let index = ScriptedVideoIndex::new()
            .with_task_statuses(vec![TaskStatus::Validating, TaskStatus::Failed]);
        let (orchestrator, store) = orchestrator(Some(index));

        let events = collect(orchestrator, "u1").await;

        let errors: Vec<&ProgressEvent> = events
            .iter()
            .filter(|e| e.status == ProgressStage::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(events.last().map(|e| e.status), Some(ProgressStage::Error));
        assert!(errors[0].message.contains("task-1"));
        assert!(events.iter().all(|e| e.status != ProgressStage::Success));
        assert!(store.list_for_user("u1", 10).await.expect("list").is_empty());
    }

    fn assert_single_timeout_error(events: &[ProgressEvent]) {
        let terminal: Vec<&ProgressEvent> =
            events.iter().filter(|e| e.status.is_terminal()).collect();
        assert_eq!(terminal.len(), 1);
        assert_eq!(terminal[0].status, ProgressStage::Error);
        assert_eq!(events.last().map(|e| e.status), Some(ProgressStage::Error));
        assert!(terminal[0].message.contains("did not finish"));
        assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));
    }

    #[tokio::test]
    async fn ceiling_ends_stream_for_task_stuck_indexing() {
        let index = ScriptedVideoIndex::new().with_task_statuses(vec![TaskStatus::Indexing]);
        let poller = IndexingPoller::new(Duration::from_millis(5), Some(Duration::from_millis(20)));
        let (orchestrator, store) = orchestrator_with_poller(Some(index), poller);

        let events = collect(orchestrator, "u1").await;

        assert_single_timeout_error(&events);
        assert!(events.iter().any(|e| e.status == ProgressStage::Indexing));
        assert!(store.list_for_user("u1", 10).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn ceiling_ends_stream_when_a_poll_hangs() {
        let index = ScriptedVideoIndex::new().with_task_delay(Duration::from_secs(30));
        let poller = IndexingPoller::new(Duration::from_millis(5), Some(Duration::from_millis(20)));
        let (orchestrator, _) = orchestrator_with_poller(Some(index), poller);

        let events = tokio::time::timeout(Duration::from_secs(5), collect(orchestrator, "u1"))
            .await
            .expect("stream must end at the ceiling");

        assert_single_timeout_error(&events);
    }

    #[tokio::test]
    async fn submit_failure_is_reported() {
        let index = ScriptedVideoIndex::new().with_submit_failure(ScriptedFailure::Status(413));
        let (orchestrator, _) = orchestrator(Some(index));

        let events = collect(orchestrator, "u1").await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].status, ProgressStage::Uploading);
        assert_eq!(events[1].status, ProgressStage::Error);
        assert_eq!(events[1].progress, events[0].progress);
    }

    #[tokio::test]
    async fn missing_configuration_and_blank_user_fail_immediately() {
        let (unconfigured, _) = orchestrator(None);
        let events = collect(unconfigured, "u1").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].status, ProgressStage::Error);
        assert!(events[0].message.contains("TWELVE_LABS_API_KEY"));

        let (configured, _) = orchestrator(Some(ScriptedVideoIndex::new()));
        let events = collect(configured, " ").await;
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("userId is required"));
    }

    #[test]
    fn events_serialize_with_lowercase_status() {
        let event = ProgressEvent {
            status: ProgressStage::Queued,
            message: "Indexing status: queued".to_string(),
            progress: 45,
            data: None,
        };
        let json = serde_json::to_value(&event).expect("json");
        assert_eq!(
            json,
            serde_json::json!({
                "status": "queued",
                "message": "Indexing status: queued",
                "progress": 45
            })
        );
    }
}
