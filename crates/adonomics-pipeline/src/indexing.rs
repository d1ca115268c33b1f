//! Waiting for a provider indexing task to finish.
//!
//! Both upload paths (the blocking route and the progress stream) drive the
//! same [`IndexingWatch`], so they share one poll interval, one ceiling, and
//! one transient-failure budget.

use std::time::{Duration, Instant};

use adonomics_twelvelabs::{TaskHandle, TaskStatus};

use crate::error::PipelineError;
use crate::video_index::VideoIndex;

/// Consecutive transient poll failures absorbed before giving up.
pub const MAX_CONSECUTIVE_TRANSIENT_FAILURES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexingPoller {
    pub interval: Duration,
    /// `None` waits until the task is terminal, however long that takes.
    pub max_wait: Option<Duration>,
}

impl IndexingPoller {
    #[must_use]
    pub fn new(interval: Duration, max_wait: Option<Duration>) -> Self {
        Self { interval, max_wait }
    }

    #[must_use]
    pub fn watch<'a>(&self, index: &'a dyn VideoIndex, handle: &TaskHandle) -> IndexingWatch<'a> {
        IndexingWatch {
            index,
            task_id: handle.task_id.clone(),
            fallback_video_id: handle.video_id.clone(),
            interval: self.interval,
            max_wait: self.max_wait,
            started: Instant::now(),
            polls: 0,
            transient_failures: 0,
        }
    }

    /// Polls until the task reaches `ready` and returns its video id.
    ///
    /// # Errors
    ///
    /// See [`IndexingWatch::next_step`].
    pub async fn await_ready(
        &self,
        index: &dyn VideoIndex,
        handle: &TaskHandle,
    ) -> Result<String, PipelineError> {
        let mut watch = self.watch(index, handle);
        loop {
            match watch.next_step().await? {
                IndexingStep::Pending(status) => {
                    tracing::debug!(task_id = %handle.task_id, %status, "indexing in progress");
                }
                IndexingStep::Ready { video_id } => return Ok(video_id),
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexingStep {
    /// Non-terminal provider status observed on this poll.
    Pending(TaskStatus),
    Ready { video_id: String },
}

/// One in-flight wait on an indexing task.
pub struct IndexingWatch<'a> {
    index: &'a dyn VideoIndex,
    task_id: String,
    fallback_video_id: Option<String>,
    interval: Duration,
    max_wait: Option<Duration>,
    started: Instant,
    polls: u32,
    transient_failures: u32,
}

impl IndexingWatch<'_> {
    #[must_use]
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Performs the next poll, sleeping for the interval first unless this is
    /// the first one. Neither the sleep nor the poll runs past the ceiling.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::IndexingFailed`] when the provider reports `failed`.
    /// - [`PipelineError::IndexingTimedOut`] once the ceiling has elapsed.
    /// - [`PipelineError::Provider`] for a non-transient poll failure, after
    ///   more than [`MAX_CONSECUTIVE_TRANSIENT_FAILURES`] transient ones in a
    ///   row, or when `ready` arrives without a video id.
    pub async fn next_step(&mut self) -> Result<IndexingStep, PipelineError> {
        loop {
            if self.polls > 0 {
                let pause = self
                    .remaining()
                    .map_or(self.interval, |left| left.min(self.interval));
                tokio::time::sleep(pause).await;
                self.check_deadline()?;
            }
            self.polls += 1;

            let poll = self.index.task(&self.task_id);
            let result = match self.remaining() {
                Some(left) => tokio::time::timeout(left, poll)
                    .await
                    .map_err(|_| self.timed_out())?,
                None => poll.await,
            };
            let task = match result {
                Ok(task) => {
                    self.transient_failures = 0;
                    task
                }
                Err(e)
                    if e.is_transient()
                        && self.transient_failures < MAX_CONSECUTIVE_TRANSIENT_FAILURES =>
                {
                    self.transient_failures += 1;
                    tracing::warn!(
                        task_id = %self.task_id,
                        attempt = self.transient_failures,
                        error = %e,
                        "transient failure polling indexing task"
                    );
                    continue;
                }
                Err(e) => return Err(PipelineError::Provider(e.to_string())),
            };

            return match task.status {
                TaskStatus::Ready => task
                    .video_id
                    .or_else(|| self.fallback_video_id.clone())
                    .map(|video_id| IndexingStep::Ready { video_id })
                    .ok_or_else(|| {
                        PipelineError::Provider(format!(
                            "task {} is ready but has no video id",
                            self.task_id
                        ))
                    }),
                TaskStatus::Failed => Err(PipelineError::IndexingFailed {
                    task_id: self.task_id.clone(),
                    reason: "the provider reported the indexing task as failed".to_string(),
                }),
                other => Ok(IndexingStep::Pending(other)),
            };
        }
    }

    fn remaining(&self) -> Option<Duration> {
        self.max_wait
            .map(|max| max.saturating_sub(self.started.elapsed()))
    }

    fn check_deadline(&self) -> Result<(), PipelineError> {
        match self.remaining() {
            Some(left) if left.is_zero() => Err(self.timed_out()),
            _ => Ok(()),
        }
    }

    fn timed_out(&self) -> PipelineError {
        PipelineError::IndexingTimedOut {
            task_id: self.task_id.clone(),
            waited_secs: self.started.elapsed().as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedVideoIndex;

    fn handle() -> TaskHandle {
        TaskHandle {
            task_id: "task-1".to_string(),
            video_id: Some("vid-1".to_string()),
        }
    }

    fn fast(max_wait: Option<Duration>) -> IndexingPoller {
        IndexingPoller::new(Duration::ZERO, max_wait)
    }

    #[tokio::test]
    async fn await_ready_walks_intermediate_statuses() {
        let index = ScriptedVideoIndex::new().with_task_statuses(vec![
            TaskStatus::Uploading,
            TaskStatus::Validating,
            TaskStatus::Queued,
            TaskStatus::Indexing,
            TaskStatus::Ready,
        ]);

        let video_id = fast(None)
            .await_ready(&index, &handle())
            .await
            .expect("ready");

        assert_eq!(video_id, "vid-1");
        assert_eq!(index.task_polls(), 5);
    }

    #[tokio::test]
    async fn failed_status_is_terminal() {
        let index = ScriptedVideoIndex::new()
            .with_task_statuses(vec![TaskStatus::Indexing, TaskStatus::Failed]);

        let err = fast(None)
            .await_ready(&index, &handle())
            .await
            .expect_err("failed");

        assert!(matches!(err, PipelineError::IndexingFailed { .. }));
    }

    #[tokio::test]
    async fn ceiling_stops_an_endless_task() {
        let index = ScriptedVideoIndex::new().with_task_statuses(vec![TaskStatus::Indexing]);
        let poller = IndexingPoller::new(Duration::from_millis(5), Some(Duration::from_millis(20)));

        let err = poller
            .await_ready(&index, &handle())
            .await
            .expect_err("timed out");

        assert!(matches!(err, PipelineError::IndexingTimedOut { .. }));
    }

    #[tokio::test]
    async fn ceiling_cuts_off_a_hung_poll() {
        let index = ScriptedVideoIndex::new().with_task_delay(Duration::from_secs(30));
        let poller = IndexingPoller::new(Duration::from_millis(5), Some(Duration::from_millis(20)));

        let started = Instant::now();
        let err = poller
            .await_ready(&index, &handle())
            .await
            .expect_err("timed out");

        assert!(matches!(err, PipelineError::IndexingTimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(index.task_polls(), 1);
    }

    #[tokio::test]
    async fn transient_failures_are_absorbed_up_to_the_budget() {
        let index = ScriptedVideoIndex::new()
            .with_task_errors(4, 503)
            .with_task_statuses(vec![TaskStatus::Ready]);

        let video_id = fast(None)
            .await_ready(&index, &handle())
            .await
            .expect("absorbed");
        assert_eq!(video_id, "vid-1");
    }

    #[tokio::test]
    async fn too_many_transient_failures_surface_as_provider_error() {
        let index = ScriptedVideoIndex::new()
            .with_task_errors(MAX_CONSECUTIVE_TRANSIENT_FAILURES + 1, 503)
            .with_task_statuses(vec![TaskStatus::Ready]);

        let err = fast(None)
            .await_ready(&index, &handle())
            .await
            .expect_err("budget exhausted");
        assert!(matches!(err, PipelineError::Provider(_)));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let index = ScriptedVideoIndex::new()
            .with_task_errors(1, 404)
            .with_task_statuses(vec![TaskStatus::Ready]);

        let err = fast(None)
            .await_ready(&index, &handle())
            .await
            .expect_err("not retried");
        assert!(matches!(err, PipelineError::Provider(_)));
        assert_eq!(index.task_polls(), 1);
    }

    #[tokio::test]
    async fn ready_without_any_video_id_is_an_error() {
        let index = ScriptedVideoIndex::new()
            .with_task_statuses(vec![TaskStatus::Ready])
            .without_task_video_id();
        let handle = TaskHandle {
            task_id: "task-1".to_string(),
            video_id: None,
        };

        let err = fast(None)
            .await_ready(&index, &handle)
            .await
            .expect_err("no video id");
        assert!(matches!(err, PipelineError::Provider(_)));
    }
}
