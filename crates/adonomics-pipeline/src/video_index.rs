//! The video-index adapter boundary.

use adonomics_twelvelabs::{
    AnalysisKind, AnalysisPayload, Gist, Task, TaskHandle, TwelveLabsClient, TwelveLabsError,
    VideoHit, VideoUpload,
};
use async_trait::async_trait;

/// Operations the pipeline needs from a video-understanding provider.
#[async_trait]
pub trait VideoIndex: Send + Sync {
    /// Index every submitted video lands in.
    fn index_id(&self) -> &str;

    async fn submit(&self, upload: VideoUpload) -> Result<TaskHandle, TwelveLabsError>;

    async fn task(&self, task_id: &str) -> Result<Task, TwelveLabsError>;

    /// Precondition gate for analysis. Provider errors read as "not ready".
    async fn is_ready(&self, video_id: &str) -> bool;

    async fn summarize(&self, video_id: &str) -> Result<String, TwelveLabsError>;

    async fn gist(&self, video_id: &str) -> Result<Gist, TwelveLabsError>;

    async fn analyze(&self, video_id: &str, prompt: &str) -> Result<String, TwelveLabsError>;

    async fn search_by_text(&self, query: &str) -> Result<Vec<VideoHit>, TwelveLabsError>;

    /// Runs one named analysis. `OpenEnded` requires a non-blank prompt.
    async fn run_analysis(
        &self,
        video_id: &str,
        kind: AnalysisKind,
        prompt: Option<&str>,
    ) -> Result<AnalysisPayload, TwelveLabsError> {
        match kind {
            AnalysisKind::Summary => Ok(AnalysisPayload::Summary {
                summary: self.summarize(video_id).await?,
            }),
            AnalysisKind::Gist => Ok(AnalysisPayload::Gist(self.gist(video_id).await?)),
            AnalysisKind::OpenEnded => match prompt.map(str::trim) {
                Some(prompt) if !prompt.is_empty() => Ok(AnalysisPayload::OpenEnded {
                    data: self.analyze(video_id, prompt).await?,
                }),
                _ => Err(TwelveLabsError::InvalidRequest(
                    "open-ended analysis requires a non-empty prompt".to_string(),
                )),
            },
        }
    }

    /// Finds videos similar to `video_id`.
    ///
    /// The provider has no direct video-to-video search, so the source
    /// video's gist title and topics become the text query. The source video
    /// itself is dropped from the hits.
    async fn search_by_video_id(&self, video_id: &str) -> Result<Vec<VideoHit>, TwelveLabsError> {
        let gist = self.gist(video_id).await?;
        let query = gist
            .title
            .into_iter()
            .chain(gist.topics)
            .map(|term| term.trim().to_string())
            .filter(|term| !term.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let hits = self.search_by_text(&query).await?;
        Ok(hits.into_iter().filter(|hit| hit.id != video_id).collect())
    }
}

#[async_trait]
impl VideoIndex for TwelveLabsClient {
    fn index_id(&self) -> &str {
        TwelveLabsClient::index_id(self)
    }

    async fn submit(&self, upload: VideoUpload) -> Result<TaskHandle, TwelveLabsError> {
        self.create_task(upload).await
    }

    async fn task(&self, task_id: &str) -> Result<Task, TwelveLabsError> {
        self.get_task(task_id).await
    }

    async fn is_ready(&self, video_id: &str) -> bool {
        match self.video_info(video_id).await {
            Ok(info) => info.is_indexed(),
            Err(e) => {
                tracing::warn!(video_id, error = %e, "readiness check failed; treating as not ready");
                false
            }
        }
    }

    async fn summarize(&self, video_id: &str) -> Result<String, TwelveLabsError> {
        TwelveLabsClient::summarize(self, video_id).await
    }

    async fn gist(&self, video_id: &str) -> Result<Gist, TwelveLabsError> {
        TwelveLabsClient::gist(self, video_id).await
    }

    async fn analyze(&self, video_id: &str, prompt: &str) -> Result<String, TwelveLabsError> {
        TwelveLabsClient::analyze(self, video_id, prompt).await
    }

    async fn search_by_text(&self, query: &str) -> Result<Vec<VideoHit>, TwelveLabsError> {
        self.search_text(query).await
    }
}
