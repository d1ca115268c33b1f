//! Request and response shapes for the `TwelveLabs` v1.3 API.

use serde::{Deserialize, Serialize};

/// Video content to index.
#[derive(Clone)]
pub enum VideoUpload {
    File { file_name: String, bytes: Vec<u8> },
    Url(String),
}

impl std::fmt::Debug for VideoUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoUpload::File { file_name, bytes } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("len", &bytes.len())
                .finish(),
            VideoUpload::Url(url) => f.debug_tuple("Url").field(url).finish(),
        }
    }
}

/// Returned by `POST /tasks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskHandle {
    #[serde(rename = "_id")]
    pub task_id: String,
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Uploading,
    Validating,
    Pending,
    Queued,
    Indexing,
    Ready,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Ready | TaskStatus::Failed)
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Uploading => "uploading",
            TaskStatus::Validating => "validating",
            TaskStatus::Pending => "pending",
            TaskStatus::Queued => "queued",
            TaskStatus::Indexing => "indexing",
            TaskStatus::Ready => "ready",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by `GET /tasks/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub index_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Gist {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisKind {
    Gist,
    Summary,
    OpenEnded,
}

impl std::str::FromStr for AnalysisKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gist" => Ok(AnalysisKind::Gist),
            "summary" => Ok(AnalysisKind::Summary),
            "open-ended" => Ok(AnalysisKind::OpenEnded),
            other => Err(format!(
                "analysis type must be 'gist', 'summary', or 'open-ended', got '{other}'"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum AnalysisPayload {
    Gist(Gist),
    Summary { summary: String },
    OpenEnded { data: String },
}

/// One video matching a search, with its best clip score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoHit {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub indexed_at: Option<String>,
    #[serde(default)]
    pub system_metadata: Option<SystemMetadata>,
}

impl VideoInfo {
    /// A video is searchable and analyzable once the provider stamps `indexed_at`.
    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed_at.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemMetadata {
    #[serde(default)]
    pub filename: Option<String>,
}

// ---------------------------------------------------------------------------
// Wire-only shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenEndedResponse {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SearchClip>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchClip {
    pub video_id: String,
    pub score: f64,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<ClipMetadata>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ClipMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
