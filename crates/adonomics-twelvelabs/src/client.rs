//! HTTP client for the `TwelveLabs` v1.3 REST API.
//!
//! Wraps `reqwest` with `TwelveLabs`-specific authentication (`x-api-key`),
//! error-body decoding, and typed responses. Non-2xx responses surface as
//! [`TwelveLabsError::Api`] carrying the provider's error code and message.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error::TwelveLabsError;
use crate::types::{
    ApiErrorBody, Gist, OpenEndedResponse, SearchResponse, SummaryResponse, Task, TaskHandle,
    VideoHit, VideoInfo, VideoUpload,
};

const DEFAULT_BASE_URL: &str = "https://api.twelvelabs.io/v1.3/";

/// Client for the `TwelveLabs` API, bound to one index.
///
/// Use [`TwelveLabsClient::new`] for production or
/// [`TwelveLabsClient::with_base_url`] to point at a mock server in tests.
pub struct TwelveLabsClient {
    client: Client,
    api_key: String,
    index_id: String,
    base_url: Url,
}

impl std::fmt::Debug for TwelveLabsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TwelveLabsClient")
            .field("api_key", &"[redacted]")
            .field("index_id", &self.index_id)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TwelveLabsClient {
    /// Creates a client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`TwelveLabsError::Configuration`] if the key or index id is
    /// blank, or [`TwelveLabsError::Http`] if the `reqwest::Client` cannot be
    /// constructed.
    pub fn new(api_key: &str, index_id: &str, timeout_secs: u64) -> Result<Self, TwelveLabsError> {
        Self::with_base_url(api_key, index_id, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL.
    ///
    /// # Errors
    ///
    /// Returns [`TwelveLabsError::Configuration`] if the key or index id is
    /// blank or `base_url` does not parse, or [`TwelveLabsError::Http`] if the
    /// `reqwest::Client` cannot be constructed.
    pub fn with_base_url(
        api_key: &str,
        index_id: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TwelveLabsError> {
        if api_key.trim().is_empty() {
            return Err(TwelveLabsError::Configuration(
                "TWELVE_LABS_API_KEY is not set".to_string(),
            ));
        }
        if index_id.trim().is_empty() {
            return Err(TwelveLabsError::Configuration(
                "TWELVE_LABS_INDEX_ID is not set".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("adonomics/0.1 (ad-analysis)")
            .build()?;

        // Exactly one trailing slash so Url::join appends instead of replacing
        // the last path segment (`v1.3`).
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            TwelveLabsError::Configuration(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            index_id: index_id.to_owned(),
            base_url,
        })
    }

    #[must_use]
    pub fn index_id(&self) -> &str {
        &self.index_id
    }

    /// Starts indexing `upload` into the bound index.
    ///
    /// # Errors
    ///
    /// Returns [`TwelveLabsError::Api`] / [`TwelveLabsError::Http`] if the
    /// request fails, or [`TwelveLabsError::Deserialize`] on an unexpected body.
    pub async fn create_task(&self, upload: VideoUpload) -> Result<TaskHandle, TwelveLabsError> {
        let form = Form::new().text("index_id", self.index_id.clone());
        let form = match upload {
            VideoUpload::File { file_name, bytes } => {
                if bytes.is_empty() {
                    return Err(TwelveLabsError::InvalidRequest(
                        "video file is empty".to_string(),
                    ));
                }
                form.part("video_file", Part::bytes(bytes).file_name(file_name))
            }
            VideoUpload::Url(url) => {
                if url.trim().is_empty() {
                    return Err(TwelveLabsError::InvalidRequest(
                        "video URL is empty".to_string(),
                    ));
                }
                form.text("video_url", url)
            }
        };

        let request = self.client.post(self.endpoint("tasks")?).multipart(form);
        let handle: TaskHandle = self.send(request, "create task").await?;
        tracing::debug!(task_id = %handle.task_id, "twelvelabs: indexing task created");
        Ok(handle)
    }

    /// Fetches the current state of an indexing task.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`].
    pub async fn get_task(&self, task_id: &str) -> Result<Task, TwelveLabsError> {
        let request = self.client.get(self.endpoint(&format!("tasks/{task_id}"))?);
        self.send(request, &format!("get task {task_id}")).await
    }

    /// Fetches metadata for one video in the bound index.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`]; a 404 surfaces as [`TwelveLabsError::Api`].
    pub async fn video_info(&self, video_id: &str) -> Result<VideoInfo, TwelveLabsError> {
        let path = format!("indexes/{}/videos/{video_id}", self.index_id);
        let request = self.client.get(self.endpoint(&path)?);
        self.send(request, &format!("video info {video_id}")).await
    }

    /// Returns the provider's prose summary of an indexed video.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`].
    pub async fn summarize(&self, video_id: &str) -> Result<String, TwelveLabsError> {
        let request = self
            .client
            .post(self.endpoint("summarize")?)
            .json(&json!({ "video_id": video_id, "type": "summary" }));
        let response: SummaryResponse =
            self.send(request, &format!("summarize {video_id}")).await?;
        Ok(response.summary)
    }

    /// Returns title, topics, and hashtags for an indexed video.
    ///
    /// # Errors
    ///
    /// Same as [`Self::create_task`].
    pub async fn gist(&self, video_id: &str) -> Result<Gist, TwelveLabsError> {
        let request = self.client.post(self.endpoint("gist")?).json(&json!({
            "video_id": video_id,
            "types": ["title", "topic", "hashtag"],
        }));
        self.send(request, &format!("gist {video_id}")).await
    }

    /// Asks an open-ended question about an indexed video.
    ///
    /// # Errors
    ///
    /// Returns [`TwelveLabsError::InvalidRequest`] if `prompt` is blank;
    /// otherwise the same as [`Self::create_task`].
    pub async fn analyze(&self, video_id: &str, prompt: &str) -> Result<String, TwelveLabsError> {
        if prompt.trim().is_empty() {
            return Err(TwelveLabsError::InvalidRequest(
                "open-ended analysis requires a non-empty prompt".to_string(),
            ));
        }
        let request = self.client.post(self.endpoint("analyze")?).json(&json!({
            "video_id": video_id,
            "prompt": prompt,
            "stream": false,
        }));
        let response: OpenEndedResponse =
            self.send(request, &format!("analyze {video_id}")).await?;
        Ok(response.data)
    }

    /// Searches the bound index with free text over visual and audio signals.
    ///
    /// The API returns clips; they are grouped per video keeping the best
    /// score, and the result is ordered by descending score.
    ///
    /// # Errors
    ///
    /// Returns [`TwelveLabsError::InvalidRequest`] if `query` is blank;
    /// otherwise the same as [`Self::create_task`].
    pub async fn search_text(&self, query: &str) -> Result<Vec<VideoHit>, TwelveLabsError> {
        if query.trim().is_empty() {
            return Err(TwelveLabsError::InvalidRequest(
                "search query must not be empty".to_string(),
            ));
        }
        let form = Form::new()
            .text("index_id", self.index_id.clone())
            .text("query_text", query.to_owned())
            .text("search_options", "visual")
            .text("search_options", "audio");

        let request = self.client.post(self.endpoint("search")?).multipart(form);
        let response: SearchResponse = self.send(request, "search").await?;
        Ok(group_clips(response))
    }

    fn endpoint(&self, path: &str) -> Result<Url, TwelveLabsError> {
        self.base_url
            .join(path)
            .map_err(|e| TwelveLabsError::InvalidRequest(format!("invalid path '{path}': {e}")))
    }

    /// Sends `request` with the API key, maps non-2xx statuses to
    /// [`TwelveLabsError::Api`], and deserializes the body.
    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T, TwelveLabsError> {
        let response = request.header("x-api-key", &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let parsed: Option<ApiErrorBody> = serde_json::from_str(&body).ok();
            let (code, message) = match parsed {
                Some(ApiErrorBody { code, message }) => {
                    (code, message.unwrap_or_else(|| status.to_string()))
                }
                None => (None, status.to_string()),
            };
            tracing::debug!(status = status.as_u16(), ?code, context, "twelvelabs: API error");
            return Err(TwelveLabsError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| TwelveLabsError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

fn group_clips(response: SearchResponse) -> Vec<VideoHit> {
    let mut best: HashMap<String, VideoHit> = HashMap::new();
    for clip in response.data {
        let (title, description) = clip
            .metadata
            .map(|m| (m.title, m.description))
            .unwrap_or_default();
        match best.get_mut(&clip.video_id) {
            Some(hit) if hit.score >= clip.score => {}
            Some(hit) => {
                hit.score = clip.score;
                hit.thumbnail_url = clip.thumbnail_url.or(hit.thumbnail_url.take());
            }
            None => {
                best.insert(
                    clip.video_id.clone(),
                    VideoHit {
                        id: clip.video_id,
                        title,
                        description,
                        thumbnail_url: clip.thumbnail_url,
                        score: clip.score,
                    },
                );
            }
        }
    }

    let mut hits: Vec<VideoHit> = best.into_values().collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchClip;

    fn test_client(base_url: &str) -> TwelveLabsClient {
        TwelveLabsClient::with_base_url("test-key", "idx-1", 30, base_url)
            .expect("client construction should not fail")
    }

    fn clip(video_id: &str, score: f64) -> SearchClip {
        SearchClip {
            video_id: video_id.to_string(),
            score,
            thumbnail_url: None,
            metadata: None,
        }
    }

    #[test]
    fn blank_credentials_are_configuration_errors() {
        let err = TwelveLabsClient::with_base_url(" ", "idx", 30, "http://localhost")
            .expect_err("blank key must fail");
        assert!(matches!(err, TwelveLabsError::Configuration(_)));

        let err = TwelveLabsClient::with_base_url("key", "", 30, "http://localhost")
            .expect_err("blank index must fail");
        assert!(matches!(err, TwelveLabsError::Configuration(_)));
    }

    #[test]
    fn endpoint_keeps_version_segment() {
        let client = test_client("https://api.twelvelabs.io/v1.3");
        let url = client.endpoint("tasks/t-1").expect("join");
        assert_eq!(url.as_str(), "https://api.twelvelabs.io/v1.3/tasks/t-1");

        let client = test_client("https://api.twelvelabs.io/v1.3///");
        let url = client.endpoint("search").expect("join");
        assert_eq!(url.as_str(), "https://api.twelvelabs.io/v1.3/search");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = test_client("http://localhost");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("test-key"));
        assert!(rendered.contains("idx-1"));
    }

    #[test]
    fn clips_are_grouped_by_video_with_best_score() {
        let hits = group_clips(SearchResponse {
            data: vec![clip("a", 0.4), clip("b", 0.9), clip("a", 0.7), clip("b", 0.2)],
        });
        let pairs: Vec<(&str, f64)> = hits.iter().map(|h| (h.id.as_str(), h.score)).collect();
        assert_eq!(pairs, vec![("b", 0.9), ("a", 0.7)]);
    }
}
