//! Scripted provider fakes for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use adonomics_groq::{
    ChatMessage, ChatRequest, ChatResponse, Choice, FunctionCall, GroqError, Role, ToolCall,
};
use adonomics_twelvelabs::{
    Gist, Task, TaskHandle, TaskStatus, TwelveLabsError, VideoHit, VideoUpload,
};
use async_trait::async_trait;

use crate::language_model::LanguageModel;
use crate::video_index::VideoIndex;

/// How a scripted call should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedFailure {
    /// The provider refuses because the video is still indexing.
    NotReady,
    /// A plain HTTP error with this status.
    Status(u16),
}

impl ScriptedFailure {
    fn to_error(self) -> TwelveLabsError {
        match self {
            ScriptedFailure::NotReady => TwelveLabsError::Api {
                status: 400,
                code: Some("video_not_ready".to_string()),
                message: "The video is still indexing.".to_string(),
            },
            ScriptedFailure::Status(status) => TwelveLabsError::Api {
                status,
                code: None,
                message: format!("scripted failure ({status})"),
            },
        }
    }
}

pub const SCRIPTED_SUMMARY: &str =
    "A fast-paced sneaker ad with a street-basketball hook and a closing discount code.";
pub const SCRIPTED_BREAKDOWN: &str =
    "Hook lands in the first two seconds; logo appears at 0:03; CTA on the final card.";

/// A [`VideoIndex`] whose every answer is fixed up front.
pub struct ScriptedVideoIndex {
    task_script: Mutex<VecDeque<Result<TaskStatus, u16>>>,
    last_status: Mutex<TaskStatus>,
    task_video_id: Option<String>,
    submit_failure: Option<ScriptedFailure>,
    ready: bool,
    summary_failure: Option<ScriptedFailure>,
    gist_failure: Option<ScriptedFailure>,
    analyze_failure: Option<ScriptedFailure>,
    search_failure: Option<ScriptedFailure>,
    hits: Vec<VideoHit>,
    task_delay: Option<Duration>,
    submissions: AtomicU32,
    task_polls: AtomicU32,
    analyze_prompts: Mutex<Vec<String>>,
}

impl Default for ScriptedVideoIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedVideoIndex {
    /// Ready immediately as `vid-1`, with canned analysis answers and two
    /// similar videos (plus the source video itself) in search results.
    #[must_use]
    pub fn new() -> Self {
        Self {
            task_script: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(TaskStatus::Ready),
            task_video_id: Some("vid-1".to_string()),
            submit_failure: None,
            ready: true,
            summary_failure: None,
            gist_failure: None,
            analyze_failure: None,
            search_failure: None,
            hits: vec![hit("vid-2", 91.0), hit("vid-1", 99.0), hit("vid-3", 74.5)],
            task_delay: None,
            submissions: AtomicU32::new(0),
            task_polls: AtomicU32::new(0),
            analyze_prompts: Mutex::new(Vec::new()),
        }
    }

    /// Appends statuses to the poll script; the last one repeats forever.
    #[must_use]
    pub fn with_task_statuses(self, statuses: Vec<TaskStatus>) -> Self {
        self.task_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(statuses.into_iter().map(Ok));
        self
    }

    /// Appends `count` HTTP failures with `status` to the poll script.
    #[must_use]
    pub fn with_task_errors(self, count: u32, status: u16) -> Self {
        self.task_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend((0..count).map(|_| Err(status)));
        self
    }

    /// Every task poll sleeps for `delay` before answering.
    #[must_use]
    pub fn with_task_delay(mut self, delay: Duration) -> Self {
        self.task_delay = Some(delay);
        self
    }

    #[must_use]
    pub fn without_task_video_id(mut self) -> Self {
        self.task_video_id = None;
        self
    }

    #[must_use]
    pub fn with_submit_failure(mut self, failure: ScriptedFailure) -> Self {
        self.submit_failure = Some(failure);
        self
    }

    #[must_use]
    pub fn not_ready(mut self) -> Self {
        self.ready = false;
        self
    }

    #[must_use]
    pub fn with_summary_failure(mut self, failure: ScriptedFailure) -> Self {
        self.summary_failure = Some(failure);
        self
    }

    #[must_use]
    pub fn with_gist_failure(mut self, failure: ScriptedFailure) -> Self {
        self.gist_failure = Some(failure);
        self
    }

    #[must_use]
    pub fn with_analyze_failure(mut self, failure: ScriptedFailure) -> Self {
        self.analyze_failure = Some(failure);
        self
    }

    #[must_use]
    pub fn with_search_failure(mut self, failure: ScriptedFailure) -> Self {
        self.search_failure = Some(failure);
        self
    }

    #[must_use]
    pub fn with_hits(mut self, hits: Vec<VideoHit>) -> Self {
        self.hits = hits;
        self
    }

    #[must_use]
    pub fn submissions(&self) -> u32 {
        self.submissions.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn task_polls(&self) -> u32 {
        self.task_polls.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn analyze_prompts(&self) -> Vec<String> {
        self.analyze_prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[must_use]
pub fn hit(id: &str, score: f64) -> VideoHit {
    VideoHit {
        id: id.to_string(),
        title: Some(format!("Video {id}")),
        description: None,
        thumbnail_url: None,
        score,
    }
}

fn fail_with(failure: Option<ScriptedFailure>) -> Result<(), TwelveLabsError> {
    failure.map_or(Ok(()), |f| Err(f.to_error()))
}

#[async_trait]
impl VideoIndex for ScriptedVideoIndex {
    fn index_id(&self) -> &str {
        "idx-test"
    }

    async fn submit(&self, _upload: VideoUpload) -> Result<TaskHandle, TwelveLabsError> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        fail_with(self.submit_failure)?;
        Ok(TaskHandle {
            task_id: "task-1".to_string(),
            video_id: self.task_video_id.clone(),
        })
    }

    async fn task(&self, task_id: &str) -> Result<Task, TwelveLabsError> {
        self.task_polls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.task_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self
            .task_script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let mut last = self.last_status.lock().unwrap_or_else(PoisonError::into_inner);
        let status = match next {
            Some(Ok(status)) => {
                *last = status.clone();
                status
            }
            Some(Err(code)) => return Err(ScriptedFailure::Status(code).to_error()),
            None => last.clone(),
        };
        Ok(Task {
            id: task_id.to_string(),
            video_id: if status == TaskStatus::Ready {
                self.task_video_id.clone()
            } else {
                None
            },
            status,
            index_id: Some("idx-test".to_string()),
        })
    }

    async fn is_ready(&self, _video_id: &str) -> bool {
        self.ready
    }

    async fn summarize(&self, _video_id: &str) -> Result<String, TwelveLabsError> {
        fail_with(self.summary_failure)?;
        Ok(SCRIPTED_SUMMARY.to_string())
    }

    async fn gist(&self, _video_id: &str) -> Result<Gist, TwelveLabsError> {
        fail_with(self.gist_failure)?;
        Ok(Gist {
            title: Some("Summer Sneaker Drop".to_string()),
            topics: vec!["sneakers".to_string(), "basketball".to_string()],
            hashtags: vec!["#kicks".to_string()],
        })
    }

    async fn analyze(&self, _video_id: &str, prompt: &str) -> Result<String, TwelveLabsError> {
        self.analyze_prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());
        fail_with(self.analyze_failure)?;
        Ok(SCRIPTED_BREAKDOWN.to_string())
    }

    async fn search_by_text(&self, _query: &str) -> Result<Vec<VideoHit>, TwelveLabsError> {
        fail_with(self.search_failure)?;
        Ok(self.hits.clone())
    }
}

enum ModelScript {
    ToolCall { name: String, arguments: String },
    Text(String),
    Status(u16),
}

/// A [`LanguageModel`] that returns one fixed answer and records requests.
pub struct ScriptedModel {
    script: ModelScript,
    delay: Duration,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    fn with_script(script: ModelScript) -> Self {
        Self {
            script,
            delay: Duration::ZERO,
            requests: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn tool_call(name: &str, arguments: impl Into<String>) -> Self {
        Self::with_script(ModelScript::ToolCall {
            name: name.to_string(),
            arguments: arguments.into(),
        })
    }

    /// A reply with prose content and no tool call.
    #[must_use]
    pub fn text(content: &str) -> Self {
        Self::with_script(ModelScript::Text(content.to_string()))
    }

    #[must_use]
    pub fn failing(status: u16) -> Self {
        Self::with_script(ModelScript::Status(status))
    }

    /// Delays every answer by `delay` before replying.
    #[must_use]
    pub fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, GroqError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let message = match &self.script {
            ModelScript::ToolCall { name, arguments } => ChatMessage {
                role: Role::Assistant,
                content: None,
                tool_calls: vec![ToolCall {
                    id: "call_1".to_string(),
                    kind: "function".to_string(),
                    function: FunctionCall {
                        name: name.clone(),
                        arguments: arguments.clone(),
                    },
                }],
            },
            ModelScript::Text(content) => ChatMessage {
                role: Role::Assistant,
                content: Some(content.clone()),
                tool_calls: Vec::new(),
            },
            ModelScript::Status(status) => {
                return Err(GroqError::Api {
                    status: *status,
                    kind: None,
                    message: format!("scripted failure ({status})"),
                })
            }
        };

        Ok(ChatResponse {
            id: "chatcmpl-test".to_string(),
            model: request.model.clone(),
            choices: vec![Choice {
                index: 0,
                message,
                finish_reason: Some("tool_calls".to_string()),
            }],
            usage: None,
        })
    }
}

/// Tool-call arguments for a complete, in-range report.
#[must_use]
pub fn sample_report_arguments() -> serde_json::Value {
    serde_json::json!({
        "video_summary": SCRIPTED_SUMMARY,
        "metadata": {
            "brand": "Stride",
            "campaign": "Summer Drop",
            "platform": "Instagram",
            "region": "US",
            "time_period": "Q3"
        },
        "creative_features": {
            "visual_style": "Handheld street footage",
            "pacing": "Fast",
            "audio": "Hip-hop bed",
            "text_overlays": "Price callout",
            "key_visual_elements": ["court", "sneaker close-up"],
            "call_to_action": "Shop now"
        },
        "emotional_features": {
            "primary_emotion": "excitement",
            "emotional_tone": "energetic",
            "emotion_intensity": 8,
            "emotional_arc": "Builds to the reveal"
        },
        "success_prediction": {
            "confidence_score": 78,
            "key_strengths": ["Strong hook"],
            "success_factors": ["Clear product shot"],
            "audience_fit": "Young urban buyers",
            "competitive_advantage": "Authentic setting"
        },
        "risk_assessment": {
            "risk_level": "low",
            "potential_issues": ["Logo appears late"],
            "failure_risks": [],
            "mitigation_strategies": ["Move logo earlier"]
        },
        "personalized_recommendations": {
            "decision_suggestion": "approve",
            "action_items": ["Launch on Instagram"],
            "priority_improvements": ["Earlier logo"],
            "user_specific_insights": "Matches the stated ROI focus."
        },
        "creative_analysis": {
            "hook_effectiveness": "Immediate",
            "message_clarity": "Clear",
            "brand_integration": "Late but present",
            "visual_storytelling": "Coherent"
        },
        "competitive_intelligence": {
            "market_positioning": "Mid-premium",
            "differentiation": "Street authenticity",
            "benchmark_comparison": "Above category average",
            "trend_alignment": "Aligned with short-form trends"
        }
    })
}
