//! Advertisement lifecycle: status machine, history, and analysis results.
//!
//! ```text
//! upload ──► analyzing ──► analyzed ──► approved | suspended | rejected
//!    ▲            │
//!    └────────────┘  (not ready yet / pipeline failure)
//! ```
//!
//! Every status change goes through [`Advertisement::transition`], which
//! appends to `status_history` so the last history entry always matches
//! `status`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::report::AnalysisReport;
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdStatus {
    Upload,
    Analyzing,
    Analyzed,
    Approved,
    Suspended,
    Rejected,
}

impl AdStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            AdStatus::Upload => "upload",
            AdStatus::Analyzing => "analyzing",
            AdStatus::Analyzed => "analyzed",
            AdStatus::Approved => "approved",
            AdStatus::Suspended => "suspended",
            AdStatus::Rejected => "rejected",
        }
    }

    /// `true` for the states set by an explicit user decision.
    #[must_use]
    pub fn is_decided(self) -> bool {
        matches!(
            self,
            AdStatus::Approved | AdStatus::Suspended | AdStatus::Rejected
        )
    }

    /// `true` once the analysis pipeline has produced a report.
    #[must_use]
    pub fn has_report(self) -> bool {
        self == AdStatus::Analyzed || self.is_decided()
    }

    #[must_use]
    pub fn can_transition_to(self, to: AdStatus) -> bool {
        match (self, to) {
            (AdStatus::Upload, AdStatus::Analyzing)
            | (AdStatus::Analyzing, AdStatus::Upload | AdStatus::Analyzed) => true,
            (AdStatus::Analyzed, to) => to.is_decided(),
            (from, to) => from.is_decided() && to.is_decided() && from != to,
        }
    }
}

impl std::fmt::Display for AdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upload" => Ok(AdStatus::Upload),
            "analyzing" => Ok(AdStatus::Analyzing),
            "analyzed" => Ok(AdStatus::Analyzed),
            "approved" => Ok(AdStatus::Approved),
            "suspended" => Ok(AdStatus::Suspended),
            "rejected" => Ok(AdStatus::Rejected),
            other => Err(CoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: AdStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Where the submitted video came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VideoSource {
    File { file_name: String },
    Url { url: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionKind {
    Approve,
    Suspend,
    Reject,
}

impl DecisionKind {
    #[must_use]
    pub fn target_status(self) -> AdStatus {
        match self {
            DecisionKind::Approve => AdStatus::Approved,
            DecisionKind::Suspend => AdStatus::Suspended,
            DecisionKind::Reject => AdStatus::Rejected,
        }
    }
}

impl FromStr for DecisionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(DecisionKind::Approve),
            "suspend" => Ok(DecisionKind::Suspend),
            "reject" => Ok(DecisionKind::Reject),
            other => Err(CoreError::InvalidDecision(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub decision: DecisionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub decided_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistSummary {
    pub title: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
}

/// Raw signals collected from the video-index provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub summary: String,
    #[serde(default)]
    pub gist: Option<GistSummary>,
    #[serde(default)]
    pub creative_breakdown: Option<String>,
}

/// Performance signal attached to a competitive hit.
///
/// No real performance source exists yet; the default scorer reports
/// `NotAvailable` rather than inventing numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PerformanceIndicators {
    NotAvailable,
    Scored {
        engagement_rate: f64,
        click_through_rate: f64,
        conversion_rate: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveHit {
    pub id: String,
    pub title: Option<String>,
    pub score: f64,
    pub performance_indicators: PerformanceIndicators,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveSearch {
    pub query_video_id: String,
    pub hits: Vec<CompetitiveHit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_analysis: Option<VideoAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_profile: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_search: Option<CompetitiveSearch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synthesis: Option<AnalysisReport>,
}

impl AnalysisResults {
    /// All three pipeline inputs needed before a report may be accepted.
    #[must_use]
    pub fn inputs_complete(&self) -> bool {
        self.video_analysis.is_some()
            && self.user_profile.is_some()
            && self.competitive_search.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advertisement {
    pub id: Uuid,
    pub user_id: String,
    pub source: VideoSource,
    pub twelve_labs_index_id: Option<String>,
    pub twelve_labs_task_id: Option<String>,
    pub twelve_labs_video_id: Option<String>,
    pub status: AdStatus,
    pub status_history: Vec<StatusEntry>,
    pub analysis_results: AnalysisResults,
    pub decision: Option<Decision>,
    /// Decisions replaced by a later, different decision.
    pub decision_history: Vec<Decision>,
    pub performance_metrics: Option<serde_json::Value>,
    /// Optimistic-concurrency token, bumped by the store on every write.
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub uploaded_at: Option<DateTime<Utc>>,
    pub analyzed_at: Option<DateTime<Utc>>,
    pub decided_at: Option<DateTime<Utc>>,
}

/// Identifiers returned by the video-index provider for an ingested video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedVideo {
    pub index_id: String,
    pub task_id: String,
    pub video_id: String,
}

impl Advertisement {
    /// Builds a freshly indexed advertisement in `upload` status.
    #[must_use]
    pub fn new_indexed(
        user_id: impl Into<String>,
        source: VideoSource,
        indexed: IndexedVideo,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            source,
            twelve_labs_index_id: Some(indexed.index_id),
            twelve_labs_task_id: Some(indexed.task_id),
            twelve_labs_video_id: Some(indexed.video_id),
            status: AdStatus::Upload,
            status_history: vec![StatusEntry {
                status: AdStatus::Upload,
                timestamp: now,
                note: Some("Video uploaded and indexed".to_string()),
            }],
            analysis_results: AnalysisResults::default(),
            decision: None,
            decision_history: Vec::new(),
            performance_metrics: None,
            version: 0,
            created_at: now,
            updated_at: now,
            uploaded_at: Some(now),
            analyzed_at: None,
            decided_at: None,
        }
    }

    /// Moves the record to `to`, appending a history entry.
    ///
    /// Entering `analyzed` requires every analysis result including the
    /// report. Falling back to `upload` drops any stale report.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] when the move is not in the
    /// transition table or the analysis results are incomplete.
    pub fn transition(
        &mut self,
        to: AdStatus,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let from = self.status;
        if !from.can_transition_to(to) {
            return Err(CoreError::InvalidTransition { from, to });
        }
        if to == AdStatus::Analyzed
            && !(self.analysis_results.inputs_complete()
                && self.analysis_results.synthesis.is_some())
        {
            return Err(CoreError::InvalidTransition { from, to });
        }

        match to {
            AdStatus::Upload => self.analysis_results.synthesis = None,
            AdStatus::Analyzed => self.analyzed_at = Some(now),
            _ => {}
        }

        self.status = to;
        self.updated_at = now;
        self.status_history.push(StatusEntry {
            status: to,
            timestamp: now,
            note,
        });
        Ok(())
    }

    /// Applies a user decision.
    ///
    /// Returns `Ok(false)` when the same decision is already in effect; the
    /// record is left untouched. A different decision replaces the current
    /// one, which moves to `decision_history`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] unless the record is
    /// `analyzed` or already decided.
    pub fn apply_decision(
        &mut self,
        kind: DecisionKind,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<bool, CoreError> {
        let target = kind.target_status();
        if self.status == target {
            return Ok(false);
        }

        self.transition(target, Some(format!("decision: {kind:?}").to_lowercase()), now)?;

        if let Some(previous) = self.decision.take() {
            self.decision_history.push(previous);
        }
        self.decision = Some(Decision {
            decision: kind,
            comments,
            decided_at: now,
        });
        self.decided_at = Some(now);
        Ok(true)
    }

    /// Latest history note, if any.
    #[must_use]
    pub fn last_note(&self) -> Option<&str> {
        self.status_history.last().and_then(|e| e.note.as_deref())
    }
}
