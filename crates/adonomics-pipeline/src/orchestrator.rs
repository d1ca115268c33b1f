//! Sequences indexing, signal collection, and synthesis for one advertisement.
//!
//! Status flow: `upload → analyzing → analyzed`, falling back to `upload`
//! when the video turns out not to be indexed yet or a step fails. Decisions
//! move an analyzed record to `approved` / `suspended` / `rejected`.
//!
//! An `analyzing` record whose last status change is older than the
//! analysis lease is treated as abandoned and may be claimed again.
//!
//! Every write goes through [`AdvertisementStore::update`], which is guarded
//! by the record's version. The copy threaded through the steps is replaced
//! with the stored one after each write.

use std::sync::Arc;
use std::time::Duration;

use adonomics_core::{
    summarize_profile, AdStatus, Advertisement, AppConfig, DecisionKind, GistSummary,
    IndexedVideo, VideoAnalysis, VideoSource,
};
use adonomics_groq::GroqClient;
use adonomics_twelvelabs::{Gist, TwelveLabsClient, TwelveLabsError, VideoUpload};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::competitive::CompetitiveLookup;
use crate::error::{PipelineError, StoreError};
use crate::indexing::IndexingPoller;
use crate::language_model::LanguageModel;
use crate::store::AdvertisementStore;
use crate::synthesis::ReportSynthesizer;
use crate::video_index::VideoIndex;

/// Open-ended question used for the creative breakdown signal.
pub const CREATIVE_BREAKDOWN_PROMPT: &str = "Break down this advertisement's creative execution: \
the opening hook and how quickly it lands, pacing and editing rhythm, on-screen text, music and \
voice-over, when and how the brand appears, and the call to action.";

const NOTE_STARTED: &str = "Analysis started";
const NOTE_DEFERRED: &str = "Video is still being indexed; analysis deferred";
const NOTE_COMPLETED: &str = "Analysis completed";
const NOTE_ABANDONED: &str = "Previous analysis abandoned; restarting";

/// Lease applied when none is configured.
pub const DEFAULT_ANALYSIS_LEASE: Duration = Duration::from_secs(30 * 60);

/// Identifiers returned once an upload is indexed and recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    pub task_id: String,
    pub video_id: String,
    pub advertisement_id: Uuid,
}

#[derive(Clone)]
pub struct AnalysisOrchestrator {
    store: Arc<dyn AdvertisementStore>,
    video_index: Option<Arc<dyn VideoIndex>>,
    synthesizer: ReportSynthesizer,
    competitive: CompetitiveLookup,
    poller: IndexingPoller,
    retry_after_secs: u64,
    analysis_lease: Duration,
}

impl AnalysisOrchestrator {
    /// `video_index` is `None` when provider credentials are missing; every
    /// operation that needs it then fails with
    /// [`PipelineError::Configuration`].
    #[must_use]
    pub fn new(
        store: Arc<dyn AdvertisementStore>,
        video_index: Option<Arc<dyn VideoIndex>>,
        synthesizer: ReportSynthesizer,
        poller: IndexingPoller,
        retry_after_secs: u64,
    ) -> Self {
        Self {
            store,
            video_index,
            synthesizer,
            competitive: CompetitiveLookup::default(),
            poller,
            retry_after_secs,
            analysis_lease: DEFAULT_ANALYSIS_LEASE,
        }
    }

    /// Builds the provider clients described by `config`.
    ///
    /// Missing credentials are not an error here: the video index becomes
    /// unavailable and synthesis always falls back.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if a client cannot be built
    /// from values that are present (for example an unparseable base URL).
    pub fn from_config(
        config: &AppConfig,
        store: Arc<dyn AdvertisementStore>,
    ) -> Result<Self, PipelineError> {
        let video_index: Option<Arc<dyn VideoIndex>> =
            match (&config.twelve_labs_api_key, &config.twelve_labs_index_id) {
                (Some(key), Some(index_id)) => Some(Arc::new(
                    TwelveLabsClient::with_base_url(
                        key,
                        index_id,
                        config.provider_timeout_secs,
                        &config.twelve_labs_base_url,
                    )
                    .map_err(|e| PipelineError::Configuration(e.to_string()))?,
                )),
                _ => {
                    tracing::warn!(
                        "TWELVE_LABS_API_KEY or TWELVE_LABS_INDEX_ID not set; video operations disabled"
                    );
                    None
                }
            };

        let model: Option<Arc<dyn LanguageModel>> = match &config.groq_api_key {
            Some(key) => Some(Arc::new(
                // The synthesizer enforces its own deadline; give the HTTP
                // client a little headroom past it.
                GroqClient::with_base_url(
                    key,
                    config.synthesis_timeout_secs + 5,
                    &config.groq_base_url,
                )
                .map_err(|e| PipelineError::Configuration(e.to_string()))?,
            )),
            None => {
                tracing::warn!("GROQ_API_KEY not set; reports will use the fallback template");
                None
            }
        };

        let synthesizer =
            ReportSynthesizer::new(model, config.groq_model.clone(), config.synthesis_timeout());
        let poller = IndexingPoller::new(config.poll_interval(), config.indexing_max_wait());

        Ok(Self::new(
            store,
            video_index,
            synthesizer,
            poller,
            config.retry_after_secs,
        )
        .with_analysis_lease(config.analysis_lease()))
    }

    #[must_use]
    pub fn with_analysis_lease(mut self, lease: Duration) -> Self {
        self.analysis_lease = lease;
        self
    }

    #[must_use]
    pub fn with_competitive(mut self, competitive: CompetitiveLookup) -> Self {
        self.competitive = competitive;
        self
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn AdvertisementStore> {
        &self.store
    }

    #[must_use]
    pub fn poller(&self) -> IndexingPoller {
        self.poller
    }

    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        self.retry_after_secs
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when no video index is configured.
    pub fn video_index(&self) -> Result<&Arc<dyn VideoIndex>, PipelineError> {
        self.video_index.as_ref().ok_or_else(|| {
            PipelineError::Configuration(
                "TWELVE_LABS_API_KEY and TWELVE_LABS_INDEX_ID must be set".to_string(),
            )
        })
    }

    /// Classifies a raw video-index failure, honouring the configured retry delay.
    #[must_use]
    pub fn provider_error(&self, err: TwelveLabsError) -> PipelineError {
        PipelineError::from_provider(err, self.retry_after_secs)
    }

    /// Uploads a video, waits for indexing, and records the advertisement.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidRequest`] for a blank user id or empty upload.
    /// - [`PipelineError::Configuration`] when the video index is unavailable.
    /// - Indexing errors from [`IndexingPoller::await_ready`].
    /// - [`PipelineError::Store`] if the record cannot be written.
    pub async fn submit(
        &self,
        user_id: &str,
        upload: VideoUpload,
    ) -> Result<UploadOutcome, PipelineError> {
        let user_id = validate_user_id(user_id)?;
        let index = self.video_index()?;
        let source = video_source(&upload);

        let handle = index
            .submit(upload)
            .await
            .map_err(|e| self.provider_error(e))?;
        tracing::info!(task_id = %handle.task_id, user_id, "pipeline: indexing task submitted");

        let video_id = self.poller.await_ready(index.as_ref(), &handle).await?;
        self.record_upload(user_id, source, &handle.task_id, &video_id)
            .await
    }

    /// Persists a freshly indexed video as a new advertisement in `upload`.
    pub(crate) async fn record_upload(
        &self,
        user_id: &str,
        source: VideoSource,
        task_id: &str,
        video_id: &str,
    ) -> Result<UploadOutcome, PipelineError> {
        let index = self.video_index()?;
        let ad = Advertisement::new_indexed(
            user_id,
            source,
            IndexedVideo {
                index_id: index.index_id().to_string(),
                task_id: task_id.to_string(),
                video_id: video_id.to_string(),
            },
            Utc::now(),
        );
        let stored = self.store.insert(&ad).await?;
        tracing::info!(
            advertisement_id = %stored.id,
            video_id,
            task_id,
            "pipeline: advertisement recorded"
        );

        Ok(UploadOutcome {
            task_id: task_id.to_string(),
            video_id: video_id.to_string(),
            advertisement_id: stored.id,
        })
    }

    /// Runs the full analysis for one advertisement.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] if the record does not exist.
    /// - [`PipelineError::AlreadyAnalyzed`] if a report already exists.
    /// - [`PipelineError::AnalysisInProgress`] if another analysis holds it
    ///   and its lease has not expired.
    /// - [`PipelineError::MissingVideo`] if no video id was recorded; the
    ///   status is left unchanged.
    /// - [`PipelineError::StillIndexing`] if the video is not ready; the
    ///   record returns to `upload`.
    /// - Any other step failure, after the record returns to `upload` with
    ///   the error message as the history note.
    pub async fn analyze(&self, id: Uuid) -> Result<Advertisement, PipelineError> {
        let mut ad = self.load(id).await?;
        if ad.status.has_report() {
            return Err(PipelineError::AlreadyAnalyzed(id));
        }
        let abandoned = ad.status == AdStatus::Analyzing;
        if abandoned && !self.lease_expired(&ad) {
            return Err(PipelineError::AnalysisInProgress(id));
        }
        let Some(video_id) = ad.twelve_labs_video_id.clone() else {
            return Err(PipelineError::MissingVideo(id));
        };
        let index = Arc::clone(self.video_index()?);

        if abandoned {
            tracing::warn!(
                advertisement_id = %id,
                lease_secs = self.analysis_lease.as_secs(),
                "pipeline: analysis lease expired; reclaiming"
            );
            ad.transition(AdStatus::Upload, Some(NOTE_ABANDONED.to_string()), Utc::now())?;
            ad = self.claim(&ad).await?;
        }
        ad.transition(AdStatus::Analyzing, Some(NOTE_STARTED.to_string()), Utc::now())?;
        ad = self.claim(&ad).await?;
        tracing::info!(
            advertisement_id = %id,
            video_id = %video_id,
            "pipeline: analysis started"
        );

        if !index.is_ready(&video_id).await {
            tracing::info!(
                advertisement_id = %id,
                video_id = %video_id,
                "pipeline: video not ready; deferring"
            );
            self.revert_to_upload(ad, NOTE_DEFERRED.to_string()).await;
            return Err(PipelineError::StillIndexing {
                retry_after_secs: self.retry_after_secs,
            });
        }

        match self.run_steps(&mut ad, index.as_ref(), &video_id).await {
            Ok(()) => {
                tracing::info!(advertisement_id = %id, "pipeline: analysis completed");
                Ok(ad)
            }
            Err(e) if e.is_still_indexing() => {
                tracing::info!(
                    advertisement_id = %id,
                    video_id = %video_id,
                    "pipeline: provider still indexing; deferring"
                );
                self.revert_to_upload(ad, NOTE_DEFERRED.to_string()).await;
                Err(e)
            }
            Err(e) => {
                tracing::error!(
                    advertisement_id = %id,
                    video_id = %video_id,
                    error = %e,
                    "pipeline: analysis failed"
                );
                self.revert_to_upload(ad, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        ad: &mut Advertisement,
        index: &dyn VideoIndex,
        video_id: &str,
    ) -> Result<(), PipelineError> {
        // Step 1: video signals. The summary is required; gist and breakdown
        // enrich the prompt but are optional.
        let summary = index
            .summarize(video_id)
            .await
            .map_err(|e| self.provider_error(e))?;
        ad.analysis_results.video_analysis = Some(VideoAnalysis {
            summary: summary.clone(),
            gist: None,
            creative_breakdown: None,
        });
        self.persist(ad).await?;

        let gist = self.optional_signal("gist", video_id, index.gist(video_id).await)?;
        let creative_breakdown = self.optional_signal(
            "creative breakdown",
            video_id,
            index.analyze(video_id, CREATIVE_BREAKDOWN_PROMPT).await,
        )?;
        let video_analysis = VideoAnalysis {
            summary,
            gist: gist.map(gist_summary),
            creative_breakdown,
        };
        ad.analysis_results.video_analysis = Some(video_analysis.clone());
        self.persist(ad).await?;

        // Steps 2 and 3: profile and competitive context are independent.
        let (preferences, competitive) = tokio::join!(
            self.store.preferences(&ad.user_id),
            self.competitive.lookup(index, video_id)
        );
        let user_profile = summarize_profile(preferences?.as_ref());
        tracing::debug!(
            advertisement_id = %ad.id,
            hits = competitive.hits.len(),
            "pipeline: profile and competitive context collected"
        );
        ad.analysis_results.user_profile = Some(user_profile.clone());
        ad.analysis_results.competitive_search = Some(competitive.clone());
        self.persist(ad).await?;

        // Step 4: synthesis never fails; the fallback report is the floor.
        let report = self
            .synthesizer
            .synthesize(&video_analysis, &user_profile, &competitive)
            .await;
        // `ad` stays `analyzing` until the completed record is stored.
        let mut completed = ad.clone();
        completed.analysis_results.synthesis = Some(report);
        completed.transition(AdStatus::Analyzed, Some(NOTE_COMPLETED.to_string()), Utc::now())?;
        *ad = self.store.update(&completed).await?;
        Ok(())
    }

    fn lease_expired(&self, ad: &Advertisement) -> bool {
        let since = ad
            .status_history
            .last()
            .map_or(ad.updated_at, |entry| entry.timestamp);
        (Utc::now() - since)
            .to_std()
            .is_ok_and(|elapsed| elapsed >= self.analysis_lease)
    }

    /// Writes a status change; losing the version race means another caller
    /// owns the analysis.
    async fn claim(&self, ad: &Advertisement) -> Result<Advertisement, PipelineError> {
        match self.store.update(ad).await {
            Ok(stored) => Ok(stored),
            Err(StoreError::VersionConflict { .. }) => {
                Err(PipelineError::AnalysisInProgress(ad.id))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Best-effort provider call: a "not ready" refusal still defers the
    /// whole analysis, anything else is logged and dropped.
    fn optional_signal<T>(
        &self,
        what: &str,
        video_id: &str,
        result: Result<T, TwelveLabsError>,
    ) -> Result<Option<T>, PipelineError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_not_ready() => Err(self.provider_error(e)),
            Err(e) => {
                tracing::warn!(video_id, error = %e, "pipeline: {what} unavailable; continuing");
                Ok(None)
            }
        }
    }

    async fn persist(&self, ad: &mut Advertisement) -> Result<(), PipelineError> {
        *ad = self.store.update(ad).await?;
        Ok(())
    }

    async fn revert_to_upload(&self, mut ad: Advertisement, note: String) {
        if let Err(e) = ad.transition(AdStatus::Upload, Some(note), Utc::now()) {
            tracing::error!(
                advertisement_id = %ad.id,
                error = %e,
                "pipeline: cannot revert to upload"
            );
            return;
        }
        if let Err(e) = self.store.update(&ad).await {
            tracing::error!(
                advertisement_id = %ad.id,
                error = %e,
                "pipeline: failed to persist revert to upload"
            );
        }
    }

    /// Applies a user decision to an analyzed (or already decided) record.
    ///
    /// Repeating the decision already in effect changes nothing and returns
    /// the record as stored.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::NotFound`] if the record does not exist.
    /// - [`PipelineError::InvalidTransition`] unless the record is analyzed
    ///   or decided.
    /// - [`PipelineError::Store`] on a concurrent write.
    pub async fn decide(
        &self,
        id: Uuid,
        decision: DecisionKind,
        comments: Option<String>,
    ) -> Result<Advertisement, PipelineError> {
        let mut ad = self.load(id).await?;
        if !ad.apply_decision(decision, comments, Utc::now())? {
            tracing::debug!(advertisement_id = %id, ?decision, "pipeline: decision unchanged");
            return Ok(ad);
        }
        let stored = self.store.update(&ad).await?;
        tracing::info!(
            advertisement_id = %id,
            status = %stored.status,
            "pipeline: decision recorded"
        );
        Ok(stored)
    }

    /// # Errors
    ///
    /// Returns [`PipelineError::NotFound`] if the record does not exist.
    pub async fn load(&self, id: Uuid) -> Result<Advertisement, PipelineError> {
        match self.store.get(id).await {
            Ok(ad) => Ok(ad),
            Err(StoreError::NotFound) => Err(PipelineError::NotFound(id)),
            Err(e) => Err(e.into()),
        }
    }
}

pub(crate) fn validate_user_id(user_id: &str) -> Result<&str, PipelineError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidRequest("userId is required".to_string()));
    }
    Ok(trimmed)
}

pub(crate) fn video_source(upload: &VideoUpload) -> VideoSource {
    match upload {
        VideoUpload::File { file_name, .. } => VideoSource::File {
            file_name: file_name.clone(),
        },
        VideoUpload::Url(url) => VideoSource::Url { url: url.clone() },
    }
}

fn gist_summary(gist: Gist) -> GistSummary {
    GistSummary {
        title: gist.title,
        topics: gist.topics,
        hashtags: gist.hashtags,
    }
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
