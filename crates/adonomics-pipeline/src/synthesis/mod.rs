//! Turns the collected analysis signals into an [`AnalysisReport`].
//!
//! The model is offered exactly one function whose parameters are the report
//! schema and is forced to call it. Anything short of a valid call, including
//! transport failures, timeouts, and missing credentials, yields
//! [`AnalysisReport::fallback`] instead of an error.

mod prompt;

use std::sync::Arc;
use std::time::Duration;

use adonomics_core::{AnalysisReport, CompetitiveSearch, CoreError, VideoAnalysis};
use adonomics_groq::{ChatMessage, ChatRequest, GroqError, ToolChoice};
use thiserror::Error;

use crate::language_model::LanguageModel;

pub use prompt::{build_user_prompt, report_schema, report_tool, REPORT_FUNCTION, SYSTEM_PROMPT};

pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4000;

#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("no language model is configured")]
    MissingCredentials,

    #[error("language model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("language model request failed: {0}")]
    Transport(#[from] GroqError),

    #[error("language model replied without calling {REPORT_FUNCTION}")]
    NoToolCall,

    #[error("language model called unexpected function '{0}'")]
    WrongFunction(String),

    #[error("report arguments do not match the contract: {0}")]
    InvalidArguments(#[from] serde_json::Error),

    #[error(transparent)]
    OutOfRange(#[from] CoreError),
}

#[derive(Clone)]
pub struct ReportSynthesizer {
    model: Option<Arc<dyn LanguageModel>>,
    model_name: String,
    timeout: Duration,
    temperature: f32,
    max_tokens: u32,
}

impl ReportSynthesizer {
    /// `model` is `None` when no credentials are configured; every call then
    /// returns the fallback report.
    #[must_use]
    pub fn new(
        model: Option<Arc<dyn LanguageModel>>,
        model_name: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            model_name: model_name.into(),
            timeout,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.model.is_some()
    }

    /// Produces a report; never fails.
    pub async fn synthesize(
        &self,
        video: &VideoAnalysis,
        user_profile: &str,
        competitive: &CompetitiveSearch,
    ) -> AnalysisReport {
        match self.try_synthesize(video, user_profile, competitive).await {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!(error = %e, "report synthesis failed; using fallback report");
                AnalysisReport::fallback()
            }
        }
    }

    /// Produces a report or says why it could not.
    ///
    /// # Errors
    ///
    /// Returns a [`SynthesisError`] for missing credentials, timeout,
    /// transport failure, a reply without the expected function call, or
    /// arguments that fail to parse or validate.
    pub async fn try_synthesize(
        &self,
        video: &VideoAnalysis,
        user_profile: &str,
        competitive: &CompetitiveSearch,
    ) -> Result<AnalysisReport, SynthesisError> {
        let model = self
            .model
            .as_ref()
            .ok_or(SynthesisError::MissingCredentials)?;

        let request = self.request(build_user_prompt(video, user_profile, competitive));
        let response = tokio::time::timeout(self.timeout, model.complete(&request))
            .await
            .map_err(|_| SynthesisError::Timeout(self.timeout))??;

        let call = response
            .tool_calls()
            .first()
            .ok_or(SynthesisError::NoToolCall)?;
        if call.function.name != REPORT_FUNCTION {
            return Err(SynthesisError::WrongFunction(call.function.name.clone()));
        }

        let report: AnalysisReport = serde_json::from_str(&call.function.arguments)?;
        report.validate()?;
        Ok(report)
    }

    fn request(&self, user_prompt: String) -> ChatRequest {
        ChatRequest {
            model: self.model_name.clone(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user_prompt)],
            tools: vec![report_tool()],
            tool_choice: Some(ToolChoice::Function(REPORT_FUNCTION.to_string())),
            temperature: Some(self.temperature),
            max_tokens: Some(self.max_tokens),
        }
    }
}

#[cfg(test)]
#[path = "synthesis_test.rs"]
mod tests;
