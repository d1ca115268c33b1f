//! The advertisement analysis pipeline.
//!
//! Provider access and persistence sit behind narrow traits
//! ([`VideoIndex`], [`LanguageModel`], [`AdvertisementStore`]) so the
//! orchestration logic can run against the real `TwelveLabs`/Groq clients and
//! Postgres in production and against scripted fakes in tests.

pub mod competitive;
pub mod error;
pub mod indexing;
pub mod language_model;
pub mod orchestrator;
pub mod progress;
pub mod store;
pub mod synthesis;
pub mod video_index;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use competitive::{CompetitiveLookup, PerformanceScorer, UnscoredPerformance};
pub use error::{PipelineError, StoreError};
pub use indexing::{IndexingPoller, IndexingStep, IndexingWatch};
pub use language_model::LanguageModel;
pub use orchestrator::{AnalysisOrchestrator, UploadOutcome};
pub use progress::{upload_with_progress, ProgressEvent, ProgressStage};
pub use store::{AdvertisementStore, MemoryStore, PgStore};
pub use synthesis::{ReportSynthesizer, SynthesisError};
pub use video_index::VideoIndex;
