//! Best-effort lookup of similar ads in the index.

use std::sync::Arc;

use adonomics_core::{CompetitiveHit, CompetitiveSearch, PerformanceIndicators};
use adonomics_twelvelabs::VideoHit;

use crate::video_index::VideoIndex;

const DEFAULT_MAX_HITS: usize = 10;

/// Attaches performance indicators to a competitive hit.
///
/// Implement this once a real performance source (ad platform reporting,
/// warehouse export) is available.
pub trait PerformanceScorer: Send + Sync {
    fn score(&self, hit: &VideoHit) -> PerformanceIndicators;
}

/// Reports [`PerformanceIndicators::NotAvailable`] for every hit.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnscoredPerformance;

impl PerformanceScorer for UnscoredPerformance {
    fn score(&self, _hit: &VideoHit) -> PerformanceIndicators {
        PerformanceIndicators::NotAvailable
    }
}

#[derive(Clone)]
pub struct CompetitiveLookup {
    scorer: Arc<dyn PerformanceScorer>,
    max_hits: usize,
}

impl Default for CompetitiveLookup {
    fn default() -> Self {
        Self::new(Arc::new(UnscoredPerformance))
    }
}

impl CompetitiveLookup {
    #[must_use]
    pub fn new(scorer: Arc<dyn PerformanceScorer>) -> Self {
        Self {
            scorer,
            max_hits: DEFAULT_MAX_HITS,
        }
    }

    #[must_use]
    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    /// Finds videos similar to `video_id`.
    ///
    /// Never fails: a provider error is logged and yields an empty hit list,
    /// so competitive context cannot block the pipeline.
    pub async fn lookup(&self, index: &dyn VideoIndex, video_id: &str) -> CompetitiveSearch {
        let hits = match index.search_by_video_id(video_id).await {
            Ok(hits) => hits,
            Err(e) => {
                tracing::warn!(video_id, error = %e, "competitive search failed; continuing without it");
                Vec::new()
            }
        };

        CompetitiveSearch {
            query_video_id: video_id.to_string(),
            hits: hits
                .iter()
                .take(self.max_hits)
                .map(|hit| CompetitiveHit {
                    id: hit.id.clone(),
                    title: hit.title.clone(),
                    score: hit.score,
                    performance_indicators: self.scorer.score(hit),
                })
                .collect(),
        }
    }
}
