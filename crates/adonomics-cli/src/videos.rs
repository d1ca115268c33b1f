use adonomics_pipeline::{AnalysisOrchestrator, VideoIndex};
use clap::Subcommand;

/// Sub-commands available under `videos`.
#[derive(Debug, Subcommand)]
pub enum VideosCommands {
    /// Free-text search over the configured index
    Search {
        /// Search text
        query: String,
        /// Maximum number of hits to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub(crate) async fn run(
    orchestrator: &AnalysisOrchestrator,
    command: VideosCommands,
) -> anyhow::Result<()> {
    match command {
        VideosCommands::Search { query, limit } => {
            run_videos_search(orchestrator, &query, limit).await
        }
    }
}

async fn run_videos_search(
    orchestrator: &AnalysisOrchestrator,
    query: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let query = query.trim();
    anyhow::ensure!(!query.is_empty(), "search query must not be empty");

    let index = orchestrator.video_index()?;
    let hits = index
        .search_by_text(query)
        .await
        .map_err(|e| orchestrator.provider_error(e))?;

    if hits.is_empty() {
        println!("no videos matched \"{query}\"");
        return Ok(());
    }

    println!("{:<8}{:<28}TITLE", "SCORE", "VIDEO");
    for hit in hits.iter().take(limit) {
        println!(
            "{:<8.1}{:<28}{}",
            hit.score,
            hit.id,
            hit.title.as_deref().unwrap_or("\u{2014}")
        );
    }
    Ok(())
}
