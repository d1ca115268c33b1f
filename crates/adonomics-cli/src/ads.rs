//! Advertisement inspection and analysis commands.

use adonomics_core::{AnalysisReport, Advertisement};
use adonomics_pipeline::{AdvertisementStore, AnalysisOrchestrator, PipelineError};
use clap::Subcommand;
use uuid::Uuid;

/// Sub-commands available under `ads`.
#[derive(Debug, Subcommand)]
pub enum AdsCommands {
    /// Show one advertisement with its status history and report
    Show {
        /// Advertisement id
        id: Uuid,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// List a user's advertisements, newest first
    List {
        /// Owning user id
        #[arg(long)]
        user: String,
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Run the analysis pipeline for one advertisement
    Analyze {
        /// Advertisement id
        id: Uuid,
    },
}

pub(crate) async fn run(
    orchestrator: &AnalysisOrchestrator,
    command: AdsCommands,
) -> anyhow::Result<()> {
    match command {
        AdsCommands::Show { id, json } => run_ads_show(orchestrator, id, json).await,
        AdsCommands::List { user, limit } => run_ads_list(orchestrator, &user, limit).await,
        AdsCommands::Analyze { id } => run_ads_analyze(orchestrator, id).await,
    }
}

async fn run_ads_show(
    orchestrator: &AnalysisOrchestrator,
    id: Uuid,
    json: bool,
) -> anyhow::Result<()> {
    let ad = orchestrator.load(id).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ad)?);
        return Ok(());
    }

    print_summary(&ad);
    println!();
    println!("HISTORY");
    for entry in &ad.status_history {
        println!(
            "  {}  {:<10} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.status,
            entry.note.as_deref().unwrap_or("")
        );
    }
    if let Some(decision) = &ad.decision {
        println!();
        println!(
            "DECISION  {:?} at {}{}",
            decision.decision,
            decision.decided_at.format("%Y-%m-%d %H:%M:%S"),
            decision
                .comments
                .as_deref()
                .map(|c| format!(" ({c})"))
                .unwrap_or_default()
        );
    }
    if let Some(report) = &ad.analysis_results.synthesis {
        println!();
        print_report(report);
    }
    Ok(())
}

async fn run_ads_list(
    orchestrator: &AnalysisOrchestrator,
    user_id: &str,
    limit: i64,
) -> anyhow::Result<()> {
    let ads = orchestrator
        .store()
        .list_for_user(user_id, limit.clamp(1, 200))
        .await?;

    if ads.is_empty() {
        println!("no advertisements found for user {user_id}");
        return Ok(());
    }

    println!("{:<38}{:<11}{:<22}VIDEO", "ID", "STATUS", "CREATED");
    for ad in &ads {
        println!(
            "{:<38}{:<11}{:<22}{}",
            ad.id,
            ad.status,
            ad.created_at.format("%Y-%m-%d %H:%M:%S"),
            ad.twelve_labs_video_id.as_deref().unwrap_or("\u{2014}")
        );
    }
    Ok(())
}

async fn run_ads_analyze(orchestrator: &AnalysisOrchestrator, id: Uuid) -> anyhow::Result<()> {
    tracing::info!(ad_id = %id, "running analysis");
    match orchestrator.analyze(id).await {
        Ok(ad) => {
            print_summary(&ad);
            if let Some(report) = &ad.analysis_results.synthesis {
                println!();
                print_report(report);
            }
            Ok(())
        }
        Err(PipelineError::StillIndexing { retry_after_secs }) => {
            println!(
                "video is still being indexed; retry in about {} minutes",
                retry_after_secs.div_ceil(60)
            );
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn print_summary(ad: &Advertisement) {
    println!("ID        {}", ad.id);
    println!("USER      {}", ad.user_id);
    println!("STATUS    {}", ad.status);
    println!(
        "VIDEO     {}",
        ad.twelve_labs_video_id.as_deref().unwrap_or("\u{2014}")
    );
    println!("CREATED   {}", ad.created_at.format("%Y-%m-%d %H:%M:%S"));
}

fn print_report(report: &AnalysisReport) {
    let prediction = &report.success_prediction;
    let recommendations = &report.personalized_recommendations;
    println!("REPORT");
    println!("  confidence  {}/100", prediction.confidence_score);
    println!(
        "  risk        {}",
        format!("{:?}", report.risk_assessment.risk_level).to_lowercase()
    );
    println!(
        "  suggestion  {}",
        format!("{:?}", recommendations.decision_suggestion).to_lowercase()
    );
    println!("  insight     {}", recommendations.user_specific_insights);
    for item in &recommendations.action_items {
        println!("  - {item}");
    }
}
