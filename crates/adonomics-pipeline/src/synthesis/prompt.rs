//! Prompt text and the function schema the model must answer with.

use adonomics_core::{CompetitiveSearch, VideoAnalysis};
use adonomics_groq::{FunctionDefinition, Tool};
use serde_json::{json, Value};

pub const REPORT_FUNCTION: &str = "generate_ad_analysis_report";

pub const SYSTEM_PROMPT: &str = "You are a senior advertising strategist and creative analyst. \
You evaluate video advertisements before they launch and advise the marketer who uploaded them.

Work through the material in this order:
1. Read the video summary, gist, and creative breakdown to understand what the ad shows and says.
2. Read the user profile to understand who you are advising and what they care about.
3. Compare the ad with the similar ads found in the index.
4. Predict how the ad will perform, identify risks, and recommend whether to approve, suspend, or reject it.

Be specific and ground every claim in the supplied material. \
Always answer by calling the generate_ad_analysis_report function.";

/// Assembles the user message from the three pipeline inputs.
#[must_use]
pub fn build_user_prompt(
    video: &VideoAnalysis,
    user_profile: &str,
    competitive: &CompetitiveSearch,
) -> String {
    let gist = video.gist.as_ref().map_or_else(
        || "Not available".to_string(),
        |g| {
            format!(
                "Title: {}\nTopics: {}\nHashtags: {}",
                g.title.as_deref().unwrap_or("Untitled"),
                join_or_none(&g.topics),
                join_or_none(&g.hashtags),
            )
        },
    );
    let breakdown = video
        .creative_breakdown
        .as_deref()
        .unwrap_or("Not available");
    let competitive_json =
        serde_json::to_string_pretty(competitive).unwrap_or_else(|_| "[]".to_string());

    format!(
        "Analyze this video advertisement and produce the full report.\n\n\
         ## Video summary\n{summary}\n\n\
         ## Gist\n{gist}\n\n\
         ## Creative breakdown\n{breakdown}\n\n\
         ## User profile\n{user_profile}\n\n\
         ## Similar ads in the index ({count} found)\n{competitive_json}\n\n\
         Tailor the recommendations to this user. Use a confidence_score from 0 to 100 \
         and an emotion_intensity from 1 to 10.",
        summary = video.summary,
        count = competitive.hits.len(),
    )
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

fn string() -> Value {
    json!({ "type": "string" })
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn object(properties: Value, required: &[&str]) -> Value {
    json!({ "type": "object", "properties": properties, "required": required })
}

/// JSON Schema for the report, mirroring `AnalysisReport`.
#[must_use]
pub fn report_schema() -> Value {
    object(
        json!({
            "video_summary": string(),
            "metadata": object(json!({
                "brand": string(),
                "campaign": string(),
                "platform": string(),
                "region": string(),
                "time_period": string(),
            }), &[]),
            "creative_features": object(json!({
                "visual_style": string(),
                "pacing": string(),
                "audio": string(),
                "text_overlays": string(),
                "key_visual_elements": string_list(),
                "call_to_action": string(),
            }), &[]),
            "emotional_features": object(json!({
                "primary_emotion": string(),
                "emotional_tone": string(),
                "emotion_intensity": { "type": "integer", "minimum": 1, "maximum": 10 },
                "emotional_arc": string(),
            }), &[]),
            "success_prediction": object(json!({
                "confidence_score": { "type": "integer", "minimum": 0, "maximum": 100 },
                "key_strengths": string_list(),
                "success_factors": string_list(),
                "audience_fit": string(),
                "competitive_advantage": string(),
            }), &["confidence_score"]),
            "risk_assessment": object(json!({
                "risk_level": { "type": "string", "enum": ["low", "medium", "high"] },
                "potential_issues": string_list(),
                "failure_risks": string_list(),
                "mitigation_strategies": string_list(),
            }), &["risk_level"]),
            "personalized_recommendations": object(json!({
                "decision_suggestion": {
                    "type": "string",
                    "enum": ["approve", "suspend", "reject"]
                },
                "action_items": string_list(),
                "priority_improvements": string_list(),
                "user_specific_insights": string(),
                "roi_projection": string(),
                "competitive_positioning": string(),
            }), &["decision_suggestion", "user_specific_insights"]),
            "creative_analysis": object(json!({
                "hook_effectiveness": string(),
                "message_clarity": string(),
                "brand_integration": string(),
                "visual_storytelling": string(),
            }), &[
                "hook_effectiveness",
                "message_clarity",
                "brand_integration",
                "visual_storytelling",
            ]),
            "competitive_intelligence": object(json!({
                "market_positioning": string(),
                "differentiation": string(),
                "benchmark_comparison": string(),
                "trend_alignment": string(),
            }), &[
                "market_positioning",
                "differentiation",
                "benchmark_comparison",
                "trend_alignment",
            ]),
        }),
        &[
            "success_prediction",
            "risk_assessment",
            "personalized_recommendations",
            "creative_analysis",
            "competitive_intelligence",
        ],
    )
}

#[must_use]
pub fn report_tool() -> Tool {
    Tool::function(FunctionDefinition {
        name: REPORT_FUNCTION.to_string(),
        description: "Return the complete structured analysis report for the advertisement."
            .to_string(),
        parameters: report_schema(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adonomics_core::{CompetitiveHit, GistSummary, PerformanceIndicators};

    fn video() -> VideoAnalysis {
        VideoAnalysis {
            summary: "Runner at dawn.".to_string(),
            gist: Some(GistSummary {
                title: Some("Dawn Run".to_string()),
                topics: vec!["running".to_string()],
                hashtags: Vec::new(),
            }),
            creative_breakdown: None,
        }
    }

    #[test]
    fn prompt_embeds_every_input() {
        let competitive = CompetitiveSearch {
            query_video_id: "v1".to_string(),
            hits: vec![CompetitiveHit {
                id: "v9".to_string(),
                title: Some("Night Run".to_string()),
                score: 80.0,
                performance_indicators: PerformanceIndicators::NotAvailable,
            }],
        };
        let prompt = build_user_prompt(&video(), "The user is a brand manager.", &competitive);

        assert!(prompt.contains("Runner at dawn."));
        assert!(prompt.contains("Title: Dawn Run"));
        assert!(prompt.contains("Hashtags: none"));
        assert!(prompt.contains("## Creative breakdown\nNot available"));
        assert!(prompt.contains("The user is a brand manager."));
        assert!(prompt.contains("(1 found)"));
        assert!(prompt.contains("Night Run"));
    }

    #[test]
    fn prompt_is_deterministic() {
        let competitive = CompetitiveSearch::default();
        assert_eq!(
            build_user_prompt(&video(), "p", &competitive),
            build_user_prompt(&video(), "p", &competitive)
        );
    }

    #[test]
    fn schema_marks_contract_fields_required() {
        let schema = report_schema();
        let required = |path: &str| -> Vec<String> {
            schema["properties"][path]["required"]
                .as_array()
                .expect("required array")
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        };

        assert_eq!(required("success_prediction"), vec!["confidence_score"]);
        assert_eq!(required("risk_assessment"), vec!["risk_level"]);
        assert!(required("personalized_recommendations")
            .contains(&"decision_suggestion".to_string()));
        assert_eq!(required("creative_analysis").len(), 4);
        assert_eq!(required("competitive_intelligence").len(), 4);
        assert_eq!(
            schema["properties"]["risk_assessment"]["properties"]["risk_level"]["enum"],
            json!(["low", "medium", "high"])
        );
    }

    #[test]
    fn tool_is_named_for_forced_choice() {
        let tool = report_tool();
        assert_eq!(tool.function.name, REPORT_FUNCTION);
        assert_eq!(tool.kind, "function");
    }
}
