//! The structured creative-performance report.
//!
//! This is the contract the language-model tool call must satisfy. Fields
//! without `#[serde(default)]` are required: a payload missing any of them
//! fails to deserialize.

use serde::{Deserialize, Serialize};

use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionSuggestion {
    Approve,
    Suspend,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetadata {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub campaign: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub time_period: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeFeatures {
    #[serde(default)]
    pub visual_style: String,
    #[serde(default)]
    pub pacing: String,
    #[serde(default)]
    pub audio: String,
    #[serde(default)]
    pub text_overlays: String,
    #[serde(default)]
    pub key_visual_elements: Vec<String>,
    #[serde(default)]
    pub call_to_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionalFeatures {
    #[serde(default)]
    pub primary_emotion: String,
    #[serde(default)]
    pub emotional_tone: String,
    /// 1–10 when present.
    #[serde(default)]
    pub emotion_intensity: Option<u8>,
    #[serde(default)]
    pub emotional_arc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessPrediction {
    /// 0–100.
    pub confidence_score: u8,
    #[serde(default)]
    pub key_strengths: Vec<String>,
    #[serde(default)]
    pub success_factors: Vec<String>,
    #[serde(default)]
    pub audience_fit: String,
    #[serde(default)]
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub potential_issues: Vec<String>,
    #[serde(default)]
    pub failure_risks: Vec<String>,
    #[serde(default)]
    pub mitigation_strategies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalizedRecommendations {
    pub decision_suggestion: DecisionSuggestion,
    #[serde(default)]
    pub action_items: Vec<String>,
    #[serde(default)]
    pub priority_improvements: Vec<String>,
    pub user_specific_insights: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roi_projection: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competitive_positioning: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreativeAnalysis {
    pub hook_effectiveness: String,
    pub message_clarity: String,
    pub brand_integration: String,
    pub visual_storytelling: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompetitiveIntelligence {
    pub market_positioning: String,
    pub differentiation: String,
    pub benchmark_comparison: String,
    pub trend_alignment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub video_summary: String,
    #[serde(default)]
    pub metadata: ReportMetadata,
    #[serde(default)]
    pub creative_features: CreativeFeatures,
    #[serde(default)]
    pub emotional_features: EmotionalFeatures,
    pub success_prediction: SuccessPrediction,
    pub risk_assessment: RiskAssessment,
    pub personalized_recommendations: PersonalizedRecommendations,
    pub creative_analysis: CreativeAnalysis,
    pub competitive_intelligence: CompetitiveIntelligence,
}

const UNAVAILABLE: &str = "Analysis unavailable - manual review required";

impl AnalysisReport {
    /// Checks the numeric ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ReportOutOfRange`] naming the offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.success_prediction.confidence_score > 100 {
            return Err(CoreError::ReportOutOfRange(format!(
                "confidence_score {} exceeds 100",
                self.success_prediction.confidence_score
            )));
        }
        if let Some(intensity) = self.emotional_features.emotion_intensity {
            if !(1..=10).contains(&intensity) {
                return Err(CoreError::ReportOutOfRange(format!(
                    "emotion_intensity {intensity} outside 1-10"
                )));
            }
        }
        Ok(())
    }

    /// The fixed report used whenever synthesis cannot produce a valid one.
    ///
    /// Always suggests `suspend` at `medium` risk so nothing ships on the
    /// strength of a report no model actually wrote.
    #[must_use]
    pub fn fallback() -> Self {
        let unavailable = || UNAVAILABLE.to_string();
        Self {
            video_summary: "Automated analysis could not be completed for this video.".to_string(),
            metadata: ReportMetadata {
                brand: "Unknown".to_string(),
                campaign: "Unknown".to_string(),
                platform: "Unknown".to_string(),
                region: "Unknown".to_string(),
                time_period: "Unknown".to_string(),
            },
            creative_features: CreativeFeatures {
                visual_style: unavailable(),
                pacing: unavailable(),
                audio: unavailable(),
                text_overlays: unavailable(),
                key_visual_elements: Vec::new(),
                call_to_action: unavailable(),
            },
            emotional_features: EmotionalFeatures {
                primary_emotion: unavailable(),
                emotional_tone: unavailable(),
                emotion_intensity: None,
                emotional_arc: unavailable(),
            },
            success_prediction: SuccessPrediction {
                confidence_score: 50,
                key_strengths: vec!["Requires manual review".to_string()],
                success_factors: vec!["Requires manual review".to_string()],
                audience_fit: unavailable(),
                competitive_advantage: unavailable(),
            },
            risk_assessment: RiskAssessment {
                risk_level: RiskLevel::Medium,
                potential_issues: vec!["Automated analysis failed".to_string()],
                failure_risks: vec!["Unable to assess automatically".to_string()],
                mitigation_strategies: vec!["Conduct a manual creative review".to_string()],
            },
            personalized_recommendations: PersonalizedRecommendations {
                decision_suggestion: DecisionSuggestion::Suspend,
                action_items: vec!["Review the advertisement manually".to_string()],
                priority_improvements: vec!["Re-run the analysis later".to_string()],
                user_specific_insights:
                    "Automated insights are unavailable; a manual review is recommended."
                        .to_string(),
                roi_projection: None,
                competitive_positioning: None,
            },
            creative_analysis: CreativeAnalysis {
                hook_effectiveness: unavailable(),
                message_clarity: unavailable(),
                brand_integration: unavailable(),
                visual_storytelling: unavailable(),
            },
            competitive_intelligence: CompetitiveIntelligence {
                market_positioning: unavailable(),
                differentiation: unavailable(),
                benchmark_comparison: unavailable(),
                trend_alignment: unavailable(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_payload() -> serde_json::Value {
        serde_json::json!({
            "success_prediction": { "confidence_score": 72 },
            "risk_assessment": { "risk_level": "low" },
            "personalized_recommendations": {
                "decision_suggestion": "approve",
                "user_specific_insights": "Fits a performance marketer."
            },
            "creative_analysis": {
                "hook_effectiveness": "Strong open",
                "message_clarity": "Clear",
                "brand_integration": "Logo early",
                "visual_storytelling": "Coherent"
            },
            "competitive_intelligence": {
                "market_positioning": "Premium",
                "differentiation": "Unique tone",
                "benchmark_comparison": "Above average",
                "trend_alignment": "On trend"
            }
        })
    }

    #[test]
    fn fallback_is_valid_and_conservative() {
        let report = AnalysisReport::fallback();
        assert!(report.validate().is_ok());
        assert_eq!(
            report.personalized_recommendations.decision_suggestion,
            DecisionSuggestion::Suspend
        );
        assert_eq!(report.risk_assessment.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn fallback_is_deterministic() {
        assert_eq!(AnalysisReport::fallback(), AnalysisReport::fallback());
    }

    #[test]
    fn minimal_payload_deserializes_with_defaults() {
        let report: AnalysisReport =
            serde_json::from_value(minimal_payload()).expect("deserialize");
        assert_eq!(report.success_prediction.confidence_score, 72);
        assert!(report.metadata.brand.is_empty());
        assert!(report.validate().is_ok());
    }

    #[test]
    fn missing_required_field_fails() {
        let mut payload = minimal_payload();
        payload["creative_analysis"]
            .as_object_mut()
            .expect("object")
            .remove("message_clarity");
        assert!(serde_json::from_value::<AnalysisReport>(payload).is_err());
    }

    #[test]
    fn unknown_risk_level_fails() {
        let mut payload = minimal_payload();
        payload["risk_assessment"]["risk_level"] = serde_json::json!("extreme");
        assert!(serde_json::from_value::<AnalysisReport>(payload).is_err());
    }

    #[test]
    fn confidence_above_100_is_rejected() {
        let mut payload = minimal_payload();
        payload["success_prediction"]["confidence_score"] = serde_json::json!(140);
        let report: AnalysisReport = serde_json::from_value(payload).expect("deserialize");
        assert!(matches!(
            report.validate(),
            Err(CoreError::ReportOutOfRange(_))
        ));
    }

    #[test]
    fn emotion_intensity_outside_range_is_rejected() {
        let mut payload = minimal_payload();
        payload["emotional_features"] = serde_json::json!({ "emotion_intensity": 0 });
        let report: AnalysisReport = serde_json::from_value(payload).expect("deserialize");
        assert!(report.validate().is_err());
    }
}
