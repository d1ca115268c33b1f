use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Onboarding answers for one user, filled in step by step.
///
/// Values are the stored enum keys (`"marketing_manager"`, `"tiktok"`, ...);
/// [`crate::profile`] owns the human-readable labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
    pub user_id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub decision_factors: Vec<String>,
    #[serde(default)]
    pub technical_comfort: Option<String>,
    #[serde(default)]
    pub campaign_types: Vec<String>,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub insight_timing: Option<String>,
    #[serde(default)]
    pub result_speed: Option<String>,
    #[serde(default)]
    pub team_size: Option<String>,
    #[serde(default)]
    pub sharing: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub current_step: i16,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl UserPreferences {
    #[must_use]
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Self::default()
        }
    }
}
