//! Deterministic natural-language summary of a user's onboarding answers.
//!
//! The output is embedded in synthesis prompts and stored alongside the
//! report, so identical preferences must always produce identical text.

use crate::preferences::UserPreferences;

pub const NEW_USER_PROFILE: &str =
    "New user with no onboarding preferences recorded yet; tailor recommendations for a general marketing audience.";

pub const NO_PROFILE_INFORMATION: &str = "No profile information available.";

const ROLE_LABELS: &[(&str, &str)] = &[
    ("marketing_manager", "marketing manager"),
    ("brand_manager", "brand manager"),
    ("creative_director", "creative director"),
    ("media_buyer", "media buyer"),
    ("agency_owner", "agency owner"),
    ("founder", "founder"),
    ("analyst", "marketing analyst"),
    ("other", "marketing professional"),
];

const GOAL_LABELS: &[(&str, &str)] = &[
    ("increase_sales", "increasing sales"),
    ("brand_awareness", "building brand awareness"),
    ("lead_generation", "generating leads"),
    ("engagement", "driving engagement"),
    ("customer_retention", "retaining customers"),
    ("app_installs", "driving app installs"),
];

const DECISION_FACTOR_LABELS: &[(&str, &str)] = &[
    ("roi", "return on investment"),
    ("engagement_metrics", "engagement metrics"),
    ("brand_safety", "brand safety"),
    ("creative_quality", "creative quality"),
    ("audience_fit", "audience fit"),
    ("cost_efficiency", "cost efficiency"),
];

const TECHNICAL_COMFORT_LABELS: &[(&str, &str)] = &[
    ("beginner", "beginner"),
    ("intermediate", "intermediate"),
    ("advanced", "advanced"),
    ("expert", "expert"),
];

const CAMPAIGN_TYPE_LABELS: &[(&str, &str)] = &[
    ("awareness", "awareness"),
    ("conversion", "conversion"),
    ("retargeting", "retargeting"),
    ("product_launch", "product launch"),
    ("seasonal", "seasonal"),
];

const PLATFORM_LABELS: &[(&str, &str)] = &[
    ("facebook", "Facebook"),
    ("instagram", "Instagram"),
    ("tiktok", "TikTok"),
    ("youtube", "YouTube"),
    ("linkedin", "LinkedIn"),
    ("twitter", "X (Twitter)"),
    ("snapchat", "Snapchat"),
    ("google_ads", "Google Ads"),
];

const INSIGHT_TIMING_LABELS: &[(&str, &str)] = &[
    ("real_time", "in real time"),
    ("daily", "daily"),
    ("weekly", "weekly"),
    ("before_launch", "before launch"),
];

const RESULT_SPEED_LABELS: &[(&str, &str)] = &[
    ("immediate", "immediately"),
    ("within_week", "within a week"),
    ("within_month", "within a month"),
    ("long_term", "over the long term"),
];

const TEAM_SIZE_LABELS: &[(&str, &str)] = &[
    ("solo", "a solo role"),
    ("small_team", "a small team"),
    ("large_team", "a large team"),
    ("agency", "an agency"),
];

const SHARING_LABELS: &[(&str, &str)] = &[
    ("executives", "executives"),
    ("clients", "clients"),
    ("creative_team", "their creative team"),
    ("media_team", "their media team"),
    ("stakeholders", "other stakeholders"),
];

const PAIN_POINT_LABELS: &[(&str, &str)] = &[
    ("slow_feedback", "slow creative feedback"),
    ("unclear_performance", "unclear performance drivers"),
    ("wasted_spend", "wasted ad spend"),
    ("creative_fatigue", "creative fatigue"),
    ("manual_reporting", "manual reporting"),
];

/// Summarize a preference record as a paragraph of up to eight sentences.
///
/// `None` yields [`NEW_USER_PROFILE`]; a record with every category empty
/// yields [`NO_PROFILE_INFORMATION`].
#[must_use]
pub fn summarize_profile(preferences: Option<&UserPreferences>) -> String {
    let Some(prefs) = preferences else {
        return NEW_USER_PROFILE.to_string();
    };

    let fragments: Vec<String> = [
        role_fragment(prefs),
        list_fragment(&prefs.goals, GOAL_LABELS, "Their primary goals are"),
        list_fragment(
            &prefs.decision_factors,
            DECISION_FACTOR_LABELS,
            "When evaluating ads they prioritize",
        ),
        single(prefs.technical_comfort.as_deref(), TECHNICAL_COMFORT_LABELS)
            .map(|c| format!("They describe their technical comfort as {c}.")),
        campaign_fragment(prefs),
        timing_fragment(prefs),
        team_fragment(prefs),
        list_fragment(
            &prefs.pain_points,
            PAIN_POINT_LABELS,
            "Their biggest pain points are",
        ),
    ]
    .into_iter()
    .flatten()
    .collect();

    if fragments.is_empty() {
        NO_PROFILE_INFORMATION.to_string()
    } else {
        fragments.join(" ")
    }
}

fn role_fragment(prefs: &UserPreferences) -> Option<String> {
    single(prefs.role.as_deref(), ROLE_LABELS)
        .map(|r| format!("The user is {} {r}.", indefinite_article(&r)))
}

fn indefinite_article(noun: &str) -> &'static str {
    match noun.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}

fn campaign_fragment(prefs: &UserPreferences) -> Option<String> {
    let campaigns = join_labels(&prefs.campaign_types, CAMPAIGN_TYPE_LABELS);
    let platforms = join_labels(&prefs.platforms, PLATFORM_LABELS);
    match (campaigns, platforms) {
        (Some(c), Some(p)) => Some(format!("They run {c} campaigns on {p}.")),
        (Some(c), None) => Some(format!("They run {c} campaigns.")),
        (None, Some(p)) => Some(format!("They advertise on {p}.")),
        (None, None) => None,
    }
}

fn timing_fragment(prefs: &UserPreferences) -> Option<String> {
    let timing = single(prefs.insight_timing.as_deref(), INSIGHT_TIMING_LABELS);
    let speed = single(prefs.result_speed.as_deref(), RESULT_SPEED_LABELS);
    match (timing, speed) {
        (Some(t), Some(s)) => Some(format!("They want insights {t} and expect results {s}.")),
        (Some(t), None) => Some(format!("They want insights {t}.")),
        (None, Some(s)) => Some(format!("They expect results {s}.")),
        (None, None) => None,
    }
}

fn team_fragment(prefs: &UserPreferences) -> Option<String> {
    let team = single(prefs.team_size.as_deref(), TEAM_SIZE_LABELS);
    let sharing = join_labels(&prefs.sharing, SHARING_LABELS);
    match (team, sharing) {
        (Some(t), Some(s)) => Some(format!("They work in {t} and share results with {s}.")),
        (Some(t), None) => Some(format!("They work in {t}.")),
        (None, Some(s)) => Some(format!("They share results with {s}.")),
        (None, None) => None,
    }
}

fn list_fragment(values: &[String], table: &[(&str, &str)], lead: &str) -> Option<String> {
    join_labels(values, table).map(|joined| format!("{lead} {joined}."))
}

fn single(value: Option<&str>, table: &[(&str, &str)]) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| label(table, v))
}

fn join_labels(values: &[String], table: &[(&str, &str)]) -> Option<String> {
    let labels: Vec<String> = values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| label(table, v))
        .collect();

    match labels.as_slice() {
        [] => None,
        [a, b] => Some(format!("{a} and {b}")),
        _ => Some(labels.join(", ")),
    }
}

/// Unknown keys fall back to the key itself with underscores spaced out.
fn label(table: &[(&str, &str)], value: &str) -> String {
    table
        .iter()
        .find(|(key, _)| *key == value)
        .map_or_else(|| value.replace('_', " "), |(_, label)| (*label).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_preferences() -> UserPreferences {
        UserPreferences {
            user_id: "u1".to_string(),
            role: Some("media_buyer".to_string()),
            goals: vec!["increase_sales".to_string(), "brand_awareness".to_string()],
            decision_factors: vec![
                "roi".to_string(),
                "brand_safety".to_string(),
                "creative_quality".to_string(),
            ],
            technical_comfort: Some("advanced".to_string()),
            campaign_types: vec!["conversion".to_string()],
            platforms: vec!["tiktok".to_string(), "instagram".to_string()],
            insight_timing: Some("before_launch".to_string()),
            result_speed: Some("within_week".to_string()),
            team_size: Some("small_team".to_string()),
            sharing: vec!["executives".to_string()],
            pain_points: vec!["wasted_spend".to_string()],
            current_step: 8,
            onboarding_completed: true,
            updated_at: None,
        }
    }

    #[test]
    fn none_yields_new_user_sentence() {
        assert_eq!(summarize_profile(None), NEW_USER_PROFILE);
    }

    #[test]
    fn empty_record_yields_no_profile_sentence() {
        let prefs = UserPreferences::empty("u1");
        assert_eq!(summarize_profile(Some(&prefs)), NO_PROFILE_INFORMATION);
    }

    #[test]
    fn blank_values_count_as_absent() {
        let mut prefs = UserPreferences::empty("u1");
        prefs.role = Some("   ".to_string());
        prefs.goals = vec![String::new()];
        assert_eq!(summarize_profile(Some(&prefs)), NO_PROFILE_INFORMATION);
    }

    #[test]
    fn full_record_renders_every_category_in_order() {
        let summary = summarize_profile(Some(&full_preferences()));
        assert_eq!(
            summary,
            "The user is a media buyer. \
             Their primary goals are increasing sales and building brand awareness. \
             When evaluating ads they prioritize return on investment, brand safety, creative quality. \
             They describe their technical comfort as advanced. \
             They run conversion campaigns on TikTok and Instagram. \
             They want insights before launch and expect results within a week. \
             They work in a small team and share results with executives. \
             Their biggest pain points are wasted ad spend."
        );
    }

    #[test]
    fn summary_is_deterministic() {
        let prefs = full_preferences();
        assert_eq!(
            summarize_profile(Some(&prefs)),
            summarize_profile(Some(&prefs))
        );
    }

    #[test]
    fn missing_categories_are_skipped() {
        let mut prefs = UserPreferences::empty("u1");
        prefs.platforms = vec!["youtube".to_string()];
        prefs.result_speed = Some("immediate".to_string());
        assert_eq!(
            summarize_profile(Some(&prefs)),
            "They advertise on YouTube. They expect results immediately."
        );
    }

    #[test]
    fn unknown_keys_fall_back_to_spaced_key() {
        let mut prefs = UserPreferences::empty("u1");
        prefs.role = Some("growth_hacker".to_string());
        assert_eq!(summarize_profile(Some(&prefs)), "The user is a growth hacker.");
    }

    #[test]
    fn role_takes_an_before_a_vowel() {
        let mut prefs = UserPreferences::empty("u1");
        prefs.role = Some("agency_owner".to_string());
        assert_eq!(summarize_profile(Some(&prefs)), "The user is an agency owner.");

        prefs.role = Some("operations_lead".to_string());
        assert_eq!(summarize_profile(Some(&prefs)), "The user is an operations lead.");

        prefs.role = Some("founder".to_string());
        assert_eq!(summarize_profile(Some(&prefs)), "The user is a founder.");
    }

    #[test]
    fn join_uses_and_only_for_exactly_two() {
        let one = vec!["roi".to_string()];
        let two = vec!["roi".to_string(), "brand_safety".to_string()];
        assert_eq!(
            join_labels(&one, DECISION_FACTOR_LABELS).as_deref(),
            Some("return on investment")
        );
        assert_eq!(
            join_labels(&two, DECISION_FACTOR_LABELS).as_deref(),
            Some("return on investment and brand safety")
        );
    }
}
