// Risk assessment produced by the scoring stage

use serde::{Deserialize, Serialize};

/// Qualitative tier derived from the numeric risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeverityLabel {
    Safe,     // 0-20
    Low,      // 21-40
    Medium,   // 41-60
    High,     // 61-80
    Critical, // 81-100
}

impl SeverityLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=20 => SeverityLabel::Safe,
            21..=40 => SeverityLabel::Low,
            41..=60 => SeverityLabel::Medium,
            61..=80 => SeverityLabel::High,
            _ => SeverityLabel::Critical,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionPriority {
    High,
    Med,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub title: String,
    pub priority: ActionPriority,
    pub detail: String,
}

impl RecommendedAction {
    pub fn new(title: &str, priority: ActionPriority, detail: &str) -> Self {
        Self {
            title: title.to_string(),
            priority,
            detail: detail.to_string(),
        }
    }
}

/// Produced once per analysis from indicators + evidence facts; immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub severity_label: SeverityLabel,
    pub scam_type: String,
    #[serde(default)]
    pub top_reasons: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    /// The scoring collaborator may supply its own actions; the
    /// orchestrator derives defaults from the score when it does not.
    #[serde(default)]
    pub recommended_actions: Option<Vec<RecommendedAction>>,
}
