// Persisted analysis record and its telemetry events

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::artifact::MessageArtifact;
use super::assessment::{RecommendedAction, RiskAssessment};
use super::indicators::IndicatorReport;
use crate::evidence::EvidenceFact;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Email,
    Url,
    File,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Completed,
    Failed,
}

/// Closed category taxonomy the raw scam-type string is mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreatCategory {
    Phishing,
    MaliciousLink,
    SocialScam,
    Other,
}

impl ThreatCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatCategory::Phishing => "PHISHING",
            ThreatCategory::MaliciousLink => "MALICIOUS_LINK",
            ThreatCategory::SocialScam => "SOCIAL_SCAM",
            ThreatCategory::Other => "OTHER",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Started,
    Completed,
    Failed,
}

/// One telemetry event. Append-only, ordered by timestamp, one list per
/// analysis id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisEvent {
    pub timestamp: DateTime<Utc>,
    pub agent_name: String,
    pub action: EventAction,
    pub details: Value,
}

impl AnalysisEvent {
    pub fn now(agent_name: &str, action: EventAction, details: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            agent_name: agent_name.to_string(),
            action,
            details,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub urls: Vec<String>,
    pub domains: Vec<String>,
    pub emails: Vec<String>,
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    Info,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub label: String,
    pub description: String,
    pub status: TimelineStatus,
}

/// Full intermediate outputs of the run, kept on the record for debugging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebugArtifacts {
    pub message_artifact: MessageArtifact,
    pub indicators: IndicatorReport,
    pub link_findings: Vec<EvidenceFact>,
    pub risk_assessment: RiskAssessment,
}

/// Top-level persisted unit. Created exactly once at the end of a
/// successful pipeline run; never mutated thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub source_type: SourceType,
    pub source_name: String,
    pub status: AnalysisStatus,

    pub threat_score: u8,
    pub confidence: f64,
    pub category: ThreatCategory,

    pub user_summary: String,
    pub why_flagged: Vec<String>,
    pub recommended_actions: Vec<RecommendedAction>,

    pub indicators: IndicatorSet,
    pub timeline: Vec<TimelineEntry>,

    pub raw_content: String,
    pub safe_preview: String,

    #[serde(default)]
    pub impersonated_brand: Option<String>,

    pub debug_artifacts: DebugArtifacts,
}
