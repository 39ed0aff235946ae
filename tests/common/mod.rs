// Shared helpers for integration tests.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use scamscan_backend::models::{
    AnalysisRecord, AnalysisStatus, BodyContent, DebugArtifacts, ExtractedEntities,
    IndicatorReport, IndicatorSet, MessageArtifact, RiskAssessment, SenderInfo, SeverityLabel,
    SourceType, ThreatCategory,
};

/// Builds a completed record with the fields the store and stats code
/// actually discriminate on; everything else is minimal filler.
pub fn make_record(
    id: &str,
    threat_score: u8,
    category: ThreatCategory,
    impersonated_brand: Option<&str>,
    created_at: DateTime<Utc>,
) -> AnalysisRecord {
    let artifact = MessageArtifact {
        source_type: SourceType::Email,
        sender: SenderInfo::default(),
        subject: None,
        body: BodyContent {
            original_text: "test message".to_string(),
            clean_text: None,
        },
        extracted_entities: ExtractedEntities::default(),
        metadata: HashMap::new(),
    };
    let assessment = RiskAssessment {
        risk_score: threat_score,
        severity_label: SeverityLabel::from_score(threat_score),
        scam_type: "Phishing".to_string(),
        top_reasons: Vec::new(),
        explanation: String::new(),
        recommended_actions: None,
    };

    AnalysisRecord {
        id: id.to_string(),
        created_at,
        updated_at: created_at,
        source_type: SourceType::Email,
        source_name: "Unknown".to_string(),
        status: AnalysisStatus::Completed,
        threat_score,
        confidence: 0.9,
        category,
        user_summary: String::new(),
        why_flagged: Vec::new(),
        recommended_actions: Vec::new(),
        indicators: IndicatorSet::default(),
        timeline: Vec::new(),
        raw_content: "test message".to_string(),
        safe_preview: "test message...".to_string(),
        impersonated_brand: impersonated_brand.map(String::from),
        debug_artifacts: DebugArtifacts {
            message_artifact: artifact,
            indicators: IndicatorReport::default(),
            link_findings: Vec::new(),
            risk_assessment: assessment,
        },
    }
}
