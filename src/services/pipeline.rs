// Pipeline orchestrator
//
// Strictly sequential five-stage state machine: ingest, extract
// indicators, gather URL evidence, score, report. Every stage transition
// appends a telemetry event; a stage failure aborts the run without
// persisting a record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{error, info};
use url::Url;
use uuid::Uuid;

use crate::agents::{AgentError, IndicatorExtractor, Ingestor, ReportWriter, RiskScorer};
use crate::evidence::EvidenceAggregator;
use crate::models::{
    ActionPriority, AnalysisEvent, AnalysisRecord, AnalysisStatus, DebugArtifacts, EventAction,
    IndicatorSet, RecommendedAction, RiskAssessment, SourceType, ThreatCategory, TimelineEntry,
    TimelineStatus,
};
use crate::services::store::{AnalysisStore, StoreError};

const INGESTION_AGENT: &str = "IngestionAgent";
const EXTRACTOR_AGENT: &str = "ExtractorAgent";
const LINK_ANALYZER_AGENT: &str = "LinkAnalyzerAgent";
const SCORING_AGENT: &str = "ScoringAgent";
const REPORT_AGENT: &str = "ReportAgent";
const ORCHESTRATOR: &str = "Orchestrator";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("{agent} stage failed: {source}")]
    Stage {
        /// Run id, usable to fetch the failure trail from the event log.
        id: String,
        agent: &'static str,
        #[source]
        source: AgentError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub struct AnalysisPipeline {
    ingestor: Arc<dyn Ingestor>,
    extractor: Arc<dyn IndicatorExtractor>,
    evidence: EvidenceAggregator,
    scorer: Arc<dyn RiskScorer>,
    reporter: Arc<dyn ReportWriter>,
    store: Arc<AnalysisStore>,
}

impl AnalysisPipeline {
    pub fn new(
        ingestor: Arc<dyn Ingestor>,
        extractor: Arc<dyn IndicatorExtractor>,
        evidence: EvidenceAggregator,
        scorer: Arc<dyn RiskScorer>,
        reporter: Arc<dyn ReportWriter>,
        store: Arc<AnalysisStore>,
    ) -> Self {
        Self {
            ingestor,
            extractor,
            evidence,
            scorer,
            reporter,
            store,
        }
    }

    /// Runs the full pipeline and persists the completed record. On any
    /// stage failure no record is persisted; the event log keeps the
    /// per-stage failure plus an Orchestrator-attributed failure.
    pub async fn run(
        &self,
        text: &str,
        source_type: SourceType,
        metadata: HashMap<String, Value>,
    ) -> Result<AnalysisRecord, PipelineError> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        info!("starting analysis {} ({:?})", id, source_type);

        // 1. Ingestion
        self.log(&id, INGESTION_AGENT, EventAction::Started, json!({"text_length": text.len()}))
            .await;
        let mut artifact = match self.ingestor.process(text, source_type).await {
            Ok(artifact) => artifact,
            Err(e) => return self.fail(&id, INGESTION_AGENT, e).await,
        };
        artifact.source_type = source_type;
        artifact.metadata.extend(metadata);
        self.log(&id, INGESTION_AGENT, EventAction::Completed, to_details(&artifact))
            .await;

        // 2. Indicator extraction
        self.log(&id, EXTRACTOR_AGENT, EventAction::Started, json!({})).await;
        let indicators = match self.extractor.analyze(&artifact).await {
            Ok(indicators) => indicators,
            Err(e) => return self.fail(&id, EXTRACTOR_AGENT, e).await,
        };
        self.log(&id, EXTRACTOR_AGENT, EventAction::Completed, to_details(&indicators))
            .await;

        // 3. Evidence gathering; partial failures are absorbed into the
        // facts themselves, so this stage cannot abort the run.
        let urls = artifact.extracted_entities.urls.clone();
        self.log(&id, LINK_ANALYZER_AGENT, EventAction::Started, json!({"url_count": urls.len()}))
            .await;
        let findings = self.evidence.analyze(&urls).await;
        self.log(&id, LINK_ANALYZER_AGENT, EventAction::Completed, to_details(&findings))
            .await;

        // 4. Scoring
        self.log(&id, SCORING_AGENT, EventAction::Started, json!({})).await;
        let assessment = match self.scorer.score(&indicators, &findings).await {
            Ok(assessment) => assessment,
            Err(e) => return self.fail(&id, SCORING_AGENT, e).await,
        };
        self.log(&id, SCORING_AGENT, EventAction::Completed, to_details(&assessment))
            .await;

        // 5. Reporting
        self.log(&id, REPORT_AGENT, EventAction::Started, json!({})).await;
        let report_text = match self
            .reporter
            .generate(&artifact, &assessment, &findings, &indicators)
            .await
        {
            Ok(report) => report,
            Err(e) => return self.fail(&id, REPORT_AGENT, e).await,
        };
        self.log(
            &id,
            REPORT_AGENT,
            EventAction::Completed,
            json!({"summary_length": report_text.len()}),
        )
        .await;

        let record = assemble_record(&id, created_at, text, artifact, indicators, findings, assessment, report_text);
        self.store.put(record.clone()).await?;
        info!("analysis {} completed with score {}", id, record.threat_score);
        Ok(record)
    }

    async fn log(&self, id: &str, agent: &str, action: EventAction, details: Value) {
        self.store
            .append_event(id, AnalysisEvent::now(agent, action, details))
            .await;
    }

    async fn fail(
        &self,
        id: &str,
        agent: &'static str,
        source: AgentError,
    ) -> Result<AnalysisRecord, PipelineError> {
        error!("analysis {} failed in {}: {}", id, agent, source);
        self.log(id, agent, EventAction::Failed, json!({"error": source.to_string()}))
            .await;
        self.log(id, ORCHESTRATOR, EventAction::Failed, json!({"error": source.to_string()}))
            .await;
        Err(PipelineError::Stage {
            id: id.to_string(),
            agent,
            source,
        })
    }
}

fn to_details<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

#[allow(clippy::too_many_arguments)]
fn assemble_record(
    id: &str,
    created_at: chrono::DateTime<Utc>,
    text: &str,
    artifact: crate::models::MessageArtifact,
    indicators: crate::models::IndicatorReport,
    findings: Vec<crate::evidence::EvidenceFact>,
    assessment: RiskAssessment,
    report_text: String,
) -> AnalysisRecord {
    let source_name = artifact.source_name();
    let safe_preview = artifact.safe_preview();
    let urls = artifact.extracted_entities.urls.clone();
    let domains = domains_of(&urls);

    let impersonated_brand = indicators
        .brand_impersonation
        .detected
        .then(|| indicators.brand_impersonation.brand_name.clone())
        .flatten();

    let recommended_actions = assessment
        .recommended_actions
        .clone()
        .unwrap_or_else(|| default_recommendations(assessment.risk_score));

    AnalysisRecord {
        id: id.to_string(),
        created_at,
        updated_at: Utc::now(),
        source_type: artifact.source_type,
        source_name,
        status: AnalysisStatus::Completed,
        threat_score: assessment.risk_score,
        confidence: 0.9,
        category: map_threat_category(&assessment.scam_type),
        user_summary: report_text,
        why_flagged: assessment.top_reasons.clone(),
        recommended_actions,
        indicators: IndicatorSet {
            urls,
            domains,
            emails: artifact.extracted_entities.emails.clone(),
            phones: artifact.extracted_entities.phones.clone(),
        },
        timeline: build_timeline(created_at),
        raw_content: text.to_string(),
        safe_preview,
        impersonated_brand,
        debug_artifacts: DebugArtifacts {
            message_artifact: artifact,
            indicators,
            link_findings: findings,
            risk_assessment: assessment,
        },
    }
}

/// Maps the raw scam-type string onto the closed category taxonomy.
/// Substring matching, case-insensitive, in precedence order.
pub fn map_threat_category(scam_type: &str) -> ThreatCategory {
    let upper = scam_type.to_uppercase();
    if upper.contains("PHISHING") {
        ThreatCategory::Phishing
    } else if upper.contains("MALWARE") || upper.contains("VIRUS") {
        ThreatCategory::MaliciousLink
    } else if upper.contains("SCAM") || upper.contains("SOCIAL") {
        ThreatCategory::SocialScam
    } else {
        ThreatCategory::Other
    }
}

/// Fallback recommendations when the scoring collaborator supplies none.
pub fn default_recommendations(score: u8) -> Vec<RecommendedAction> {
    if score > 70 {
        vec![
            RecommendedAction::new(
                "Do not click any links",
                ActionPriority::High,
                "High risk of phishing or malware.",
            ),
            RecommendedAction::new(
                "Block the sender",
                ActionPriority::High,
                "Prevent further contact.",
            ),
        ]
    } else if score > 30 {
        vec![RecommendedAction::new(
            "Verify sender identity",
            ActionPriority::Med,
            "Contact them through a separate, trusted channel.",
        )]
    } else {
        vec![RecommendedAction::new(
            "No immediate action needed",
            ActionPriority::Low,
            "Message appears safe, but stay vigilant.",
        )]
    }
}

fn domains_of(urls: &[String]) -> Vec<String> {
    let mut domains = Vec::new();
    for url in urls {
        if let Some(host) = Url::parse(url).ok().and_then(|u| u.host_str().map(String::from)) {
            if !domains.contains(&host) {
                domains.push(host);
            }
        }
    }
    domains
}

fn build_timeline(start: chrono::DateTime<Utc>) -> Vec<TimelineEntry> {
    vec![
        TimelineEntry {
            timestamp: start,
            label: "Analysis Started".to_string(),
            description: "Message received and queued for analysis".to_string(),
            status: TimelineStatus::Info,
        },
        TimelineEntry {
            timestamp: start + Duration::seconds(2),
            label: "AI Scanning".to_string(),
            description: "Scanning for malicious patterns and links".to_string(),
            status: TimelineStatus::Info,
        },
        TimelineEntry {
            timestamp: start + Duration::seconds(4),
            label: "Complete".to_string(),
            description: "Analysis finished successfully".to_string(),
            status: TimelineStatus::Success,
        },
    ]
}
