// End-to-end pipeline tests over the deterministic agents with stubbed
// network adapters.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use scamscan_backend::agents::{
    AgentError, HeuristicExtractor, HeuristicScorer, RegexIngestor, RiskScorer, TemplateReporter,
};
use scamscan_backend::evidence::{
    AdapterError, EvidenceAggregator, EvidenceFact, FetchResult, RegistrationLookup,
    RegistrationRecord, UrlFetcher,
};
use scamscan_backend::models::{
    AnalysisStatus, EventAction, IndicatorReport, RiskAssessment, SourceType, ThreatCategory,
};
use scamscan_backend::services::{AnalysisPipeline, AnalysisStore, PipelineError};

const PHISHING_PAGE: &str = r#"
<html><body>
<h1>PayPal - Confirm your account</h1>
<form action="/login">
  <input type="email" name="email">
  <input type="password" name="password">
</form>
</body></html>
"#;

const PHISHING_EMAIL: &str = "From: PayPal Support <alerts@secure-updates.example>\n\
    Subject: Your account has been suspended\n\n\
    Please verify your account immediately: http://paypal-verify.example/login";

struct PhishingPageFetcher;

#[async_trait]
impl UrlFetcher for PhishingPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, AdapterError> {
        Ok(FetchResult {
            final_url: url.to_string(),
            redirect_chain: Vec::new(),
            status_code: 200,
            headers: HashMap::new(),
            html_content: PHISHING_PAGE.to_string(),
        })
    }
}

struct YoungDomainRegistration;

#[async_trait]
impl RegistrationLookup for YoungDomainRegistration {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord, AdapterError> {
        Ok(RegistrationRecord {
            domain: domain.to_string(),
            creation_date: Some(Utc::now() - Duration::days(5)),
            age_days: Some(5),
            registrar: Some("Cheap Domains Inc".to_string()),
            privacy_protection: true,
        })
    }
}

struct BrokenScorer;

#[async_trait]
impl RiskScorer for BrokenScorer {
    async fn score(
        &self,
        _indicators: &IndicatorReport,
        _findings: &[EvidenceFact],
    ) -> Result<RiskAssessment, AgentError> {
        Err(AgentError::Transport("connection reset".to_string()))
    }
}

fn build_pipeline(
    scorer: Arc<dyn RiskScorer>,
    store: Arc<AnalysisStore>,
) -> AnalysisPipeline {
    let aggregator = EvidenceAggregator::new(
        Arc::new(PhishingPageFetcher),
        Arc::new(YoungDomainRegistration),
        None,
    );
    AnalysisPipeline::new(
        Arc::new(RegexIngestor),
        Arc::new(HeuristicExtractor),
        aggregator,
        scorer,
        Arc::new(TemplateReporter),
        store,
    )
}

#[tokio::test]
async fn phishing_email_produces_high_risk_record() {
    let store = Arc::new(AnalysisStore::in_memory());
    let pipeline = build_pipeline(Arc::new(HeuristicScorer), store.clone());

    let record = pipeline
        .run(PHISHING_EMAIL, SourceType::Email, HashMap::new())
        .await
        .unwrap();

    assert_eq!(record.status, AnalysisStatus::Completed);
    assert!(record.threat_score >= 61, "score {}", record.threat_score);
    assert_eq!(record.category, ThreatCategory::Phishing);
    assert_eq!(record.impersonated_brand.as_deref(), Some("paypal"));
    assert!(!record.why_flagged.is_empty());
    assert!(record.user_summary.contains("Scam Risk Analysis Report"));
    assert_eq!(record.timeline.len(), 3);

    // High-risk records carry two high-priority recommendations.
    assert_eq!(record.recommended_actions.len(), 2);

    assert!(record
        .indicators
        .urls
        .contains(&"http://paypal-verify.example/login".to_string()));
    assert!(record
        .indicators
        .domains
        .contains(&"paypal-verify.example".to_string()));

    // The record is queryable through the store.
    let listed = store.list().await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, record.id);
}

#[tokio::test]
async fn pipeline_emits_stage_events_in_order() {
    let store = Arc::new(AnalysisStore::in_memory());
    let pipeline = build_pipeline(Arc::new(HeuristicScorer), store.clone());

    let record = pipeline
        .run(PHISHING_EMAIL, SourceType::Email, HashMap::new())
        .await
        .unwrap();

    let events = store.events_for(&record.id).await.unwrap();
    let started: Vec<&str> = events
        .iter()
        .filter(|e| e.action == EventAction::Started)
        .map(|e| e.agent_name.as_str())
        .collect();
    assert_eq!(
        started,
        [
            "IngestionAgent",
            "ExtractorAgent",
            "LinkAnalyzerAgent",
            "ScoringAgent",
            "ReportAgent"
        ]
    );

    // Each stage completed; nothing failed.
    let completed = events
        .iter()
        .filter(|e| e.action == EventAction::Completed)
        .count();
    assert_eq!(completed, 5);
    assert!(events.iter().all(|e| e.action != EventAction::Failed));
}

#[tokio::test]
async fn failed_stage_leaves_events_but_no_record() {
    let store = Arc::new(AnalysisStore::in_memory());
    let pipeline = build_pipeline(Arc::new(BrokenScorer), store.clone());

    let err = pipeline
        .run(PHISHING_EMAIL, SourceType::Email, HashMap::new())
        .await
        .unwrap_err();
    let PipelineError::Stage { id, agent, .. } = err else {
        panic!("expected a stage failure, got {:?}", err);
    };
    assert_eq!(agent, "ScoringAgent");

    // No partial record was persisted.
    assert_eq!(store.count().await, 0);
    assert!(store.list().await.is_empty());

    // But the failure trail exists under the run id.
    let events = store.events_for(&id).await.unwrap();
    assert!(events
        .iter()
        .any(|e| e.agent_name == "ScoringAgent" && e.action == EventAction::Failed));
    let last = events.last().unwrap();
    assert_eq!(last.agent_name, "Orchestrator");
    assert_eq!(last.action, EventAction::Failed);
}

#[tokio::test]
async fn url_submission_flows_through_as_url_source() {
    let store = Arc::new(AnalysisStore::in_memory());
    let pipeline = build_pipeline(Arc::new(HeuristicScorer), store.clone());

    let record = pipeline
        .run(
            "URL to analyze: http://paypal-verify.example/login",
            SourceType::Url,
            HashMap::new(),
        )
        .await
        .unwrap();

    assert_eq!(record.source_type, SourceType::Url);
    assert_eq!(record.indicators.urls.len(), 1);
}

#[tokio::test]
async fn metadata_is_carried_onto_the_artifact() {
    let store = Arc::new(AnalysisStore::in_memory());
    let pipeline = build_pipeline(Arc::new(HeuristicScorer), store.clone());

    let mut metadata = HashMap::new();
    metadata.insert(
        "filename".to_string(),
        serde_json::Value::String("suspicious.txt".to_string()),
    );
    let record = pipeline
        .run(PHISHING_EMAIL, SourceType::File, metadata)
        .await
        .unwrap();

    assert_eq!(record.source_type, SourceType::File);
    assert_eq!(
        record
            .debug_artifacts
            .message_artifact
            .metadata
            .get("filename")
            .and_then(|v| v.as_str()),
        Some("suspicious.txt")
    );
}
