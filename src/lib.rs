// Library exports for the ScamScan backend
// This file exposes modules and functions for library consumers

pub mod agents;
pub mod app;
pub mod app_config;
pub mod evidence;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, CONFIG};
pub use evidence::{EvidenceAggregator, EvidenceFact};
pub use handlers::{analysis_routes, analyze_routes, recovery_routes};
pub use middleware::dynamic_cors_middleware;
pub use models::{AnalysisEvent, AnalysisRecord, StatsSummary};
pub use services::{
    AnalysisPipeline, AnalysisStore, PipelineError, RecoveryChatService, StoreError,
    HIGH_RISK_THRESHOLD,
};
pub use utils::ServiceError;

use std::sync::Arc;

use tracing::info;

use agents::{
    HeuristicExtractor, HeuristicScorer, IndicatorExtractor, Ingestor, LlmClient, LlmExtractor,
    LlmIngestor, LlmReporter, LlmScorer, RegexIngestor, ReportWriter, RiskScorer,
    TemplateReporter,
};

// Library initialization: wires the store, agents, and pipeline together.
pub async fn initialize_app_state() -> anyhow::Result<AppState> {
    dotenv::dotenv().ok();

    let config = app_config::config();
    let store = Arc::new(AnalysisStore::open(&config.data_dir));

    let (ingestor, extractor, scorer, reporter, llm): (
        Arc<dyn Ingestor>,
        Arc<dyn IndicatorExtractor>,
        Arc<dyn RiskScorer>,
        Arc<dyn ReportWriter>,
        Option<Arc<LlmClient>>,
    ) = match &config.llm_api_key {
        Some(api_key) => {
            info!("LLM credentials found, using model-backed agents ({})", config.llm_model);
            let client = Arc::new(LlmClient::new(config, api_key.clone())?);
            (
                Arc::new(LlmIngestor::new(client.clone())),
                Arc::new(LlmExtractor::new(client.clone())),
                Arc::new(LlmScorer::new(client.clone())),
                Arc::new(LlmReporter::new(client.clone())),
                Some(client),
            )
        },
        None => {
            info!("no LLM credentials, using deterministic agents");
            (
                Arc::new(RegexIngestor),
                Arc::new(HeuristicExtractor),
                Arc::new(HeuristicScorer),
                Arc::new(TemplateReporter),
                None,
            )
        },
    };

    let aggregator = EvidenceAggregator::from_config(config)?;
    let pipeline = Arc::new(AnalysisPipeline::new(
        ingestor,
        extractor,
        aggregator,
        scorer,
        reporter,
        store.clone(),
    ));
    let recovery = Arc::new(RecoveryChatService::new(llm));

    Ok(AppState {
        config: Arc::new(config.clone()),
        store,
        pipeline,
        recovery,
    })
}

/// Full API router with middleware layers applied.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::routing::get;
    use tower_http::trace::TraceLayer;

    axum::Router::new()
        .nest("/api/analyze", analyze_routes())
        .nest("/api/analyses", analysis_routes())
        .nest("/api/recovery", recovery_routes())
        .route("/api/stats", get(handlers::analyses::get_stats))
        .route("/api/health", get(health_check))
        .layer(axum::middleware::from_fn(dynamic_cors_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Health check handler
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    use axum::Json;

    let analysis_count = state.store.count().await;
    let response = serde_json::json!({
        "status": "healthy",
        "service": "scamscan-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "store": {
                "status": "healthy",
                "analyses": analysis_count
            },
            "llm": {
                "configured": state.config.llm_api_key.is_some()
            }
        }
    });
    Json(response)
}
