// Reasoning collaborators
//
// The pipeline talks to four opaque reasoning capabilities through typed
// traits: ingestion, indicator extraction, risk scoring, and report
// generation. Each trait has an LLM-backed implementation and a
// deterministic local one; the orchestrator cannot tell them apart.

pub mod client;
pub mod extractor;
pub mod ingestion;
pub mod report;
pub mod scoring;

use async_trait::async_trait;
use thiserror::Error;

use crate::evidence::EvidenceFact;
use crate::models::{IndicatorReport, MessageArtifact, RiskAssessment, SourceType};

pub use client::LlmClient;
pub use extractor::{HeuristicExtractor, LlmExtractor};
pub use ingestion::{LlmIngestor, RegexIngestor};
pub use report::{LlmReporter, TemplateReporter};
pub use scoring::{HeuristicScorer, LlmScorer};

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("collaborator transport error: {0}")]
    Transport(String),

    #[error("collaborator returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("collaborator returned an empty response")]
    EmptyResponse,

    #[error("{0}")]
    Internal(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(error: reqwest::Error) -> Self {
        AgentError::Transport(error.to_string())
    }
}

#[async_trait]
pub trait Ingestor: Send + Sync {
    /// Parses raw text into a normalized MessageArtifact.
    async fn process(
        &self,
        raw_text: &str,
        source_type: SourceType,
    ) -> Result<MessageArtifact, AgentError>;
}

#[async_trait]
pub trait IndicatorExtractor: Send + Sync {
    /// Scans the artifact for scam indicators (urgency, requested actions,
    /// brand impersonation, sender mismatch).
    async fn analyze(&self, artifact: &MessageArtifact) -> Result<IndicatorReport, AgentError>;
}

#[async_trait]
pub trait RiskScorer: Send + Sync {
    /// Combines indicators and URL evidence into a 0-100 risk assessment.
    async fn score(
        &self,
        indicators: &IndicatorReport,
        findings: &[EvidenceFact],
    ) -> Result<RiskAssessment, AgentError>;
}

#[async_trait]
pub trait ReportWriter: Send + Sync {
    /// Produces the human-readable markdown report.
    async fn generate(
        &self,
        artifact: &MessageArtifact,
        assessment: &RiskAssessment,
        findings: &[EvidenceFact],
        indicators: &IndicatorReport,
    ) -> Result<String, AgentError>;
}
