// Report generation: assembled analysis -> user-facing markdown

use std::sync::Arc;

use async_trait::async_trait;

use super::{AgentError, LlmClient, ReportWriter};
use crate::evidence::{EvidenceFact, Reachability};
use crate::models::{IndicatorReport, MessageArtifact, RiskAssessment, SeverityLabel};

/// Deterministic markdown reporter built from the structured results.
pub struct TemplateReporter;

#[async_trait]
impl ReportWriter for TemplateReporter {
    async fn generate(
        &self,
        artifact: &MessageArtifact,
        assessment: &RiskAssessment,
        findings: &[EvidenceFact],
        indicators: &IndicatorReport,
    ) -> Result<String, AgentError> {
        let mut report = String::new();
        report.push_str("# Scam Risk Analysis Report\n\n");
        report.push_str("## Summary\n");
        report.push_str(&format!(
            "**{}/100 - {:?}**\n\n{}\n\n",
            assessment.risk_score, assessment.severity_label, assessment.explanation
        ));

        report.push_str("## Key Evidence\n");
        if assessment.top_reasons.is_empty() {
            report.push_str("- No significant indicators were found in this message.\n");
        }
        for reason in &assessment.top_reasons {
            report.push_str(&format!("- {}\n", reason));
        }
        for fact in findings {
            if fact.reachability == Reachability::Unreachable {
                report.push_str(&format!("- Linked page {} could not be reached\n", fact.url));
            }
            if let Some(age) = fact.domain_age_days {
                report.push_str(&format!(
                    "- Domain behind {} was registered {} days ago\n",
                    fact.url, age
                ));
            }
        }

        report.push_str("\n## What To Do Now\n");
        match assessment.severity_label {
            SeverityLabel::High | SeverityLabel::Critical => {
                report.push_str(
                    "- Do not click any links or download attachments from this message.\n\
                     - Block the sender and report the message as phishing.\n",
                );
                if let Some(brand) = &indicators.brand_impersonation.brand_name {
                    report.push_str(&format!(
                        "- If you have an account with {}, reach it only through the official app or website.\n",
                        brand
                    ));
                }
            },
            SeverityLabel::Medium => {
                report.push_str(
                    "- Verify the sender through a separate, trusted channel before acting.\n",
                );
            },
            SeverityLabel::Safe | SeverityLabel::Low => {
                report.push_str("- No immediate action needed. Stay vigilant.\n");
            },
        }

        report.push_str("\n## If You Already Clicked\n");
        report.push_str(
            "- Change the password for any account you entered credentials for, starting from a trusted device.\n\
             - Enable two-factor authentication where available.\n\
             - Watch account statements for activity you do not recognize.\n",
        );

        let _ = artifact;
        Ok(report)
    }
}

/// LLM-backed reporter producing a narrative for non-technical users.
pub struct LlmReporter {
    client: Arc<LlmClient>,
}

impl LlmReporter {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReportWriter for LlmReporter {
    async fn generate(
        &self,
        artifact: &MessageArtifact,
        assessment: &RiskAssessment,
        findings: &[EvidenceFact],
        indicators: &IndicatorReport,
    ) -> Result<String, AgentError> {
        let sender = serde_json::to_string(&artifact.sender)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        let assessment_json = serde_json::to_string_pretty(assessment)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        let findings_json = serde_json::to_string_pretty(findings)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        let indicators_json = serde_json::to_string_pretty(indicators)
            .map_err(|e| AgentError::Internal(e.to_string()))?;

        let prompt = format!(
            "You are a Report Agent. Generate a clear, helpful, and explainable security report for a non-technical user.\n\n\
             Input Data:\n\
             - Message Sender: {sender}\n\
             - Subject: {subject}\n\
             - Risk Assessment: {assessment_json}\n\
             - Link Findings: {findings_json}\n\
             - Indicators: {indicators_json}\n\n\
             Structure:\n\
             # Scam Risk Analysis Report\n\n\
             ## Summary\n\
             [Risk Score] - [Severity Label], brief explanation\n\n\
             ## Key Evidence\n\
             Bullet points of PROVEN facts only.\n\n\
             ## What To Do Now\n\
             Specific advice based on the threat type.\n\n\
             ## If You Already Clicked\n\
             Mitigation steps.\n\n\
             Tone: professional, calm, authoritative but helpful. Format: Markdown.",
            subject = artifact.subject.as_deref().unwrap_or("(none)"),
        );
        self.client.generate(&prompt).await
    }
}
