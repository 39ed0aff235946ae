// Risk scoring: indicators + evidence facts -> RiskAssessment

use std::sync::Arc;

use async_trait::async_trait;

use super::{AgentError, LlmClient, RiskScorer};
use crate::evidence::EvidenceFact;
use crate::models::{IndicatorReport, RiskAssessment, SeverityLabel};

/// Domains registered fewer days ago than this are treated as young.
const YOUNG_DOMAIN_DAYS: i64 = 30;

/// Deterministic additive scorer. Weights follow the documented factor
/// ordering: credential harvesting strongest, then brand impersonation
/// combined with urgency, young domains, and sender mismatch.
pub struct HeuristicScorer;

#[async_trait]
impl RiskScorer for HeuristicScorer {
    async fn score(
        &self,
        indicators: &IndicatorReport,
        findings: &[EvidenceFact],
    ) -> Result<RiskAssessment, AgentError> {
        let mut score: u32 = 0;
        let mut reasons = Vec::new();

        let credential_harvesting = findings.iter().any(|f| f.password_field_detected);
        if credential_harvesting {
            score += 40;
            reasons.push("Password entry form detected on a linked page".to_string());
        } else if findings.iter().any(|f| f.login_form_detected) {
            score += 25;
            reasons.push("Login form detected on a linked page".to_string());
        }

        let brand = indicators.brand_impersonation.detected;
        if brand {
            score += 20;
            if let Some(name) = &indicators.brand_impersonation.brand_name {
                reasons.push(format!("Message impersonates {}", name));
            }
        }
        if indicators.urgency_detected {
            score += 10;
            reasons.push("Urgency language pressuring quick action".to_string());
            if brand {
                // Brand impersonation plus urgency is a classic pairing.
                score += 10;
            }
        }

        if let Some(age) = findings.iter().filter_map(|f| f.domain_age_days).min() {
            if (0..YOUNG_DOMAIN_DAYS).contains(&age) {
                score += 20;
                reasons.push(format!("Linked domain registered {} days ago", age));
            }
        }

        if indicators.sender_mismatch.detected {
            score += 15;
            if let Some(explanation) = &indicators.sender_mismatch.explanation {
                reasons.push(explanation.clone());
            }
        }

        if findings.iter().any(|f| !f.suspicious_patterns.is_empty()) {
            score += 10;
            reasons.push("URL uses a known evasion pattern".to_string());
        }
        if findings.iter().any(|f| f.redirect_count >= 2) {
            score += 5;
            reasons.push("Link passes through multiple redirects".to_string());
        }
        if findings.iter().any(|f| f.privacy_protection == Some(true)) {
            score += 5;
            reasons.push("Domain registration hides its owner".to_string());
        }

        let risk_score = score.min(100) as u8;
        let severity_label = SeverityLabel::from_score(risk_score);
        let scam_type = classify(indicators, credential_harvesting, risk_score);
        let explanation = if reasons.is_empty() {
            "No significant scam indicators were found.".to_string()
        } else {
            format!(
                "Score {} from {} weighted indicators; strongest: {}.",
                risk_score,
                reasons.len(),
                reasons[0]
            )
        };

        Ok(RiskAssessment {
            risk_score,
            severity_label,
            scam_type,
            top_reasons: reasons,
            explanation,
            recommended_actions: None,
        })
    }
}

fn classify(
    indicators: &IndicatorReport,
    credential_harvesting: bool,
    score: u8,
) -> String {
    if credential_harvesting || indicators.brand_impersonation.detected {
        "Phishing".to_string()
    } else if indicators
        .requested_actions
        .iter()
        .any(|a| a == "download")
    {
        "Malware Delivery".to_string()
    } else if indicators
        .requested_actions
        .iter()
        .any(|a| a == "payment")
    {
        "Advance Fee Scam".to_string()
    } else if score > 20 {
        "Social Engineering Scam".to_string()
    } else {
        "None".to_string()
    }
}

/// LLM-backed scorer following the same output contract.
pub struct LlmScorer {
    client: Arc<LlmClient>,
}

impl LlmScorer {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RiskScorer for LlmScorer {
    async fn score(
        &self,
        indicators: &IndicatorReport,
        findings: &[EvidenceFact],
    ) -> Result<RiskAssessment, AgentError> {
        let indicators_json =
            serde_json::to_string_pretty(indicators).map_err(|e| AgentError::Internal(e.to_string()))?;
        let findings_json =
            serde_json::to_string_pretty(findings).map_err(|e| AgentError::Internal(e.to_string()))?;
        let prompt = format!(
            "You are a Risk Scoring Agent. Calculate a scam risk score (0-100) based on the provided indicators and findings.\n\n\
             Extractor Indicators:\n{indicators_json}\n\n\
             Link Analysis Findings:\n{findings_json}\n\n\
             Factors to weigh heavily:\n\
             - Credential harvesting detected (Critical)\n\
             - Brand impersonation + Urgency (High)\n\
             - Young domain (< 30 days) (High)\n\
             - Mismatched sender domain (Medium/High)\n\n\
             Output JSON Schema:\n\
             {{\n\
               \"risk_score\": 0,\n\
               \"severity_label\": \"Safe|Low|Medium|High|Critical\",\n\
               \"scam_type\": \"Phishing|AdvanceFee|TechSupport|None\",\n\
               \"top_reasons\": [\"reason 1\", \"reason 2\"],\n\
               \"explanation\": \"Short summary of why this score was given.\"\n\
             }}\n\n\
             Return ONLY valid JSON."
        );
        self.client.generate_json(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::Reachability;
    use crate::models::{BrandImpersonation, SenderMismatch};

    fn fact(url: &str) -> EvidenceFact {
        EvidenceFact {
            reachability: Reachability::Reachable,
            ..EvidenceFact::unreachable(url)
        }
    }

    #[tokio::test]
    async fn credential_page_with_brand_and_urgency_is_high_or_critical() {
        let indicators = IndicatorReport {
            urgency_detected: true,
            urgency_type: Some("account_verification".to_string()),
            brand_impersonation: BrandImpersonation {
                detected: true,
                brand_name: Some("paypal".to_string()),
                evidence: None,
            },
            ..Default::default()
        };
        let mut finding = fact("http://paypal-verify.com/login");
        finding.password_field_detected = true;
        finding.login_form_detected = true;
        finding.brand_keywords_found = vec!["paypal".to_string()];

        let assessment = HeuristicScorer
            .score(&indicators, &[finding])
            .await
            .unwrap();
        assert!(assessment.risk_score >= 61, "score {}", assessment.risk_score);
        assert!(matches!(
            assessment.severity_label,
            SeverityLabel::High | SeverityLabel::Critical
        ));
        assert_eq!(assessment.scam_type, "Phishing");
        assert!(!assessment.top_reasons.is_empty());
    }

    #[tokio::test]
    async fn young_domain_and_mismatch_raise_score() {
        let indicators = IndicatorReport {
            sender_mismatch: SenderMismatch {
                detected: true,
                explanation: Some("sender domain differs".to_string()),
            },
            ..Default::default()
        };
        let mut finding = fact("http://fresh.example");
        finding.domain_age_days = Some(3);

        let assessment = HeuristicScorer
            .score(&indicators, &[finding])
            .await
            .unwrap();
        assert_eq!(assessment.risk_score, 35);
        assert_eq!(assessment.severity_label, SeverityLabel::Low);
    }

    #[tokio::test]
    async fn clean_message_scores_safe() {
        let assessment = HeuristicScorer
            .score(&IndicatorReport::default(), &[])
            .await
            .unwrap();
        assert_eq!(assessment.risk_score, 0);
        assert_eq!(assessment.severity_label, SeverityLabel::Safe);
        assert_eq!(assessment.scam_type, "None");
    }
}
