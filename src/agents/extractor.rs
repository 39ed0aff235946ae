// Indicator extraction: MessageArtifact -> IndicatorReport

use std::sync::Arc;

use async_trait::async_trait;

use super::{AgentError, IndicatorExtractor, LlmClient};
use crate::evidence::signals::BRAND_KEYWORDS;
use crate::models::{BrandImpersonation, IndicatorReport, MessageArtifact, SenderMismatch};

/// Urgency phrasing with the coarse type it signals.
const URGENCY_MARKERS: [(&str, &str); 8] = [
    ("suspended", "account_suspension"),
    ("account will be closed", "account_suspension"),
    ("verify your account", "account_verification"),
    ("confirm your identity", "account_verification"),
    ("within 24 hours", "deadline"),
    ("immediately", "deadline"),
    ("act now", "deadline"),
    ("limited time", "limited_time_offer"),
];

const ACTION_MARKERS: [(&str, &str); 7] = [
    ("log in", "login"),
    ("login", "login"),
    ("sign in", "login"),
    ("payment", "payment"),
    ("download", "download"),
    ("reply", "reply"),
    ("one-time password", "otp"),
];

/// Deterministic keyword-table extractor.
pub struct HeuristicExtractor;

#[async_trait]
impl IndicatorExtractor for HeuristicExtractor {
    async fn analyze(&self, artifact: &MessageArtifact) -> Result<IndicatorReport, AgentError> {
        let text = artifact
            .body
            .clean_text
            .as_deref()
            .unwrap_or(&artifact.body.original_text)
            .to_lowercase();
        let subject = artifact
            .subject
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();
        let haystack = format!("{} {}", subject, text);

        let urgency = URGENCY_MARKERS
            .iter()
            .find(|(marker, _)| haystack.contains(marker));

        let requested_actions: Vec<String> = {
            let mut actions = Vec::new();
            for (marker, action) in ACTION_MARKERS {
                if haystack.contains(marker) && !actions.contains(&action.to_string()) {
                    actions.push(action.to_string());
                }
            }
            actions
        };

        let brand = BRAND_KEYWORDS
            .iter()
            .find(|brand| haystack.contains(*brand));
        let brand_impersonation = match brand {
            Some(name) => BrandImpersonation {
                detected: true,
                brand_name: Some(name.to_string()),
                evidence: Some(format!("message mentions \"{}\"", name)),
            },
            None => BrandImpersonation::default(),
        };

        let sender_mismatch = detect_sender_mismatch(artifact, brand.copied());

        let language_tone = if urgency.is_some() {
            Some("urgent".to_string())
        } else {
            Some("neutral".to_string())
        };

        Ok(IndicatorReport {
            urgency_detected: urgency.is_some(),
            urgency_type: urgency.map(|(_, kind)| kind.to_string()),
            requested_actions,
            brand_impersonation,
            sender_mismatch,
            language_tone,
        })
    }
}

/// A message that talks about a brand but was sent from a domain that does
/// not carry the brand's name is a mismatch signal.
fn detect_sender_mismatch(artifact: &MessageArtifact, brand: Option<&str>) -> SenderMismatch {
    let (Some(brand), Some(email)) = (brand, artifact.sender.email.as_deref()) else {
        return SenderMismatch::default();
    };
    let Some(domain) = email.rsplit('@').next() else {
        return SenderMismatch::default();
    };
    let brand_slug = brand.replace(' ', "");
    if domain.to_lowercase().contains(&brand_slug) {
        SenderMismatch::default()
    } else {
        SenderMismatch {
            detected: true,
            explanation: Some(format!(
                "message references {} but sender domain is {}",
                brand, domain
            )),
        }
    }
}

/// LLM-backed extractor matching the heuristic contract.
pub struct LlmExtractor {
    client: Arc<LlmClient>,
}

impl LlmExtractor {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IndicatorExtractor for LlmExtractor {
    async fn analyze(&self, artifact: &MessageArtifact) -> Result<IndicatorReport, AgentError> {
        let artifact_json =
            serde_json::to_string(artifact).map_err(|e| AgentError::Internal(e.to_string()))?;
        let prompt = format!(
            "You are a security extractor agent. Analyze the following message artifact for scam indicators.\n\n\
             Message:\n{artifact_json}\n\n\
             Task:\n\
             Identify specific indicators of urgency, requested actions, brand impersonation, and sender mismatches.\n\n\
             Output JSON Schema:\n\
             {{\n\
               \"urgency_detected\": bool,\n\
               \"urgency_type\": \"account_suspension | limited_time_offer | none\",\n\
               \"requested_actions\": [\"login\", \"payment\", \"download\", \"reply\", \"otp\"],\n\
               \"brand_impersonation\": {{\"detected\": bool, \"brand_name\": \"...\", \"evidence\": \"...\"}},\n\
               \"sender_mismatch\": {{\"detected\": bool, \"explanation\": \"...\"}},\n\
               \"language_tone\": \"threatening | professional | casual\"\n\
             }}\n\n\
             Return ONLY valid JSON."
        );
        self.client.generate_json(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Ingestor, RegexIngestor};
    use crate::models::SourceType;

    #[tokio::test]
    async fn flags_brand_urgency_and_mismatch() {
        let text = "From: support@secure-updates.example\n\
                    Subject: Action required\n\n\
                    Please verify your account with PayPal immediately: http://paypal-verify.com/login";
        let artifact = RegexIngestor
            .process(text, SourceType::Email)
            .await
            .unwrap();
        let report = HeuristicExtractor.analyze(&artifact).await.unwrap();

        assert!(report.urgency_detected);
        assert!(report.brand_impersonation.detected);
        assert_eq!(report.brand_impersonation.brand_name.as_deref(), Some("paypal"));
        assert!(report.sender_mismatch.detected);
        assert!(report.requested_actions.contains(&"login".to_string()));
    }

    #[tokio::test]
    async fn neutral_message_has_no_indicators() {
        let artifact = RegexIngestor
            .process("Lunch on Friday?", SourceType::Email)
            .await
            .unwrap();
        let report = HeuristicExtractor.analyze(&artifact).await.unwrap();
        assert!(!report.urgency_detected);
        assert!(!report.brand_impersonation.detected);
        assert!(report.requested_actions.is_empty());
    }
}
