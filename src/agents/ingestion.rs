// Ingestion: raw text -> MessageArtifact

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::json;

use super::{AgentError, Ingestor, LlmClient};
use crate::models::{BodyContent, ExtractedEntities, MessageArtifact, SenderInfo, SourceType};

lazy_static! {
    static ref URL_RE: Regex = Regex::new(r#"https?://[^\s<>"')\]]+"#).unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"\+?\d[\d\s().-]{7,}\d").unwrap();
    static ref FROM_HEADER_RE: Regex =
        Regex::new(r#"(?im)^from:\s*"?([^"<\r\n]*?)"?\s*(?:<([^>\r\n]+)>)?\s*$"#).unwrap();
    static ref SUBJECT_HEADER_RE: Regex = Regex::new(r"(?im)^subject:\s*(.+?)\s*$").unwrap();
    static ref HTML_TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref WHITESPACE_RE: Regex = Regex::new(r"[ \t]{2,}").unwrap();
}

/// Deterministic ingestion: header parsing and entity extraction by regex.
/// Default when no LLM is configured, and the implementation the test
/// suite runs against.
pub struct RegexIngestor;

#[async_trait]
impl Ingestor for RegexIngestor {
    async fn process(
        &self,
        raw_text: &str,
        source_type: SourceType,
    ) -> Result<MessageArtifact, AgentError> {
        let urls: Vec<String> = dedup(URL_RE.find_iter(raw_text).map(|m| {
            m.as_str()
                .trim_end_matches(['.', ',', ';', '!', '?'])
                .to_string()
        }));
        let emails = dedup(EMAIL_RE.find_iter(raw_text).map(|m| m.as_str().to_string()));
        let phones = dedup(
            PHONE_RE
                .find_iter(raw_text)
                .map(|m| m.as_str().trim().to_string()),
        );

        let (display_name, header_email) = FROM_HEADER_RE
            .captures(raw_text)
            .map(|c| {
                (
                    c.get(1)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|s| !s.is_empty()),
                    c.get(2).map(|m| m.as_str().trim().to_string()),
                )
            })
            .unwrap_or((None, None));

        let subject = SUBJECT_HEADER_RE
            .captures(raw_text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let sender_email = header_email.or_else(|| emails.first().cloned());

        let clean_text = clean_body(raw_text);

        Ok(MessageArtifact {
            source_type,
            sender: SenderInfo {
                display_name,
                email: sender_email,
                phone: None,
            },
            subject,
            body: BodyContent {
                original_text: raw_text.to_string(),
                clean_text: Some(clean_text),
            },
            extracted_entities: ExtractedEntities {
                urls,
                emails,
                phones,
            },
            metadata: HashMap::new(),
        })
    }
}

/// Strips HTML tags and collapses runs of whitespace.
fn clean_body(raw: &str) -> String {
    let no_tags = HTML_TAG_RE.replace_all(raw, " ");
    WHITESPACE_RE.replace_all(no_tags.trim(), " ").to_string()
}

fn dedup(iter: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for item in iter {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

/// LLM-backed ingestion for messy real-world messages (forwarded chains,
/// mixed languages) where regex parsing falls short.
pub struct LlmIngestor {
    client: Arc<LlmClient>,
}

impl LlmIngestor {
    pub fn new(client: Arc<LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Ingestor for LlmIngestor {
    async fn process(
        &self,
        raw_text: &str,
        source_type: SourceType,
    ) -> Result<MessageArtifact, AgentError> {
        let source = serde_json::to_string(&source_type)
            .map_err(|e| AgentError::Internal(e.to_string()))?;
        let schema = json!({
            "source_type": source,
            "sender": {"display_name": "...", "email": "...", "phone": "..."},
            "subject": "...",
            "body": {"original_text": "...", "clean_text": "..."},
            "extracted_entities": {"urls": ["..."], "emails": ["..."], "phones": ["..."]},
            "metadata": {"language": "...", "platform": "..."}
        });
        let prompt = format!(
            "You are an expert data ingestion agent.\n\
             Parse the following raw text into a structured JSON object.\n\n\
             Input Text:\n{raw_text}\n\n\
             Source Type: {source}\n\n\
             Output Schema (JSON):\n{schema}\n\n\
             Instructions:\n\
             1. Extract sender info if available.\n\
             2. Clean the body text (remove HTML tags, signatures, noise).\n\
             3. Extract all URLs, emails, and phone numbers into extracted_entities.\n\
             4. Detect language.\n\
             5. Return ONLY valid JSON.",
        );

        let mut artifact: MessageArtifact = self.client.generate_json(&prompt).await?;
        artifact.source_type = source_type;
        Ok(artifact)
    }
}
