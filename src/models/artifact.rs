// Normalized representation of an ingested message

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::analysis::SourceType;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderInfo {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub phones: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyContent {
    pub original_text: String,
    #[serde(default)]
    pub clean_text: Option<String>,
}

/// Immutable once produced by ingestion, except for the source-type override
/// and metadata merge performed by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageArtifact {
    pub source_type: SourceType,
    pub sender: SenderInfo,
    #[serde(default)]
    pub subject: Option<String>,
    pub body: BodyContent,
    pub extracted_entities: ExtractedEntities,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl MessageArtifact {
    /// Display name, then address, then a placeholder. Used for the
    /// record's `sourceName`.
    pub fn source_name(&self) -> String {
        self.sender
            .display_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.sender.email.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// First 200 characters of the cleaned body, for list views that must
    /// not render the raw message.
    pub fn safe_preview(&self) -> String {
        let text = self
            .body
            .clean_text
            .as_deref()
            .unwrap_or(&self.body.original_text);
        let preview: String = text.chars().take(200).collect();
        format!("{}...", preview)
    }
}
