// Structured output of the indicator-extraction stage

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandImpersonation {
    #[serde(default)]
    pub detected: bool,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub evidence: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SenderMismatch {
    #[serde(default)]
    pub detected: bool,
    #[serde(default)]
    pub explanation: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndicatorReport {
    #[serde(default)]
    pub urgency_detected: bool,
    #[serde(default)]
    pub urgency_type: Option<String>,
    #[serde(default)]
    pub requested_actions: Vec<String>,
    #[serde(default)]
    pub brand_impersonation: BrandImpersonation,
    #[serde(default)]
    pub sender_mismatch: SenderMismatch,
    #[serde(default)]
    pub language_tone: Option<String>,
}
