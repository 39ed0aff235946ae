// Technical evidence gathering for URLs found in a message
//
// Three independently-fallible adapters (page fetch, registration lookup,
// DNS lookup) plus a pure page-signal extractor. Each adapter returns a
// typed result or an AdapterError; nothing here panics past its boundary.

pub mod aggregator;
pub mod dns;
pub mod fetch;
pub mod signals;
pub mod whois;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub use aggregator::EvidenceAggregator;
pub use dns::HickoryDnsLookup;
pub use fetch::HttpFetcher;
pub use signals::{extract_page_signals, PageSignals};
pub use whois::WhoisRegistrationLookup;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("too many redirects (limit {0})")]
    TooManyRedirects(usize),

    #[error("lookup failed: {0}")]
    Lookup(String),
}

impl From<reqwest::Error> for AdapterError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            AdapterError::Timeout
        } else {
            AdapterError::Network(error.to_string())
        }
    }
}

/// Result of fetching a page, redirects followed manually so the chain
/// can be reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchResult {
    pub final_url: String,
    /// URLs visited before the final one, in order.
    pub redirect_chain: Vec<String>,
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    /// Truncated to a fixed character budget.
    pub html_content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub domain: String,
    pub creation_date: Option<DateTime<Utc>>,
    /// None when the registry did not expose a creation date.
    pub age_days: Option<i64>,
    pub registrar: Option<String>,
    pub privacy_protection: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DnsRecords {
    pub a: Vec<String>,
    pub mx: Vec<String>,
    pub ns: Vec<String>,
    pub txt: Vec<String>,
}

#[async_trait]
pub trait UrlFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResult, AdapterError>;
}

#[async_trait]
pub trait RegistrationLookup: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord, AdapterError>;
}

#[async_trait]
pub trait DnsLookup: Send + Sync {
    async fn resolve(&self, domain: &str) -> Result<DnsRecords, AdapterError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    Reachable,
    Unreachable,
}

/// Merged technical findings about one URL.
///
/// Invariant: `technical_errors` is non-empty whenever any adapter failed
/// for this URL, and the fact is still returned as long as the URL itself
/// was ingested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceFact {
    pub url: String,
    pub domain_age_days: Option<i64>,
    pub registrar: Option<String>,
    pub privacy_protection: Option<bool>,
    pub redirect_chain: Vec<String>,
    pub redirect_count: usize,
    pub login_form_detected: bool,
    pub password_field_detected: bool,
    pub brand_keywords_found: Vec<String>,
    pub suspicious_patterns: Vec<String>,
    pub reachability: Reachability,
    #[serde(default)]
    pub dns_records: Option<DnsRecords>,
    pub technical_errors: Vec<String>,
}

impl EvidenceFact {
    pub fn unreachable(url: &str) -> Self {
        Self {
            url: url.to_string(),
            domain_age_days: None,
            registrar: None,
            privacy_protection: None,
            redirect_chain: Vec::new(),
            redirect_count: 0,
            login_form_detected: false,
            password_field_detected: false,
            brand_keywords_found: Vec::new(),
            suspicious_patterns: Vec::new(),
            reachability: Reachability::Unreachable,
            dns_records: None,
            technical_errors: Vec::new(),
        }
    }
}
