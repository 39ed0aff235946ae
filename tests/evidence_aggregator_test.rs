// Integration tests for evidence aggregation with stubbed adapters:
// per-URL fact ordering and partial-failure merging.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use scamscan_backend::evidence::{
    AdapterError, DnsLookup, DnsRecords, EvidenceAggregator, FetchResult, Reachability,
    RegistrationLookup, RegistrationRecord, UrlFetcher,
};

struct OkFetcher {
    html: &'static str,
}

#[async_trait]
impl UrlFetcher for OkFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, AdapterError> {
        Ok(FetchResult {
            final_url: url.to_string(),
            redirect_chain: Vec::new(),
            status_code: 200,
            headers: HashMap::new(),
            html_content: self.html.to_string(),
        })
    }
}

struct FailingFetcher;

#[async_trait]
impl UrlFetcher for FailingFetcher {
    async fn fetch(&self, _url: &str) -> Result<FetchResult, AdapterError> {
        Err(AdapterError::Timeout)
    }
}

struct OkRegistration {
    age_days: i64,
}

#[async_trait]
impl RegistrationLookup for OkRegistration {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord, AdapterError> {
        Ok(RegistrationRecord {
            domain: domain.to_string(),
            creation_date: Some(Utc::now() - Duration::days(self.age_days)),
            age_days: Some(self.age_days),
            registrar: Some("Example Registrar LLC".to_string()),
            privacy_protection: true,
        })
    }
}

struct FailingRegistration;

#[async_trait]
impl RegistrationLookup for FailingRegistration {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord, AdapterError> {
        Err(AdapterError::Lookup(format!("no whois server for {}", domain)))
    }
}

struct OkDns;

#[async_trait]
impl DnsLookup for OkDns {
    async fn resolve(&self, _domain: &str) -> Result<DnsRecords, AdapterError> {
        Ok(DnsRecords {
            a: vec!["192.0.2.1".to_string()],
            mx: Vec::new(),
            ns: vec!["ns1.example.net.".to_string()],
            txt: Vec::new(),
        })
    }
}

const LOGIN_PAGE: &str = r#"
<html><body>
<form action="/submit">
  <input type="text" name="user">
  <input type="password" name="pass">
</form>
</body></html>
"#;

#[tokio::test]
async fn one_fact_per_url_in_input_order() {
    let aggregator = EvidenceAggregator::new(
        Arc::new(OkFetcher { html: "<html></html>" }),
        Arc::new(OkRegistration { age_days: 400 }),
        None,
    );
    let urls = vec![
        "http://first.example/a".to_string(),
        "http://second.example/b".to_string(),
        "http://third.example/c".to_string(),
    ];

    let facts = aggregator.analyze(&urls).await;
    assert_eq!(facts.len(), 3);
    for (fact, url) in facts.iter().zip(&urls) {
        assert_eq!(&fact.url, url);
        assert_eq!(fact.reachability, Reachability::Reachable);
        assert!(fact.technical_errors.is_empty());
    }
}

#[tokio::test]
async fn fetch_failure_keeps_registration_evidence() {
    let aggregator = EvidenceAggregator::new(
        Arc::new(FailingFetcher),
        Arc::new(OkRegistration { age_days: 3 }),
        None,
    );

    let facts = aggregator
        .analyze(&["http://fresh.example/login".to_string()])
        .await;
    assert_eq!(facts.len(), 1);
    let fact = &facts[0];

    assert_eq!(fact.reachability, Reachability::Unreachable);
    assert!(fact.technical_errors.iter().any(|e| e.starts_with("fetch:")));
    // The whois side still contributed.
    assert_eq!(fact.domain_age_days, Some(3));
    assert_eq!(fact.registrar.as_deref(), Some("Example Registrar LLC"));
    assert_eq!(fact.privacy_protection, Some(true));
}

#[tokio::test]
async fn all_sources_failing_still_returns_a_fact() {
    let aggregator = EvidenceAggregator::new(
        Arc::new(FailingFetcher),
        Arc::new(FailingRegistration),
        None,
    );

    let facts = aggregator
        .analyze(&["http://dead.example/".to_string()])
        .await;
    assert_eq!(facts.len(), 1);
    let fact = &facts[0];

    assert_eq!(fact.reachability, Reachability::Unreachable);
    assert!(fact.domain_age_days.is_none());
    assert!(fact.registrar.is_none());
    let kinds: Vec<&str> = fact
        .technical_errors
        .iter()
        .map(|e| e.split(':').next().unwrap())
        .collect();
    assert!(kinds.contains(&"fetch"));
    assert!(kinds.contains(&"whois"));
}

#[tokio::test]
async fn page_signals_and_dns_records_are_merged() {
    let aggregator = EvidenceAggregator::new(
        Arc::new(OkFetcher { html: LOGIN_PAGE }),
        Arc::new(OkRegistration { age_days: 10 }),
        Some(Arc::new(OkDns)),
    );

    let facts = aggregator
        .analyze(&["http://paypal-verify.example/login".to_string()])
        .await;
    let fact = &facts[0];

    assert!(fact.password_field_detected);
    assert!(fact.login_form_detected);
    let dns = fact.dns_records.as_ref().unwrap();
    assert_eq!(dns.a, ["192.0.2.1"]);
    assert_eq!(fact.domain_age_days, Some(10));
}

#[tokio::test]
async fn unparseable_url_reports_missing_host() {
    let aggregator = EvidenceAggregator::new(
        Arc::new(FailingFetcher),
        Arc::new(OkRegistration { age_days: 10 }),
        None,
    );

    let facts = aggregator.analyze(&["not a url".to_string()]).await;
    let fact = &facts[0];
    assert!(fact.technical_errors.iter().any(|e| e.starts_with("url:")));
    assert!(fact.domain_age_days.is_none());
}
