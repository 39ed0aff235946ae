// Evidence aggregator
//
// For each URL: fetch, extract page signals, look up registration and DNS,
// and merge everything into one EvidenceFact. A failure in any one source
// never discards facts obtained from the others; every adapter error is
// appended to technical_errors instead.

use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;
use url::Url;

use super::{
    extract_page_signals, DnsLookup, EvidenceFact, Reachability, RegistrationLookup, UrlFetcher,
};
use crate::app_config::AppConfig;

pub struct EvidenceAggregator {
    fetcher: Arc<dyn UrlFetcher>,
    registration: Arc<dyn RegistrationLookup>,
    dns: Option<Arc<dyn DnsLookup>>,
}

impl EvidenceAggregator {
    pub fn new(
        fetcher: Arc<dyn UrlFetcher>,
        registration: Arc<dyn RegistrationLookup>,
        dns: Option<Arc<dyn DnsLookup>>,
    ) -> Self {
        Self {
            fetcher,
            registration,
            dns,
        }
    }

    /// Builds the production aggregator from config.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let fetcher = Arc::new(super::HttpFetcher::new(
            config.fetch_timeout_secs,
            config.fetch_max_content_chars,
        )?);
        let registration = Arc::new(super::WhoisRegistrationLookup::new(
            config.whois_timeout_secs,
        )?);
        let dns: Option<Arc<dyn DnsLookup>> = if config.dns_enabled {
            Some(Arc::new(super::HickoryDnsLookup::new(
                config.dns_timeout_secs,
            )))
        } else {
            None
        };
        Ok(Self::new(fetcher, registration, dns))
    }

    /// Returns exactly one fact per input URL, in input order, regardless
    /// of how many sources fail for any given URL. URLs have no cross
    /// dependency, so they are analyzed concurrently.
    pub async fn analyze(&self, urls: &[String]) -> Vec<EvidenceFact> {
        join_all(urls.iter().map(|url| self.analyze_url(url))).await
    }

    async fn analyze_url(&self, url: &str) -> EvidenceFact {
        let mut fact = EvidenceFact::unreachable(url);

        // Fetch first: signal extraction prefers content the fetch already
        // obtained, degrading to an empty document when it failed.
        let html_content = match self.fetcher.fetch(url).await {
            Ok(fetched) => {
                fact.reachability = Reachability::Reachable;
                fact.redirect_count = fetched.redirect_chain.len();
                fact.redirect_chain = fetched.redirect_chain;
                fetched.html_content
            },
            Err(e) => {
                debug!("fetch failed for {}: {}", url, e);
                fact.technical_errors.push(format!("fetch: {}", e));
                String::new()
            },
        };

        let signals = extract_page_signals(url, &html_content);
        fact.login_form_detected = signals.login_form_detected;
        fact.password_field_detected = signals.password_field_detected;
        fact.brand_keywords_found = signals.brand_keywords_found;
        fact.suspicious_patterns = signals.suspicious_patterns;

        let Some(host) = host_of(url) else {
            fact.technical_errors
                .push(format!("url: no host in {}", url));
            return fact;
        };

        match &self.dns {
            Some(dns) => {
                let (registration, dns_records) =
                    tokio::join!(self.registration.lookup(&host), dns.resolve(&host));
                match registration {
                    Ok(record) => {
                        fact.domain_age_days = record.age_days;
                        fact.registrar = record.registrar;
                        fact.privacy_protection = Some(record.privacy_protection);
                    },
                    Err(e) => fact.technical_errors.push(format!("whois: {}", e)),
                }
                match dns_records {
                    Ok(records) => fact.dns_records = Some(records),
                    Err(e) => fact.technical_errors.push(format!("dns: {}", e)),
                }
            },
            None => match self.registration.lookup(&host).await {
                Ok(record) => {
                    fact.domain_age_days = record.age_days;
                    fact.registrar = record.registrar;
                    fact.privacy_protection = Some(record.privacy_protection);
                },
                Err(e) => fact.technical_errors.push(format!("whois: {}", e)),
            },
        }

        fact
    }
}

fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_extraction() {
        assert_eq!(
            host_of("http://paypal-verify.com/login").as_deref(),
            Some("paypal-verify.com")
        );
        assert_eq!(host_of("not a url"), None);
    }
}
