// Page fetch adapter
//
// Follows redirects manually (bounded hop count) so the full chain can be
// reported, and truncates content to a fixed character budget to bound
// downstream processing cost.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::StatusCode;
use url::Url;

use super::{AdapterError, FetchResult, UrlFetcher};

const MAX_REDIRECTS: usize = 10;

pub struct HttpFetcher {
    client: reqwest::Client,
    max_content_chars: usize,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, max_content_chars: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("scamscan-backend/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            max_content_chars,
        })
    }
}

#[async_trait]
impl UrlFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResult, AdapterError> {
        let mut current =
            Url::parse(url).map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        let mut redirect_chain = Vec::new();

        loop {
            let response = self.client.get(current.clone()).send().await?;
            let status = response.status();

            if status.is_redirection() {
                if redirect_chain.len() >= MAX_REDIRECTS {
                    return Err(AdapterError::TooManyRedirects(MAX_REDIRECTS));
                }
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        AdapterError::Network(format!(
                            "redirect {} without Location header",
                            status.as_u16()
                        ))
                    })?;
                let next = current
                    .join(location)
                    .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
                redirect_chain.push(current.to_string());
                current = next;
                continue;
            }

            return self
                .finish(current.to_string(), redirect_chain, status, response)
                .await;
        }
    }
}

impl HttpFetcher {
    async fn finish(
        &self,
        final_url: String,
        redirect_chain: Vec<String>,
        status: StatusCode,
        response: reqwest::Response,
    ) -> Result<FetchResult, AdapterError> {
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.text().await?;
        let html_content: String = body.chars().take(self.max_content_chars).collect();

        Ok(FetchResult {
            final_url,
            redirect_chain,
            status_code: status.as_u16(),
            headers,
            html_content,
        })
    }
}
