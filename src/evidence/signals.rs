// Page signal extractor
//
// Pure function of (url, html). Network-free by design: content comes from
// the fetch adapter, or an empty string when the fetch failed.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// Brand vocabulary scanned against page text. Shared with the indicator
/// extractor so message-level and page-level detection agree.
pub const BRAND_KEYWORDS: [&str; 11] = [
    "paypal",
    "google",
    "microsoft",
    "apple",
    "facebook",
    "instagram",
    "netflix",
    "amazon",
    "bank",
    "chase",
    "wells fargo",
];

/// Hostname fragments of tunnel services commonly used to hide phishing
/// pages behind throwaway URLs.
const TUNNEL_MARKERS: [&str; 3] = ["ngrok", "trycloudflare.com", "loca.lt"];

static FORM_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("form").unwrap());
static PASSWORD_INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("input[type=password]").unwrap());

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageSignals {
    pub login_form_detected: bool,
    pub password_field_detected: bool,
    pub brand_keywords_found: Vec<String>,
    pub suspicious_patterns: Vec<String>,
    #[serde(default)]
    pub analysis_note: Option<String>,
}

pub fn extract_page_signals(url: &str, html_content: &str) -> PageSignals {
    let document = Html::parse_document(html_content);

    let mut login_form_detected = false;
    let mut password_field_detected = false;
    let mut form_count = 0usize;

    for form in document.select(&FORM_SELECTOR) {
        form_count += 1;

        // A password input is the strongest signal; it implies a login form
        // regardless of what the form text says.
        if form.select(&PASSWORD_INPUT_SELECTOR).next().is_some() {
            password_field_detected = true;
            login_form_detected = true;
            break;
        }

        let form_text = form.text().collect::<String>().to_lowercase();
        if form_text.contains("login") || form_text.contains("sign in") {
            login_form_detected = true;
        }
    }

    let page_text = document
        .root_element()
        .text()
        .collect::<String>()
        .to_lowercase();
    let brand_keywords_found: Vec<String> = BRAND_KEYWORDS
        .iter()
        .filter(|brand| page_text.contains(*brand))
        .map(|brand| brand.to_string())
        .collect();

    let mut suspicious_patterns = Vec::new();
    if TUNNEL_MARKERS.iter().any(|marker| url.contains(marker)) {
        suspicious_patterns.push("tunnel_service_host".to_string());
    }
    if url.contains('@') {
        suspicious_patterns.push("url_has_at_symbol".to_string());
    }

    // Absence of forms is informational, not an error.
    let analysis_note = if form_count == 0 && !password_field_detected {
        Some("No HTML forms detected on page".to_string())
    } else {
        None
    };

    PageSignals {
        login_form_detected,
        password_field_detected,
        brand_keywords_found,
        suspicious_patterns,
        analysis_note,
    }
}
