// Domain registration lookup adapter
//
// Queries the registry over the whois protocol and extracts creation date,
// registrar, and a privacy-protection flag from the raw response text.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use whois_rust::{WhoIs, WhoIsLookupOptions};

use super::{AdapterError, RegistrationLookup, RegistrationRecord};

lazy_static! {
    static ref CREATION_DATE_RE: Regex = Regex::new(
        r"(?im)^\s*(?:creation date|created(?: on)?|registered(?: on)?|registration (?:time|date))\s*:?\s*(.+?)\s*$"
    )
    .unwrap();
    static ref REGISTRAR_RE: Regex =
        Regex::new(r"(?im)^\s*registrar(?: name)?\s*:\s*(.+?)\s*$").unwrap();
}

/// Case-insensitive markers of redacted registrant data.
const PRIVACY_KEYWORDS: [&str; 5] = ["privacy", "redacted", "protected", "proxy", "guard"];

pub struct WhoisRegistrationLookup {
    client: WhoIs,
    timeout: Duration,
}

impl WhoisRegistrationLookup {
    pub fn new(timeout_secs: u64) -> anyhow::Result<Self> {
        let client = WhoIs::from_string(include_str!("../../data/whois_servers.json"))?;
        Ok(Self {
            client,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[async_trait]
impl RegistrationLookup for WhoisRegistrationLookup {
    async fn lookup(&self, domain: &str) -> Result<RegistrationRecord, AdapterError> {
        let mut options = WhoIsLookupOptions::from_string(domain)
            .map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        options.timeout = Some(self.timeout);

        let raw = self
            .client
            .lookup_async(options)
            .await
            .map_err(|e| AdapterError::Lookup(e.to_string()))?;

        Ok(parse_registration(domain, &raw))
    }
}

/// Extracts the structured record from raw whois text. Pure, so the field
/// extraction is testable without hitting port 43.
pub fn parse_registration(domain: &str, raw: &str) -> RegistrationRecord {
    let creation_date = CREATION_DATE_RE
        .captures(raw)
        .and_then(|c| parse_whois_date(c.get(1).map(|m| m.as_str()).unwrap_or_default()));

    let age_days = creation_date.map(|created| (Utc::now() - created).num_days());

    let registrar = REGISTRAR_RE
        .captures(raw)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let lower = raw.to_lowercase();
    let privacy_protection = PRIVACY_KEYWORDS.iter().any(|k| lower.contains(k));

    RegistrationRecord {
        domain: domain.to_string(),
        creation_date,
        age_days,
        registrar,
        privacy_protection,
    }
}

/// Registries disagree on date formats; try the common ones in order.
fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%d %H:%M:%S",
        "%Y.%m.%d %H:%M:%S",
        "%d-%b-%Y %H:%M:%S",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%b-%Y", "%Y.%m.%d"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive));
        }
    }

    None
}
