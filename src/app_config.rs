// Centralized configuration management
// Load ALL env vars ONCE at startup

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Global application configuration loaded once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    #[cfg(test)]
    dotenv::dotenv().ok();

    AppConfig::from_env().expect("Failed to load configuration")
});

pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Environment {
    Development,
    Test,
    Staging,
    Production,
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" => Environment::Staging,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    // Server
    pub bind_address: String,
    pub port: u16,
    pub environment: Environment,
    pub cors_allowed_origins: Vec<String>,

    // Result store
    pub data_dir: PathBuf,

    // Evidence adapters
    pub fetch_timeout_secs: u64,
    pub fetch_max_content_chars: usize,
    pub whois_timeout_secs: u64,
    pub dns_enabled: bool,
    pub dns_timeout_secs: u64,

    // Reasoning collaborators
    pub llm_api_base: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_address: env_or("BIND_ADDRESS", "0.0.0.0"),
            port: parse_env("PORT", 5000)?,
            environment: Environment::from(env_or("ENVIRONMENT", "development")),
            cors_allowed_origins: env_or("CORS_ALLOWED_ORIGINS", "http://localhost:3000")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),

            data_dir: PathBuf::from(env_or("DATA_DIR", "./data")),

            fetch_timeout_secs: parse_env("FETCH_TIMEOUT_SECS", 10)?,
            fetch_max_content_chars: parse_env("FETCH_MAX_CONTENT_CHARS", 10_000)?,
            whois_timeout_secs: parse_env("WHOIS_TIMEOUT_SECS", 10)?,
            dns_enabled: parse_env("DNS_ENABLED", true)?,
            dns_timeout_secs: parse_env("DNS_TIMEOUT_SECS", 5)?,

            llm_api_base: env_or(
                "LLM_API_BASE",
                "https://generativelanguage.googleapis.com",
            ),
            llm_api_key: env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty()),
            llm_model: env_or("LLM_MODEL", "gemini-2.5-flash"),
            llm_timeout_secs: parse_env("LLM_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw)),
        Err(_) => Ok(default),
    }
}
