// Configuration loading tests. Serialized because they mutate process
// environment variables.

use serial_test::serial;

use scamscan_backend::app_config::{AppConfig, Environment};

fn clear_config_env() {
    for key in [
        "BIND_ADDRESS",
        "PORT",
        "ENVIRONMENT",
        "CORS_ALLOWED_ORIGINS",
        "DATA_DIR",
        "FETCH_TIMEOUT_SECS",
        "DNS_ENABLED",
        "GEMINI_API_KEY",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn defaults_apply_when_env_is_empty() {
    clear_config_env();
    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.server_addr(), "0.0.0.0:5000");
    assert_eq!(config.environment, Environment::Development);
    assert!(!config.is_production());
    assert_eq!(config.cors_allowed_origins, ["http://localhost:3000"]);
    assert!(config.llm_api_key.is_none());
    assert!(config.dns_enabled);
}

#[test]
#[serial]
fn env_values_override_defaults() {
    clear_config_env();
    std::env::set_var("PORT", "8080");
    std::env::set_var("ENVIRONMENT", "production");
    std::env::set_var("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example");
    std::env::set_var("DNS_ENABLED", "false");
    std::env::set_var("GEMINI_API_KEY", "test-key");

    let config = AppConfig::from_env().unwrap();
    assert_eq!(config.port, 8080);
    assert!(config.is_production());
    assert_eq!(
        config.cors_allowed_origins,
        ["https://a.example", "https://b.example"]
    );
    assert!(!config.dns_enabled);
    assert_eq!(config.llm_api_key.as_deref(), Some("test-key"));

    clear_config_env();
}

#[test]
#[serial]
fn invalid_numeric_value_is_an_error() {
    clear_config_env();
    std::env::set_var("PORT", "not-a-port");

    assert!(AppConfig::from_env().is_err());

    clear_config_env();
}

#[test]
#[serial]
fn empty_api_key_counts_as_absent() {
    clear_config_env();
    std::env::set_var("GEMINI_API_KEY", "");

    let config = AppConfig::from_env().unwrap();
    assert!(config.llm_api_key.is_none());

    clear_config_env();
}
