//! Configuration module for environment variable parsing.
//!
//! Configuration is read once at startup and shared read-only with every
//! request handler through [`crate::web::AppState`].

use std::env;
use tracing::warn;

use crate::lead::PabauLead;

/// Default Pabau API host.
pub const DEFAULT_PABAU_API_BASE: &str = "https://api.oauth.pabau.com";

/// Default Pabau custom field that receives the form message.
pub const DEFAULT_MESSAGE_FIELD: &str = "custom_field_12345";

/// Default replay window for signed webhooks (5 minutes).
pub const DEFAULT_SIGNATURE_MAX_AGE_MS: u64 = 300_000;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Pabau API key, used as a path segment in API URLs
    pub pabau_api_key: Option<String>,

    /// Base URL of the Pabau API
    pub pabau_api_base: String,

    /// Label assigned as lead owner for signed Webflow submissions
    pub default_lead_owner: Option<String>,

    /// Custom field that carries the message for form-encoded submissions
    pub message_field: String,

    /// Overrides the lead destination (e.g. a request-inspection endpoint)
    pub lead_target_url: Option<String>,

    /// Webflow webhook signing secret
    pub webflow_signing_secret: Option<String>,

    /// Maximum age in milliseconds for Webflow webhook timestamps
    pub signature_max_age_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            pabau_api_key: None,
            pabau_api_base: DEFAULT_PABAU_API_BASE.to_string(),
            default_lead_owner: None,
            message_field: DEFAULT_MESSAGE_FIELD.to_string(),
            lead_target_url: None,
            webflow_signing_secret: None,
            signature_max_age_ms: DEFAULT_SIGNATURE_MAX_AGE_MS,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            port: parse_number("PORT", defaults.port),

            pabau_api_key: non_empty("PABAU_API_KEY"),

            pabau_api_base: non_empty("PABAU_API_BASE")
                .map(|base| base.trim_end_matches('/').to_string())
                .unwrap_or(defaults.pabau_api_base),

            default_lead_owner: non_empty("PABAU_LEAD_OWNER"),

            message_field: message_field(non_empty("PABAU_MESSAGE_FIELD")),

            lead_target_url: non_empty("LEAD_TARGET_URL"),

            webflow_signing_secret: non_empty("WEBFLOW_WEBHOOK_SECRET"),

            signature_max_age_ms: parse_number(
                "WEBFLOW_SIGNATURE_MAX_AGE_MS",
                defaults.signature_max_age_ms,
            ),
        }
    }

    /// Resolve where leads are sent.
    ///
    /// An explicit target URL wins; otherwise the Pabau lead endpoint is
    /// built from the API key. Returns `None` when neither is configured.
    pub fn lead_endpoint(&self) -> Option<String> {
        if let Some(url) = &self.lead_target_url {
            return Some(url.clone());
        }

        self.pabau_api_key
            .as_ref()
            .map(|key| format!("{}/{}/leads", self.pabau_api_base, key))
    }
}

/// Read a variable, treating blank values as unset.
fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Pick the message custom field, refusing keys the lead payload already uses.
fn message_field(raw: Option<String>) -> String {
    match raw {
        Some(field) if PabauLead::RESERVED_KEYS.contains(&field.as_str()) => {
            warn!(
                env_var = "PABAU_MESSAGE_FIELD",
                value = %field,
                "Reserved lead field, using default"
            );
            DEFAULT_MESSAGE_FIELD.to_string()
        }
        Some(field) => field,
        None => DEFAULT_MESSAGE_FIELD.to_string(),
    }
}

/// Parse a numeric variable, falling back to the default on absence or error.
fn parse_number<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    let raw = match non_empty(name) {
        Some(v) => v,
        None => return default,
    };

    match raw.parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_treats_blank_as_unset() {
        env::set_var("TEST_LEAD_RELAY_BLANK", "   ");
        assert_eq!(non_empty("TEST_LEAD_RELAY_BLANK"), None);
        env::remove_var("TEST_LEAD_RELAY_BLANK");
    }

    #[test]
    fn test_parse_number_invalid_uses_default() {
        env::set_var("TEST_LEAD_RELAY_PORT", "eighty");
        assert_eq!(parse_number("TEST_LEAD_RELAY_PORT", 8080u16), 8080);
        env::remove_var("TEST_LEAD_RELAY_PORT");
    }

    #[test]
    fn test_parse_number_valid() {
        env::set_var("TEST_LEAD_RELAY_AGE", "60000");
        assert_eq!(parse_number("TEST_LEAD_RELAY_AGE", 0u64), 60000);
        env::remove_var("TEST_LEAD_RELAY_AGE");
    }

    #[test]
    fn test_message_field_rejects_reserved_keys() {
        assert_eq!(message_field(Some("email".to_string())), DEFAULT_MESSAGE_FIELD);
        assert_eq!(message_field(Some("first_name".to_string())), DEFAULT_MESSAGE_FIELD);
        assert_eq!(message_field(Some("description".to_string())), DEFAULT_MESSAGE_FIELD);
    }

    #[test]
    fn test_message_field_custom_and_default() {
        assert_eq!(
            message_field(Some("custom_field_777".to_string())),
            "custom_field_777"
        );
        assert_eq!(message_field(None), DEFAULT_MESSAGE_FIELD);
    }

    #[test]
    fn test_lead_endpoint_from_api_key() {
        let config = Config {
            pabau_api_key: Some("abc123".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.lead_endpoint().as_deref(),
            Some("https://api.oauth.pabau.com/abc123/leads")
        );
    }

    #[test]
    fn test_lead_endpoint_override_wins() {
        let config = Config {
            pabau_api_key: Some("abc123".to_string()),
            lead_target_url: Some("https://inspect.example/hook".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.lead_endpoint().as_deref(),
            Some("https://inspect.example/hook")
        );
    }

    #[test]
    fn test_lead_endpoint_unconfigured() {
        assert!(Config::default().lead_endpoint().is_none());
    }
}
