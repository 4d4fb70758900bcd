//! Gateway configuration

use serde::{Deserialize, Serialize};

pub const ENV_URL: &str = "AI_GATEWAY_URL";
pub const ENV_API_KEY: &str = "AI_GATEWAY_API_KEY";
pub const ENV_MODEL: &str = "AI_GATEWAY_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "AI_GATEWAY_TIMEOUT_SECS";

/// Where and how to reach the chat-completion gateway
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token. Checked when a call is made, not at startup.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://ai.gateway.lovable.dev/v1".to_string()
}

fn default_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GatewayConfig {
    /// Defaults overridden by the process environment
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Apply environment overrides on top of `self`
    pub fn with_env(self) -> Self {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Empty values are ignored,
    /// as is a timeout that does not parse as a positive integer.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(url) = get(ENV_URL) {
            self.base_url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.model = model;
        }
        if let Some(raw) = get(ENV_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => tracing::warn!(value = %raw, "ignoring invalid {ENV_TIMEOUT_SECS}"),
            }
        }
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Full endpoint URL
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.api_key, None);
        assert_eq!(config.timeout_secs, 60);
        assert_eq!(
            config.completions_url(),
            "https://ai.gateway.lovable.dev/v1/chat/completions"
        );
    }

    #[test]
    fn lookup_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "http://127.0.0.1:9000/"),
            (ENV_API_KEY, "secret"),
            (ENV_MODEL, "  "),
            (ENV_TIMEOUT_SECS, "abc"),
        ]
        .into_iter()
        .collect();

        let config =
            GatewayConfig::default().with_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.completions_url(), "http://127.0.0.1:9000/chat/completions");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        // Blank and unparsable values leave the defaults alone
        assert_eq!(config.model, "google/gemini-2.5-flash");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: GatewayConfig = serde_json::from_str(r#"{"model": "m"}"#).unwrap();
        assert_eq!(config.model, "m");
        assert_eq!(config.base_url, "https://ai.gateway.lovable.dev/v1");
    }
}
