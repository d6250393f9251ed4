//! アプリケーション設定
//!
//! Process-wide settings are read once at startup and passed by reference
//! into the model client, the tool executor and the tool service.

use std::time::Duration;

use color_eyre::eyre::{eyre, Result};

/// Default OpenAI-compatible endpoint (Gemini).
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TOOL_SERVER_URL: &str = "http://127.0.0.1:8080";

/// エージェント設定
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// API key for the language model (`GEMINI_API_KEY`)
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL
    pub api_base: String,
    /// モデル名
    pub model: String,
    /// 最大トークン数
    pub max_tokens: u32,
    /// Base address of the tool server (`MCP_SERVER_URL`)
    pub tool_server_url: String,
    pub tool_timeout: Duration,
    pub model_timeout: Duration,
    /// Check arguments against the tool schema before calling the tool server
    pub validate_arguments: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            // NOTE: Keep in sync with tests/config_tests.rs.
            max_tokens: 1024,
            tool_server_url: DEFAULT_TOOL_SERVER_URL.to_string(),
            tool_timeout: Duration::from_secs(15),
            model_timeout: Duration::from_secs(30),
            validate_arguments: false,
        }
    }
}

impl AgentConfig {
    /// 新しい設定インスタンスを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        config.api_key = non_empty(lookup("GEMINI_API_KEY"));
        if let Some(base) = non_empty(lookup("CITY_AGENT_API_BASE")) {
            config.api_base = base;
        }
        if let Some(model) = non_empty(lookup("CITY_AGENT_MODEL")) {
            config.model = model;
        }
        if let Some(raw) = non_empty(lookup("CITY_AGENT_MAX_TOKENS")) {
            config.max_tokens = raw
                .parse()
                .map_err(|e| eyre!("CITY_AGENT_MAX_TOKENS is not a number ({raw}): {e}"))?;
        }
        if let Some(url) = non_empty(lookup("MCP_SERVER_URL")) {
            config.tool_server_url = url;
        }
        if let Some(raw) = non_empty(lookup("CITY_AGENT_TOOL_TIMEOUT_SECS")) {
            config.tool_timeout = parse_secs("CITY_AGENT_TOOL_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = non_empty(lookup("CITY_AGENT_MODEL_TIMEOUT_SECS")) {
            config.model_timeout = parse_secs("CITY_AGENT_MODEL_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = non_empty(lookup("CITY_AGENT_VALIDATE_ARGS")) {
            config.validate_arguments = parse_flag("CITY_AGENT_VALIDATE_ARGS", &raw)?;
        }
        Ok(config)
    }

    /// The API key, or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| eyre!("GEMINI_API_KEY not set"))
    }
}

/// Settings for the tool implementations served at `/tool/<name>`.
#[derive(Debug, Clone)]
pub struct ToolServiceConfig {
    pub openweather_api_key: Option<String>,
    pub yelp_api_key: Option<String>,
    pub nominatim_url: String,
    pub openweather_url: String,
    pub yelp_url: String,
    /// Nominatim rejects requests without a User-Agent.
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl Default for ToolServiceConfig {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            yelp_api_key: None,
            nominatim_url: "https://nominatim.openstreetmap.org/search".to_string(),
            openweather_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            yelp_url: "https://api.yelp.com/v3/businesses/search".to_string(),
            user_agent: "SmartCityAgent".to_string(),
            request_timeout: Duration::from_secs(15),
        }
    }
}

impl ToolServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        config.openweather_api_key = non_empty(lookup("OPENWEATHER_API_KEY"));
        config.yelp_api_key = non_empty(lookup("YELP_API_KEY"));
        if let Some(url) = non_empty(lookup("NOMINATIM_URL")) {
            config.nominatim_url = url;
        }
        if let Some(url) = non_empty(lookup("OPENWEATHER_URL")) {
            config.openweather_url = url;
        }
        if let Some(url) = non_empty(lookup("YELP_URL")) {
            config.yelp_url = url;
        }
        if let Some(raw) = non_empty(lookup("CITY_TOOLS_TIMEOUT_SECS")) {
            config.request_timeout = parse_secs("CITY_TOOLS_TIMEOUT_SECS", &raw)?;
        }
        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    let secs: u64 = raw
        .parse()
        .map_err(|e| eyre!("{key} is not a whole number of seconds ({raw}): {e}"))?;
    if secs == 0 {
        return Err(eyre!("{key} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(eyre!("{key} must be a boolean, got {raw}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = AgentConfig::from_lookup(lookup_from(&[("CITY_AGENT_MODEL", "  "), ("GEMINI_API_KEY", "")])).unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert!(cfg.api_key.is_none());
        assert!(cfg.require_api_key().is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = AgentConfig::from_lookup(lookup_from(&[("CITY_AGENT_TOOL_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("X", "TRUE").unwrap());
        assert!(!parse_flag("X", "off").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }

    #[test]
    fn tool_service_keys_are_read() {
        let cfg = ToolServiceConfig::from_lookup(lookup_from(&[
            ("YELP_API_KEY", "yelp"),
            ("NOMINATIM_URL", "http://localhost:9999/search"),
        ]))
        .unwrap();
        assert_eq!(cfg.yelp_api_key.as_deref(), Some("yelp"));
        assert!(cfg.openweather_api_key.is_none());
        assert_eq!(cfg.nominatim_url, "http://localhost:9999/search");
        assert_eq!(cfg.user_agent, "SmartCityAgent");
    }
}
