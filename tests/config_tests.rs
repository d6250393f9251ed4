use std::time::Duration;

use city_agent::config::{AgentConfig, ToolServiceConfig, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_TOOL_SERVER_URL};
mod common;

#[ctor::ctor]
fn _init() { common::init(); }

#[test]
fn config_defaults() {
    let c = AgentConfig::new();
    assert_eq!(c.model, DEFAULT_MODEL);
    assert_eq!(c.model, "gemini-2.0-flash");
    assert_eq!(c.api_base, DEFAULT_API_BASE);
    assert_eq!(c.max_tokens, 1024);
    assert_eq!(c.tool_server_url, DEFAULT_TOOL_SERVER_URL);
    assert_eq!(c.tool_timeout, Duration::from_secs(15));
    assert_eq!(c.model_timeout, Duration::from_secs(30));
    assert!(!c.validate_arguments);
    assert!(c.api_key.is_none());
}

#[test]
fn environment_overrides() {
    let c = AgentConfig::from_lookup(common::lookup(&[
        ("GEMINI_API_KEY", "k-123"),
        ("CITY_AGENT_MODEL", "gemini-1.5-pro"),
        ("CITY_AGENT_MAX_TOKENS", "256"),
        ("MCP_SERVER_URL", "http://tools.internal:9000"),
        ("CITY_AGENT_TOOL_TIMEOUT_SECS", "3"),
        ("CITY_AGENT_VALIDATE_ARGS", "yes"),
    ]))
    .unwrap();
    assert_eq!(c.require_api_key().unwrap(), "k-123");
    assert_eq!(c.model, "gemini-1.5-pro");
    assert_eq!(c.max_tokens, 256);
    assert_eq!(c.tool_server_url, "http://tools.internal:9000");
    assert_eq!(c.tool_timeout, Duration::from_secs(3));
    assert!(c.validate_arguments);
}

#[test]
fn invalid_numbers_are_errors() {
    let err = AgentConfig::from_lookup(common::lookup(&[("CITY_AGENT_MAX_TOKENS", "lots")])).unwrap_err();
    assert!(err.to_string().contains("CITY_AGENT_MAX_TOKENS"));

    let err = ToolServiceConfig::from_lookup(common::lookup(&[("CITY_TOOLS_TIMEOUT_SECS", "-1")])).unwrap_err();
    assert!(err.to_string().contains("CITY_TOOLS_TIMEOUT_SECS"));
}

#[test]
fn missing_api_key_names_the_variable() {
    let c = AgentConfig::from_lookup(common::lookup(&[])).unwrap();
    assert_eq!(c.require_api_key().unwrap_err().to_string(), "GEMINI_API_KEY not set");
}
