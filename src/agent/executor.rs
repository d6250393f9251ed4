//! Tool execution boundary.
//!
//! `ToolExecutor::execute` never fails: unknown tools, transport problems,
//! malformed responses and the tools' own `{"error": ..}` replies all come
//! back as `ToolResult::Failure`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use color_eyre::{eyre::WrapErr, Result};
use reqwest::Client;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use super::registry::find_tool;
use super::types::{ToolInvocation, ToolResult};
use crate::config::AgentConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("tool {name} timed out after {after:?}")]
    Timeout { name: String, after: Duration },
    #[error("tool {name} request failed: {message}")]
    Connect { name: String, message: String },
    #[error("tool {name} returned a non-JSON response: {message}")]
    Malformed { name: String, message: String },
}

/// Carries one tool call to wherever the tool lives.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value, TransportError>;
}

/// `POST <base>/tool/<name>` with the arguments as the JSON body.
#[derive(Debug, Clone)]
pub struct HttpToolTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpToolTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("city_agent/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .wrap_err("building reqwest client for tool transport")?;
        Ok(Self { client, base_url: base_url.into().trim_end_matches('/').to_string(), timeout })
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(config.tool_server_url.clone(), config.tool_timeout)
    }

    pub fn tool_url(&self, name: &str) -> String {
        format!("{}/tool/{}", self.base_url, name)
    }

    fn classify(&self, name: &str, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout { name: name.to_string(), after: self.timeout }
        } else {
            TransportError::Connect { name: name.to_string(), message: e.to_string() }
        }
    }
}

#[async_trait]
impl ToolTransport for HttpToolTransport {
    async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value, TransportError> {
        let url = self.tool_url(name);
        let resp = self
            .client
            .post(&url)
            .json(arguments)
            .send()
            .await
            .map_err(|e| self.classify(name, e))?;

        // Tools report their own errors in the body, so the status alone decides nothing.
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.classify(name, e))?;
        debug!(target: "tools", %url, status = %status, len = text.len(), "tool_response_raw");

        serde_json::from_str(&text).map_err(|e| TransportError::Malformed {
            name: name.to_string(),
            message: format!("status {}: {e}", status.as_u16()),
        })
    }
}

/// Registry-backed dispatch over a transport.
#[derive(Clone)]
pub struct ToolExecutor {
    transport: Arc<dyn ToolTransport>,
    validate_arguments: bool,
}

impl std::fmt::Debug for ToolExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolExecutor")
            .field("validate_arguments", &self.validate_arguments)
            .finish()
    }
}

impl ToolExecutor {
    pub fn new(transport: Arc<dyn ToolTransport>) -> Self {
        Self { transport, validate_arguments: false }
    }

    /// Reject arguments that do not fit the tool's schema instead of sending them.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_arguments = validate;
        self
    }

    /// Run one planned invocation; a malformed one fails here without a transport call.
    pub async fn execute_invocation(&self, invocation: &ToolInvocation) -> ToolResult {
        if let Some(error) = &invocation.argument_error {
            warn!(target: "tools", tool = %invocation.name, %error, "malformed_invocation");
            return ToolResult::failure(error.clone());
        }
        self.execute(&invocation.name, &invocation.arguments).await
    }

    #[instrument(name = "execute_tool", skip(self, arguments))]
    pub async fn execute(&self, name: &str, arguments: &Map<String, Value>) -> ToolResult {
        let Some(spec) = find_tool(name) else {
            warn!(target: "tools", tool = %name, "unknown_tool");
            return ToolResult::failure(format!("unknown tool: {name}"));
        };

        if self.validate_arguments {
            if let Err(reason) = spec.parameters.check(arguments) {
                return ToolResult::failure(format!("invalid arguments for {name}: {reason}"));
            }
        }

        match self.transport.invoke(name, arguments).await {
            Ok(value) => interpret_response(name, value),
            Err(e) => {
                warn!(target: "tools", tool = %name, error = %e, "tool_transport_error");
                ToolResult::failure(e.to_string())
            }
        }
    }
}

/// Turn a tool's JSON reply into a `ToolResult`.
fn interpret_response(name: &str, value: Value) -> ToolResult {
    let Value::Object(payload) = value else {
        return ToolResult::failure(format!("malformed response from {name}: expected a JSON object"));
    };
    match payload.get("error") {
        Some(Value::String(message)) => ToolResult::failure(message.clone()),
        Some(other) => ToolResult::failure(other.to_string()),
        None => ToolResult::Success { payload },
    }
}
