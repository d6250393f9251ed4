use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{self, Display};

/// A concrete request to run one tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    pub arguments: Map<String, Value>,
    /// Set when the model's argument text could not be parsed; such an
    /// invocation fails without reaching the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument_error: Option<String>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self { name: name.into(), arguments, argument_error: None }
    }

    pub fn malformed(name: impl Into<String>, error: impl std::fmt::Display) -> Self {
        let name = name.into();
        let argument_error = Some(format!("malformed arguments for {name}: {error}"));
        Self { name, arguments: Map::new(), argument_error }
    }

    /// Argument as a string, if present and a string.
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Outcome of exactly one tool invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success { payload: Map<String, Value> },
    Failure { message: String },
}

impl ToolResult {
    pub fn failure(message: impl Into<String>) -> Self {
        ToolResult::Failure { message: message.into() }
    }
}

/// What the language model decided, fixed once at the model boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum IntentResolution {
    ToolInvocationBatch(Vec<ToolInvocation>),
    RawText(String),
}

/// One chained translation of an entity name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub original: String,
    pub translated: String,
}

/// Progress events of one query; logged and forwarded to an optional callback.
#[derive(Debug, Clone)]
pub enum AgentEvent {
    Proposed { invocations: Vec<ToolInvocation> },
    RawText { len: usize },
    ToolStarted { name: String, arguments: Map<String, Value> },
    ToolFinished { name: String, result: ToolResult },
    ShortCircuit { name: String, message: String },
    ChainTriggered { target_lang: String, entities: usize },
    Translated { translation: Translation },
    Fallback { reason: String },
}

impl Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, Value::Object(self.arguments.clone()))
    }
}

impl Display for ToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolResult::Success { payload } => write!(f, "Success {}", Value::Object(payload.clone())),
            ToolResult::Failure { message } => write!(f, "Failure: {message}"),
        }
    }
}

impl Display for AgentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentEvent::Proposed { invocations } => {
                let names: Vec<&str> = invocations.iter().map(|i| i.name.as_str()).collect();
                write!(f, "Proposed [{}]", names.join(", "))
            }
            AgentEvent::RawText { len } => write!(f, "RawText(len={len})"),
            AgentEvent::ToolStarted { name, arguments } => {
                write!(f, "ToolStarted name={} args={}", name, Value::Object(arguments.clone()))
            }
            AgentEvent::ToolFinished { name, result } => write!(f, "ToolFinished name={name} => {result}"),
            AgentEvent::ShortCircuit { name, message } => write!(f, "ShortCircuit name={name} message={message}"),
            AgentEvent::ChainTriggered { target_lang, entities } => {
                write!(f, "ChainTriggered target_lang={target_lang} entities={entities}")
            }
            AgentEvent::Translated { translation } => {
                write!(f, "Translated {} => {}", translation.original, translation.translated)
            }
            AgentEvent::Fallback { reason } => write!(f, "Fallback reason={reason}"),
        }
    }
}
