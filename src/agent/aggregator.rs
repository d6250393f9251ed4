//! Collects tool payloads into the final structured answer.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::chaining::{derive_followups, extract_target_language, run_followups};
use super::executor::ToolExecutor;
use super::model::{LanguageModel, ModelError};
use super::types::{AgentEvent, ToolInvocation, ToolResult, Translation};

pub const TRANSLATIONS_KEY: &str = "translations";
pub const FAILURE_PREFIX: &str = "I am sorry, something went wrong";
pub const FALLBACK_ANSWER: &str = "Sorry — I could not summarize the results.";

/// Tool name -> payload, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregatedResponse {
    entries: Map<String, Value>,
}

impl AggregatedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated tool name overwrites the earlier payload.
    pub fn insert(&mut self, name: impl Into<String>, payload: Map<String, Value>) {
        self.entries.insert(name.into(), Value::Object(payload));
    }

    pub fn attach_translations(&mut self, translations: &[Translation]) {
        let list = translations
            .iter()
            .map(|t| {
                let mut entry = Map::new();
                entry.insert("original".into(), Value::from(t.original.as_str()));
                entry.insert("translated".into(), Value::from(t.translated.as_str()));
                Value::Object(entry)
            })
            .collect();
        self.entries.insert(TRANSLATIONS_KEY.to_string(), Value::Array(list));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pretty JSON (two-space indent); same input, same bytes.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}

/// The first primary invocation that failed; nothing after it ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrimaryFailure {
    pub tool: String,
    pub message: String,
}

impl PrimaryFailure {
    /// User-facing answer for a failed batch.
    pub fn answer(&self) -> String {
        failure_answer(&self.message)
    }
}

fn failure_answer(message: &str) -> String {
    format!("{FAILURE_PREFIX} → {message}")
}

/// Run the primary invocations in order, stopping at the first failure,
/// then apply the chaining rule once over everything collected.
#[instrument(name = "aggregate", skip_all, fields(primary = primary.len()))]
pub async fn aggregate(
    query: &str,
    primary: &[ToolInvocation],
    executor: &ToolExecutor,
    emit: &mut (dyn FnMut(&AgentEvent) + Send),
) -> Result<AggregatedResponse, PrimaryFailure> {
    let mut response = AggregatedResponse::new();

    for invocation in primary {
        emit(&AgentEvent::ToolStarted { name: invocation.name.clone(), arguments: invocation.arguments.clone() });
        let result = executor.execute_invocation(invocation).await;
        emit(&AgentEvent::ToolFinished { name: invocation.name.clone(), result: result.clone() });

        match result {
            ToolResult::Success { payload } => response.insert(invocation.name.clone(), payload),
            ToolResult::Failure { message } => {
                warn!(target: "agent", tool = %invocation.name, %message, "primary_tool_failed");
                emit(&AgentEvent::ShortCircuit { name: invocation.name.clone(), message: message.clone() });
                return Err(PrimaryFailure { tool: invocation.name.clone(), message });
            }
        }
    }

    if let Some(followups) = derive_followups(query, &response) {
        let target_lang = extract_target_language(query);
        info!(target: "agent", %target_lang, entities = followups.len(), "chain_triggered");
        emit(&AgentEvent::ChainTriggered { target_lang, entities: followups.len() });
        let translations = run_followups(executor, &followups, emit).await;
        response.attach_translations(&translations);
    }

    debug!(target: "agent", keys = response.len(), "aggregate_done");
    Ok(response)
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FallbackError {
    #[error("plain-text model call failed: {0}")]
    Model(ModelError),
    #[error("plain-text model call returned no text")]
    EmptyText,
}

/// Second round-trip used when the model proposed no tools.
pub async fn plain_text_answer(model: &dyn LanguageModel, query: &str) -> Result<String, FallbackError> {
    match model.complete(query).await {
        Ok(text) if text.trim().is_empty() => Err(FallbackError::EmptyText),
        Ok(text) => Ok(text),
        Err(ModelError::EmptyText) => Err(FallbackError::EmptyText),
        Err(e) => Err(FallbackError::Model(e)),
    }
}
