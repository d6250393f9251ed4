//! Deterministic doubles for the model and the tool transport.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::executor::{ToolTransport, TransportError};
use super::model::{LanguageModel, ModelError, ModelReply};
use super::registry::ToolSpec;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Replays queued replies in order.
#[derive(Debug, Default)]
pub struct MockModel {
    proposals: Mutex<VecDeque<Result<ModelReply, ModelError>>>,
    completions: Mutex<VecDeque<Result<String, ModelError>>>,
    propose_calls: Mutex<usize>,
    complete_prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_reply(&self, reply: ModelReply) {
        lock(&self.proposals).push_back(Ok(reply));
    }

    pub fn push_error(&self, error: ModelError) {
        lock(&self.proposals).push_back(Err(error));
    }

    pub fn push_completion(&self, completion: Result<String, ModelError>) {
        lock(&self.completions).push_back(completion);
    }

    pub fn propose_count(&self) -> usize {
        *lock(&self.propose_calls)
    }

    pub fn complete_prompts(&self) -> Vec<String> {
        lock(&self.complete_prompts).clone()
    }
}

#[async_trait]
impl LanguageModel for MockModel {
    async fn propose(&self, _query: &str, _tools: &[ToolSpec]) -> Result<ModelReply, ModelError> {
        *lock(&self.propose_calls) += 1;
        lock(&self.proposals)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("MockModel: no more replies in queue".into())))
    }

    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        lock(&self.complete_prompts).push(prompt.to_string());
        lock(&self.completions)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::Request("MockModel: no more completions in queue".into())))
    }
}

/// Canned per-tool replies plus a log of every call made.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: HashMap<String, Result<Value, TransportError>>,
    /// Per-tool queues consumed before `responses`; lets one tool answer differently per call.
    sequences: Mutex<HashMap<String, VecDeque<Value>>>,
    calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, name: &str, value: Value) -> Self {
        self.responses.insert(name.to_string(), Ok(value));
        self
    }

    pub fn with_error(mut self, name: &str, error: TransportError) -> Self {
        self.responses.insert(name.to_string(), Err(error));
        self
    }

    pub fn with_sequence(self, name: &str, values: impl IntoIterator<Item = Value>) -> Self {
        lock(&self.sequences).insert(name.to_string(), values.into_iter().collect());
        self
    }

    pub fn calls(&self) -> Vec<(String, Map<String, Value>)> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn called_tools(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|(name, _)| name.clone()).collect()
    }
}

#[async_trait]
impl ToolTransport for MockTransport {
    async fn invoke(&self, name: &str, arguments: &Map<String, Value>) -> Result<Value, TransportError> {
        lock(&self.calls).push((name.to_string(), arguments.clone()));
        if let Some(next) = lock(&self.sequences).get_mut(name).and_then(|q| q.pop_front()) {
            return Ok(next);
        }
        self.responses.get(name).cloned().unwrap_or_else(|| {
            Err(TransportError::Connect { name: name.to_string(), message: "MockTransport: no response configured".into() })
        })
    }
}
