//! Language-model boundary.
//!
//! `LanguageModel` is the only thing the orchestration knows about the model.
//! `OpenAiModel` talks to any OpenAI-compatible chat completion endpoint
//! (Gemini's compatibility endpoint by default).

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, ChatCompletionTool, ChatCompletionToolChoiceOption,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
};
use async_openai::Client;
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use color_eyre::Result;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::registry::ToolSpec;
use crate::config::AgentConfig;

const SYSTEM_PROMPT: &str = "You answer questions about cities: locations, weather, nearby businesses and translations. \
Call the provided functions whenever they can supply the facts.";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("model request failed: {0}")]
    Request(String),
    #[error("model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("model returned an empty answer")]
    EmptyText,
}

/// A function call exactly as the model proposed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedCall {
    pub name: String,
    /// Raw JSON text; parsed by the resolver.
    pub arguments: String,
}

impl ProposedCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self { name: name.into(), arguments: arguments.into() }
    }
}

/// One model response: ordered tool calls and/or free text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub tool_calls: Vec<ProposedCall>,
    pub text: Option<String>,
}

impl ModelReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { tool_calls: Vec::new(), text: Some(text.into()) }
    }

    pub fn calls(tool_calls: Vec<ProposedCall>) -> Self {
        Self { tool_calls, text: None }
    }
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// One round-trip with the tool catalog attached; the model picks the tools.
    async fn propose(&self, query: &str, tools: &[ToolSpec]) -> Result<ModelReply, ModelError>;

    /// Plain text completion without tools.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// OpenAI 互換 API のクライアント
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiModel")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl OpenAiModel {
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        let api_key = config.require_api_key()?;
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(config.api_base.trim_end_matches('/'));
        // 429 はそのまま失敗として返す（SDK 既定のリトライを無効化）
        let no_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Ok(Self {
            client: Client::with_config(openai_config).with_backoff(no_retry),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.model_timeout,
        })
    }

    fn messages(&self, prompt: &str, with_system: bool) -> Result<Vec<ChatCompletionRequestMessage>, ModelError> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(2);
        if with_system {
            let system = ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| ModelError::Request(e.to_string()))?;
            messages.push(system.into());
        }
        let user = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| ModelError::Request(e.to_string()))?;
        messages.push(user.into());
        Ok(messages)
    }

    fn build_request(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        tools: Vec<ChatCompletionTool>,
    ) -> Result<CreateChatCompletionRequest, ModelError> {
        let mut builder = CreateChatCompletionRequestArgs::default();
        builder.model(&self.model).messages(messages).max_tokens(self.max_tokens);
        if !tools.is_empty() {
            builder.tools(tools).tool_choice(ChatCompletionToolChoiceOption::Auto);
        }
        builder.build().map_err(|e| ModelError::Request(e.to_string()))
    }

    async fn send(&self, request: CreateChatCompletionRequest) -> Result<CreateChatCompletionResponse, ModelError> {
        tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ModelError::Timeout(self.timeout))?
            .map_err(|e| ModelError::Request(e.to_string()))
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    #[instrument(name = "model_propose", skip(self, tools), fields(tools = tools.len()))]
    async fn propose(&self, query: &str, tools: &[ToolSpec]) -> Result<ModelReply, ModelError> {
        let messages = self.messages(query, true)?;
        let tools_for_api: Vec<ChatCompletionTool> = tools.iter().map(|t| t.as_chat_tool()).collect();
        let request = self.build_request(messages, tools_for_api)?;

        info!(target: "model", model = %self.model, max_tokens = self.max_tokens, "propose_request");
        let response = self.send(request).await?;
        debug!(target: "model", choices = response.choices.len(), "propose_response");
        Ok(reply_from_response(&response))
    }

    #[instrument(name = "model_complete", skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let messages = self.messages(prompt, false)?;
        let request = self.build_request(messages, Vec::new())?;

        info!(target: "model", model = %self.model, "complete_request");
        let response = self.send(request).await?;
        let text = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ModelError::EmptyText);
        }
        Ok(text.to_string())
    }
}

/// Only the first choice is considered; its tool calls keep the model's order.
pub(crate) fn reply_from_response(response: &CreateChatCompletionResponse) -> ModelReply {
    let Some(choice) = response.choices.first() else {
        return ModelReply::default();
    };
    let tool_calls = choice
        .message
        .tool_calls
        .as_ref()
        .map(|calls| {
            calls
                .iter()
                .map(|c| ProposedCall::new(c.function.name.clone(), c.function.arguments.clone()))
                .collect()
        })
        .unwrap_or_default();
    ModelReply { tool_calls, text: choice.message.content.clone() }
}
