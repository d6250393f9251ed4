//! CityAgent
//!
//! 質問 → モデルによるツール選択 → ツール実行 → 連鎖 → 回答、の一連の流れ。
//! UI層（CLI/Web）から独立した形で提供する。

use std::sync::Arc;

use color_eyre::Result;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, instrument, warn};

use super::aggregator::{aggregate, plain_text_answer, FALLBACK_ANSWER};
use super::executor::{HttpToolTransport, ToolExecutor, ToolTransport};
use super::model::{LanguageModel, OpenAiModel};
use super::registry::list_tools;
use super::resolver::resolve;
use super::types::{AgentEvent, IntentResolution};
use crate::config::AgentConfig;

/// Returned when something outside the tools breaks (e.g. the model is unreachable).
pub const UNEXPECTED_FAILURE_ANSWER: &str = "I am sorry, I could not process your question right now.";

/// Built once per process; read-only afterwards.
#[derive(Clone)]
pub struct CityAgent {
    model: Arc<dyn LanguageModel>,
    executor: ToolExecutor,
}

impl CityAgent {
    pub fn new(config: AgentConfig, model: Arc<dyn LanguageModel>, transport: Arc<dyn ToolTransport>) -> Self {
        let executor = ToolExecutor::new(transport).with_validation(config.validate_arguments);
        Self { model, executor }
    }

    /// OpenAI 互換モデル + HTTP ツールサーバで構築
    pub fn from_config(config: AgentConfig) -> Result<Self> {
        let model = Arc::new(OpenAiModel::from_config(&config)?);
        let transport = Arc::new(HttpToolTransport::from_config(&config)?);
        info!(target: "agent", model = %config.model, tool_server = %config.tool_server_url, "agent_ready");
        Ok(Self::new(config, model, transport))
    }

    pub fn model(&self) -> Arc<dyn LanguageModel> {
        Arc::clone(&self.model)
    }

    /// Answer a question. Always returns text: either the JSON document of
    /// tool results, a failure sentence, or the model's plain answer.
    pub async fn answer(&self, question: &str) -> String {
        self.answer_with_logger(question, |_| {}).await
    }

    #[instrument(name = "answer", skip(self, logger), fields(question_len = question.len()))]
    pub async fn answer_with_logger(
        &self,
        question: &str,
        mut logger: impl FnMut(&AgentEvent) + Send,
    ) -> String {
        let mut emit = |ev: &AgentEvent| {
            debug!(target: "agent", event = %ev, "agent_event");
            logger(ev);
        };

        let resolution = match resolve(self.model.as_ref(), question, list_tools()).await {
            Ok(r) => r,
            Err(e) => {
                error!(target: "agent", error = %e, "resolve_failed");
                return UNEXPECTED_FAILURE_ANSWER.to_string();
            }
        };

        match resolution {
            IntentResolution::ToolInvocationBatch(invocations) => {
                emit(&AgentEvent::Proposed { invocations: invocations.clone() });
                match aggregate(question, &invocations, &self.executor, &mut emit).await {
                    Ok(response) => match response.to_json_string() {
                        Ok(json) => json,
                        Err(e) => {
                            error!(target: "agent", error = %e, "serialize_failed");
                            UNEXPECTED_FAILURE_ANSWER.to_string()
                        }
                    },
                    Err(failure) => failure.answer(),
                }
            }
            IntentResolution::RawText(text) => {
                emit(&AgentEvent::RawText { len: text.len() });
                match plain_text_answer(self.model.as_ref(), question).await {
                    Ok(answer) => answer,
                    Err(e) => {
                        warn!(target: "agent", error = %e, "plain_text_fallback_failed");
                        emit(&AgentEvent::Fallback { reason: e.to_string() });
                        FALLBACK_ANSWER.to_string()
                    }
                }
            }
        }
    }

    /// ブロッキング版 (同期): Tokio ランタイムを内部生成
    pub fn answer_blocking(&self, question: &str, logger: impl FnMut(&AgentEvent) + Send) -> Result<String> {
        let rt = Runtime::new()?;
        Ok(rt.block_on(self.answer_with_logger(question, logger)))
    }
}
