//! 質問応答エージェント本体
//!
//! registry → resolver → executor → chaining → aggregator の順に流れる。

pub mod aggregator;
pub mod chaining;
pub mod executor;
pub mod mock;
pub mod model;
pub mod registry;
pub mod resolver;
pub mod service;
pub mod types;

pub use aggregator::{aggregate, AggregatedResponse, FallbackError, PrimaryFailure};
pub use chaining::{derive_followups, extract_target_language, run_followups};
pub use executor::{HttpToolTransport, ToolExecutor, ToolTransport, TransportError};
pub use model::{LanguageModel, ModelError, ModelReply, OpenAiModel, ProposedCall};
pub use registry::{find_tool, list_tools, ParameterSchema, ToolSpec};
pub use resolver::resolve;
pub use service::{CityAgent, UNEXPECTED_FAILURE_ANSWER};
pub use types::{AgentEvent, IntentResolution, ToolInvocation, ToolResult, Translation};
