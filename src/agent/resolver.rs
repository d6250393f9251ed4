use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use super::model::{LanguageModel, ModelError, ProposedCall};
use super::registry::ToolSpec;
use super::types::{IntentResolution, ToolInvocation};

/// Ask the model once which tools to run for `query`.
///
/// - tool calls present: `ToolInvocationBatch` in the model's order (text is ignored)
/// - no tool calls: `RawText` with whatever text came back (possibly empty)
///
/// A call whose arguments do not parse stays in the batch at its position,
/// marked malformed; it fails when its turn comes. Argument values are not
/// checked against the schema here.
#[instrument(name = "resolve", skip(model, tools), fields(query_len = query.len()))]
pub async fn resolve(
    model: &dyn LanguageModel,
    query: &str,
    tools: &[ToolSpec],
) -> Result<IntentResolution, ModelError> {
    let reply = model.propose(query, tools).await?;
    debug!(target: "agent", calls = reply.tool_calls.len(), has_text = reply.text.is_some(), "model_reply");

    if reply.tool_calls.is_empty() {
        return Ok(IntentResolution::RawText(reply.text.unwrap_or_default()));
    }

    let invocations = reply.tool_calls.into_iter().map(into_invocation).collect();
    Ok(IntentResolution::ToolInvocationBatch(invocations))
}

/// 引数 JSON をパースして ToolInvocation に変換
fn into_invocation(call: ProposedCall) -> ToolInvocation {
    match parse_arguments(&call.arguments) {
        Ok(arguments) => ToolInvocation::new(call.name, arguments),
        Err(error) => {
            warn!(target: "agent", tool = %call.name, %error, "malformed_tool_arguments");
            ToolInvocation::malformed(call.name, error)
        }
    }
}

fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {other}")),
        Err(e) => Err(e.to_string()),
    }
}
