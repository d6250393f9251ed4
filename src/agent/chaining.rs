//! Deterministic follow-up rule: translate business names found by
//! `search_places` when the user asked for a translation.
//!
//! No model call happens here, so the same query and results always give
//! the same follow-ups.

use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::aggregator::AggregatedResponse;
use super::executor::ToolExecutor;
use super::registry::{SEARCH_PLACES, TRANSLATE_TEXT};
use super::types::{AgentEvent, ToolInvocation, ToolResult, Translation};

pub const MAX_TRANSLATED_ENTITIES: usize = 3;
pub const DEFAULT_TARGET_LANGUAGE: &str = "hindi";
pub const TRANSLATION_ERROR_SENTINEL: &str = "[error]";
const TRIGGER_WORD: &str = "translate";

/// Target language named after the first standalone `to` in the query.
///
/// `"translate these to spanish"` -> `"spanish"`; no `to`, or `to` as the last
/// word, falls back to `"hindi"`. Punctuation stays attached to the word.
pub fn extract_target_language(query: &str) -> String {
    let lowered = query.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().collect();
    words
        .iter()
        .position(|w| *w == "to")
        .and_then(|idx| words.get(idx + 1))
        .map(|w| w.to_string())
        .unwrap_or_else(|| DEFAULT_TARGET_LANGUAGE.to_string())
}

/// Whether the query asks for a translation at all.
pub fn wants_translation(query: &str) -> bool {
    query.to_lowercase().contains(TRIGGER_WORD)
}

/// Follow-up `translate_text` invocations for `results`.
///
/// `None` means the rule did not fire. `Some` may be empty when the places
/// list is empty or none of the first entries carry a name.
pub fn derive_followups(query: &str, results: &AggregatedResponse) -> Option<Vec<ToolInvocation>> {
    if !wants_translation(query) {
        return None;
    }
    let places = results.get(SEARCH_PLACES)?;
    let target_lang = extract_target_language(query);

    let entities = places
        .get("results")
        .and_then(Value::as_array)
        .map(|list| list.as_slice())
        .unwrap_or_default();

    let followups = entities
        .iter()
        .take(MAX_TRANSLATED_ENTITIES)
        .filter_map(|entity| entity.get("name").and_then(Value::as_str))
        .map(|name| translate_invocation(name, &target_lang))
        .collect();
    Some(followups)
}

fn translate_invocation(text: &str, target_lang: &str) -> ToolInvocation {
    let mut arguments = Map::new();
    arguments.insert("text".into(), Value::from(text));
    arguments.insert("target_lang".into(), Value::from(target_lang));
    ToolInvocation::new(TRANSLATE_TEXT, arguments)
}

/// Run follow-ups one after another. A failed translation only affects its own entry.
#[instrument(name = "run_followups", skip_all, fields(count = followups.len()))]
pub async fn run_followups(
    executor: &ToolExecutor,
    followups: &[ToolInvocation],
    emit: &mut (dyn FnMut(&AgentEvent) + Send),
) -> Vec<Translation> {
    let mut translations = Vec::with_capacity(followups.len());
    for invocation in followups {
        let original = invocation.str_arg("text").unwrap_or_default().to_string();
        let result = executor.execute_invocation(invocation).await;
        let translated = match &result {
            ToolResult::Success { payload } => payload
                .get("translated_text")
                .and_then(Value::as_str)
                .unwrap_or(TRANSLATION_ERROR_SENTINEL)
                .to_string(),
            ToolResult::Failure { message } => {
                debug!(target: "agent", %original, %message, "translation_failed");
                TRANSLATION_ERROR_SENTINEL.to_string()
            }
        };
        let translation = Translation { original, translated };
        emit(&AgentEvent::Translated { translation: translation.clone() });
        translations.push(translation);
    }
    translations
}
