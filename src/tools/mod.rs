//! City tools.
//!
//! Each tool takes the JSON arguments posted to `/tool/<name>` and returns
//! either its payload or `{"error": "<message>"}`. Nothing here panics or
//! returns `Err` to the caller; the HTTP layer serializes whatever comes back.

mod geocode;
mod places;
mod translate;
mod weather;

use std::sync::Arc;

use color_eyre::{eyre::WrapErr, Result};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::agent::model::LanguageModel;
use crate::agent::registry::{GEOCODE_LOCATION, GET_WEATHER, SEARCH_PLACES, TRANSLATE_TEXT};
use crate::config::ToolServiceConfig;

pub use places::clean_businesses;
pub use translate::translation_prompt;
pub use weather::weather_summary;

/// 外部 API (Nominatim / OpenWeather / Yelp) と翻訳モデルへの窓口
#[derive(Clone)]
pub struct ToolService {
    http: Client,
    config: ToolServiceConfig,
    translator: Arc<dyn LanguageModel>,
}

impl std::fmt::Debug for ToolService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolService")
            .field("nominatim_url", &self.config.nominatim_url)
            .field("openweather_url", &self.config.openweather_url)
            .field("yelp_url", &self.config.yelp_url)
            .finish()
    }
}

impl ToolService {
    pub fn new(config: ToolServiceConfig, translator: Arc<dyn LanguageModel>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .wrap_err("building reqwest client for city tools")?;
        Ok(Self { http, config, translator })
    }

    /// Dispatch by tool name.
    #[instrument(name = "tool_call", skip(self, args))]
    pub async fn call(&self, name: &str, args: &Value) -> Value {
        let out = match name {
            GEOCODE_LOCATION => self.geocode_location(args).await,
            GET_WEATHER => self.get_weather(args).await,
            SEARCH_PLACES => self.search_places(args).await,
            TRANSLATE_TEXT => self.translate_text(args).await,
            other => error_payload(format!("unknown tool: {other}")),
        };
        match out.get("error") {
            Some(err) => warn!(target: "tools", tool = %name, error = %err, "tool_error"),
            None => debug!(target: "tools", tool = %name, "tool_ok"),
        }
        out
    }
}

pub(crate) fn error_payload(message: impl Into<String>) -> Value {
    json!({ "error": message.into() })
}

/// Non-blank string argument.
pub(crate) fn str_field<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Query-string form of a JSON scalar (Nominatim returns coordinates as strings).
pub(crate) fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
