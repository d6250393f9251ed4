//! geocode_location: place name -> coordinates via Nominatim.

use serde_json::{json, Map, Value};
use tracing::debug;

use super::{error_payload, str_field, ToolService};

impl ToolService {
    /// `{"location": "Portland"}` or just `"Portland"`.
    pub async fn geocode_location(&self, args: &Value) -> Value {
        let query = match args {
            Value::String(s) if !s.trim().is_empty() => s.trim(),
            Value::Object(_) => match str_field(args, "location") {
                Some(q) => q,
                None => return error_payload("Missing location"),
            },
            _ => return error_payload("Missing location"),
        };
        match self.geocode(query).await {
            Ok(place) => Value::Object(place),
            Err(message) => error_payload(message),
        }
    }

    /// First Nominatim hit as `{display_name, lat, lon}`.
    pub(crate) async fn geocode(&self, query: &str) -> Result<Map<String, Value>, String> {
        let resp = self
            .http
            .get(&self.config.nominatim_url)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let results: Value = resp
            .json()
            .await
            .map_err(|_| "Invalid JSON returned by geocoding API".to_string())?;
        debug!(target: "tools", %query, hits = results.as_array().map(Vec::len), "geocode_response");
        first_place(&results).ok_or_else(|| "Location not found".to_string())
    }
}

fn first_place(results: &Value) -> Option<Map<String, Value>> {
    let first = results.as_array()?.first()?;
    let place = json!({
        "display_name": first.get("display_name").cloned().unwrap_or(Value::Null),
        "lat": first.get("lat").cloned().unwrap_or(Value::Null),
        "lon": first.get("lon").cloned().unwrap_or(Value::Null),
    });
    place.as_object().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::MockModel;
    use crate::config::ToolServiceConfig;
    use std::sync::Arc;

    #[test]
    fn first_place_keeps_three_fields() {
        let raw = json!([
            {"display_name": "Portland, Oregon", "lat": "45.5", "lon": "-122.6", "importance": 0.9},
            {"display_name": "Portland, Maine", "lat": "43.6", "lon": "-70.2"}
        ]);
        let place = first_place(&raw).unwrap();
        assert_eq!(Value::Object(place), json!({"display_name": "Portland, Oregon", "lat": "45.5", "lon": "-122.6"}));
        assert!(first_place(&json!([])).is_none());
        assert!(first_place(&json!({"not": "a list"})).is_none());
    }

    #[tokio::test]
    async fn missing_location_is_rejected_before_any_request() {
        let svc = ToolService::new(ToolServiceConfig::default(), Arc::new(MockModel::new())).unwrap();
        assert_eq!(svc.geocode_location(&json!({})).await, json!({"error": "Missing location"}));
        assert_eq!(svc.geocode_location(&json!("  ")).await, json!({"error": "Missing location"}));
        assert_eq!(svc.geocode_location(&json!(null)).await, json!({"error": "Missing location"}));
    }
}
