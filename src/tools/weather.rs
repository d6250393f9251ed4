//! get_weather: current conditions from OpenWeather.

use serde_json::{json, Value};

use super::{error_payload, param_text, str_field, ToolService};

impl ToolService {
    pub async fn get_weather(&self, args: &Value) -> Value {
        let Some(location) = str_field(args, "location") else {
            return error_payload("Missing required field: 'location'");
        };
        let Some(api_key) = self.config.openweather_api_key.as_deref() else {
            return error_payload("OPENWEATHER_API_KEY not found in environment variables");
        };

        // geocode のエラーはそのまま返す
        let coords = match self.geocode(location).await {
            Ok(c) => c,
            Err(message) => return error_payload(message),
        };
        let lat = coords.get("lat").map(param_text).unwrap_or_default();
        let lon = coords.get("lon").map(param_text).unwrap_or_default();

        let resp = self
            .http
            .get(&self.config.openweather_url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let body: Value = match resp {
            Ok(r) => match r.json().await {
                Ok(v) => v,
                Err(e) => return error_payload(e.to_string()),
            },
            Err(e) => return error_payload(e.to_string()),
        };

        weather_summary(location, &body).unwrap_or_else(|message| error_payload(message))
    }
}

/// OpenWeather body -> `{location, temperature_c, weather, humidity, wind_speed}`.
pub fn weather_summary(location: &str, body: &Value) -> Result<Value, String> {
    let field = |pointer: &str| {
        body.pointer(pointer)
            .cloned()
            .ok_or_else(|| format!("unexpected weather response: missing {pointer}"))
    };
    Ok(json!({
        "location": location,
        "temperature_c": field("/main/temp")?,
        "weather": field("/weather/0/description")?,
        "humidity": field("/main/humidity")?,
        "wind_speed": field("/wind/speed")?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::MockModel;
    use crate::config::ToolServiceConfig;
    use std::sync::Arc;

    #[test]
    fn summary_picks_the_documented_fields() {
        let body = json!({
            "main": {"temp": 10.5, "humidity": 93, "pressure": 1012},
            "weather": [{"description": "broken clouds", "main": "Clouds"}],
            "wind": {"speed": 2.5}
        });
        let out = weather_summary("Portland", &body).unwrap();
        assert_eq!(
            out,
            json!({"location": "Portland", "temperature_c": 10.5, "weather": "broken clouds", "humidity": 93, "wind_speed": 2.5})
        );
    }

    #[test]
    fn summary_reports_missing_fields() {
        let err = weather_summary("Portland", &json!({"main": {"temp": 1.0}})).unwrap_err();
        assert!(err.contains("/weather/0/description"));
    }

    #[tokio::test]
    async fn argument_and_key_checks() {
        let svc = ToolService::new(ToolServiceConfig::default(), Arc::new(MockModel::new())).unwrap();
        assert_eq!(svc.get_weather(&json!({})).await, json!({"error": "Missing required field: 'location'"}));
        assert_eq!(
            svc.get_weather(&json!({"location": "Portland"})).await,
            json!({"error": "OPENWEATHER_API_KEY not found in environment variables"})
        );
    }
}
