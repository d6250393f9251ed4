//! search_places: nearby businesses from Yelp.

use serde_json::{json, Value};

use super::{error_payload, param_text, str_field, ToolService};

const RESULT_LIMIT: &str = "5";

impl ToolService {
    pub async fn search_places(&self, args: &Value) -> Value {
        let (Some(query), Some(location)) = (str_field(args, "query"), str_field(args, "location")) else {
            return error_payload("Both 'query' and 'location' are required");
        };
        let Some(api_key) = self.config.yelp_api_key.as_deref() else {
            return error_payload("YELP_API_KEY not found in environment variables");
        };

        let coords = match self.geocode(location).await {
            Ok(c) => c,
            Err(message) => return error_payload(message),
        };
        let lat = coords.get("lat").map(param_text).unwrap_or_default();
        let lon = coords.get("lon").map(param_text).unwrap_or_default();

        let resp = self
            .http
            .get(&self.config.yelp_url)
            .bearer_auth(api_key)
            .query(&[("term", query), ("latitude", lat.as_str()), ("longitude", lon.as_str()), ("limit", RESULT_LIMIT)])
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

        match clean_businesses(&body) {
            Ok(results) => json!({ "results": results }),
            Err(message) => error_payload(message),
        }
    }
}

/// Yelp `businesses` -> `[{name, rating, address, phone, url}]`.
///
/// A missing `businesses` list means no results; a business missing one of
/// the required fields fails the whole search.
pub fn clean_businesses(body: &Value) -> Result<Vec<Value>, String> {
    let Some(list) = body.get("businesses").and_then(Value::as_array) else {
        return Ok(Vec::new());
    };
    list.iter()
        .map(|b| -> Result<Value, String> {
            let required = |key: &str| {
                b.get(key)
                    .cloned()
                    .ok_or_else(|| format!("unexpected Yelp response: business without '{key}'"))
            };
            let address = b
                .pointer("/location/display_address")
                .and_then(Value::as_array)
                .ok_or_else(|| "unexpected Yelp response: business without 'location.display_address'".to_string())?
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            Ok(json!({
                "name": required("name")?,
                "rating": required("rating")?,
                "address": address,
                "phone": b.get("display_phone").cloned().unwrap_or(Value::Null),
                "url": required("url")?,
            }))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::mock::MockModel;
    use crate::config::ToolServiceConfig;
    use std::sync::Arc;

    #[test]
    fn businesses_are_cleaned() {
        let body = json!({"businesses": [{
            "id": "x1",
            "name": "Case Study Coffee",
            "rating": 4.5,
            "location": {"display_address": ["1422 SW 11th Ave", "Portland, OR 97201"]},
            "display_phone": "(503) 555-0100",
            "url": "https://yelp.example/case-study"
        }], "total": 1});
        let out = clean_businesses(&body).unwrap();
        assert_eq!(
            out,
            vec![json!({
                "name": "Case Study Coffee",
                "rating": 4.5,
                "address": "1422 SW 11th Ave Portland, OR 97201",
                "phone": "(503) 555-0100",
                "url": "https://yelp.example/case-study"
            })]
        );
    }

    #[test]
    fn phone_is_optional_but_name_is_not() {
        let ok = json!({"businesses": [{"name": "A", "rating": 4, "location": {"display_address": []}, "url": "u"}]});
        assert_eq!(clean_businesses(&ok).unwrap()[0]["phone"], Value::Null);

        let bad = json!({"businesses": [{"rating": 4, "location": {"display_address": []}, "url": "u"}]});
        assert!(clean_businesses(&bad).unwrap_err().contains("'name'"));
        assert!(clean_businesses(&json!({})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn argument_and_key_checks() {
        let svc = ToolService::new(ToolServiceConfig::default(), Arc::new(MockModel::new())).unwrap();
        assert_eq!(
            svc.search_places(&json!({"query": "coffee"})).await,
            json!({"error": "Both 'query' and 'location' are required"})
        );
        assert_eq!(
            svc.search_places(&json!({"query": "coffee", "location": "PSU"})).await,
            json!({"error": "YELP_API_KEY not found in environment variables"})
        );
    }
}
