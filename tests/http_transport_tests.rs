//! `HttpToolTransport` against a local axum stub.

use std::time::Duration;

use axum::{extract::Path, http::StatusCode, routing::post, Json, Router};
use city_agent::agent::{HttpToolTransport, ToolExecutor, ToolResult, ToolTransport, TransportError};
use serde_json::{json, Map, Value};
use std::sync::Arc;
mod common;

#[ctor::ctor]
fn _init() { common::init(); }

async fn stub_tool(Path(name): Path<String>, Json(args): Json<Value>) -> (StatusCode, String) {
    match name.as_str() {
        "get_weather" => (
            StatusCode::OK,
            json!({"location": args["location"], "temperature_c": 10.5}).to_string(),
        ),
        "geocode_location" => (StatusCode::OK, json!({"error": "Location not found"}).to_string()),
        // error body with a non-2xx status still counts as a tool reply
        "search_places" => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "Yelp unavailable"}).to_string(),
        ),
        "translate_text" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            (StatusCode::OK, json!({"translated_text": "late"}).to_string())
        }
        _ => (StatusCode::OK, "<html>not json</html>".to_string()),
    }
}

async fn transport(timeout: Duration) -> HttpToolTransport {
    let router = Router::new().route("/tool/:name", post(stub_tool));
    let addr = common::spawn_stub(router).await;
    HttpToolTransport::new(format!("http://{addr}"), timeout).unwrap()
}

fn args(v: Value) -> Map<String, Value> {
    v.as_object().cloned().unwrap_or_default()
}

#[tokio::test]
async fn posts_arguments_and_parses_json() {
    let t = transport(Duration::from_secs(5)).await;
    let out = t.invoke("get_weather", &args(json!({"location": "Portland"}))).await.unwrap();
    assert_eq!(out, json!({"location": "Portland", "temperature_c": 10.5}));
}

#[tokio::test]
async fn error_bodies_are_returned_regardless_of_status() {
    let t = transport(Duration::from_secs(5)).await;
    let out = t.invoke("search_places", &Map::new()).await.unwrap();
    assert_eq!(out, json!({"error": "Yelp unavailable"}));

    let executor = ToolExecutor::new(Arc::new(t));
    let res = executor.execute("geocode_location", &args(json!({"location": "x"}))).await;
    assert_eq!(res, ToolResult::failure("Location not found"));
}

#[tokio::test]
async fn non_json_body_is_malformed() {
    let t = transport(Duration::from_secs(5)).await;
    let err = t.invoke("something_else", &Map::new()).await.unwrap_err();
    assert!(matches!(err, TransportError::Malformed { ref name, .. } if name == "something_else"));
}

#[tokio::test]
async fn slow_tool_times_out() {
    let t = transport(Duration::from_millis(300)).await;
    let err = t.invoke("translate_text", &Map::new()).await.unwrap_err();
    assert_eq!(
        err,
        TransportError::Timeout { name: "translate_text".into(), after: Duration::from_millis(300) }
    );
}

#[tokio::test]
async fn unreachable_server_is_a_connect_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let t = HttpToolTransport::new(format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let executor = ToolExecutor::new(Arc::new(t));
    match executor.execute("get_weather", &args(json!({"location": "Portland"}))).await {
        ToolResult::Failure { message } => assert!(message.starts_with("tool get_weather request failed")),
        other => panic!("unexpected: {other:?}"),
    }
}
