use axum::extract::{Json, Path, State};
use serde_json::Value;

use crate::AppState;

/// POST /tool/:name - ツールを直接実行（エラーも 200 + {"error": ..} で返す）
pub async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(args): Json<Value>,
) -> Json<Value> {
    tracing::info!(target: "web::tool", tool = %name, "Tool request");
    Json(state.tools.call(&name, &args).await)
}
