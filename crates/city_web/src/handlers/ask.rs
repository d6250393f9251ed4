use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::models::{AskRequest, AskResponse, ErrorResponse};
use crate::AppState;

/// POST /ask - 質問をエージェントに渡して回答を返す
#[axum::debug_handler]
pub async fn ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> impl IntoResponse {
    // 壊れた JSON や型違いも ErrorResponse で返す
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(target: "web::ask", error = %rejection.body_text(), "Rejected request body");
            return (rejection.status(), Json(ErrorResponse { error: rejection.body_text() })).into_response();
        }
    };
    let question = req.question.trim();
    if question.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse { error: "Question cannot be empty".to_string() }),
        )
            .into_response();
    }

    tracing::info!(target: "web::ask", %question, "Received question");
    let answer = state
        .agent
        .answer_with_logger(question, |ev| tracing::debug!(target: "web::ask", event = %ev))
        .await;
    tracing::info!(target: "web::ask", answer_len = answer.len(), "Answered");

    Json(AskResponse { answer }).into_response()
}
