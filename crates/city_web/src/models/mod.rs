use serde::{Deserialize, Serialize};

/// POST /ask リクエスト
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

/// POST /ask レスポンス
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub answer: String,
}

/// エラーレスポンス
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
