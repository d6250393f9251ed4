use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};

use crate::models::HealthResponse;

/// トップページテンプレート
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: &'static str,
}

/// GET / - 質問フォーム
pub async fn index() -> impl IntoResponse {
    let template = IndexTemplate { title: "Smart City Info Agent" };
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Template error: {}", e),
        )
            .into_response(),
    }
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
