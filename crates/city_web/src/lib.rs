//! Web surface for the city agent: tool endpoints, `/ask`, UI page.

pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use city_agent::{CityAgent, ToolService};
use tower_http::cors::{Any, CorsLayer};

/// ハンドラ間で共有する状態（起動時に一度だけ構築）
#[derive(Clone)]
pub struct AppState {
    pub agent: Arc<CityAgent>,
    pub tools: Arc<ToolService>,
}

impl AppState {
    pub fn new(agent: CityAgent, tools: ToolService) -> Self {
        Self { agent: Arc::new(agent), tools: Arc::new(tools) }
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ページルート
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        // エージェント
        .route("/ask", post(handlers::ask))
        // ツールエンドポイント
        .route("/tool/:name", post(handlers::call_tool))
        .with_state(state)
        .layer(cors)
}
