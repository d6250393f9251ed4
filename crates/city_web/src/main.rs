use city_agent::{AgentConfig, CityAgent, ToolService, ToolServiceConfig};
use city_web::{build_router, AppState};
use color_eyre::Result;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<()> {
    // エラーハンドリングの初期化
    color_eyre::install()?;

    // 環境変数のロード
    dotenvy::dotenv().ok();

    // ロギングの初期化
    city_agent::logging::init_server_tracing()?;

    tracing::info!(target: "city_web", "Starting web server...");

    let agent = CityAgent::from_config(AgentConfig::from_env()?)?;
    // translate_text はエージェントと同じモデルを使う
    let tools = ToolService::new(ToolServiceConfig::from_env()?, agent.model())?;
    let app = build_router(AppState::new(agent, tools));

    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|e| color_eyre::eyre::eyre!("PORT is not a valid port ({raw}): {e}"))?,
        Err(_) => DEFAULT_PORT,
    };

    // サーバー起動
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    let addr = listener.local_addr()?;
    tracing::info!(target: "city_web", "Server running on http://{}", addr);
    println!("Server running on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
