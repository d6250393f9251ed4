//! tracing の初期化
//!
//! CLI は標準出力を回答表示に使うので、ログはファイルへのみ出力する。
//! Web サーバは標準出力へ出す。

use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_DIR: &str = "logs";
pub const CLI_LOG_FILE: &str = "city_agent.log";
pub const SERVER_DEFAULT_FILTER: &str = "info,city_web=debug";

fn env_filter(default: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => Ok(EnvFilter::try_new(default)?),
    }
}

/// Daily rolling file under `logs/`. Keep the returned guard alive until exit
/// or buffered lines are lost.
pub fn init_cli_tracing() -> Result<WorkerGuard> {
    let file_appender = rolling::daily(LOG_DIR, CLI_LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false) // ファイルにANSIカラー不要
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter("info")?)
        .with(file_layer)
        .try_init()?;
    Ok(guard)
}

pub fn init_server_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(SERVER_DEFAULT_FILTER)?)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!(e))?;
    Ok(())
}
