// 同階層のファイルをモジュールとしてインポート
pub mod agent;
pub mod config;
pub mod logging;
pub mod tools; // Tool implementations served at /tool/<name>

pub use agent::CityAgent;
pub use config::{AgentConfig, ToolServiceConfig};
pub use tools::ToolService;

// Ensure .env is loaded for tests before anything else runs in the test process.
#[cfg(test)]
#[ctor::ctor]
fn load_dotenv_for_tests() {
    let _ = dotenvy::dotenv();
}
