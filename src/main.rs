use std::io::{self, BufRead, Write};

use city_agent::agent::AgentEvent;
use city_agent::{AgentConfig, CityAgent};
use color_eyre::Result;

const PROMPT: &str = "You: ";

fn main() -> Result<()> {
    color_eyre::install()?;

    // Load .env (optional). GEMINI_API_KEY and MCP_SERVER_URL can live there.
    let _ = dotenvy::dotenv();

    // ログ: 標準出力は回答表示に使うのでファイルへのみ出力
    let _guard = city_agent::logging::init_cli_tracing()?;

    let config = AgentConfig::from_env()?;
    let agent = CityAgent::from_config(config)?;
    tracing::info!(target: "agent", "cli_started");

    println!("Smart City Agent. Ask about places, weather or translations (quit/exit to leave).");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let Some(line) = lines.next() else { break }; // EOF
        let question = line?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question.to_lowercase().as_str(), "quit" | "exit") {
            break;
        }

        let answer = agent.answer_blocking(question, |ev| {
            if let AgentEvent::ToolStarted { name, arguments } = ev {
                println!("  -> calling {name} {}", serde_json::Value::Object(arguments.clone()));
            }
        })?;
        println!("\n{answer}\n");
    }

    tracing::info!(target: "agent", "cli_finished");
    Ok(())
}
