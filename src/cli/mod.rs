//! Command-line interface: `serve` runs the HTTP gateway, `chat` runs a
//! one-shot turn, `config` prints the effective configuration.

use crate::agent::{Agent, TurnRequest};
use crate::config::{self, Config};
use crate::errors::DeskbotError;
use crate::gateway::{self, AppState};
use crate::memory::MemoryStore;
use crate::providers::{ChatProvider, DeepSeekProvider};
use crate::tools::{FileTools, LocalFileTools};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "deskbot", version, about = "Conversational filesystem assistant")]
struct Cli {
    /// Path to the config file (default: ~/.deskbot/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP gateway
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },
    /// Send a single query and print the reply
    Chat {
        /// The query text
        query: Vec<String>,
        /// Session ID for preview/confirm continuity
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the effective configuration
    Config,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let state = build_state(config.clone())?;
            gateway::serve(&config.gateway, state).await
        }
        Command::Chat { query, session } => {
            let query = query.join(" ");
            if query.trim().is_empty() {
                anyhow::bail!("empty query; usage: deskbot chat <text>");
            }
            let state = build_state(config)?;
            let reply = state
                .agent
                .handle_turn(TurnRequest {
                    query,
                    history: Vec::new(),
                    session_id: session,
                })
                .await;
            println!("{}", reply.reply);
            println!("({}s)", reply.duration_seconds);
            Ok(())
        }
        Command::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn build_state(config: Config) -> Result<AppState> {
    if config.provider.api_key.is_empty() {
        return Err(DeskbotError::Config(
            "No API key configured. Set provider.apiKey in ~/.deskbot/config.json \
             or export DESKBOT_API_KEY."
                .to_string(),
        )
        .into());
    }

    config.workspace.ensure_dirs()?;

    let memory = Arc::new(MemoryStore::new(config.workspace.memory_dir())?);
    let tools: Arc<dyn FileTools> = Arc::new(LocalFileTools::new(
        config.workspace.effective_search_roots(),
    ));
    let provider: Arc<dyn ChatProvider> = Arc::new(DeepSeekProvider::new(&config.provider));
    let config = Arc::new(config);
    let agent = Arc::new(Agent::new(
        config,
        provider,
        tools.clone(),
        memory.clone(),
    ));

    Ok(AppState {
        agent,
        memory,
        tools,
    })
}
