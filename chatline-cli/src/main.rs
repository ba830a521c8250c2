//! Chatline CLI
//!
//! Command-line interface for Chatline - two-party chat over WebSocket.

mod commands;
mod config;
mod display;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use tracing_subscriber::EnvFilter;

use chatline_core::ClientConfig;
use config::CliConfig;

#[derive(Parser)]
#[command(name = "chatline")]
#[command(version, about = "Two-party chat over WebSocket")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Data directory (default: platform data dir / chatline)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// REST API base URL
    #[arg(long, global = true, env = "CHATLINE_API_URL")]
    api_url: Option<String>,

    /// WebSocket URL
    #[arg(long, global = true, env = "CHATLINE_WS_URL")]
    ws_url: Option<String>,

    /// Heartbeat interval in milliseconds
    #[arg(long, global = true, env = "CHATLINE_HEARTBEAT_INTERVAL_MS")]
    heartbeat_interval_ms: Option<u64>,

    /// Heartbeat timeout in milliseconds
    #[arg(long, global = true, env = "CHATLINE_HEARTBEAT_TIMEOUT_MS")]
    heartbeat_timeout_ms: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and save the session
    Login {
        /// Your user id
        user: String,

        /// Password (prompted when omitted)
        #[arg(long, env = "CHATLINE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// List conversations, newest first
    Conversations,

    /// Print message history with a user
    History {
        /// Peer user id
        peer: String,

        /// Only messages before this instant (epoch milliseconds)
        #[arg(long)]
        before: Option<i64>,
    },

    /// Chat live with a user
    Chat {
        /// Peer user id
        peer: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl Cli {
    /// Builds the client config: defaults, then flags and environment.
    fn client_config(&self) -> ClientConfig {
        let mut client = ClientConfig::default();
        if let Some(url) = &self.api_url {
            client.api_base_url = url.clone();
        }
        if let Some(url) = &self.ws_url {
            client.ws_url = url.clone();
        }
        if let Some(ms) = self.heartbeat_interval_ms.filter(|ms| *ms > 0) {
            client.heartbeat.interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.heartbeat_timeout_ms.filter(|ms| *ms > 0) {
            client.heartbeat.timeout = Duration::from_millis(ms);
        }
        client
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("CHATLINE_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatline")
    });

    let config = CliConfig {
        data_dir,
        client: cli.client_config(),
    };

    let result = match cli.command {
        Commands::Login { user, password } => commands::login::run(&user, password, &config).await,
        Commands::Logout => commands::login::logout(&config),
        Commands::Conversations => commands::conversations::list(&config).await,
        Commands::History { peer, before } => {
            commands::history::show(&peer, before, &config).await
        }
        Commands::Chat { peer } => commands::chat::run(&peer, &config).await,
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "chatline", &mut io::stdout());
            Ok(())
        }
    };

    if let Err(err) = &result {
        display::error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}
