mod ask_cmd;
mod chat_cmd;
mod config;
mod status_cmd;
mod terminal_output;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use shaman_core::Mode;
use shaman_gateway::{start_server, GatewayState, Relay};
use shaman_logging::init_logger;

use ask_cmd::AskArgs;

#[derive(Parser)]
#[command(name = "shaman")]
#[command(about = "Shaman: multimodal chat relay and terminal client")]
#[command(version)]
struct Cli {
    /// Directory holding config.yaml (default: $SHAMAN_CONFIG_DIR or ~/.shaman)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay server
    Serve {
        /// Port to bind the HTTP server to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send one turn and print the rendered reply
    Ask {
        /// The prompt text
        prompt: Vec<String>,
        /// Reply mode: chat, graph or draw
        #[arg(short, long, default_value = "chat")]
        mode: Mode,
        /// Image file or data: URI to attach
        #[arg(short, long)]
        image: Option<String>,
        /// Also save the exchange as an HTML page
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Interactive conversation
    Chat {
        /// Starting mode: chat, graph or draw
        #[arg(short, long, default_value = "chat")]
        mode: Mode,
    },
    /// Check whether the relay is reachable
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = config::load(cli.config_dir.as_deref()).await?;
    let config = &loaded.prepared.config;

    init_logger(config::log_dir(config)?, &config.logging.level);
    info!(path = %loaded.path.display(), exists = loaded.path.exists(), "Loaded config");
    loaded.prepared.log_warnings();

    match cli.command {
        Commands::Serve { port } => {
            let mut relay_config = config.relay.clone();
            if let Some(port) = port {
                relay_config.port = port;
            }

            let addr: SocketAddr = format!("{}:{}", relay_config.bind_address, relay_config.port)
                .parse()
                .with_context(|| format!("Invalid bind address {}:{}", relay_config.bind_address, relay_config.port))?;
            info!(%addr, upstream = %relay_config.upstream_url, "Starting Shaman relay");

            let state = GatewayState { relay: Arc::new(Relay::new(&relay_config)) };
            start_server(addr, state, &relay_config.route).await?;
        }
        Commands::Ask { prompt, mode, image, html } => {
            let args = AskArgs { prompt: prompt.join(" "), mode, image, html };
            ask_cmd::run(config, args).await?;
        }
        Commands::Chat { mode } => {
            chat_cmd::run(config, mode).await?;
        }
        Commands::Status => {
            status_cmd::run(config).await?;
        }
    }

    Ok(())
}
