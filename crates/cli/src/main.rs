//! echomind CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize the config file
//! - `chat`    — Interactive chat or single-message mode
//! - `doctor`  — Check connectivity to the endpoint and the memory store
//! - `memory`  — Query or reset the long-term store

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "echomind",
    about = "echomind — a persona assistant with two-tier memory",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration file
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Override the generation endpoint host
        #[arg(long)]
        host: Option<String>,

        /// Override the generation endpoint port
        #[arg(long)]
        port: Option<u16>,

        /// Override the model
        #[arg(long)]
        model: Option<String>,

        /// Override the temperature (0.0–1.0)
        #[arg(long)]
        temp: Option<f32>,
    },

    /// Check connectivity to the endpoint and the memory store
    Doctor,

    /// Long-term memory administration
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Search the long-term store directly
    Search {
        /// The query text
        query: String,

        /// Maximum results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },

    /// Delete every memory in the assistant's namespace
    Reset {
        /// Confirm the bulk delete
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            host,
            port,
            model,
            temp,
        } => commands::chat::run(message, host, port, model, temp).await?,
        Commands::Doctor => commands::doctor::run().await?,
        Commands::Memory { action } => match action {
            MemoryAction::Search { query, limit } => {
                commands::memory::search(&query, limit).await?
            }
            MemoryAction::Reset { yes } => commands::memory::reset(yes).await?,
        },
    }

    Ok(())
}
