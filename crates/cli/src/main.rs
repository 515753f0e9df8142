//! Stepwright CLI — the main entry point.
//!
//! Commands:
//! - `run`      — Execute a goal through the agent loop
//! - `sessions` — List persisted sessions

use clap::{Parser, Subcommand};

mod commands;
mod presets;

#[derive(Parser)]
#[command(
    name = "stepwright",
    about = "Stepwright — a bounded think/act agent execution engine",
    version,
    author
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
    /// Execute a goal through the agent loop
    Run {
        /// The goal to accomplish
        goal: String,

        /// Session id for persistent conversation memory
        #[arg(short, long)]
        session: Option<String>,

        /// Stream progress events instead of blocking until completion
        #[arg(long)]
        stream: bool,

        /// Use the financial-assistant preset (6-step budget)
        #[arg(long)]
        financial: bool,
    },

    /// List persisted sessions
    Sessions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
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
        Commands::Run {
            goal,
            session,
            stream,
            financial,
        } => commands::run::run(&goal, session, stream, financial).await?,
        Commands::Sessions => commands::sessions::run()?,
    }

    Ok(())
}
