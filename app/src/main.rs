#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use sentibot_config::Config;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, HistoryStrategy, InfoStrategy, InitStrategy,
    ResetStrategy, SessionsStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "sentibot")]
#[command(about = "Sentiment-aware chat responder", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively, or send a single message
    Chat {
        /// Session to continue (a new one is created if omitted)
        #[arg(short, long)]
        session: Option<String>,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,
    },
    /// Print the transcript of a session
    History {
        #[arg(short, long)]
        session: String,
    },
    /// List sessions that have a transcript
    Sessions,
    /// Delete a session's transcript and state
    Reset {
        #[arg(short, long)]
        session: String,
    },
    /// Initialize configuration
    Init,
    /// Show configuration and database status
    Info,
    /// Show version
    Version,
}

fn init_logging() -> anyhow::Result<()> {
    let level = Config::load().map_or_else(|_| "info".to_string(), |c| c.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    match cli.command {
        Commands::Chat { session, message } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session,
                    message,
                })
                .await
        }
        Commands::History { session } => HistoryStrategy.execute(session).await,
        Commands::Sessions => SessionsStrategy.execute(()).await,
        Commands::Reset { session } => ResetStrategy.execute(session).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
