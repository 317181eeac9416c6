use std::{io::Write as _, path::PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use sweepsage::{Config, SweepSage, config::DEFAULT_CONFIG_PATH, logging};
use tokio_stream::StreamExt as _;

#[derive(Parser)]
#[command(
    name = "sweepsage",
    about = "Support agent for robot vacuums, answering from an ingested knowledge base",
    version
)]
struct Cli {
    /// Path to the configuration file
    #[arg(long, global = true, env = "SWEEPSAGE_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest new or changed files from the data directory
    Ingest,
    /// Answer a question from the knowledge base
    Ask {
        /// The question
        query: String,
    },
    /// Run the support agent and stream the conversation
    Chat {
        /// The user's message
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config)?;
    let _guard = logging::init(&config)?;
    tracing::info!(config = %cli.config.display(), root = %config.root().display(), "Starting sweepsage");

    let app = SweepSage::from_config(config)?;

    match cli.command {
        Commands::Ingest => {
            let summary = app.ingestion_pipeline()?.run().await?;
            println!("{summary}");
        }
        Commands::Ask { query } => {
            let answer = app.rag_service()?.summarize(&query).await?;
            println!("{answer}");
        }
        Commands::Chat { query } => {
            let agent = app.agent()?;
            let mut stream = std::pin::pin!(agent.execute_stream(&query));
            let mut stdout = std::io::stdout();
            while let Some(line) = stream.next().await {
                write!(stdout, "{}", line?)?;
                stdout.flush()?;
            }
        }
    }

    Ok(())
}
