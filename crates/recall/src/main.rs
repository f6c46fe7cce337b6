// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recall - a browsing-history memory engine.
//!
//! This is the binary entry point: it loads configuration, opens the
//! store, and dispatches to the subcommands.

use std::sync::Arc;

use clap::{Parser, Subcommand};
use recall_config::RecallConfig;
use recall_core::traits::AiProvider;
use recall_core::RecallError;
use recall_openai::OpenAiClient;
use recall_search::SearchService;
use recall_storage::Database;

mod ingest;
mod save;
mod serve;

/// Recall - a browsing-history memory engine.
#[derive(Parser, Debug)]
#[command(name = "recall", version, about, long_about = None)]
struct Cli {
    /// Profile the command operates on.
    #[arg(long, global = true, default_value = "local")]
    user: String,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the capture-agent bridge server.
    Serve,
    /// Ingest browsing history from a JSON export file.
    Ingest {
        /// Path to a JSON array of history entries.
        file: std::path::PathBuf,
    },
    /// Fetch one URL and save it as a memory.
    Save {
        /// Page to fetch and remember.
        url: String,
    },
    /// Search saved memories.
    Search {
        /// Free-text query.
        query: String,
    },
    /// Show the most recent searches.
    Recent,
    /// Show memory and search-cache statistics.
    Stats,
    /// Forget a memory by id.
    Delete {
        /// Memory id, as shown in search results.
        id: i64,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match recall_config::load_and_validate() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("recall: {e}");
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);

    if let Err(e) = run(cli, config).await {
        eprintln!("recall: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Arc<RecallConfig>) -> Result<(), RecallError> {
    let db = Database::open(&config.storage).await?;

    match cli.command {
        Commands::Serve => {
            let provider = openai_provider(&config)?;
            serve::run_serve(db, provider, config).await
        }
        Commands::Ingest { file } => {
            let provider = openai_provider(&config)?;
            ingest::run_ingest(db, provider, config, &cli.user, &file).await
        }
        Commands::Save { url } => {
            let provider = openai_provider(&config)?;
            save::run_save(db, provider, config, &cli.user, &url).await
        }
        Commands::Search { query } => {
            let provider = openai_provider(&config)?;
            let service = SearchService::new(db, config);
            let response = service
                .semantic_search(provider.as_ref(), &cli.user, &query)
                .await?;
            if response.results.is_empty() {
                println!("No memories matched \"{}\".", response.query);
                return Ok(());
            }
            for result in &response.results {
                println!(
                    "[{}] {:.3}  {}\n      {}\n      {}",
                    result.id, result.final_score, result.title, result.url, result.summary
                );
            }
            Ok(())
        }
        Commands::Recent => {
            let service = SearchService::new(db, config);
            for search in service.recent_searches(&cli.user).await? {
                println!("{}  {}", search.date, search.query);
            }
            Ok(())
        }
        Commands::Stats => {
            let service = SearchService::new(db, config);
            let stats = service.stats(&cli.user).await?;
            println!("memories:        {}", stats.total_memories);
            println!("cached searches: {}", stats.total_cached_searches);
            println!(
                "last memory at:  {}",
                stats.last_memory_at.as_deref().unwrap_or("never")
            );
            Ok(())
        }
        Commands::Delete { id } => {
            let service = SearchService::new(db, config);
            service.delete_memory(id).await?;
            println!("Deleted memory {id}.");
            Ok(())
        }
    }
}

fn openai_provider(config: &RecallConfig) -> Result<Arc<dyn AiProvider>, RecallError> {
    Ok(Arc::new(OpenAiClient::new(&config.openai)?))
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("recall={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
