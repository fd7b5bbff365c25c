//! # ragserve
//!
//! A retrieval-augmented generation HTTP service over a local model server.
//!
//! Uploaded documents (PDF, TXT, MD) are chunked, embedded through Ollama,
//! and stored in a LanceDB collection; questions are answered from the
//! nearest chunks. A chat endpoint talks to the model directly.
//!
//! ```bash
//! # Start the server with defaults (Ollama on localhost:11434)
//! ragserve serve
//!
//! # Print a sample config file
//! ragserve config init > ~/.config/ragserve/config.toml
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ragserve::config::Config;
use ragserve::ingest::DocumentIngestor;
use ragserve::server::{self, AppState};
use ragserve_chunker::RecursiveChunker;
use ragserve_core::{Embedder, TextGenerator, VectorStore};
use ragserve_extract::ExtractorRegistry;
use ragserve_llm::OllamaClient;
use ragserve_qa::{ChatChain, QaChain, Retriever};
use ragserve_store::LanceStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ragserve")]
#[command(about = "Retrieval-augmented generation service over a local model server")]
#[command(version)]
struct Cli {
    /// Path to config file (default: ~/.config/ragserve/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Print a sample configuration file
    Init,
    /// Show the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let state = build_state(&config).await?;
            server::serve(state, &host, port).await
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show => {
                    println!("{}", toml::to_string_pretty(&config)?);
                }
                ConfigAction::Init => {
                    println!("{}", Config::sample());
                }
                ConfigAction::Path => match Config::default_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("(no config directory available)"),
                },
            }
            Ok(())
        }
    }
}

/// Construct every service and wire them into the shared state.
async fn build_state(config: &Config) -> Result<AppState> {
    let ollama = Arc::new(OllamaClient::new(
        config.ollama.base_url.clone(),
        config.ollama.model.clone(),
        config.ollama.embedding_model.clone(),
        config.store.embedding_dim,
    ));
    let embedder: Arc<dyn Embedder> = ollama.clone();
    let generator: Arc<dyn TextGenerator> = ollama;

    let store: Arc<dyn VectorStore> = Arc::new(LanceStore::new(
        config.store.path.clone(),
        config.store.collection.clone(),
        config.store.embedding_dim,
    ));
    store
        .init()
        .await
        .context("failed to initialize vector store")?;

    let ingestor = Arc::new(DocumentIngestor::new(
        config.upload.dir.clone(),
        ExtractorRegistry::with_defaults(),
        Arc::new(RecursiveChunker::new()),
        embedder.clone(),
        store.clone(),
        config.chunking.chunk_config(),
    ));

    let retriever = Retriever::new(store.clone(), embedder, config.retrieval.top_k);
    let qa_chain = Arc::new(QaChain::new(
        retriever,
        generator.clone(),
        config.ollama.generation_options(),
    ));
    let chat_chain = Arc::new(ChatChain::new(
        generator.clone(),
        config.ollama.generation_options(),
    ));

    Ok(AppState {
        ingestor,
        qa_chain,
        chat_chain,
        generator,
        store,
        collection_name: config.store.collection.clone(),
        ollama_url: config.ollama.base_url.clone(),
        model: config.ollama.model.clone(),
    })
}
