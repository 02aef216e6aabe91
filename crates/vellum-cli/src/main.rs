//! CLI entry point for the Vellum ingester.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vellum_core::{ingest, scan_documents, status, Config, EmbedClient, IndexClient};

#[derive(Parser)]
#[command(name = "vellum")]
#[command(about = "Vellum: PDF ingestion into a managed vector index")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Show backend status (for dev).
    Status,
    /// Load PDFs, chunk, embed, and upsert into the configured index.
    Ingest {
        /// Directory containing the source PDFs.
        #[arg(value_name = "PATH", default_value = "data")]
        path: PathBuf,
        /// Maximum characters per chunk.
        #[arg(long)]
        max_chars: Option<usize>,
        /// Characters of overlap between consecutive chunks.
        #[arg(long)]
        overlap: Option<usize>,
    },
    /// Scan a directory for PDFs and list what would be ingested.
    Scan {
        /// Root directory to scan.
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
    /// Show vector count and dimension of the configured index.
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Status) {
        Commands::Status => {
            println!("Vellum backend");
            println!("  core: {}", status());
        }
        Commands::Ingest {
            path,
            max_chars,
            overlap,
        } => {
            let config = Config::from_env()?;
            let embedder =
                EmbedClient::from_url(&config.ollama_url)?.with_embed_model(config.embed_model.clone());
            let index = IndexClient::new(&config.index_host, &config.api_key, &config.namespace);
            let report = ingest(&path, &embedder, &index, max_chars, overlap).await?;
            println!(
                "Ingested {} document(s): {} chunk(s), {} vector(s) upserted.",
                report.documents, report.chunks, report.upserted
            );
        }
        Commands::Scan { path } => {
            let docs = scan_documents(&path)?;
            println!("Scanned {} document(s) under {}", docs.len(), path.display());
            for d in docs {
                let p = d.text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
                let preview = if p.chars().count() > 60 {
                    format!("{}...", p.chars().take(60).collect::<String>())
                } else {
                    p.to_string()
                };
                println!("  {}  {}", d.path.display(), preview);
            }
        }
        Commands::Stats => {
            let config = Config::from_env()?;
            let index = IndexClient::new(&config.index_host, &config.api_key, &config.namespace);
            let stats = index.stats().await?;
            println!("Index at {}", config.index_host);
            match stats.dimension {
                Some(d) => println!("  dimension: {}", d),
                None => println!("  dimension: unknown"),
            }
            println!("  vectors:   {}", stats.total_vector_count);
        }
    }

    Ok(())
}
