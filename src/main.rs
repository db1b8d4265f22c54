//! docsift command-line entry point.

use anyhow::Context;
use clap::{Parser, Subcommand};
use docsift::{
    assemble_and_import, import_spec, split_dump, ChunkArgs, CrawlArgs, Crawler, HttpRenderer,
    JsonlSink,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "docsift", about = "Ingest documentation into a vector-ready document stream")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a documentation site from its sitemap
    Crawl {
        #[command(flatten)]
        crawl: CrawlArgs,

        #[command(flatten)]
        chunking: ChunkArgs,

        /// Output JSONL file for assembled documents
        #[arg(long, env = "DOCSIFT_OUTPUT", default_value = "documents.jsonl")]
        output: PathBuf,
    },
    /// Split a pre-formatted documentation dump into documents
    Dump {
        /// Path to the dump file
        #[arg(long)]
        input: PathBuf,

        /// Base URL for derived page URLs
        #[arg(long, env = "DOCSIFT_BASE_URL")]
        base_url: String,

        #[command(flatten)]
        chunking: ChunkArgs,

        /// Output JSONL file for assembled documents
        #[arg(long, env = "DOCSIFT_OUTPUT", default_value = "documents.jsonl")]
        output: PathBuf,
    },
    /// Import an OpenAPI specification as documentation pages
    Spec {
        /// Path to the OpenAPI JSON file
        #[arg(long)]
        input: PathBuf,

        /// Base URL for generated fragment URLs
        #[arg(long, env = "DOCSIFT_BASE_URL")]
        base_url: String,

        #[command(flatten)]
        chunking: ChunkArgs,

        /// Output JSONL file for assembled documents
        #[arg(long, env = "DOCSIFT_OUTPUT", default_value = "documents.jsonl")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Crawl {
            crawl,
            chunking,
            output,
        } => {
            let config = crawl.build_config();
            let renderer =
                HttpRenderer::new(config.timeout()).context("failed to build HTTP client")?;
            let crawler = Crawler::new(config, renderer);
            let pages = crawler.crawl().await.context("crawl failed")?;
            info!(pages = pages.len(), "crawl finished");

            let sink = JsonlSink::new(output);
            assemble_and_import(&pages, &chunking.build_config(), &sink).await?;
        }
        Command::Dump {
            input,
            base_url,
            chunking,
            output,
        } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("failed to read {}", input.display()))?;
            let pages = split_dump(&raw, &base_url);
            info!(pages = pages.len(), "dump split");

            let sink = JsonlSink::new(output);
            assemble_and_import(&pages, &chunking.build_config(), &sink).await?;
        }
        Command::Spec {
            input,
            base_url,
            chunking,
            output,
        } => {
            let raw = tokio::fs::read_to_string(&input)
                .await
                .with_context(|| format!("failed to read {}", input.display()))?;
            let pages = import_spec(&raw, &base_url).context("failed to import specification")?;
            info!(pages = pages.len(), "specification imported");

            let sink = JsonlSink::new(output);
            assemble_and_import(&pages, &chunking.build_config(), &sink).await?;
        }
    }
    Ok(())
}
