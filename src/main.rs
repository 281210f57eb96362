//! # DocSage — Document Q&A from the command line
//!
//! Usage:
//!   docsage ask report.pdf.json "What is the deadline?"
//!   docsage index notes.txt
//!   docsage memory search "deadline"
//!   docsage memory compact

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docsage_agent::DocSage;
use docsage_core::config::DocSageConfig;
use docsage_core::types::{DocumentInput, DocumentMetadata};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docsage", version, about = "Document Q&A with citations and memory")]
struct Cli {
    /// Path to a config file (default: ~/.docsage/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Index a document and answer a question about it
    Ask {
        /// Document file: plain text, or reader JSON output
        file: PathBuf,
        /// The question to answer
        question: String,
    },
    /// Index a document and report its passage count
    Index {
        /// Document file: plain text, or reader JSON output
        file: PathBuf,
    },
    /// Persisted insight memory
    Memory {
        #[command(subcommand)]
        command: MemoryCommand,
    },
}

#[derive(Subcommand)]
enum MemoryCommand {
    /// Search stored insights
    Search {
        query: String,
        /// Maximum number of hits
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },
    /// List documents with stored insights
    List,
    /// Remove insight records past the retention window
    Compact,
}

/// Load a document: reader JSON output when the file ends in `.json`,
/// otherwise plain text with minimal metadata.
fn load_document(path: &Path) -> Result<DocumentInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    if path.extension().is_some_and(|e| e == "json") {
        let input: DocumentInput = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse reader output {}", path.display()))?;
        return Ok(input);
    }

    Ok(DocumentInput {
        text: content,
        metadata: DocumentMetadata {
            source: path.to_string_lossy().into_owned(),
            source_type: "text".to_string(),
            ..Default::default()
        },
        chunks: None,
    })
}

fn print_answer(answer: &docsage_core::types::Answer) {
    println!("{}", answer.text);
    println!();
    println!(
        "confidence: {:.2}  supporting passages: {}",
        answer.confidence, answer.supporting_passages
    );
    for citation in &answer.citations {
        println!("  [page {}] {}", citation.page, citation.excerpt);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "docsage=debug" } else { "docsage=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = match &cli.config {
        Some(path) => DocSageConfig::load_from(path)?,
        None => DocSageConfig::load()?,
    };
    let mut engine = DocSage::new(config)?;

    match cli.command {
        Command::Ask { file, question } => {
            let input = load_document(&file)?;
            engine.add_document(input).await?;
            let answer = engine.answer(&question).await;
            print_answer(&answer);
        }
        Command::Index { file } => {
            let input = load_document(&file)?;
            let source = input.metadata.source.clone();
            let id = engine.add_document(input).await?;
            if engine.is_ready(&id) {
                println!("indexed {source} as {id}");
            } else {
                println!("registered {source} as {id}, but the index could not be built");
            }
        }
        Command::Memory { command } => match command {
            MemoryCommand::Search { query, limit } => {
                let hits = engine.search_memory(&query, limit).await?;
                if hits.is_empty() {
                    println!("no stored insights match '{query}'");
                }
                for hit in hits {
                    println!("{} (relevance {})", hit.document_id, hit.relevance);
                    println!("  {}", hit.insights);
                }
            }
            MemoryCommand::List => {
                let ids = engine.remembered_documents().await?;
                if ids.is_empty() {
                    println!("no documents in memory");
                }
                for id in ids {
                    println!("{id}");
                }
            }
            MemoryCommand::Compact => {
                let removed = engine.compact_memory().await?;
                println!("removed {removed} stale insight record(s)");
            }
        },
    }

    Ok(())
}
