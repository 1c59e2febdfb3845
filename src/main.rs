//! quizdoc-chunker - chunk a normalized text document from the command line.
//!
//! ```bash
//! quizdoc-chunker notes.txt
//! quizdoc-chunker notes.txt --max-tokens 2000 --overlap-tokens 100 --json
//! quizdoc-chunker notes.txt --config chunking.json -v
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use quizdoc_chunker::{
    ChunkingOutcome, DocumentChunker, HeuristicEstimator, Settings, TokenEstimator,
};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Split a document into overlapping, token-budgeted chunks.
#[derive(Parser)]
#[command(name = "quizdoc-chunker", version, about)]
struct Cli {
    /// UTF-8 text file to chunk
    file: PathBuf,

    /// JSON settings file (`chunking` and `estimator` sections)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Document id stamped on every chunk (default: content hash)
    #[arg(long)]
    document_id: Option<String>,

    /// Override the single-chunk token budget
    #[arg(long)]
    max_tokens: Option<usize>,

    /// Override the overlap between neighbouring chunks
    #[arg(long)]
    overlap_tokens: Option<usize>,

    /// Use smaller windows for extra headroom
    #[arg(long)]
    aggressive: bool,

    /// Return partial results instead of falling back to fixed-size slicing
    #[arg(long)]
    no_emergency: bool,

    /// Print the full outcome as JSON
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut settings = match &cli.config {
        Some(path) => Settings::from_json_file(path)?,
        None => Settings::default(),
    };
    if let Some(max_tokens) = cli.max_tokens {
        settings.chunking.max_single_chunk_tokens = max_tokens;
    }
    if let Some(overlap_tokens) = cli.overlap_tokens {
        settings.chunking.overlap_tokens = overlap_tokens;
    }
    settings.chunking.aggressive_chunking |= cli.aggressive;
    if cli.no_emergency {
        settings.chunking.enable_emergency_chunking = false;
    }
    settings.chunking.validate()?;

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("Failed to read {}", cli.file.display()))?;
    let document_id = cli
        .document_id
        .clone()
        .unwrap_or_else(|| content_id(&text));

    let estimator: Arc<dyn TokenEstimator> = Arc::new(HeuristicEstimator::new(settings.estimator));
    let chunker = DocumentChunker::new(settings.chunking, estimator.clone());

    let start_time = Instant::now();
    let outcome = chunker.chunk_with_outcome(&text, &document_id);
    let elapsed = start_time.elapsed();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_summary(&cli, &document_id, &text, &outcome, estimator.as_ref());
        println!("Elapsed:              {:.3}s", elapsed.as_secs_f64());
    }

    Ok(())
}

/// Short, stable id derived from the document content
fn content_id(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    hex::encode(&digest[..6])
}

fn print_summary(
    cli: &Cli,
    document_id: &str,
    text: &str,
    outcome: &ChunkingOutcome,
    estimator: &dyn TokenEstimator,
) {
    println!("=== {} ({}) ===\n", cli.file.display(), document_id);
    println!("Input:                {} bytes, ~{} tokens", text.len(), estimator.estimate_tokens(text));
    println!("Working text:         {} bytes", outcome.working_len);
    for section in &outcome.removed_sections {
        println!(
            "Removed:              {} [{}..{}]",
            section.heading, section.start, section.end
        );
    }
    println!("Status:               {:?}", outcome.status);
    println!("Chunks:               {}", outcome.chunks.len());
    println!("Skipped (dense):      {}", outcome.skipped_chunks);

    if !outcome.chunks.is_empty() {
        let total_tokens: usize = outcome.chunks.iter().map(|c| c.metadata.token_count).sum();
        println!(
            "Avg tokens per chunk: {:.1}",
            total_tokens as f64 / outcome.chunks.len() as f64
        );
    }

    println!();
    for chunk in &outcome.chunks {
        println!(
            "  #{:<4} [{:>8}..{:<8}] {:>6} tok  {:<12} {}{}",
            chunk.chunk_index,
            chunk.start_offset,
            chunk.end_offset,
            chunk.metadata.token_count,
            format!("{:?}", chunk.metadata.boundary),
            chunk.metadata.title,
            if chunk.metadata.ends_cleanly { "" } else { "  (cut mid-sentence)" }
        );
    }
    println!();
}
