use std::collections::HashSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use semindex::chunker::Chunk;
use semindex::config::{ChunkingConfig, EmbeddingConfig, SectionVocabulary};
use semindex::embedder::{Embedder, HttpEmbedder};
use semindex::error::{IndexError, IndexResult};
use semindex::index::FlatIpIndex;
use semindex::pipeline::Pipeline;
use semindex::report::BuildReport;
use semindex::store;
use semindex::SectionChunker;

const DEFAULT_EMBED_URL: &str = "http://127.0.0.1:8080/v1/embeddings";

#[derive(Parser)]
#[command(
    name = "semindex",
    about = "Build and query a semantic search index over a PDF corpus"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, chunk, embed, and index a directory of PDFs
    Build(BuildArgs),
    /// Query an existing index
    Query(QueryArgs),
}

#[derive(clap::Args)]
struct BuildArgs {
    /// Directory containing PDF files
    #[arg(long)]
    corpus: PathBuf,
    /// Directory to write index artifacts
    #[arg(long)]
    output: PathBuf,
    /// Target chunk size in tokens
    #[arg(long, default_value_t = 800)]
    chunk_target: usize,
    /// Overlap between chunks in tokens
    #[arg(long, default_value_t = 100)]
    chunk_overlap: usize,
    /// Minimum chunk size in tokens
    #[arg(long, default_value_t = 200)]
    chunk_min: usize,
    /// File listing PDF filenames to skip (one per line)
    #[arg(long)]
    skip_list: Option<PathBuf>,
    /// OpenAI-compatible embeddings endpoint
    #[arg(long, default_value = DEFAULT_EMBED_URL)]
    embed_url: String,
    /// Embedding model identifier
    #[arg(long, default_value = "intfloat/e5-large-v2")]
    model: String,
}

#[derive(clap::Args)]
struct QueryArgs {
    /// Path to the vectors.json index file
    #[arg(long)]
    index: PathBuf,
    /// Path to the chunks.jsonl file
    #[arg(long)]
    chunks: PathBuf,
    /// Search query (omit for interactive mode)
    #[arg(long, short)]
    query: Option<String>,
    /// Number of results
    #[arg(long, short = 'k', default_value_t = 5)]
    top_k: usize,
    /// Output results as JSON
    #[arg(long)]
    json: bool,
    /// OpenAI-compatible embeddings endpoint
    #[arg(long, default_value = DEFAULT_EMBED_URL)]
    embed_url: String,
    /// Embedding model identifier
    #[arg(long, default_value = "intfloat/e5-large-v2")]
    model: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Query(args) => run_query(args),
    };
    if let Err(e) = result {
        eprintln!("ERROR: {e}");
        process::exit(1);
    }
}

fn run_build(args: BuildArgs) -> IndexResult<()> {
    let skip = match &args.skip_list {
        Some(path) => {
            let skip = store::load_skip_list(path)?;
            if !skip.is_empty() {
                println!("Skip list: {} files", skip.len());
            }
            skip
        }
        None => HashSet::new(),
    };

    let chunking = ChunkingConfig {
        target_tokens: args.chunk_target,
        overlap_tokens: args.chunk_overlap,
        min_tokens: args.chunk_min,
    };
    let embedding = EmbeddingConfig {
        model: args.model.clone(),
        ..EmbeddingConfig::default()
    };

    println!("{}", "=".repeat(60));
    println!("Semantic Index Builder");
    println!("  PDF directory : {}", args.corpus.display());
    println!("  Output        : {}", args.output.display());
    println!("  Chunk target  : {} tokens", chunking.target_tokens);
    println!("  Chunk overlap : {} tokens", chunking.overlap_tokens);
    println!("  Chunk minimum : {} tokens", chunking.min_tokens);
    println!("{}", "=".repeat(60));

    println!("\n[1/4] Extracting and chunking PDFs ...");
    let chunker = SectionChunker::new(SectionVocabulary::academic(), chunking);
    let pipeline = Pipeline::new(chunker);
    let output = pipeline.run(&args.corpus, &skip)?;
    println!(
        "  {} chunks from {} documents",
        output.chunks.len(),
        output.stats.processed
    );

    if output.chunks.is_empty() {
        return Err(IndexError::EmptyCorpus);
    }

    fs::create_dir_all(&args.output)?;
    store::write_jsonl(&args.output.join(store::CHUNKS_FILE), &output.chunks)?;
    store::write_jsonl(&args.output.join(store::METADATA_FILE), &output.documents)?;

    println!("\n[2/4] Generating embeddings ...");
    let embedder = HttpEmbedder::new(&args.embed_url, embedding.clone())?;
    let texts: Vec<String> = output.chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_passages(&texts)?;

    println!("\n[3/4] Building index ...");
    let index = FlatIpIndex::build(embedding.dim, vectors)?;
    println!("  index: {} vectors", index.total_count());

    println!("\n[4/4] Saving outputs ...");
    index.save(&args.output.join(store::VECTORS_FILE))?;
    let report = BuildReport::generate(
        &chunking,
        &embedding,
        &output.stats,
        output.chunks.len(),
        index.total_count(),
    );
    store::write_report(&args.output.join(store::REPORT_FILE), &report)?;

    let aligned = report.integrity.alignment_verified;
    println!("\n{}", "=".repeat(60));
    if aligned {
        println!("BUILD COMPLETE");
    } else {
        println!("BUILD COMPLETE (alignment warning)");
    }
    println!("  Chunks  : {}", report.stats.chunk_count);
    println!("  Vectors : {}", report.stats.vector_count);
    println!("  Aligned : {aligned}");
    println!("{}", "=".repeat(60));
    Ok(())
}

#[derive(Debug, Serialize)]
struct SearchResult {
    rank: usize,
    score: f64,
    doc_id: String,
    title: String,
    year: Option<u16>,
    section: String,
    snippet: String,
}

fn run_query(args: QueryArgs) -> IndexResult<()> {
    let index = FlatIpIndex::load(&args.index)?;
    let chunks = store::read_chunks(&args.chunks)?;
    if index.total_count() != chunks.len() {
        eprintln!(
            "WARNING: index has {} vectors but chunk store has {} entries",
            index.total_count(),
            chunks.len()
        );
    }

    let embedder = HttpEmbedder::new(
        &args.embed_url,
        EmbeddingConfig {
            model: args.model.clone(),
            dim: index.dim(),
            ..EmbeddingConfig::default()
        },
    )?;

    if let Some(query) = &args.query {
        let results = search(query, &index, &chunks, &embedder, args.top_k)?;
        print_results(query, &results, args.json)?;
        return Ok(());
    }

    // Interactive mode: one query per line until EOF.
    println!("\nSemantic Search  ({} chunks indexed)", chunks.len());
    println!("Enter queries below. Ctrl+D to exit.\n");
    let stdin = io::stdin();
    loop {
        print!("Query: ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!("\nExiting.");
            break;
        }
        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        let results = search(query, &index, &chunks, &embedder, args.top_k)?;
        print_results(query, &results, args.json)?;
    }
    Ok(())
}

fn search(
    query: &str,
    index: &FlatIpIndex,
    chunks: &[Chunk],
    embedder: &dyn Embedder,
    top_k: usize,
) -> IndexResult<Vec<SearchResult>> {
    let query_vec = embedder.embed_query(query)?;
    let hits = index.search(&query_vec, top_k)?;

    let results = hits
        .into_iter()
        .filter_map(|(pos, score)| chunks.get(pos).map(|chunk| (chunk, score)))
        .enumerate()
        .map(|(i, (chunk, score))| SearchResult {
            rank: i + 1,
            score: (score as f64 * 10000.0).round() / 10000.0,
            doc_id: chunk.doc_id.clone(),
            title: chunk.title.clone(),
            year: chunk.year,
            section: chunk.section.clone(),
            snippet: snippet(&chunk.text, 300),
        })
        .collect();
    Ok(results)
}

fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head} ...")
    } else {
        text.to_string()
    }
}

fn print_results(query: &str, results: &[SearchResult], as_json: bool) -> IndexResult<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }

    println!("\nQuery: {query}");
    println!("Results: {}", results.len());
    for r in results {
        println!("\n{}", "=".repeat(60));
        println!("[{}]  Score: {}", r.rank, r.score);
        println!("  Document : {}", r.doc_id);
        if !r.title.is_empty() {
            println!("  Title    : {}", r.title);
        }
        if let Some(year) = r.year {
            println!("  Year     : {year}");
        }
        if !r.section.is_empty() {
            println!("  Section  : {}", r.section);
        }
        println!("\n  {}", r.snippet);
    }
    println!();
    Ok(())
}
