//! `medichat-index` — rebuild the Pinecone index from the PDFs in the data
//! directory.
//!
//! Stages run strictly in order; the first failure prints the stage name and
//! exits with status 1. Progress goes to stdout, logs to stderr.
//!
//! ```text
//! medichat-index          # uses config/default.toml + .env
//! MEDICHAT_DATA_DIR=~/pdfs medichat-index
//! ```

use std::process;

use medichat::error::AppError;
use medichat::ingest::filter::filter_documents;
use medichat::ingest::loader::load_dir;
use medichat::ingest::pipeline::Ingestor;
use medichat::ingest::splitter::Splitter;
use medichat::ingest::{ChunkStats, PageStats};
use medichat::logger::preview;
use medichat::{config, logger};

const RULE: &str = "==================================================";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("✗ {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level, std::env::var_os("MEDICHAT_LOG_LEVEL").is_some())?;
    let ingestor = Ingestor::new(&config)?;
    let data_dir = config.ingest.data_dir.clone();

    println!("Starting fresh PDF processing");
    println!("{RULE}");

    // 1. Load
    println!("Step 1: loading PDF files from {}", data_dir.display());
    let pages = tokio::task::spawn_blocking(move || load_dir(&data_dir))
        .await
        .map_err(|e| AppError::ingest("load", e))??;
    let page_stats = PageStats::of(&pages);
    println!("  ✓ loaded {} pages", page_stats.pages);
    println!("  total characters: {}", page_stats.total_chars);
    println!("  average characters per page: {}", page_stats.avg_chars);

    // 2. Filter
    println!("\nStep 2: filtering pages");
    let docs = filter_documents(pages, config.ingest.min_chars);
    println!("  ✓ kept {} pages", docs.len());

    // 3. Split
    println!("\nStep 3: splitting into chunks");
    let splitter = Splitter::new(config.ingest.chunk_size, config.ingest.chunk_overlap)?;
    let chunks = splitter.split(&docs);
    let chunk_stats = ChunkStats::of(&chunks)
        .ok_or_else(|| AppError::ingest("split", "no text chunks produced"))?;
    println!("  ✓ created {} chunks", chunk_stats.chunks);
    println!("  average chunk size: {:.0} characters", chunk_stats.avg_chars);
    println!("  chunk size range: {} - {} characters", chunk_stats.min_chars, chunk_stats.max_chars);

    // 4. Embed
    let embedder = ingestor.embedder();
    println!("\nStep 4: embedding with {} ({} dimensions)", embedder.model(), embedder.dimension());
    let vectors = ingestor.embed(&chunks).await?;
    println!("  ✓ embedded {} chunks", vectors.len());

    // 5. Recreate index
    let spec = ingestor.index_spec();
    println!("\nStep 5: recreating index '{}'", spec.name);
    let index = ingestor.recreate_index().await?;
    println!(
        "  ✓ index ready ({} dims, {}, {}/{})",
        spec.dimension, spec.metric, spec.cloud, spec.region
    );

    // 6. Upload
    println!("\nStep 6: uploading vectors");
    let uploaded = ingestor.upload(&index, &chunks, vectors).await?;
    println!("  ✓ uploaded {uploaded} chunks");

    // 7. Smoke test
    let query = &config.ingest.smoke_query;
    println!("\nStep 7: testing with a sample query");
    let hits = ingestor.smoke_query(&index, query, config.vectordb.top_k).await?;
    println!("  query: '{query}'");
    println!("  ✓ retrieved {} documents", hits.len());
    for (i, hit) in hits.iter().enumerate() {
        println!("  {}. [{:.3}] {}", i + 1, hit.score, preview(hit.text().unwrap_or(""), 100));
    }

    println!("\n{RULE}");
    println!("Processing complete");
    println!("{RULE}");
    println!("  pages:      {}", page_stats.pages);
    println!("  chunks:     {}", chunk_stats.chunks);
    println!("  index:      '{}' (fresh)", spec.name);
    println!("  embeddings: {}-dimensional", spec.dimension);
    Ok(())
}
