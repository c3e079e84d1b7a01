//! Offline ingestion stages that need no network: discovery, filtering and
//! deterministic chunking.

use std::fs;

use tempfile::TempDir;

use medichat::error::AppError;
use medichat::ingest::filter::filter_documents;
use medichat::ingest::loader::{load_dir, pdf_files};
use medichat::ingest::splitter::Splitter;
use medichat::ingest::{ChunkStats, Document, PageStats};

fn page(source: &str, page: u32, text: &str) -> Document {
    Document { text: text.to_string(), source: source.to_string(), page }
}

fn corpus() -> Vec<Document> {
    let para = "Diabetes mellitus is a group of metabolic disorders characterised by high blood sugar. \
                Symptoms often include frequent urination, increased thirst and increased appetite. ";
    vec![
        page("data/encyclopedia.pdf", 0, &para.repeat(12)),
        page("data/encyclopedia.pdf", 1, "   \n  "),
        page("data/encyclopedia.pdf", 2, &para.repeat(3)),
        page("data/handbook.pdf", 0, "Hypertension is persistently elevated arterial pressure."),
    ]
}

#[test]
fn chunking_is_deterministic_across_runs() {
    let run = || {
        let docs = filter_documents(corpus(), 1);
        Splitter::new(500, 20).unwrap().split(&docs)
    };
    let first = run();
    let second = run();
    assert!(!first.is_empty());
    assert_eq!(first.len(), second.len());
    assert_eq!(first, second);
}

#[test]
fn blank_pages_produce_no_chunks() {
    let docs = filter_documents(corpus(), 1);
    assert_eq!(docs.len(), 3);
    let chunks = Splitter::new(500, 20).unwrap().split(&docs);
    assert!(chunks.iter().all(|c| c.page != 1 || c.source != "data/encyclopedia.pdf"));
    assert!(chunks.iter().all(|c| c.text.chars().count() <= 500));
}

#[test]
fn stats_summarise_pages_and_chunks() {
    let docs = filter_documents(corpus(), 1);
    let pages = PageStats::of(&docs);
    assert_eq!(pages.pages, 3);
    assert!(pages.total_chars > 0);

    let chunks = Splitter::new(500, 20).unwrap().split(&docs);
    let stats = ChunkStats::of(&chunks).unwrap();
    assert_eq!(stats.chunks, chunks.len());
    assert!(stats.min_chars <= stats.max_chars);
    assert!(stats.max_chars <= 500);
}

#[test]
fn data_dir_without_pdfs_fails_load_stage() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("readme.txt"), "not a pdf").unwrap();
    assert!(pdf_files(tmp.path()).unwrap().is_empty());
    match load_dir(tmp.path()) {
        Err(AppError::Ingest { stage, .. }) => assert_eq!(stage, "load"),
        other => panic!("expected load failure, got {other:?}"),
    }
}
