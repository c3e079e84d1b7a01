//! Offline PDF ingestion: load → filter → split → embed → recreate index →
//! upsert → smoke query.
//!
//! Every run wipes and rebuilds the whole index. The `medichat-index` binary
//! drives the stages one by one through [`pipeline::Ingestor`] and prints
//! progress between them.

pub mod filter;
pub mod loader;
pub mod pipeline;
pub mod splitter;

/// One PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub text: String,
    /// Path of the PDF the page came from.
    pub source: String,
    /// Zero-based page index within `source`.
    pub page: u32,
}

/// One piece of a [`Document`], ready to embed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Stable across runs for the same input and splitter settings.
    pub id: String,
    pub text: String,
    pub source: String,
    pub page: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStats {
    pub pages: usize,
    pub total_chars: usize,
    pub avg_chars: usize,
}

impl PageStats {
    pub fn of(docs: &[Document]) -> Self {
        let total_chars: usize = docs.iter().map(|d| d.text.chars().count()).sum();
        let avg_chars = if docs.is_empty() { 0 } else { total_chars / docs.len() };
        Self { pages: docs.len(), total_chars, avg_chars }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkStats {
    pub chunks: usize,
    pub avg_chars: f64,
    pub min_chars: usize,
    pub max_chars: usize,
}

impl ChunkStats {
    /// `None` for an empty chunk set.
    pub fn of(chunks: &[Chunk]) -> Option<Self> {
        let sizes: Vec<usize> = chunks.iter().map(|c| c.text.chars().count()).collect();
        let min_chars = *sizes.iter().min()?;
        let max_chars = *sizes.iter().max()?;
        let avg_chars = sizes.iter().sum::<usize>() as f64 / sizes.len() as f64;
        Some(Self { chunks: sizes.len(), avg_chars, min_chars, max_chars })
    }
}
