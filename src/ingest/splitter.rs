//! Fixed-size overlapping chunking with `text-splitter`.
//!
//! Chunk ids are `sha256(source \0 page \0 byte offset)`, so re-running the
//! same inputs with the same settings yields identical ids and counts.

use sha2::{Digest, Sha256};
use text_splitter::{ChunkConfig, TextSplitter};

use crate::error::AppError;

use super::{Chunk, Document};

pub struct Splitter {
    inner: TextSplitter<text_splitter::Characters>,
}

impl Splitter {
    /// `chunk_size` and `overlap` are in characters; overlap must be smaller.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self, AppError> {
        if chunk_size == 0 {
            return Err(AppError::ingest("split", "chunk_size must be > 0"));
        }
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(overlap)
            .map_err(|e| AppError::ingest("split", e))?;
        Ok(Self { inner: TextSplitter::new(config) })
    }

    pub fn split(&self, docs: &[Document]) -> Vec<Chunk> {
        docs.iter().flat_map(|doc| self.split_one(doc)).collect()
    }

    fn split_one<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = Chunk> + 'a {
        self.inner
            .chunk_indices(&doc.text)
            .filter(|(_, t)| !t.trim().is_empty())
            .map(|(offset, text)| Chunk {
                id: chunk_id(&doc.source, doc.page, offset),
                text: text.to_string(),
                source: doc.source.clone(),
                page: doc.page,
            })
    }
}

fn chunk_id(source: &str, page: u32, offset: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update([0]);
    hasher.update(page.to_le_bytes());
    hasher.update([0]);
    hasher.update((offset as u64).to_le_bytes());
    hex::encode(hasher.finalize())
}
