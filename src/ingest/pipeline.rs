//! Remote stages of ingestion: embed, recreate index, upload, smoke query.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::error::AppError;
use crate::vectordb::pinecone::{PineconeClient, PineconeIndex};
use crate::vectordb::{ChunkMetadata, IndexSpec, QueryMatch, VectorRecord};

use super::Chunk;

/// Long-lived clients for one ingestion run.
pub struct Ingestor {
    embedder: EmbeddingProvider,
    pinecone: PineconeClient,
    spec: IndexSpec,
    embed_batch_size: usize,
    upsert_batch_size: usize,
    poll_interval: Duration,
    ready_timeout: Duration,
}

impl Ingestor {
    /// Needs `PINECONE_API_KEY`; ingestion has no retrieval-less mode.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let api_key = config
            .secrets
            .vectordb_api_key
            .clone()
            .ok_or_else(|| AppError::Config("PINECONE_API_KEY is required for indexing".into()))?;
        let embedder = EmbeddingProvider::build(&config.embedding, config.secrets.embedding_api_key.clone())
            .map_err(|e| AppError::ingest("embed", e))?;
        let pinecone = PineconeClient::new(&config.vectordb, api_key).map_err(|e| AppError::ingest("index", e))?;
        Ok(Self {
            embedder,
            pinecone,
            spec: IndexSpec::from_config(&config.vectordb),
            embed_batch_size: config.embedding.batch_size,
            upsert_batch_size: config.vectordb.upsert_batch_size,
            poll_interval: Duration::from_millis(config.vectordb.poll_interval_ms),
            ready_timeout: Duration::from_secs(config.vectordb.ready_timeout_seconds),
        })
    }

    pub fn embedder(&self) -> &EmbeddingProvider {
        &self.embedder
    }

    pub fn index_spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// One vector per chunk, same order.
    pub async fn embed(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, AppError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let vectors = self
            .embedder
            .embed_all(&texts, self.embed_batch_size)
            .await
            .map_err(|e| AppError::ingest("embed", e))?;
        info!(vectors = vectors.len(), dimension = self.embedder.dimension(), "embedded chunks");
        Ok(vectors)
    }

    /// Delete (if present) and create the index; returns once it is ready.
    pub async fn recreate_index(&self) -> Result<PineconeIndex, AppError> {
        let desc = self
            .pinecone
            .recreate_index(&self.spec)
            .await
            .map_err(|e| AppError::ingest("index", e))?;
        info!(
            index = %desc.name,
            host = %desc.host,
            dimension = ?desc.dimension,
            metric = ?desc.metric,
            "index ready"
        );
        self.pinecone.index_at(&desc.host).map_err(|e| AppError::ingest("index", e))
    }

    /// Upsert all chunks in batches, then wait (bounded) for the index to
    /// report them. Returns the number of vectors the server acknowledged.
    pub async fn upload(
        &self,
        index: &PineconeIndex,
        chunks: &[Chunk],
        vectors: Vec<Vec<f32>>,
    ) -> Result<usize, AppError> {
        if chunks.len() != vectors.len() {
            return Err(AppError::ingest(
                "upload",
                format!("{} chunks but {} vectors", chunks.len(), vectors.len()),
            ));
        }
        let records: Vec<VectorRecord> = chunks
            .iter()
            .zip(vectors)
            .map(|(c, values)| VectorRecord {
                id: c.id.clone(),
                values,
                metadata: ChunkMetadata { text: c.text.clone(), source: c.source.clone(), page: c.page },
            })
            .collect();

        let mut upserted = 0;
        for (i, batch) in records.chunks(self.upsert_batch_size.max(1)).enumerate() {
            upserted += index.upsert(batch).await.map_err(|e| AppError::ingest("upload", e))?;
            info!(batch = i + 1, upserted, total = records.len(), "upserted batch");
        }
        self.wait_for_count(index, upserted as u64).await;
        Ok(upserted)
    }

    // Serverless indexes are eventually consistent; a short lag is not fatal.
    async fn wait_for_count(&self, index: &PineconeIndex, expected: u64) {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            match index.vector_count().await {
                Ok(n) if n >= expected => {
                    info!(vectors = n, "index reports all vectors");
                    return;
                }
                Ok(n) => info!(vectors = n, expected, "waiting for index to catch up"),
                Err(e) => warn!(error = %e, "could not read index stats"),
            }
            if Instant::now() >= deadline {
                warn!(expected, "index vector count not reached before timeout, continuing");
                return;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Embed `query` and return the top-`top_k` matches.
    pub async fn smoke_query(
        &self,
        index: &PineconeIndex,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<QueryMatch>, AppError> {
        let vector = self.embedder.embed(query).await.map_err(|e| AppError::ingest("smoke test", e))?;
        index.query(&vector, top_k).await.map_err(|e| AppError::ingest("smoke test", e))
    }
}
