use tracing::{info, warn};

use crate::config::Config;
use crate::embedding::EmbeddingProvider;
use crate::vectordb::pinecone::{PineconeClient, PineconeIndex};

/// Context used whenever retrieval is disabled, fails, or finds nothing.
pub const NO_CONTEXT: &str = "No specific medical context available.";

#[derive(Debug, Clone)]
struct Backend {
    embedder: EmbeddingProvider,
    index: PineconeIndex,
}

/// Top-k similarity search over the ingested medical chunks.
///
/// Never fails: every error degrades to [`NO_CONTEXT`].
#[derive(Debug, Clone)]
pub struct ContextRetriever {
    backend: Option<Backend>,
    top_k: usize,
}

/// Context string plus how many chunks went into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrieved {
    pub context: String,
    pub documents: usize,
}

impl ContextRetriever {
    pub fn new(embedder: EmbeddingProvider, index: PineconeIndex, top_k: usize) -> Self {
        Self { backend: Some(Backend { embedder, index }), top_k }
    }

    pub fn disabled() -> Self {
        Self { backend: None, top_k: 0 }
    }

    /// Build from config. Missing credentials or a failed connection
    /// disable retrieval with a warning instead of failing startup.
    pub async fn from_config(config: &Config) -> Self {
        let Some(api_key) = config.secrets.vectordb_api_key.clone() else {
            warn!("no PINECONE_API_KEY found, running without retrieval");
            return Self::disabled();
        };
        match connect(config, api_key).await {
            Ok(retriever) => {
                info!(
                    index = %config.vectordb.index_name,
                    embedding_model = %config.embedding.model,
                    top_k = config.vectordb.top_k,
                    "vector store initialised"
                );
                retriever
            }
            Err(e) => {
                warn!(error = %e, "could not initialise vector store, running without retrieval");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn retrieve(&self, query: &str) -> Retrieved {
        let Some(backend) = &self.backend else {
            return Retrieved { context: NO_CONTEXT.to_string(), documents: 0 };
        };

        let result = async {
            let vector = backend
                .embedder
                .embed(query)
                .await
                .map_err(|e| e.to_string())?;
            backend
                .index
                .query(&vector, self.top_k)
                .await
                .map_err(|e| e.to_string())
        }
        .await;

        match result {
            Ok(matches) => {
                let texts: Vec<&str> = matches.iter().filter_map(|m| m.text()).collect();
                info!(documents = texts.len(), "retrieved context documents");
                if texts.is_empty() {
                    Retrieved { context: NO_CONTEXT.to_string(), documents: 0 }
                } else {
                    Retrieved { context: texts.join("\n\n"), documents: texts.len() }
                }
            }
            Err(e) => {
                warn!(error = %e, "retrieval failed, using fallback context");
                Retrieved { context: NO_CONTEXT.to_string(), documents: 0 }
            }
        }
    }
}

async fn connect(config: &Config, api_key: String) -> Result<ContextRetriever, String> {
    let embedder = EmbeddingProvider::build(&config.embedding, config.secrets.embedding_api_key.clone())
        .map_err(|e| e.to_string())?;
    let client = PineconeClient::new(&config.vectordb, api_key).map_err(|e| e.to_string())?;
    let index = client
        .connect(&config.vectordb.index_name)
        .await
        .map_err(|e| e.to_string())?;
    Ok(ContextRetriever::new(embedder, index, config.vectordb.top_k))
}
