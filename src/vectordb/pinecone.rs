//! Pinecone REST client.
//!
//! Control plane (`https://api.pinecone.io`):
//!
//! ```text
//! GET    /indexes/{name}      describe (404 = absent)
//! DELETE /indexes/{name}      delete (asynchronous on the server)
//! POST   /indexes             create serverless index
//! ```
//!
//! Data plane (`https://{index host}`):
//!
//! ```text
//! POST /vectors/upsert
//! POST /query
//! POST /describe_index_stats
//! ```
//!
//! Every request carries `Api-Key` and `X-Pinecone-API-Version`.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::VectorDbConfig;

use super::{ChunkMetadata, IndexSpec, QueryMatch, VectorDbError, VectorRecord};

// ── Shared request plumbing ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Auth {
    api_key: String,
    api_version: String,
}

impl Auth {
    fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", &self.api_version)
    }
}

async fn send(req: RequestBuilder, what: &str) -> Result<reqwest::Response, VectorDbError> {
    req.send().await.map_err(|e| {
        error!(error = %e, "pinecone {what} failed (transport)");
        VectorDbError::Transport(format!("{what}: {e}"))
    })
}

async fn check_status(response: reqwest::Response, what: &str) -> Result<reqwest::Response, VectorDbError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    error!(%status, %message, "pinecone {what} returned HTTP error");
    Err(VectorDbError::Api { status: status.as_u16(), message })
}

// ── Control plane ─────────────────────────────────────────────────────────────

/// Index description as returned by `GET /indexes/{name}`.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexDescription {
    pub name: String,
    #[serde(default)]
    pub dimension: Option<usize>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub status: IndexStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IndexStatus {
    #[serde(default)]
    pub ready: bool,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone)]
pub struct PineconeClient {
    client: Client,
    control_plane_url: String,
    auth: Auth,
    namespace: String,
    poll_interval: Duration,
    ready_timeout: Duration,
}

impl PineconeClient {
    pub fn new(config: &VectorDbConfig, api_key: String) -> Result<Self, VectorDbError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VectorDbError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            control_plane_url: config.control_plane_url.trim_end_matches('/').to_string(),
            auth: Auth { api_key, api_version: config.api_version.clone() },
            namespace: config.namespace.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            ready_timeout: Duration::from_secs(config.ready_timeout_seconds),
        })
    }

    fn index_url(&self, name: &str) -> String {
        format!("{}/indexes/{name}", self.control_plane_url)
    }

    /// `Ok(None)` when the index does not exist.
    pub async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>, VectorDbError> {
        let req = self.auth.apply(self.client.get(self.index_url(name)));
        let response = send(req, "describe_index").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let desc = check_status(response, "describe_index")
            .await?
            .json::<IndexDescription>()
            .await
            .map_err(|e| VectorDbError::Parse(format!("describe_index: {e}")))?;
        Ok(Some(desc))
    }

    pub async fn has_index(&self, name: &str) -> Result<bool, VectorDbError> {
        Ok(self.describe_index(name).await?.is_some())
    }

    pub async fn delete_index(&self, name: &str) -> Result<(), VectorDbError> {
        let req = self.auth.apply(self.client.delete(self.index_url(name)));
        let response = send(req, "delete_index").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(VectorDbError::NotFound(name.to_string()));
        }
        check_status(response, "delete_index").await?;
        Ok(())
    }

    pub async fn create_index(&self, spec: &IndexSpec) -> Result<(), VectorDbError> {
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": { "serverless": { "cloud": spec.cloud, "region": spec.region } },
        });
        let req = self
            .auth
            .apply(self.client.post(format!("{}/indexes", self.control_plane_url)))
            .json(&body);
        check_status(send(req, "create_index").await?, "create_index").await?;
        Ok(())
    }

    /// Poll until `describe_index` returns 404.
    pub async fn wait_until_deleted(&self, name: &str) -> Result<(), VectorDbError> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            if self.describe_index(name).await?.is_none() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(VectorDbError::Timeout(format!("deletion of index '{name}'")));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Poll until the index reports `status.ready`.
    pub async fn wait_until_ready(&self, name: &str) -> Result<IndexDescription, VectorDbError> {
        let deadline = Instant::now() + self.ready_timeout;
        loop {
            match self.describe_index(name).await? {
                Some(desc) if desc.status.ready => return Ok(desc),
                Some(desc) => debug!(index = %name, state = %desc.status.state, "index not ready yet"),
                None => debug!(index = %name, "index not visible yet"),
            }
            if Instant::now() >= deadline {
                return Err(VectorDbError::Timeout(format!("index '{name}' to become ready")));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Delete the index if present, create it fresh, and wait for readiness.
    pub async fn recreate_index(&self, spec: &IndexSpec) -> Result<IndexDescription, VectorDbError> {
        if self.has_index(&spec.name).await? {
            info!(index = %spec.name, "deleting existing index");
            self.delete_index(&spec.name).await?;
            self.wait_until_deleted(&spec.name).await?;
        }
        info!(
            index = %spec.name,
            dimension = spec.dimension,
            metric = %spec.metric,
            cloud = %spec.cloud,
            region = %spec.region,
            "creating index"
        );
        self.create_index(spec).await?;
        let desc = self.wait_until_ready(&spec.name).await?;
        if let Some(dimension) = desc.dimension.filter(|d| *d != spec.dimension) {
            return Err(VectorDbError::Config(format!(
                "index '{}' reports dimension {dimension}, expected {}",
                spec.name, spec.dimension
            )));
        }
        Ok(desc)
    }

    /// Resolve the index host and return a data-plane handle.
    pub async fn connect(&self, name: &str) -> Result<PineconeIndex, VectorDbError> {
        let desc = self
            .describe_index(name)
            .await?
            .ok_or_else(|| VectorDbError::NotFound(name.to_string()))?;
        self.index_at(&desc.host)
    }

    /// Data-plane handle for a known host. A host without a scheme gets
    /// `https://`, which is what Pinecone returns.
    pub fn index_at(&self, host: &str) -> Result<PineconeIndex, VectorDbError> {
        if host.is_empty() {
            return Err(VectorDbError::Config("index has no host".into()));
        }
        let base_url = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };
        Ok(PineconeIndex {
            client: self.client.clone(),
            base_url,
            auth: self.auth.clone(),
            namespace: self.namespace.clone(),
        })
    }
}

// ── Data plane ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct PineconeIndex {
    client: Client,
    base_url: String,
    auth: Auth,
    namespace: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    #[serde(default)]
    total_vector_count: u64,
    #[serde(default)]
    namespaces: std::collections::HashMap<String, NamespaceStats>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NamespaceStats {
    #[serde(default)]
    vector_count: u64,
}

impl PineconeIndex {
    /// Upsert one batch. Returns the server's upserted count.
    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, VectorDbError> {
        if records.is_empty() {
            return Ok(0);
        }
        let req = self
            .auth
            .apply(self.client.post(format!("{}/vectors/upsert", self.base_url)))
            .json(&UpsertRequest { vectors: records, namespace: &self.namespace });
        let resp = check_status(send(req, "upsert").await?, "upsert")
            .await?
            .json::<UpsertResponse>()
            .await
            .map_err(|e| VectorDbError::Parse(format!("upsert: {e}")))?;
        debug!(sent = records.len(), upserted = resp.upserted_count, "upserted batch");
        Ok(resp.upserted_count)
    }

    /// Top-`top_k` matches for `vector`, best first.
    pub async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>, VectorDbError> {
        let req = self
            .auth
            .apply(self.client.post(format!("{}/query", self.base_url)))
            .json(&QueryRequest {
                vector,
                top_k,
                include_metadata: true,
                include_values: false,
                namespace: &self.namespace,
            });
        let resp = check_status(send(req, "query").await?, "query")
            .await?
            .json::<QueryResponse>()
            .await
            .map_err(|e| VectorDbError::Parse(format!("query: {e}")))?;

        Ok(resp
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m
                    .metadata
                    .and_then(|v| serde_json::from_value::<ChunkMetadata>(v).ok()),
            })
            .collect())
    }

    /// Number of vectors in the configured namespace.
    pub async fn vector_count(&self) -> Result<u64, VectorDbError> {
        let req = self
            .auth
            .apply(self.client.post(format!("{}/describe_index_stats", self.base_url)))
            .json(&json!({}));
        let stats = check_status(send(req, "describe_index_stats").await?, "describe_index_stats")
            .await?
            .json::<StatsResponse>()
            .await
            .map_err(|e| VectorDbError::Parse(format!("describe_index_stats: {e}")))?;
        if self.namespace.is_empty() {
            Ok(stats.total_vector_count)
        } else {
            Ok(stats.namespaces.get(&self.namespace).map(|n| n.vector_count).unwrap_or(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn client(url: &str) -> PineconeClient {
        let mut cfg = Config::test_default().vectordb;
        cfg.control_plane_url = url.to_string();
        PineconeClient::new(&cfg, "pc_test".into()).unwrap()
    }

    fn spec() -> IndexSpec {
        IndexSpec::from_config(&Config::test_default().vectordb)
    }

    #[tokio::test]
    async fn describe_missing_index_is_none() {
        let mut server = mockito::Server::new_async().await;
        server.mock("GET", "/indexes/test-index").with_status(404).create_async().await;
        assert!(!client(&server.url()).has_index("test-index").await.unwrap());
    }

    #[tokio::test]
    async fn requests_carry_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/indexes/test-index")
            .match_header("api-key", "pc_test")
            .match_header("x-pinecone-api-version", "2025-01")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"test-index","dimension":4,"metric":"cosine","host":"idx.example.io","status":{"ready":true,"state":"Ready"}}"#)
            .create_async()
            .await;

        let desc = client(&server.url()).describe_index("test-index").await.unwrap().unwrap();
        assert_eq!(desc.host, "idx.example.io");
        assert!(desc.status.ready);
        mock.assert_async().await;
    }

    fn ready_body(host: &str) -> String {
        format!(
            r#"{{"name":"test-index","dimension":4,"metric":"cosine","host":"{host}","status":{{"ready":true,"state":"Ready"}}}}"#
        )
    }

    #[tokio::test]
    async fn recreate_creates_when_absent() {
        let mut server = mockito::Server::new_async().await;
        let absent = server
            .mock("GET", "/indexes/test-index")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/indexes")
            .match_body(mockito::Matcher::Json(serde_json::json!({
                "name": "test-index",
                "dimension": 4,
                "metric": "cosine",
                "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } }
            })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let ready = server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ready_body("h"))
            .expect(1)
            .create_async()
            .await;

        let desc = client(&server.url()).recreate_index(&spec()).await.unwrap();
        assert_eq!(desc.host, "h");
        assert_eq!(desc.dimension, Some(4));
        assert_eq!(desc.metric.as_deref(), Some("cosine"));
        absent.assert_async().await;
        create.assert_async().await;
        ready.assert_async().await;
    }

    // Mocks on one path are served in creation order once each has its hit.
    #[tokio::test]
    async fn recreate_replaces_existing_index() {
        let mut server = mockito::Server::new_async().await;
        let present = server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ready_body("old.example.io"))
            .expect(1)
            .create_async()
            .await;
        let delete = server
            .mock("DELETE", "/indexes/test-index")
            .with_status(202)
            .expect(1)
            .create_async()
            .await;
        let gone = server
            .mock("GET", "/indexes/test-index")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        let create = server
            .mock("POST", "/indexes")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({ "name": "test-index", "dimension": 4 })))
            .with_status(201)
            .with_body("{}")
            .expect(1)
            .create_async()
            .await;
        let ready = server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ready_body("idx.example.io"))
            .expect(1)
            .create_async()
            .await;

        let desc = client(&server.url()).recreate_index(&spec()).await.unwrap();
        assert_eq!(desc.host, "idx.example.io");
        present.assert_async().await;
        delete.assert_async().await;
        gone.assert_async().await;
        create.assert_async().await;
        ready.assert_async().await;
    }

    #[tokio::test]
    async fn recreate_rejects_wrong_dimension() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/indexes/test-index")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;
        server.mock("POST", "/indexes").with_status(201).with_body("{}").create_async().await;
        server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"test-index","dimension":384,"host":"h","status":{"ready":true,"state":"Ready"}}"#)
            .create_async()
            .await;

        let err = client(&server.url()).recreate_index(&spec()).await.unwrap_err();
        assert!(matches!(err, VectorDbError::Config(ref m) if m.contains("384")), "{err}");
    }

    #[tokio::test]
    async fn wait_until_deleted_times_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(ready_body("h"))
            .create_async()
            .await;
        let err = client(&server.url()).wait_until_deleted("test-index").await.unwrap_err();
        assert!(matches!(err, VectorDbError::Timeout(_)));
    }

    #[tokio::test]
    async fn wait_until_ready_times_out() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/indexes/test-index")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"test-index","host":"h","status":{"ready":false,"state":"Initializing"}}"#)
            .create_async()
            .await;
        let err = client(&server.url()).wait_until_ready("test-index").await.unwrap_err();
        assert!(matches!(err, VectorDbError::Timeout(_)));
    }

    #[tokio::test]
    async fn delete_missing_index_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server.mock("DELETE", "/indexes/test-index").with_status(404).create_async().await;
        let err = client(&server.url()).delete_index("test-index").await.unwrap_err();
        assert!(matches!(err, VectorDbError::NotFound(_)));
    }

    #[test]
    fn host_without_scheme_gets_https() {
        let c = client("http://localhost:0");
        assert_eq!(c.index_at("idx.svc.pinecone.io").unwrap().base_url, "https://idx.svc.pinecone.io");
        assert_eq!(c.index_at("http://127.0.0.1:9/").unwrap().base_url, "http://127.0.0.1:9");
        assert!(c.index_at("").is_err());
    }

    #[tokio::test]
    async fn query_parses_metadata_with_float_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "topK": 3,
                "includeMetadata": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"matches":[
                    {"id":"a","score":0.91,"metadata":{"text":"Diabetes causes thirst.","source":"data/book.pdf","page":12.0}},
                    {"id":"b","score":0.80,"metadata":{"unrelated":true}}
                ],"namespace":""}"#,
            )
            .create_async()
            .await;

        let index = client("http://localhost:0").index_at(&server.url()).unwrap();
        let matches = index.query(&[0.1, 0.2, 0.3, 0.4], 3).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].text(), Some("Diabetes causes thirst."));
        assert_eq!(matches[0].metadata.as_ref().unwrap().page, 12);
        assert!(matches[1].text().is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upsert_sends_vectors_and_namespace() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/vectors/upsert")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "namespace": "",
                "vectors": [{ "id": "c1", "metadata": { "text": "t", "source": "s.pdf", "page": 1 } }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"upsertedCount":1}"#)
            .create_async()
            .await;

        let index = client("http://localhost:0").index_at(&server.url()).unwrap();
        let records = vec![VectorRecord {
            id: "c1".into(),
            values: vec![0.0, 1.0, 0.0, 0.0],
            metadata: ChunkMetadata { text: "t".into(), source: "s.pdf".into(), page: 1 },
        }];
        assert_eq!(index.upsert(&records).await.unwrap(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn vector_count_reads_total() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/describe_index_stats")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"namespaces":{"":{"vectorCount":7}},"dimension":4,"totalVectorCount":7}"#)
            .create_async()
            .await;
        let index = client("http://localhost:0").index_at(&server.url()).unwrap();
        assert_eq!(index.vector_count().await.unwrap(), 7);
    }
}
