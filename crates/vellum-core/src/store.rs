//! Client for a managed vector index (Pinecone serverless data plane).
//! Wraps the REST API we need: upsert vectors and read index stats.

use serde::{Deserialize, Serialize};

use crate::chunks::Chunk;

/// Vectors per upsert request. The data plane caps request size, so large
/// ingests go up in slices.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// One vector ready for upsert: id, embedding values, and chunk metadata.
#[derive(Debug, Clone, Serialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: VectorMetadata,
}

/// Metadata stored alongside each vector so search results can cite the passage.
#[derive(Debug, Clone, Serialize)]
pub struct VectorMetadata {
    /// The chunk text itself.
    pub text: String,
    /// Source file the chunk came from.
    pub source: String,
    /// Index of the chunk within its source document.
    pub chunk: usize,
}

impl VectorRecord {
    /// Pair a chunk with its embedding. Ids are fresh v4 UUIDs.
    pub fn from_chunk(chunk: &Chunk, values: Vec<f32>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            values,
            metadata: VectorMetadata {
                text: chunk.text.clone(),
                source: chunk.doc_path.to_string_lossy().into_owned(),
                chunk: chunk.index,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpsertResponse {
    #[serde(rename = "upsertedCount", default)]
    upserted_count: usize,
}

/// Totals reported by the index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexStats {
    pub dimension: Option<usize>,
    #[serde(rename = "totalVectorCount", default)]
    pub total_vector_count: usize,
}

/// Client bound to one index host and namespace. Cheap to clone; the
/// underlying HTTP client is shared.
#[derive(Debug, Clone)]
pub struct IndexClient {
    http: reqwest::Client,
    host: String,
    api_key: String,
    namespace: String,
}

impl IndexClient {
    pub fn new(
        host: impl Into<String>,
        api_key: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            host: host.into(),
            api_key: api_key.into(),
            namespace: namespace.into(),
        }
    }

    /// Upsert all records, slicing into requests of at most
    /// [`UPSERT_BATCH_SIZE`] vectors. Returns the total upserted count.
    pub async fn upsert(&self, records: &[VectorRecord]) -> Result<usize, StoreError> {
        let mut total = 0;
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let body = UpsertRequest {
                vectors: batch,
                namespace: &self.namespace,
            };
            let resp = self
                .http
                .post(format!("{}/vectors/upsert", self.host))
                .header("Api-Key", &self.api_key)
                .json(&body)
                .send()
                .await
                .map_err(StoreError::Request)?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(StoreError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
            let parsed: UpsertResponse = resp.json().await.map_err(StoreError::Request)?;
            tracing::debug!(upserted = parsed.upserted_count, "upserted batch");
            total += parsed.upserted_count;
        }
        Ok(total)
    }

    /// Fetch dimension and vector count from the index.
    pub async fn stats(&self) -> Result<IndexStats, StoreError> {
        let resp = self
            .http
            .post(format!("{}/describe_index_stats", self.host))
            .header("Api-Key", &self.api_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            // The stats endpoint expects a JSON object body, even an empty one.
            .body("{}")
            .send()
            .await
            .map_err(StoreError::Request)?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                body,
            });
        }
        resp.json().await.map_err(StoreError::Request)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("index request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("index returned {status}: {body}")]
    Api { status: u16, body: String },
}
