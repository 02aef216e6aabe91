//! Ingest pipeline: scan → chunk → embed → upsert into the remote index.

use std::path::Path;

use tracing::info;

use crate::chunks::{chunk_documents, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP};
use crate::documents::{scan_documents, ScanError};
use crate::embed::{EmbedClient, EmbedError};
use crate::store::{IndexClient, StoreError, VectorRecord};

/// What the pipeline did, for reporting to the user.
#[derive(Debug, Clone, Copy)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
    pub upserted: usize,
}

/// Runs the full pipeline: load PDFs under `root`, chunk, embed, upsert.
pub async fn ingest(
    root: &Path,
    embedder: &EmbedClient,
    index: &IndexClient,
    max_chars: Option<usize>,
    overlap: Option<usize>,
) -> Result<IngestReport, IngestError> {
    info!(root = %root.display(), "loading PDF documents");
    let docs = scan_documents(root)?;

    let max_chars = max_chars.unwrap_or(DEFAULT_MAX_CHARS);
    let overlap = overlap.unwrap_or(DEFAULT_OVERLAP);
    info!(documents = docs.len(), max_chars, overlap, "creating text chunks");
    let chunks = chunk_documents(&docs, max_chars, overlap);

    if chunks.is_empty() {
        return Ok(IngestReport {
            documents: docs.len(),
            chunks: 0,
            upserted: 0,
        });
    }

    info!(chunks = chunks.len(), model = embedder.model(), "embedding chunks");
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != chunks.len() {
        return Err(IngestError::EmbeddingCount {
            expected: chunks.len(),
            got: embeddings.len(),
        });
    }

    let records: Vec<VectorRecord> = chunks
        .iter()
        .zip(embeddings)
        .map(|(chunk, values)| VectorRecord::from_chunk(chunk, values))
        .collect();

    info!(vectors = records.len(), "upserting into index");
    let upserted = index.upsert(&records).await?;

    Ok(IngestReport {
        documents: docs.len(),
        chunks: records.len(),
        upserted,
    })
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("scan error: {0}")]
    Scan(#[from] ScanError),
    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),
    #[error("index error: {0}")]
    Store(#[from] StoreError),
    #[error("embedding count mismatch: expected {expected}, got {got}")]
    EmbeddingCount { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writes a one-page PDF with `text` drawn in Helvetica, computing the
    /// xref offsets so the file is well-formed.
    fn write_minimal_pdf(path: &Path, text: &str) {
        let content = format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ];
        let mut body: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, obj) in objects.iter().enumerate() {
            offsets.push(body.len());
            body.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, obj).as_bytes());
        }
        let xref_at = body.len();
        body.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        body.extend_from_slice(b"0000000000 65535 f \n");
        for off in &offsets {
            body.extend_from_slice(format!("{off:010} 00000 n \n").as_bytes());
        }
        body.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_at
            )
            .as_bytes(),
        );
        std::fs::write(path, body).unwrap();
    }

    /// Ollama /api/embed response carrying `embeddings`.
    fn embed_body(embeddings: &[Vec<f32>]) -> String {
        serde_json::json!({ "model": "all-minilm", "embeddings": embeddings }).to_string()
    }

    #[tokio::test]
    async fn ingest_uploads_embedded_chunks() {
        let dir = std::env::temp_dir().join("vellum-ingest-happy-test");
        std::fs::create_dir_all(&dir).unwrap();
        write_minimal_pdf(&dir.join("doc.pdf"), "Hello ingest");

        // Learn how many chunks the fixture produces so the mocks line up.
        let docs = scan_documents(&dir).unwrap();
        let chunks = chunk_documents(&docs, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP);
        let n = chunks.len();
        assert!(n >= 1);

        let mut ollama = mockito::Server::new_async().await;
        ollama
            .mock("POST", "/api/embed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(embed_body(&vec![vec![0.1, 0.2]; n]))
            .create_async()
            .await;
        let mut index = mockito::Server::new_async().await;
        index
            .mock("POST", "/vectors/upsert")
            .with_status(200)
            .with_body(format!(r#"{{"upsertedCount": {n}}}"#))
            .create_async()
            .await;

        let embedder = EmbedClient::from_url(&ollama.url()).unwrap();
        let client = IndexClient::new(index.url(), "test-key", "");
        let report = ingest(&dir, &embedder, &client, None, None).await.unwrap();
        assert_eq!(report.documents, 1);
        assert_eq!(report.chunks, n);
        assert_eq!(report.upserted, n);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn ingest_rejects_embedding_count_mismatch() {
        let dir = std::env::temp_dir().join("vellum-ingest-mismatch-test");
        std::fs::create_dir_all(&dir).unwrap();
        write_minimal_pdf(&dir.join("doc.pdf"), "Hello ingest");

        let docs = scan_documents(&dir).unwrap();
        let n = chunk_documents(&docs, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP).len();
        assert!(n >= 1);

        // One embedding too many; the index must never be contacted.
        let mut ollama = mockito::Server::new_async().await;
        ollama
            .mock("POST", "/api/embed")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(embed_body(&vec![vec![0.1, 0.2]; n + 1]))
            .create_async()
            .await;
        let mut index = mockito::Server::new_async().await;
        let upsert = index
            .mock("POST", "/vectors/upsert")
            .expect(0)
            .create_async()
            .await;

        let embedder = EmbedClient::from_url(&ollama.url()).unwrap();
        let client = IndexClient::new(index.url(), "test-key", "");
        let err = ingest(&dir, &embedder, &client, None, None)
            .await
            .unwrap_err();
        match err {
            IngestError::EmbeddingCount { expected, got } => {
                assert_eq!(expected, n);
                assert_eq!(got, n + 1);
            }
            other => panic!("expected EmbeddingCount error, got {other:?}"),
        }
        upsert.assert_async().await;
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn ingest_empty_dir_is_noop() {
        let dir = std::env::temp_dir().join("vellum-ingest-empty-test");
        std::fs::create_dir_all(&dir).unwrap();
        // Neither client is contacted when there is nothing to embed.
        let embedder = EmbedClient::from_url("http://localhost:11434").unwrap();
        let index = IndexClient::new("http://localhost:9", "test-key", "");
        let report = ingest(&dir, &embedder, &index, None, None).await.unwrap();
        assert_eq!(report.documents, 0);
        assert_eq!(report.chunks, 0);
        assert_eq!(report.upserted, 0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn ingest_missing_dir_is_scan_error() {
        let embedder = EmbedClient::from_url("http://localhost:11434").unwrap();
        let index = IndexClient::new("http://localhost:9", "test-key", "");
        let err = ingest(
            Path::new("/nonexistent/vellum-pipeline-test"),
            &embedder,
            &index,
            None,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, IngestError::Scan(ScanError::NotADirectory(_))));
    }
}
