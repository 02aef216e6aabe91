//! All backend logic independent of how the tool is run.
//!
//! Source PDFs live in a folder the user chooses. Vellum reads them, chunks
//! the text, embeds each chunk with a pretrained model (via Ollama), and
//! upserts the vectors into a remote managed index for similarity search.

pub mod chunks;
pub mod config;
pub mod documents;
pub mod embed;
pub mod pipeline;
pub mod store;

pub use chunks::{chunk_document, chunk_documents, Chunk, DEFAULT_MAX_CHARS, DEFAULT_OVERLAP};
pub use config::{Config, ConfigError};
pub use documents::{scan_documents, Document, ScanError};
pub use embed::{EmbedClient, EmbedError, DEFAULT_EMBED_MODEL};
pub use pipeline::{ingest, IngestError, IngestReport};
pub use store::{IndexClient, IndexStats, StoreError, VectorRecord};

/// Returns a short status string. Used to verify the backend is wired up.
pub fn status() -> &'static str {
    "vellum-core ready"
}
